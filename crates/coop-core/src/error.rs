//! Simulation Errors

use thiserror::Error;

/// Errors raised by the simulation engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// A construction or iteration parameter is out of range
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Internal consistency check failed; indicates a defect
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// Topology build requested on a network that already has edges
    #[error("topology already populated ({edges} edges)")]
    AlreadyPopulated { edges: usize },

    /// Neighbour selection on an isolated agent
    #[error("agent {0} has no neighbors")]
    NoNeighbors(usize),
}

impl SimError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        SimError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
