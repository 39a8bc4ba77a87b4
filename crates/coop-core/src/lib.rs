//! Cooperation Simulation Engine Library
//!
//! Public API for simulating networked 2x2 social dilemmas under local
//! wealth redistribution. Agents play every edge of a fixed topology, pay a
//! tax on utility above a threshold to a beneficiary neighbourhood, and
//! imitate better-off neighbours through the Fermi rule.

use rand::rngs::SmallRng;
use rand::SeedableRng;

pub mod components;
pub mod config;
pub mod error;
pub mod experiment;
pub mod output;
pub mod setup;
pub mod simulation;
pub mod systems;

pub use components::*;
pub use error::{SimError, SimResult};
pub use setup::Topology;
pub use simulation::{IterationParams, Iterations, RunOutcome, Simulation};

pub use coop_events::{BeneficiaryRule, NetworkType, RunSummary, TimeseriesPoint};

/// Seeded random number generator owned by a single simulation
#[derive(Debug, Clone)]
pub struct SimRng(pub SmallRng);

impl SimRng {
    pub fn seed_from_u64(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }
}
