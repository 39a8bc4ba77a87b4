//! Shared record types for the cooperation simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! The engine produces these records and anything downstream (loggers,
//! plotting, sweep analysis) consumes them.

pub mod record;

pub use record::{
    generate_run_id, BeneficiaryRule, NetworkType, ParseLabelError, RunSummary, TimeseriesPoint,
};
