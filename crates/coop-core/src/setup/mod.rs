//! Simulation Setup
//!
//! Topology generation for a freshly constructed population.

pub mod topology;

pub use topology::*;
