//! Simulation Systems
//!
//! The per-iteration steps: game round, redistribution, imitation.

pub mod imitation;
pub mod redistribution;
pub mod round;

pub use imitation::{fermi_probability, update_strategies, MAX_EXPONENT};
pub use redistribution::{calc_surplus, distribute_tax, BeneficiaryCache};
pub use round::play;
