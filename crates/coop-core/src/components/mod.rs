//! Simulation Components
//!
//! Agents, the interaction network, and the payoff model.

pub mod agent;
pub mod network;
pub mod payoff;

pub use agent::*;
pub use network::*;
pub use payoff::*;
