//! Agent Components
//!
//! Per-agent strategy and round accumulators.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Index of an agent in the simulation's agent table
pub type AgentId = usize;

/// Binary move played against every neighbour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Cooperate,
    Defect,
}

impl Strategy {
    /// Initial assignment: even indices cooperate, odd indices defect
    pub fn initial_for(id: AgentId) -> Self {
        if id % 2 == 0 {
            Strategy::Cooperate
        } else {
            Strategy::Defect
        }
    }

    pub fn cooperates(&self) -> bool {
        matches!(self, Strategy::Cooperate)
    }
}

impl From<bool> for Strategy {
    fn from(cooperate: bool) -> Self {
        if cooperate {
            Strategy::Cooperate
        } else {
            Strategy::Defect
        }
    }
}

/// A vertex of the interaction network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub strategy: Strategy,
    /// Raw payoff accumulated this round (clamped to the threshold once surplus is taken)
    pub utility: f64,
    /// Utility above the threshold, owned by the agent until taxed
    pub surplus: f64,
    /// Tax received from donors this round
    pub benefit: f64,
    pub(crate) neighbors: BTreeSet<AgentId>,
}

impl Agent {
    pub fn new(id: AgentId) -> Self {
        Self {
            id,
            strategy: Strategy::initial_for(id),
            utility: 0.0,
            surplus: 0.0,
            benefit: 0.0,
            neighbors: BTreeSet::new(),
        }
    }

    /// Post-redistribution value accumulated this round
    pub fn fitness(&self) -> f64 {
        self.utility + self.surplus + self.benefit
    }

    pub fn neighbors(&self) -> &BTreeSet<AgentId> {
        &self.neighbors
    }

    pub fn degree(&self) -> usize {
        self.neighbors.len()
    }

    pub fn reset_payoffs(&mut self) {
        self.utility = 0.0;
        self.surplus = 0.0;
        self.benefit = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_strategy_alternates() {
        let agents: Vec<_> = (0..4).map(Agent::new).collect();
        assert_eq!(agents[0].strategy, Strategy::Cooperate);
        assert_eq!(agents[1].strategy, Strategy::Defect);
        assert_eq!(agents[2].strategy, Strategy::Cooperate);
        assert_eq!(agents[3].strategy, Strategy::Defect);
    }

    #[test]
    fn test_fitness_sums_accumulators() {
        let mut agent = Agent::new(0);
        agent.utility = 1.0;
        agent.surplus = 0.5;
        agent.benefit = 0.25;
        assert_eq!(agent.fitness(), 1.75);

        agent.reset_payoffs();
        assert_eq!(agent.fitness(), 0.0);
        assert_eq!(agent.strategy, Strategy::Cooperate);
    }

    #[test]
    fn test_strategy_from_bool() {
        assert_eq!(Strategy::from(true), Strategy::Cooperate);
        assert_eq!(Strategy::from(false), Strategy::Defect);
        assert!(Strategy::Cooperate.cooperates());
        assert!(!Strategy::Defect.cooperates());
    }
}
