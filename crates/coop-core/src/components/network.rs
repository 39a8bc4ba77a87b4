//! Interaction Network
//!
//! Flat agent table plus an undirected edge set. Adjacency is stored as
//! agent indices in each agent's neighbour set; `add_edge` is the only
//! writer and keeps both sides and the edge set in step.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

use crate::components::agent::{Agent, AgentId};
use crate::error::{SimError, SimResult};

/// Undirected edge, stored with the lower index first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge(AgentId, AgentId);

impl Edge {
    /// Normalized edge between two distinct agents
    pub fn new(a: AgentId, b: AgentId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Edge(a, b)),
            std::cmp::Ordering::Greater => Some(Edge(b, a)),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn endpoints(&self) -> (AgentId, AgentId) {
        (self.0, self.1)
    }
}

/// Agents and the undirected simple graph linking them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    agents: Vec<Agent>,
    edges: BTreeSet<Edge>,
}

impl Network {
    /// `num_agents` unconnected agents with alternating initial strategies
    pub fn new(num_agents: usize) -> Self {
        Self {
            agents: (0..num_agents).map(Agent::new).collect(),
            edges: BTreeSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub(crate) fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    /// Agents for mutation alongside a read-only view of the edge set
    pub(crate) fn split_mut(&mut self) -> (&mut [Agent], &BTreeSet<Edge>) {
        (&mut self.agents, &self.edges)
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.edges.iter().copied()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn has_edge(&self, a: AgentId, b: AgentId) -> bool {
        Edge::new(a, b).is_some_and(|e| self.edges.contains(&e))
    }

    pub fn degree(&self, id: AgentId) -> usize {
        self.agents.get(id).map_or(0, Agent::degree)
    }

    /// Add an undirected edge. Returns false for self-loops, unknown
    /// agents, and edges that already exist.
    pub fn add_edge(&mut self, a: AgentId, b: AgentId) -> bool {
        let Some(edge) = Edge::new(a, b) else {
            return false;
        };
        if b.max(a) >= self.agents.len() || self.edges.contains(&edge) {
            return false;
        }

        self.agents[a].neighbors.insert(b);
        self.agents[b].neighbors.insert(a);
        self.edges.insert(edge);
        true
    }

    /// Mean degree, `2E / N`
    pub fn average_degree(&self) -> f64 {
        if self.agents.is_empty() {
            return 0.0;
        }
        2.0 * self.edges.len() as f64 / self.agents.len() as f64
    }

    /// Uniformly random neighbour of `id`
    pub fn random_neighbor<R: Rng + ?Sized>(&self, id: AgentId, rng: &mut R) -> SimResult<AgentId> {
        let agent = self.agents.get(id).ok_or(SimError::NoNeighbors(id))?;
        if agent.neighbors.is_empty() {
            return Err(SimError::NoNeighbors(id));
        }
        let pick = rng.gen_range(0..agent.neighbors.len());
        agent
            .neighbors
            .iter()
            .nth(pick)
            .copied()
            .ok_or(SimError::NoNeighbors(id))
    }

    /// All agents between 1 and `radius` hops from `center`, sorted, center excluded
    pub fn within_radius(&self, center: AgentId, radius: usize) -> Vec<AgentId> {
        if center >= self.agents.len() || radius == 0 {
            return Vec::new();
        }

        let mut seen = BTreeSet::from([center]);
        let mut queue = VecDeque::from([(center, 0usize)]);
        while let Some((current, depth)) = queue.pop_front() {
            if depth == radius {
                continue;
            }
            for &next in &self.agents[current].neighbors {
                if seen.insert(next) {
                    queue.push_back((next, depth + 1));
                }
            }
        }

        seen.remove(&center);
        seen.into_iter().collect()
    }

    /// Fraction of agents currently cooperating
    pub fn cooperation_fraction(&self) -> f64 {
        if self.agents.is_empty() {
            return 0.0;
        }
        let cooperators = self.agents.iter().filter(|a| a.strategy.cooperates()).count();
        cooperators as f64 / self.agents.len() as f64
    }

    /// Zero utility, surplus and benefit for every agent
    pub fn reset_payoffs(&mut self) {
        for agent in &mut self.agents {
            agent.reset_payoffs();
        }
    }

    /// Check that adjacency and the edge set describe the same simple graph
    pub fn check_symmetry(&self) -> SimResult<()> {
        let mut half_edges = 0usize;
        for agent in &self.agents {
            for &other in &agent.neighbors {
                if other == agent.id {
                    return Err(SimError::InvariantViolation(format!(
                        "self-loop on agent {}",
                        agent.id
                    )));
                }
                let back = self
                    .agents
                    .get(other)
                    .is_some_and(|o| o.neighbors.contains(&agent.id));
                if !back || !self.has_edge(agent.id, other) {
                    return Err(SimError::InvariantViolation(format!(
                        "edge {} -> {} is one-sided",
                        agent.id, other
                    )));
                }
                half_edges += 1;
            }
        }

        if half_edges != 2 * self.edges.len() {
            return Err(SimError::InvariantViolation(format!(
                "edge set holds {} edges but adjacency holds {}",
                self.edges.len(),
                half_edges / 2
            )));
        }
        Ok(())
    }
}
