//! Topology Builders
//!
//! Generators for the interaction network. Every builder writes through
//! `Network::add_edge` and refuses to run on a network that already has
//! edges.

use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

use coop_events::NetworkType;

use crate::components::agent::AgentId;
use crate::components::network::Network;
use crate::error::{SimError, SimResult};

/// Consecutive failed insertions tolerated by the homogeneous builder
pub const DEFAULT_ATTEMPTS: usize = 1000;

fn default_attempts() -> usize {
    DEFAULT_ATTEMPTS
}

/// Network generator and its parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Topology {
    /// Every agent targets the same degree; pairs are drawn at random
    Homogeneous {
        degree: usize,
        #[serde(default = "default_attempts")]
        attempts: usize,
    },
    /// Barabási–Albert style growth from a seed clique
    PreferentialAttachment { edges_per_agent: usize },
    /// Agent i linked to i + 1 (mod N)
    Ring,
}

impl Default for Topology {
    fn default() -> Self {
        Topology::Homogeneous {
            degree: 4,
            attempts: DEFAULT_ATTEMPTS,
        }
    }
}

impl Topology {
    pub fn network_type(&self) -> NetworkType {
        match self {
            Topology::Homogeneous { .. } => NetworkType::Homogeneous,
            Topology::PreferentialAttachment { .. } => NetworkType::PreferentialAttachment,
            Topology::Ring => NetworkType::Ring,
        }
    }

    /// Check the parameters against a population of `num_agents`
    pub fn validate(&self, num_agents: usize) -> SimResult<()> {
        match *self {
            Topology::Homogeneous { degree, attempts } => {
                if degree == 0 || degree >= num_agents {
                    return Err(SimError::invalid(
                        "degree",
                        format!("must satisfy 1 <= degree < N ({}), got {}", num_agents, degree),
                    ));
                }
                if attempts == 0 {
                    return Err(SimError::invalid("attempts", "must be at least 1"));
                }
            }
            Topology::PreferentialAttachment { edges_per_agent } => {
                if edges_per_agent == 0 || edges_per_agent >= num_agents {
                    return Err(SimError::invalid(
                        "edges_per_agent",
                        format!(
                            "must satisfy 1 <= k < N ({}), got {}",
                            num_agents, edges_per_agent
                        ),
                    ));
                }
            }
            Topology::Ring => {
                if num_agents < 3 {
                    return Err(SimError::invalid(
                        "num_agents",
                        format!("a ring needs at least 3 agents, got {}", num_agents),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Populate an empty network
    pub fn build<R: Rng + ?Sized>(&self, network: &mut Network, rng: &mut R) -> SimResult<()> {
        self.validate(network.len())?;
        ensure_empty(network)?;

        match *self {
            Topology::Homogeneous { degree, attempts } => {
                build_homogeneous(network, degree, attempts, rng)
            }
            Topology::PreferentialAttachment { edges_per_agent } => {
                build_preferential(network, edges_per_agent, rng)
            }
            Topology::Ring => build_ring(network),
        }

        tracing::debug!(
            topology = %self.network_type(),
            agents = network.len(),
            edges = network.edge_count(),
            avg_degree = network.average_degree(),
            "Built topology"
        );
        Ok(())
    }
}

fn ensure_empty(network: &Network) -> SimResult<()> {
    if network.edge_count() > 0 {
        return Err(SimError::AlreadyPopulated {
            edges: network.edge_count(),
        });
    }
    Ok(())
}

/// Homogeneous random graph.
///
/// Pairs are drawn from the pool of agents still below `degree`. Near the
/// end the remaining pairs are often already linked, so the loop gives up
/// after `attempts` consecutive rejections and may leave a few agents short.
fn build_homogeneous<R: Rng + ?Sized>(
    network: &mut Network,
    degree: usize,
    attempts: usize,
    rng: &mut R,
) {
    let mut pool: Vec<AgentId> = (0..network.len()).collect();
    let mut failures = 0usize;

    while pool.len() > 1 {
        let picked = index::sample(rng, pool.len(), 2);
        let (a, b) = (pool[picked.index(0)], pool[picked.index(1)]);

        if network.add_edge(a, b) {
            failures = 0;
            pool.retain(|&id| network.degree(id) < degree);
        } else {
            failures += 1;
            if failures >= attempts {
                break;
            }
        }
    }

    let short = (0..network.len()).filter(|&id| network.degree(id) < degree).count();
    if short > 0 {
        tracing::warn!(
            short,
            target_degree = degree,
            "Homogeneous builder stopped with agents below target degree"
        );
    }
}

/// Preferential attachment.
///
/// Seeds the complete graph on agents `0..=k`, then links every later agent
/// to `k` distinct targets drawn from the endpoint multiset, so high-degree
/// agents are proportionally more likely to be picked.
fn build_preferential<R: Rng + ?Sized>(network: &mut Network, k: usize, rng: &mut R) {
    let n = network.len();
    let mut endpoints: Vec<AgentId> = Vec::with_capacity(2 * k * n);

    for a in 0..=k {
        for b in (a + 1)..=k {
            if network.add_edge(a, b) {
                endpoints.push(a);
                endpoints.push(b);
            }
        }
    }

    for new in (k + 1)..n {
        let mut added = 0;
        while added < k {
            let target = endpoints[rng.gen_range(0..endpoints.len())];
            if target == new || !network.add_edge(new, target) {
                continue;
            }
            endpoints.push(new);
            endpoints.push(target);
            added += 1;
        }
    }
}

fn build_ring(network: &mut Network) {
    let n = network.len();
    for i in 0..n {
        network.add_edge(i, (i + 1) % n);
    }
}
