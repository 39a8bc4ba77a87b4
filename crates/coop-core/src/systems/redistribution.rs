//! Redistribution System
//!
//! Surplus extraction above a threshold, then a flat-rate tax on surplus
//! shared evenly across each donor's beneficiary set.

use rand::seq::index;
use rand::Rng;

use coop_events::BeneficiaryRule;

use crate::components::agent::AgentId;
use crate::components::network::Network;

/// System: Move utility above `threshold` into surplus
pub fn calc_surplus(network: &mut Network, threshold: f64) {
    for agent in network.agents_mut() {
        if agent.utility > threshold {
            agent.surplus += agent.utility - threshold;
            agent.utility = threshold;
        }
    }
}

/// Memoized beneficiary sets, one per donor.
///
/// Topology is fixed after construction, so a set never changes once
/// computed. The cache remembers the rule and radius it was filled for and
/// starts over if asked for a different combination.
#[derive(Debug, Clone, Default)]
pub struct BeneficiaryCache {
    key: Option<(BeneficiaryRule, usize)>,
    sets: Vec<Option<Vec<AgentId>>>,
}

impl BeneficiaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of donors with a computed set
    pub fn cached_count(&self) -> usize {
        self.sets.iter().filter(|s| s.is_some()).count()
    }

    /// Beneficiaries of `donor`, computing and caching them on first use
    pub fn resolve<R: Rng + ?Sized>(
        &mut self,
        network: &Network,
        donor: AgentId,
        rule: BeneficiaryRule,
        radius: usize,
        rng: &mut R,
    ) -> &[AgentId] {
        if self.key != Some((rule, radius)) || self.sets.len() != network.len() {
            if self.key.is_some() {
                tracing::debug!(?rule, radius, "Beneficiary parameters changed, dropping cache");
            }
            self.key = Some((rule, radius));
            self.sets = vec![None; network.len()];
        }

        self.sets[donor].get_or_insert_with(|| match rule {
            BeneficiaryRule::Nearest => network.within_radius(donor, radius),
            BeneficiaryRule::Random => random_beneficiaries(network, donor, radius, rng),
        })
        .as_slice()
    }
}

/// Topology-blind sample, sized like the donor's radius neighbourhood,
/// never containing the donor itself.
fn random_beneficiaries<R: Rng + ?Sized>(
    network: &Network,
    donor: AgentId,
    radius: usize,
    rng: &mut R,
) -> Vec<AgentId> {
    let others = network.len().saturating_sub(1);
    let size = network.within_radius(donor, radius).len().min(others);

    let mut picked: Vec<AgentId> = index::sample(rng, others, size)
        .into_iter()
        .map(|i| if i >= donor { i + 1 } else { i })
        .collect();
    picked.sort_unstable();
    picked
}

/// System: Tax every positive surplus at `tax_rate` and share it out.
///
/// Donors with no beneficiaries keep their whole surplus. Returns the total
/// amount taxed, which equals the total benefit handed out.
pub fn distribute_tax<R: Rng + ?Sized>(
    network: &mut Network,
    cache: &mut BeneficiaryCache,
    tax_rate: f64,
    radius: usize,
    rule: BeneficiaryRule,
    rng: &mut R,
) -> f64 {
    let mut total_tax = 0.0;

    for donor in 0..network.len() {
        let surplus = network.agents()[donor].surplus;
        if surplus <= 0.0 {
            continue;
        }

        let beneficiaries = cache.resolve(network, donor, rule, radius, rng);
        if beneficiaries.is_empty() {
            continue;
        }

        let tax = surplus * tax_rate;
        let share = tax / beneficiaries.len() as f64;
        let agents = network.agents_mut();
        agents[donor].surplus -= tax;
        for &beneficiary in beneficiaries {
            agents[beneficiary].benefit += share;
        }
        total_tax += tax;
    }

    total_tax
}
