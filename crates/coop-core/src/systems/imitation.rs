//! Imitation System
//!
//! Pairwise comparison with the Fermi rule: a random agent looks at a random
//! neighbour and copies its strategy with probability
//! `1 / (1 + exp(-beta * (fitness(model) - fitness(focal))))`.

use rand::Rng;

use crate::components::agent::AgentId;
use crate::components::network::Network;

/// Exponent magnitude past which the Fermi probability is saturated
pub const MAX_EXPONENT: f64 = 700.0;

/// Probability that the focal agent adopts the model's strategy.
///
/// Saturates to 0 or 1 instead of evaluating `exp` out of range.
pub fn fermi_probability(intensity: f64, focal_fitness: f64, model_fitness: f64) -> f64 {
    let exponent = -intensity * (model_fitness - focal_fitness);
    if exponent.is_nan() {
        return 0.0;
    }
    if exponent > MAX_EXPONENT {
        return 0.0;
    }
    if exponent < -MAX_EXPONENT {
        return 1.0;
    }
    1.0 / (1.0 + exponent.exp())
}

/// System: Run `num_updates` imitation events.
///
/// Only agents with at least one neighbour are drawn as the focal agent.
/// Updates are applied in sequence, so a later event sees earlier switches.
/// Returns how many events changed a strategy.
pub fn update_strategies<R: Rng + ?Sized>(
    network: &mut Network,
    intensity: f64,
    num_updates: usize,
    rng: &mut R,
) -> usize {
    let candidates: Vec<AgentId> = network
        .agents()
        .iter()
        .filter(|a| a.degree() > 0)
        .map(|a| a.id)
        .collect();
    if candidates.is_empty() {
        tracing::debug!("No connected agents, skipping strategy updates");
        return 0;
    }

    let mut switched = 0;
    for _ in 0..num_updates {
        let focal = candidates[rng.gen_range(0..candidates.len())];
        let model = match network.random_neighbor(focal, rng) {
            Ok(model) => model,
            Err(e) => {
                tracing::debug!("Skipping update: {}", e);
                continue;
            }
        };

        let agents = network.agents_mut();
        let p = fermi_probability(intensity, agents[focal].fitness(), agents[model].fitness());
        if rng.gen::<f64>() < p {
            let adopted = agents[model].strategy;
            if agents[focal].strategy != adopted {
                agents[focal].strategy = adopted;
                switched += 1;
            }
        }
    }

    switched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::agent::Strategy;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_fermi_neutral_and_symmetric() {
        assert_eq!(fermi_probability(1.0, 2.0, 2.0), 0.5);
        assert_eq!(fermi_probability(0.0, -5.0, 5.0), 0.5);

        let up = fermi_probability(1.0, 0.0, 2.0);
        let down = fermi_probability(1.0, 2.0, 0.0);
        assert!((up + down - 1.0).abs() < 1e-12);
        assert!((up - 1.0 / (1.0 + (-2.0f64).exp())).abs() < 1e-12);
    }

    #[test]
    fn test_fermi_saturates() {
        assert_eq!(fermi_probability(1e6, 0.0, 1e6), 1.0);
        assert_eq!(fermi_probability(1e6, 1e6, 0.0), 0.0);
        assert_eq!(fermi_probability(f64::MAX, 0.0, f64::MAX), 1.0);
        assert_eq!(fermi_probability(0.0, 0.0, f64::INFINITY), 0.0);
    }

    #[test]
    fn test_strong_selection_copies_fitter_neighbor() {
        // Pair: cooperator far fitter than defector
        let mut network = Network::new(2);
        network.add_edge(0, 1);
        network.agents_mut()[0].utility = 100.0;

        let mut rng = SmallRng::seed_from_u64(11);
        update_strategies(&mut network, 1000.0, 50, &mut rng);
        assert_eq!(network.agents()[0].strategy, Strategy::Cooperate);
        assert_eq!(network.agents()[1].strategy, Strategy::Cooperate);
    }

    #[test]
    fn test_isolated_agents_never_update() {
        // 0 and 1 linked, 2 and 3 isolated defector/cooperator
        let mut network = Network::new(4);
        network.add_edge(0, 1);
        let mut rng = SmallRng::seed_from_u64(2);

        update_strategies(&mut network, 1.0, 200, &mut rng);
        assert_eq!(network.agents()[2].strategy, Strategy::Cooperate);
        assert_eq!(network.agents()[3].strategy, Strategy::Defect);
    }

    #[test]
    fn test_no_edges_is_noop() {
        let mut network = Network::new(5);
        let mut rng = SmallRng::seed_from_u64(0);
        assert_eq!(update_strategies(&mut network, 1.0, 10, &mut rng), 0);
        assert_eq!(network.cooperation_fraction(), 0.6);
    }
}
