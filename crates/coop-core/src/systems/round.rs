//! Round System
//!
//! One game per edge, rewards accumulated into both players' utility.

use crate::components::network::Network;
use crate::components::payoff::PayoffSource;

/// System: Play every edge once against the payoff source
pub fn play<P: PayoffSource + ?Sized>(network: &mut Network, payoff: &P) {
    let (agents, edges) = network.split_mut();
    for edge in edges {
        let (u, v) = edge.endpoints();
        let (reward_u, reward_v) = payoff.payoff(agents[u].strategy, agents[v].strategy);
        agents[u].utility += reward_u;
        agents[v].utility += reward_v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::agent::Strategy;
    use crate::components::payoff::{DilemmaFamily, PayoffTable};

    /// Constant payoff used to count games per agent
    struct Unit;

    impl PayoffSource for Unit {
        fn payoff(&self, _row: Strategy, _col: Strategy) -> (f64, f64) {
            (1.0, 1.0)
        }
    }

    #[test]
    fn test_each_edge_played_once() {
        let mut network = Network::new(4);
        network.add_edge(0, 1);
        network.add_edge(0, 2);
        network.add_edge(0, 3);

        play(&mut network, &Unit);
        let utilities: Vec<f64> = network.agents().iter().map(|a| a.utility).collect();
        assert_eq!(utilities, vec![3.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_prisoners_round() {
        // 0 (C) - 1 (D) - 2 (C)
        let mut network = Network::new(3);
        network.add_edge(0, 1);
        network.add_edge(1, 2);
        let table = PayoffTable::build(DilemmaFamily::Prisoners, 1.2).unwrap();

        play(&mut network, &table);
        let agents = network.agents();
        assert!((agents[0].utility - (-0.2)).abs() < 1e-12);
        assert!((agents[1].utility - 2.4).abs() < 1e-12);
        assert!((agents[2].utility - (-0.2)).abs() < 1e-12);
        assert_eq!(agents[1].strategy, Strategy::Defect);
    }
}
