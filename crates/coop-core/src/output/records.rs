//! Run Records
//!
//! Builds the shared run-summary record from a simulation and the
//! parameters it was run with.

use coop_events::{generate_run_id, RunSummary};

use crate::components::payoff::PayoffSource;
use crate::setup::Topology;
use crate::simulation::{IterationParams, Simulation};

/// Labels a simulation cannot know about itself
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunLabels {
    pub topology: Topology,
    pub temptation: f64,
}

/// Summarize a run. Unconverged runs report the full iteration count as
/// iterations-to-convergence.
pub fn build_run_summary<P: PayoffSource>(
    sim: &Simulation<P>,
    labels: RunLabels,
    params: &IterationParams,
) -> RunSummary {
    let outcome = sim.summary();
    let network_type = labels.topology.network_type();

    RunSummary {
        run_id: generate_run_id(network_type, labels.temptation, params.tax_rate, sim.seed()),
        seed: sim.seed(),
        network_type,
        num_agents: sim.network().len(),
        avg_degree: sim.average_degree(),
        temptation: labels.temptation,
        alpha: params.tax_rate,
        theta: params.threshold,
        beta: params.intensity,
        beneficiary_rule: params.beneficiaries,
        init_frac_coop: sim.initial_cooperation(),
        converged: outcome.converged,
        iters_to_conv: outcome
            .iterations_to_convergence
            .unwrap_or(outcome.iterations_run),
        final_frac_coop: outcome.final_cooperation_fraction,
    }
}
