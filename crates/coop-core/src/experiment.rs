//! Experiment Driver
//!
//! Runs single simulations or a full parameter sweep and hands the results
//! to the record writer.

use thiserror::Error;

use coop_events::RunSummary;

use crate::components::payoff::DilemmaFamily;
use crate::config::Config;
use crate::error::SimError;
use crate::output::{build_run_summary, RecordError, RecordWriter, RunLabels};
use crate::setup::Topology;
use crate::simulation::{IterationParams, Simulation};

/// Errors that can abort an experiment
#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error("Simulation error: {0}")]
    Sim(#[from] SimError),
    #[error("Record error: {0}")]
    Record(#[from] RecordError),
}

/// One fully specified run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSpec {
    pub num_agents: usize,
    pub topology: Topology,
    pub family: DilemmaFamily,
    pub temptation: f64,
    pub seed: u64,
    pub iterations: u64,
    pub stop_at_convergence: bool,
    pub params: IterationParams,
}

impl RunSpec {
    /// The single run described by the top-level config sections
    pub fn from_config(config: &Config) -> Self {
        Self {
            num_agents: config.simulation.num_agents,
            topology: config.topology,
            family: config.payoff.family,
            temptation: config.payoff.temptation,
            seed: config.simulation.seed,
            iterations: config.simulation.iterations,
            stop_at_convergence: config.simulation.stop_at_convergence,
            params: config.iteration_params(),
        }
    }
}

/// Result of a finished run
#[derive(Debug, Clone)]
pub struct RunResult {
    pub summary: RunSummary,
    /// Cooperating fraction after each iteration
    pub history: Vec<f64>,
}

/// Expand the sweep grid: topology, then temptation, then tax rate, then seed
pub fn sweep_specs(config: &Config) -> Vec<RunSpec> {
    let base = RunSpec::from_config(config);
    let sweep = &config.sweep;
    let mut specs = Vec::with_capacity(
        sweep.topologies.len() * sweep.temptations.len() * sweep.tax_rates.len() * sweep.seeds.len(),
    );

    for &topology in &sweep.topologies {
        for &temptation in &sweep.temptations {
            for &tax_rate in &sweep.tax_rates {
                for &seed in &sweep.seeds {
                    specs.push(RunSpec {
                        topology,
                        temptation,
                        seed,
                        params: IterationParams {
                            tax_rate,
                            ..base.params
                        },
                        ..base
                    });
                }
            }
        }
    }
    specs
}

/// Construct and run one simulation
pub fn run_single(spec: &RunSpec) -> Result<RunResult, SimError> {
    let mut sim = Simulation::construct(
        spec.num_agents,
        spec.topology,
        spec.family,
        spec.temptation,
        spec.seed,
    )?;

    // The budget is only an upper bound when stopping at convergence
    let mut history = Vec::new();
    for fraction in sim.run_iterations(spec.iterations, spec.params)? {
        history.push(fraction);
        if spec.stop_at_convergence && (fraction == 0.0 || fraction == 1.0) {
            break;
        }
    }

    let labels = RunLabels {
        topology: spec.topology,
        temptation: spec.temptation,
    };
    let summary = build_run_summary(&sim, labels, &spec.params);
    tracing::info!(
        run_id = %summary.run_id,
        iterations = history.len(),
        converged = summary.converged,
        final_frac_coop = summary.final_frac_coop,
        "Run complete"
    );

    Ok(RunResult { summary, history })
}

/// Run every spec in order, logging each result. Returns the number of runs.
pub fn run_all(specs: &[RunSpec], writer: &mut RecordWriter) -> Result<usize, ExperimentError> {
    for (i, spec) in specs.iter().enumerate() {
        tracing::info!(
            "Running {} of {}: {}, T={}, alpha={}, seed={}",
            i + 1,
            specs.len(),
            spec.topology.network_type(),
            spec.temptation,
            spec.params.tax_rate,
            spec.seed
        );
        let result = run_single(spec)?;
        writer.log_timeseries(&result.summary.run_id, &result.history)?;
        writer.log_run_summary(&result.summary)?;
    }
    writer.flush()?;
    Ok(specs.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> Config {
        let mut config = Config::default();
        config.simulation.num_agents = 30;
        config.simulation.iterations = 20;
        config.sweep.temptations = vec![1.2, 1.4];
        config.sweep.tax_rates = vec![0.0, 0.5];
        config.sweep.seeds = vec![0, 1, 2];
        config
    }

    #[test]
    fn test_sweep_grid_order() {
        let specs = sweep_specs(&small_config());
        assert_eq!(specs.len(), 2 * 2 * 2 * 3);

        assert_eq!(specs[0].topology.network_type(), coop_events::NetworkType::Homogeneous);
        assert_eq!((specs[0].temptation, specs[0].params.tax_rate, specs[0].seed), (1.2, 0.0, 0));
        assert_eq!(specs[1].seed, 1);
        assert_eq!(specs[3].params.tax_rate, 0.5);
        assert_eq!(specs[6].temptation, 1.4);
        assert_eq!(
            specs[12].topology,
            Topology::PreferentialAttachment { edges_per_agent: 2 }
        );
        assert!(specs.iter().all(|s| s.num_agents == 30 && s.iterations == 20));
    }

    #[test]
    fn test_run_single_history_length() {
        let spec = RunSpec::from_config(&small_config());
        let result = run_single(&spec).unwrap();
        assert_eq!(result.history.len(), 20);
        assert_eq!(result.summary.final_frac_coop, result.history[19]);
    }

    #[test]
    fn test_stop_at_convergence() {
        let mut config = small_config();
        config.simulation.iterations = 5000;
        config.simulation.stop_at_convergence = true;
        config.topology = Topology::Ring;
        config.simulation.num_agents = 4;
        config.imitation.intensity = 20.0;
        config.imitation.updates_per_iteration = 4;

        let result = run_single(&RunSpec::from_config(&config)).unwrap();
        if result.summary.converged {
            let last = *result.history.last().unwrap();
            assert!(last == 0.0 || last == 1.0);
            assert_eq!(result.summary.iters_to_conv, result.history.len() as u64);
        } else {
            assert_eq!(result.history.len(), 5000);
        }
    }

    #[test]
    fn test_huge_budget_stops_at_convergence() {
        let mut config = small_config();
        config.simulation.iterations = u64::MAX / 4;
        config.simulation.stop_at_convergence = true;
        config.topology = Topology::Ring;
        config.simulation.num_agents = 4;
        config.redistribution.tax_rate = 0.0;
        // Neutral drift: every update copies the opposite neighbour with p = 1/2
        config.imitation.intensity = 0.0;
        config.imitation.updates_per_iteration = 4;

        let result = run_single(&RunSpec::from_config(&config)).unwrap();
        assert!(result.summary.converged);
        assert!(result.history.len() < 10_000);
        assert_eq!(result.summary.iters_to_conv, result.history.len() as u64);
    }

    #[test]
    fn test_run_all_counts_records() {
        let mut config = small_config();
        config.sweep.topologies = vec![Topology::Ring];
        config.sweep.temptations = vec![1.5];
        let specs = sweep_specs(&config);

        let mut writer = RecordWriter::null();
        let runs = run_all(&specs, &mut writer).unwrap();
        assert_eq!(runs, 6);
        assert_eq!(writer.runs_written(), 6);
        assert_eq!(writer.points_written(), 6 * 20);
    }

    #[test]
    fn test_invalid_spec_aborts() {
        let mut config = small_config();
        config.payoff.temptation = 3.0;
        let err = run_single(&RunSpec::from_config(&config)).unwrap_err();
        assert!(matches!(err, SimError::InvalidParameter { .. }));
    }
}
