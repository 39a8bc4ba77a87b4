//! Simulation State
//!
//! Owns the population, its topology, the payoff source, the beneficiary
//! cache and the run's random number generator. One iteration is
//! play → surplus → tax → imitation → reset.

use serde::{Deserialize, Serialize};

use coop_events::BeneficiaryRule;

use crate::components::network::Network;
use crate::components::payoff::{DilemmaFamily, PayoffSource, PayoffTable};
use crate::error::{SimError, SimResult};
use crate::setup::Topology;
use crate::systems::{self, BeneficiaryCache};
use crate::SimRng;

/// Parameters applied on every iteration of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterationParams {
    /// Utility above this is surplus (theta)
    pub threshold: f64,
    /// Fraction of surplus taxed, 0.0 - 1.0 (alpha)
    pub tax_rate: f64,
    /// Hops defining the nearest beneficiary set
    pub radius: usize,
    pub beneficiaries: BeneficiaryRule,
    /// Selection intensity (beta)
    pub intensity: f64,
    pub updates_per_iteration: usize,
}

impl Default for IterationParams {
    fn default() -> Self {
        Self {
            threshold: 1.0,
            tax_rate: 0.5,
            radius: 2,
            beneficiaries: BeneficiaryRule::Nearest,
            intensity: 1.0,
            updates_per_iteration: 1,
        }
    }
}

impl IterationParams {
    pub fn validate(&self) -> SimResult<()> {
        if !self.threshold.is_finite() {
            return Err(SimError::invalid("threshold", "must be finite"));
        }
        if !(0.0..=1.0).contains(&self.tax_rate) {
            return Err(SimError::invalid(
                "tax_rate",
                format!("must lie in [0, 1], got {}", self.tax_rate),
            ));
        }
        if self.radius == 0 {
            return Err(SimError::invalid("radius", "must be at least 1"));
        }
        if !self.intensity.is_finite() || self.intensity < 0.0 {
            return Err(SimError::invalid(
                "intensity",
                format!("must be finite and non-negative, got {}", self.intensity),
            ));
        }
        Ok(())
    }
}

/// End-of-run statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub final_cooperation_fraction: f64,
    /// Population is all-cooperate or all-defect
    pub converged: bool,
    pub iterations_run: u64,
    /// First iteration after which the population was converged
    pub iterations_to_convergence: Option<u64>,
}

/// A single experiment run
#[derive(Debug)]
pub struct Simulation<P = PayoffTable> {
    network: Network,
    payoff: P,
    topology: Option<Topology>,
    beneficiaries: BeneficiaryCache,
    rng: SimRng,
    seed: u64,
    initial_cooperation: f64,
    iterations_run: u64,
    converged_at: Option<u64>,
}

impl Simulation<PayoffTable> {
    /// Build the payoff table and topology for a fresh population
    pub fn construct(
        num_agents: usize,
        topology: Topology,
        family: DilemmaFamily,
        temptation: f64,
        seed: u64,
    ) -> SimResult<Self> {
        let payoff = PayoffTable::build(family, temptation)?;
        let mut sim = Simulation::with_payoff(num_agents, payoff, seed)?;
        sim.build_topology(topology)?;
        Ok(sim)
    }

    /// The `m` the payoff table was built from
    pub fn temptation(&self) -> f64 {
        self.payoff.motivation
    }
}

impl<P: PayoffSource> Simulation<P> {
    /// Unconnected population using a custom payoff source
    pub fn with_payoff(num_agents: usize, payoff: P, seed: u64) -> SimResult<Self> {
        if num_agents == 0 {
            return Err(SimError::invalid("num_agents", "must be at least 1"));
        }
        let network = Network::new(num_agents);
        let initial_cooperation = network.cooperation_fraction();
        Ok(Self {
            network,
            payoff,
            topology: None,
            beneficiaries: BeneficiaryCache::new(),
            rng: SimRng::seed_from_u64(seed),
            seed,
            initial_cooperation,
            iterations_run: 0,
            converged_at: None,
        })
    }

    /// Generate the topology. Only the first successful call has any effect.
    pub fn build_topology(&mut self, topology: Topology) -> SimResult<()> {
        topology.build(&mut self.network, &mut self.rng.0)?;
        self.network.check_symmetry()?;
        self.topology = Some(topology);
        Ok(())
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn payoff(&self) -> &P {
        &self.payoff
    }

    pub fn topology(&self) -> Option<Topology> {
        self.topology
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn iterations_run(&self) -> u64 {
        self.iterations_run
    }

    /// Cooperating fraction of the initial strategy assignment
    pub fn initial_cooperation(&self) -> f64 {
        self.initial_cooperation
    }

    pub fn average_degree(&self) -> f64 {
        self.network.average_degree()
    }

    pub fn play(&mut self) {
        systems::play(&mut self.network, &self.payoff);
    }

    pub fn calc_surplus(&mut self, threshold: f64) {
        systems::calc_surplus(&mut self.network, threshold);
    }

    /// Returns the total tax collected
    pub fn distribute_tax(&mut self, tax_rate: f64, radius: usize, rule: BeneficiaryRule) -> f64 {
        systems::distribute_tax(
            &mut self.network,
            &mut self.beneficiaries,
            tax_rate,
            radius,
            rule,
            &mut self.rng.0,
        )
    }

    /// Returns how many updates changed a strategy
    pub fn update_strategies(&mut self, intensity: f64, num_updates: usize) -> usize {
        systems::update_strategies(&mut self.network, intensity, num_updates, &mut self.rng.0)
    }

    pub fn reset_payoffs(&mut self) {
        self.network.reset_payoffs();
    }

    /// (fraction cooperating, fraction defecting)
    pub fn strategy_distribution(&self) -> (f64, f64) {
        let cooperating = self.network.cooperation_fraction();
        (cooperating, 1.0 - cooperating)
    }

    /// All agents share one strategy
    pub fn is_done(&self) -> bool {
        let (cooperating, _) = self.strategy_distribution();
        cooperating == 0.0 || cooperating == 1.0
    }

    /// Run one full iteration and return the cooperating fraction
    pub fn step(&mut self, params: &IterationParams) -> SimResult<f64> {
        params.validate()?;
        Ok(self.advance(params))
    }

    fn advance(&mut self, params: &IterationParams) -> f64 {
        self.play();
        self.calc_surplus(params.threshold);
        self.distribute_tax(params.tax_rate, params.radius, params.beneficiaries);
        self.update_strategies(params.intensity, params.updates_per_iteration);
        let (cooperating, _) = self.strategy_distribution();
        self.reset_payoffs();

        self.iterations_run += 1;
        if self.converged_at.is_none() && self.is_done() {
            self.converged_at = Some(self.iterations_run);
        }
        cooperating
    }

    /// Lazily run `count` iterations, yielding the cooperating fraction after each
    pub fn run_iterations(
        &mut self,
        count: u64,
        params: IterationParams,
    ) -> SimResult<Iterations<'_, P>> {
        params.validate()?;
        Ok(Iterations {
            sim: self,
            params,
            remaining: count,
        })
    }

    pub fn summary(&self) -> RunOutcome {
        RunOutcome {
            final_cooperation_fraction: self.strategy_distribution().0,
            converged: self.is_done(),
            iterations_run: self.iterations_run,
            iterations_to_convergence: self.converged_at,
        }
    }
}

/// Iterator returned by [`Simulation::run_iterations`]
#[derive(Debug)]
pub struct Iterations<'a, P> {
    sim: &'a mut Simulation<P>,
    params: IterationParams,
    remaining: u64,
}

impl<P: PayoffSource> Iterator for Iterations<'_, P> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.sim.advance(&self.params))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl<P: PayoffSource> ExactSizeIterator for Iterations<'_, P> {}
