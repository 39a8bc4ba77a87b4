//! Configuration System
//!
//! Loads run and sweep parameters from tuning.toml so experiments can be
//! adjusted without recompiling. Every section falls back to defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use coop_events::BeneficiaryRule;

use crate::components::payoff::DilemmaFamily;
use crate::setup::Topology;
use crate::simulation::IterationParams;

/// Default tuning file path
pub const DEFAULT_TUNING_PATH: &str = "tuning.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationConfig,
    pub topology: Topology,
    pub payoff: PayoffConfig,
    pub redistribution: RedistributionConfig,
    pub imitation: ImitationConfig,
    pub sweep: SweepConfig,
    pub output: OutputConfig,
}

/// Population size and run length
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub num_agents: usize,
    pub iterations: u64,
    pub seed: u64,
    /// End a run as soon as the population is all-C or all-D
    pub stop_at_convergence: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_agents: 1000,
            iterations: 10_000,
            seed: 0,
            stop_at_convergence: false,
        }
    }
}

/// Dilemma family and temptation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PayoffConfig {
    pub family: DilemmaFamily,
    pub temptation: f64,
}

impl Default for PayoffConfig {
    fn default() -> Self {
        Self {
            family: DilemmaFamily::Prisoners,
            temptation: 1.5,
        }
    }
}

/// Surplus threshold and tax
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedistributionConfig {
    pub threshold: f64,
    pub tax_rate: f64,
    pub radius: usize,
    pub beneficiaries: BeneficiaryRule,
}

impl Default for RedistributionConfig {
    fn default() -> Self {
        Self {
            threshold: 1.0,
            tax_rate: 0.5,
            radius: 2,
            beneficiaries: BeneficiaryRule::Nearest,
        }
    }
}

/// Strategy update settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImitationConfig {
    pub intensity: f64,
    pub updates_per_iteration: usize,
}

impl Default for ImitationConfig {
    fn default() -> Self {
        Self {
            intensity: 1.0,
            updates_per_iteration: 1,
        }
    }
}

/// Parameter grid for sweep mode
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub temptations: Vec<f64>,
    pub tax_rates: Vec<f64>,
    pub seeds: Vec<u64>,
    pub topologies: Vec<Topology>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            temptations: vec![1.1, 1.2, 1.3, 1.4, 1.5],
            tax_rates: vec![0.0, 0.3, 0.5, 0.7, 0.9],
            seeds: (0..5).collect(),
            topologies: vec![
                Topology::default(),
                Topology::PreferentialAttachment { edges_per_agent: 2 },
            ],
        }
    }
}

/// Where run records are appended
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub runs_file: String,
    pub timeseries_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            runs_file: "runs.jsonl".to_string(),
            timeseries_file: "timeseries.jsonl".to_string(),
        }
    }
}

impl OutputConfig {
    pub fn runs_path(&self) -> PathBuf {
        self.dir.join(&self.runs_file)
    }

    pub fn timeseries_path(&self) -> PathBuf {
        self.dir.join(&self.timeseries_file)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from `path`, or use defaults if the file does not exist.
    ///
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!("{} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Per-iteration parameters for the configured run
    pub fn iteration_params(&self) -> IterationParams {
        IterationParams {
            threshold: self.redistribution.threshold,
            tax_rate: self.redistribution.tax_rate,
            radius: self.redistribution.radius,
            beneficiaries: self.redistribution.beneficiaries,
            intensity: self.imitation.intensity,
            updates_per_iteration: self.imitation.updates_per_iteration,
        }
    }
}

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
