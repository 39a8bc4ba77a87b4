//! Run Records
//!
//! Serialization structs for the per-run summary and the per-iteration
//! cooperation timeseries. Both are append-only tabular records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Generates the run identifier used to join summaries with timeseries rows.
///
/// Format: `<NETWORK>_T<temptation>_a<tax_rate>_s<seed>`, two decimals each.
pub fn generate_run_id(network: NetworkType, temptation: f64, tax_rate: f64, seed: u64) -> String {
    format!("{}_T{:.2}_a{:.2}_s{}", network, temptation, tax_rate, seed)
}

/// Topology family a run was played on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkType {
    /// Homogeneous random graph
    #[serde(rename = "HRG")]
    Homogeneous,
    /// Preferential attachment graph
    #[serde(rename = "PAG")]
    PreferentialAttachment,
    /// Ring lattice
    #[serde(rename = "RING")]
    Ring,
}

impl NetworkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkType::Homogeneous => "HRG",
            NetworkType::PreferentialAttachment => "PAG",
            NetworkType::Ring => "RING",
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who receives a donor's taxed surplus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeneficiaryRule {
    /// Every agent within the beneficiary radius of the donor
    #[default]
    Nearest,
    /// A topology-blind sample of the same size as the nearest set
    Random,
}

impl BeneficiaryRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            BeneficiaryRule::Nearest => "nearest",
            BeneficiaryRule::Random => "random",
        }
    }
}

impl fmt::Display for BeneficiaryRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a label does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLabelError {
    pub kind: &'static str,
    pub label: String,
}

impl fmt::Display for ParseLabelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {:?}", self.kind, self.label)
    }
}

impl std::error::Error for ParseLabelError {}

impl FromStr for BeneficiaryRule {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" => Ok(BeneficiaryRule::Nearest),
            "random" => Ok(BeneficiaryRule::Random),
            _ => Err(ParseLabelError {
                kind: "beneficiary rule",
                label: s.to_string(),
            }),
        }
    }
}

impl FromStr for NetworkType {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HRG" => Ok(NetworkType::Homogeneous),
            "PAG" => Ok(NetworkType::PreferentialAttachment),
            "RING" => Ok(NetworkType::Ring),
            _ => Err(ParseLabelError {
                kind: "network type",
                label: s.to_string(),
            }),
        }
    }
}

/// Summary of a single simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub seed: u64,
    pub network_type: NetworkType,
    #[serde(rename = "N")]
    pub num_agents: usize,
    pub avg_degree: f64,
    #[serde(rename = "T")]
    pub temptation: f64,
    pub alpha: f64,
    pub theta: f64,
    pub beta: f64,
    pub beneficiary_rule: BeneficiaryRule,
    pub init_frac_coop: f64,
    pub converged: bool,
    pub iters_to_conv: u64,
    pub final_frac_coop: f64,
}

/// Cooperation fraction observed at the end of one iteration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesPoint {
    pub run_id: String,
    pub iter: u64,
    pub frac_coop: f64,
}

impl TimeseriesPoint {
    /// Expand a cooperation history into timeseries rows for one run.
    pub fn from_history(run_id: &str, history: &[f64]) -> Vec<TimeseriesPoint> {
        history
            .iter()
            .enumerate()
            .map(|(i, &frac_coop)| TimeseriesPoint {
                run_id: run_id.to_string(),
                iter: i as u64,
                frac_coop,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_format() {
        let id = generate_run_id(NetworkType::Homogeneous, 1.5, 0.3, 4);
        assert_eq!(id, "HRG_T1.50_a0.30_s4");

        let id = generate_run_id(NetworkType::PreferentialAttachment, 1.1, 0.0, 0);
        assert_eq!(id, "PAG_T1.10_a0.00_s0");
    }

    #[test]
    fn test_labels_parse() {
        assert_eq!("random".parse::<BeneficiaryRule>().unwrap(), BeneficiaryRule::Random);
        assert_eq!("Nearest".parse::<BeneficiaryRule>().unwrap(), BeneficiaryRule::Nearest);
        assert_eq!("pag".parse::<NetworkType>().unwrap(), NetworkType::PreferentialAttachment);
        assert!("lattice".parse::<NetworkType>().is_err());
    }

    #[test]
    fn test_summary_field_names() {
        let summary = RunSummary {
            run_id: "RING_T1.50_a0.50_s7".to_string(),
            seed: 7,
            network_type: NetworkType::Ring,
            num_agents: 4,
            avg_degree: 2.0,
            temptation: 1.5,
            alpha: 0.5,
            theta: 1.0,
            beta: 1.0,
            beneficiary_rule: BeneficiaryRule::Nearest,
            init_frac_coop: 0.5,
            converged: false,
            iters_to_conv: 10,
            final_frac_coop: 0.25,
        };

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["network_type"], "RING");
        assert_eq!(value["N"], 4);
        assert_eq!(value["T"], 1.5);
        assert_eq!(value["beneficiary_rule"], "nearest");

        let parsed: RunSummary = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, summary);
    }

    #[test]
    fn test_timeseries_from_history() {
        let rows = TimeseriesPoint::from_history("run", &[0.5, 0.25, 0.0]);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].iter, 2);
        assert_eq!(rows[2].frac_coop, 0.0);
        assert!(rows.iter().all(|r| r.run_id == "run"));
    }
}
