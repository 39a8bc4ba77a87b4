//! Payoff Model
//!
//! Normalized 2x2 social dilemmas. Every family is built from the same four
//! values `[m, 1, 0, 1 - m]` (greatest first); the family only decides which
//! cell receives which value.
//!
//! ```text
//!    |  C  |  D
//! ---|-----|-----
//!  C | R,R | S,T
//!  D | T,S | P,P
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::components::agent::Strategy;
use crate::error::{SimError, SimResult};

/// Source of rewards for a single game between two agents
pub trait PayoffSource {
    /// Rewards for (row, column) given both moves
    fn payoff(&self, row: Strategy, col: Strategy) -> (f64, f64);
}

/// One cell label of the normal-form game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    /// Reward: both cooperate
    R,
    /// Temptation: defect against a cooperator
    T,
    /// Sucker: cooperate against a defector
    S,
    /// Punishment: both defect
    P,
}

/// Social dilemma family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DilemmaFamily {
    /// T > R > P > S
    #[default]
    Prisoners,
    /// R > T > S > P
    Harmony,
    /// R > T > P > S
    StagHunt,
    /// T > R > S > P
    Snowdrift,
    /// T > P > R > S
    Deadlock,
}

impl DilemmaFamily {
    pub const ALL: [DilemmaFamily; 5] = [
        DilemmaFamily::Prisoners,
        DilemmaFamily::Harmony,
        DilemmaFamily::StagHunt,
        DilemmaFamily::Snowdrift,
        DilemmaFamily::Deadlock,
    ];

    /// Required strict ordering of the cells, greatest first
    pub fn ordering(&self) -> [Cell; 4] {
        use Cell::*;
        match self {
            DilemmaFamily::Prisoners => [T, R, P, S],
            DilemmaFamily::Harmony => [R, T, S, P],
            DilemmaFamily::StagHunt => [R, T, P, S],
            DilemmaFamily::Snowdrift => [T, R, S, P],
            DilemmaFamily::Deadlock => [T, P, R, S],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DilemmaFamily::Prisoners => "prisoners",
            DilemmaFamily::Harmony => "harmony",
            DilemmaFamily::StagHunt => "staghunt",
            DilemmaFamily::Snowdrift => "snowdrift",
            DilemmaFamily::Deadlock => "deadlock",
        }
    }
}

impl fmt::Display for DilemmaFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DilemmaFamily {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        DilemmaFamily::ALL
            .into_iter()
            .find(|family| family.as_str() == lowered)
            .ok_or_else(|| {
                SimError::invalid(
                    "family",
                    format!("{:?} not in [prisoners, harmony, staghunt, snowdrift, deadlock]", s),
                )
            })
    }
}

/// Fixed reward table for one dilemma
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoffTable {
    pub family: DilemmaFamily,
    /// The `m` the table was built from, 1 < m <= 2
    pub motivation: f64,
    pub reward: f64,
    pub temptation: f64,
    pub sucker: f64,
    pub punishment: f64,
}

impl PayoffTable {
    /// Build the table for `family` with greatest value `m`.
    pub fn build(family: DilemmaFamily, m: f64) -> SimResult<Self> {
        if !m.is_finite() || m <= 1.0 || m > 2.0 {
            return Err(SimError::invalid(
                "temptation",
                format!("must satisfy 1 < m <= 2, got {}", m),
            ));
        }

        let values = [m, 1.0, 0.0, 1.0 - m];
        let mut table = Self {
            family,
            motivation: m,
            reward: 0.0,
            temptation: 0.0,
            sucker: 0.0,
            punishment: 0.0,
        };
        for (cell, value) in family.ordering().into_iter().zip(values) {
            *table.cell_mut(cell) = value;
        }

        table.check_ordering()?;
        Ok(table)
    }

    pub fn cell(&self, cell: Cell) -> f64 {
        match cell {
            Cell::R => self.reward,
            Cell::T => self.temptation,
            Cell::S => self.sucker,
            Cell::P => self.punishment,
        }
    }

    fn cell_mut(&mut self, cell: Cell) -> &mut f64 {
        match cell {
            Cell::R => &mut self.reward,
            Cell::T => &mut self.temptation,
            Cell::S => &mut self.sucker,
            Cell::P => &mut self.punishment,
        }
    }

    /// Verify the family's strict ordering holds for the stored values
    pub fn check_ordering(&self) -> SimResult<()> {
        let order = self.family.ordering();
        for pair in order.windows(2) {
            let (hi, lo) = (self.cell(pair[0]), self.cell(pair[1]));
            if hi <= lo {
                return Err(SimError::InvariantViolation(format!(
                    "{} payoffs require {:?} > {:?}, got {} <= {}",
                    self.family, pair[0], pair[1], hi, lo
                )));
            }
        }
        Ok(())
    }
}

impl PayoffSource for PayoffTable {
    fn payoff(&self, row: Strategy, col: Strategy) -> (f64, f64) {
        match (row, col) {
            (Strategy::Cooperate, Strategy::Cooperate) => (self.reward, self.reward),
            (Strategy::Cooperate, Strategy::Defect) => (self.sucker, self.temptation),
            (Strategy::Defect, Strategy::Cooperate) => (self.temptation, self.sucker),
            (Strategy::Defect, Strategy::Defect) => (self.punishment, self.punishment),
        }
    }
}

impl fmt::Display for PayoffTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  C{:9}D", "")?;
        for (label, row) in [("C", Strategy::Cooperate), ("D", Strategy::Defect)] {
            write!(f, "{} ", label)?;
            for col in [Strategy::Cooperate, Strategy::Defect] {
                let (r, c) = self.payoff(row, col);
                write!(f, "({:.1}, {:.1})", r, c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_prisoners_table() {
        let table = PayoffTable::build(DilemmaFamily::Prisoners, 1.5).unwrap();
        assert_eq!(table.temptation, 1.5);
        assert_eq!(table.reward, 1.0);
        assert_eq!(table.punishment, 0.0);
        assert_eq!(table.sucker, -0.5);

        use crate::components::agent::Strategy::{Cooperate, Defect};
        assert_eq!(table.payoff(Cooperate, Cooperate), (1.0, 1.0));
        assert_eq!(table.payoff(Cooperate, Defect), (-0.5, 1.5));
        assert_eq!(table.payoff(Defect, Cooperate), (1.5, -0.5));
        assert_eq!(table.payoff(Defect, Defect), (0.0, 0.0));
    }

    #[test]
    fn test_temptation_range() {
        for m in [1.0, 0.5, 2.0001, f64::NAN, f64::INFINITY] {
            let err = PayoffTable::build(DilemmaFamily::Prisoners, m).unwrap_err();
            assert!(matches!(err, SimError::InvalidParameter { name: "temptation", .. }));
        }
        assert!(PayoffTable::build(DilemmaFamily::Prisoners, 2.0).is_ok());
    }

    #[test]
    fn test_broken_ordering_detected() {
        let mut table = PayoffTable::build(DilemmaFamily::Prisoners, 1.5).unwrap();
        table.sucker = 0.5;
        assert!(matches!(
            table.check_ordering(),
            Err(SimError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_family_parse() {
        assert_eq!("staghunt".parse::<DilemmaFamily>().unwrap(), DilemmaFamily::StagHunt);
        assert_eq!(" Deadlock ".parse::<DilemmaFamily>().unwrap(), DilemmaFamily::Deadlock);
        assert!("chicken".parse::<DilemmaFamily>().is_err());
    }

    #[test]
    fn test_board_rendering() {
        let table = PayoffTable::build(DilemmaFamily::Prisoners, 1.5).unwrap();
        let board = table.to_string();
        assert!(board.contains("(1.0, 1.0)(-0.5, 1.5)"));
        assert!(board.contains("(1.5, -0.5)(0.0, 0.0)"));
    }

    proptest! {
        #[test]
        fn prop_families_keep_their_ordering(m in 1.000_001f64..=2.0, idx in 0usize..5) {
            let family = DilemmaFamily::ALL[idx];
            let table = PayoffTable::build(family, m).unwrap();
            prop_assert!(table.check_ordering().is_ok());

            // Inverting the permutation recovers the sorted normalized values
            let recovered: Vec<f64> = family.ordering().iter().map(|&c| table.cell(c)).collect();
            prop_assert_eq!(recovered, vec![m, 1.0, 0.0, 1.0 - m]);
        }
    }
}
