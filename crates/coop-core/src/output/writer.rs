//! Record Writer
//!
//! Append-only JSONL logging of run summaries and timeseries rows.

use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

use coop_events::{RunSummary, TimeseriesPoint};

/// Errors raised while persisting records
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Appends run summaries and timeseries points to two JSONL files
pub struct RecordWriter {
    runs: Option<BufWriter<File>>,
    timeseries: Option<BufWriter<File>>,
    runs_written: u64,
    points_written: u64,
}

impl RecordWriter {
    /// Open (creating parent directories) both files in append mode
    pub fn open(runs_path: impl AsRef<Path>, timeseries_path: impl AsRef<Path>) -> Result<Self, RecordError> {
        Ok(Self {
            runs: Some(BufWriter::new(open_append(runs_path.as_ref())?)),
            timeseries: Some(BufWriter::new(open_append(timeseries_path.as_ref())?)),
            runs_written: 0,
            points_written: 0,
        })
    }

    /// Create a writer that discards records (for testing)
    pub fn null() -> Self {
        Self {
            runs: None,
            timeseries: None,
            runs_written: 0,
            points_written: 0,
        }
    }

    pub fn runs_written(&self) -> u64 {
        self.runs_written
    }

    pub fn points_written(&self) -> u64 {
        self.points_written
    }

    pub fn log_run_summary(&mut self, summary: &RunSummary) -> Result<(), RecordError> {
        self.runs_written += 1;
        if let Some(ref mut writer) = self.runs {
            write_line(writer, summary)?;
        }
        Ok(())
    }

    /// Log one row per iteration of a run's cooperation history
    pub fn log_timeseries(&mut self, run_id: &str, history: &[f64]) -> Result<(), RecordError> {
        for point in TimeseriesPoint::from_history(run_id, history) {
            self.points_written += 1;
            if let Some(ref mut writer) = self.timeseries {
                write_line(writer, &point)?;
            }
        }
        Ok(())
    }

    /// Flush the buffers to disk
    pub fn flush(&mut self) -> Result<(), RecordError> {
        if let Some(ref mut writer) = self.runs {
            writer.flush()?;
        }
        if let Some(ref mut writer) = self.timeseries {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for RecordWriter {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!("Failed to flush record writer: {}", e);
        }
    }
}

fn open_append(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn write_line<T: Serialize>(writer: &mut BufWriter<File>, record: &T) -> Result<(), RecordError> {
    let json = serde_json::to_string(record)?;
    writeln!(writer, "{}", json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coop_events::{BeneficiaryRule, NetworkType};
    use std::io::BufRead;

    fn sample_summary(run_id: &str) -> RunSummary {
        RunSummary {
            run_id: run_id.to_string(),
            seed: 1,
            network_type: NetworkType::Homogeneous,
            num_agents: 100,
            avg_degree: 4.0,
            temptation: 1.3,
            alpha: 0.5,
            theta: 1.0,
            beta: 1.0,
            beneficiary_rule: BeneficiaryRule::Nearest,
            init_frac_coop: 0.5,
            converged: true,
            iters_to_conv: 40,
            final_frac_coop: 1.0,
        }
    }

    fn read_lines(path: &Path) -> Vec<String> {
        let file = File::open(path).unwrap();
        std::io::BufReader::new(file).lines().map(|l| l.unwrap()).collect()
    }

    #[test]
    fn test_records_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let runs = dir.path().join("nested/runs.jsonl");
        let series = dir.path().join("nested/timeseries.jsonl");

        {
            let mut writer = RecordWriter::open(&runs, &series).unwrap();
            writer.log_run_summary(&sample_summary("a")).unwrap();
            writer.log_timeseries("a", &[0.5, 0.6]).unwrap();
        }
        {
            let mut writer = RecordWriter::open(&runs, &series).unwrap();
            writer.log_run_summary(&sample_summary("b")).unwrap();
            writer.log_timeseries("b", &[0.5]).unwrap();
            assert_eq!(writer.runs_written(), 1);
            assert_eq!(writer.points_written(), 1);
        }

        let run_lines = read_lines(&runs);
        assert_eq!(run_lines.len(), 2);
        let second: RunSummary = serde_json::from_str(&run_lines[1]).unwrap();
        assert_eq!(second, sample_summary("b"));

        let point_lines = read_lines(&series);
        assert_eq!(point_lines.len(), 3);
        let point: TimeseriesPoint = serde_json::from_str(&point_lines[1]).unwrap();
        assert_eq!(point.run_id, "a");
        assert_eq!(point.iter, 1);
        assert_eq!(point.frac_coop, 0.6);
    }

    #[test]
    fn test_null_writer() {
        let mut writer = RecordWriter::null();
        writer.log_run_summary(&sample_summary("x")).unwrap();
        writer.log_timeseries("x", &[0.1, 0.2, 0.3]).unwrap();
        assert_eq!(writer.runs_written(), 1);
        assert_eq!(writer.points_written(), 3);
    }
}
