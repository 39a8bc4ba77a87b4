//! Output
//!
//! Run records built from a finished simulation and the append-only
//! JSON-lines writer that persists them.

pub mod records;
pub mod writer;

pub use records::{build_run_summary, RunLabels};
pub use writer::{RecordError, RecordWriter};
