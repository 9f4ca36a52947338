//! Run reports
//!
//! Serializes a completed run to disk so CI can archive it.

mod report;

pub use report::{ReportWriter, RunReport};
