//! Test execution engine
//!
//! Sequential orchestration with per-case outcome bookkeeping.

mod runner;

pub use runner::{GroupSelection, TestRunner};
