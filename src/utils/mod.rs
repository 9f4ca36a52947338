//! Shared utilities
//!
//! Logging setup and timing helpers.

mod logger;
mod timer;

pub use logger::{LogLevel, Logger};
pub use timer::{truncate, Timer};
