//! Shared utilities: logging initialization and in-process counters.

pub mod logging;
pub mod stats;

pub use logging::init_tracing;
pub use stats::StatsCounter;
