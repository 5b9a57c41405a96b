//! Data models and structures for the CIDR speedtest

pub mod config;
pub mod results;

// Re-export main model types
pub use config::{Config, RunConfig};
pub use results::{ProbeResult, ProgressSnapshot, RunSummary};
