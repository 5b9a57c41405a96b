//! CIDR Speedtest
//!
//! Samples random IPv4 addresses from a file of CIDR ranges, measures the
//! TCP-connect latency of each one with bounded concurrency, and keeps a
//! live leaderboard of the fastest responders. Runs can be paused, resumed
//! and stopped while in progress.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod output;
pub mod probe;
pub mod ranges;
pub mod sampler;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result, RunError};
pub use executor::{ChannelObserver, Orchestrator, RunEvent, RunObserver};
pub use models::{Config, ProbeResult, ProgressSnapshot, RunConfig, RunSummary};
pub use output::{ColoredFormatter, OutputFormatter, OutputFormatterFactory, PlainFormatter};
pub use probe::{LatencyProbe, ProbeAttempt, TcpConnectProbe};
pub use ranges::AddressRange;
pub use types::RunPhase;

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Version string shown by `--version` with build metadata
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ", env!("GIT_COMMIT"),
    ", built ", env!("BUILD_TIME"),
    ", ", env!("TARGET_TRIPLE"), ")"
);

/// Default configuration values
pub mod defaults {
    pub const DEFAULT_SOURCE_PATH: &str = "ip.txt";
    pub const DEFAULT_MAX_WORKERS: usize = 50;
    pub const DEFAULT_TARGET_COUNT: usize = 200;
    pub const DEFAULT_PORT: u16 = 443;
    pub const DEFAULT_TIMEOUT_MS: u64 = 500;
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    /// Submission tokens beyond the worker count
    pub const BACKLOG_SLACK: usize = 10;
    /// Entries in the live leaderboard
    pub const LEADERBOARD_SIZE: usize = 5;
    /// Sampling draws allowed per requested address
    pub const SAMPLE_ATTEMPT_FACTOR: usize = 5;
}
