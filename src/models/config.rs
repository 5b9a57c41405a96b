//! Configuration data model and validation

use crate::types::{Result, AppError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path of the CIDR list, one network per line
    #[serde(default = "default_source_path")]
    pub source_path: PathBuf,

    /// Maximum number of probes in flight at once
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Number of distinct addresses to sample and probe
    #[serde(default = "default_target_count")]
    pub target_count: usize,

    /// Destination TCP port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Connect timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

/// Immutable snapshot of the parameters a single run needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub source_path: PathBuf,
    pub max_workers: usize,
    pub target_count: usize,
    pub port: u16,
    pub timeout_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Config::default().run_config()
    }
}

impl RunConfig {
    /// Connect timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Size of the submission token pool: workers plus the fixed backlog slack
    pub fn submission_tokens(&self) -> usize {
        self.max_workers + crate::defaults::BACKLOG_SLACK
    }

    /// Reject parameters a run cannot make progress with
    pub fn validate(&self) -> Result<()> {
        if self.max_workers == 0 {
            return Err(AppError::config("Worker count must be greater than 0"));
        }

        if self.timeout_ms == 0 {
            return Err(AppError::config("Timeout must be greater than 0"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_path: default_source_path(),
            max_workers: default_max_workers(),
            target_count: default_target_count(),
            port: default_port(),
            timeout_ms: default_timeout_ms(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Snapshot the run parameters
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            source_path: self.source_path.clone(),
            max_workers: self.max_workers,
            target_count: self.target_count,
            port: self.port,
            timeout_ms: self.timeout_ms,
        }
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.source_path.as_os_str().is_empty() {
            return Err(AppError::config("CIDR source path cannot be empty"));
        }

        if self.max_workers == 0 {
            return Err(AppError::config("Worker count must be greater than 0"));
        }

        if self.max_workers > 1000 {
            return Err(AppError::config("Worker count cannot exceed 1000"));
        }

        if self.target_count == 0 {
            return Err(AppError::config("Address count must be greater than 0"));
        }

        if self.target_count > 100_000 {
            return Err(AppError::config("Address count cannot exceed 100000"));
        }

        if self.port == 0 {
            return Err(AppError::config("Port must be greater than 0"));
        }

        if self.timeout_ms == 0 {
            return Err(AppError::config("Timeout must be greater than 0"));
        }

        if self.timeout_ms > 60_000 {
            return Err(AppError::config("Timeout cannot exceed 60000 milliseconds"));
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(source_path) = std::env::var("CIDR_FILE") {
            let source_path = source_path.trim();
            if !source_path.is_empty() {
                self.source_path = PathBuf::from(source_path);
            }
        }

        if let Ok(workers) = std::env::var("MAX_WORKERS") {
            self.max_workers = workers.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid MAX_WORKERS value '{}': {}", workers, e)))?;
        }

        if let Ok(count) = std::env::var("IP_COUNT") {
            self.target_count = count.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid IP_COUNT value '{}': {}", count, e)))?;
        }

        if let Ok(port) = std::env::var("TEST_PORT") {
            self.port = port.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid TEST_PORT value '{}': {}", port, e)))?;
        }

        if let Ok(timeout) = std::env::var("TIMEOUT_MS") {
            self.timeout_ms = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid TIMEOUT_MS value '{}': {}", timeout, e)))?;
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

// Default value functions for serde
fn default_source_path() -> PathBuf {
    PathBuf::from(crate::defaults::DEFAULT_SOURCE_PATH)
}

fn default_max_workers() -> usize {
    crate::defaults::DEFAULT_MAX_WORKERS
}

fn default_target_count() -> usize {
    crate::defaults::DEFAULT_TARGET_COUNT
}

fn default_port() -> u16 {
    crate::defaults::DEFAULT_PORT
}

fn default_timeout_ms() -> u64 {
    crate::defaults::DEFAULT_TIMEOUT_MS
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_match_documented_values() {
        let run = Config::default().run_config();
        assert_eq!(run.source_path, PathBuf::from("ip.txt"));
        assert_eq!(run.max_workers, 50);
        assert_eq!(run.target_count, 200);
        assert_eq!(run.port, 443);
        assert_eq!(run.timeout_ms, 500);
        assert_eq!(run.timeout(), Duration::from_millis(500));
        assert_eq!(run.submission_tokens(), 60);
    }

    #[test]
    fn test_zero_workers_invalid() {
        let mut config = Config::default();
        config.max_workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_run_config_requires_workers_and_timeout() {
        assert!(RunConfig::default().validate().is_ok());

        let no_workers = RunConfig { max_workers: 0, ..RunConfig::default() };
        assert!(matches!(no_workers.validate(), Err(AppError::Config(_))));

        let no_timeout = RunConfig { timeout_ms: 0, ..RunConfig::default() };
        assert!(matches!(no_timeout.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_zero_count_invalid() {
        let mut config = Config::default();
        config.target_count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_port_invalid() {
        let mut config = Config::default();
        config.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timeout_bounds() {
        let mut config = Config::default();
        config.timeout_ms = 0;
        assert!(config.validate().is_err());

        config.timeout_ms = 60_001;
        assert!(config.validate().is_err());

        config.timeout_ms = 60_000;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_source_path_invalid() {
        let mut config = Config::default();
        config.source_path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serde_defaults_fill_missing_fields() {
        let config: Config = serde_json::from_str(r#"{"max_workers": 8}"#).unwrap();
        assert_eq!(config.max_workers, 8);
        assert_eq!(config.target_count, 200);
        assert_eq!(config.port, 443);
    }
}
