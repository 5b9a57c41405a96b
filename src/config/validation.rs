//! Configuration validation utilities and rules

use crate::{
    error::Result,
    models::Config,
    ranges,
};
use colored::Colorize;

/// Timeouts below this rarely complete a handshake beyond the local network
const LOW_TIMEOUT_MS: u64 = 100;
const HIGH_TIMEOUT_MS: u64 = 5_000;
const HIGH_WORKER_COUNT: usize = 200;

/// Configuration validator with advanced validation rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration with comprehensive checks
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        let mut warnings = Vec::new();

        // Hard limits first
        config.validate()?;

        warnings.extend(Self::validate_source(config));
        warnings.extend(Self::validate_performance_settings(config));
        warnings.extend(Self::validate_port(config.port));

        Ok(warnings)
    }

    /// Inspect the CIDR list without failing on it; the run reports a missing file itself
    fn validate_source(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if !config.source_path.is_file() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("CIDR file '{}' does not exist or is not a regular file", config.source_path.display()),
            ));
            return warnings;
        }

        let report = ranges::load_with_report(&config.source_path);
        if report.invalid_lines > 0 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("{} line(s) in '{}' are not valid IPv4 CIDR ranges and will be skipped",
                    report.invalid_lines, config.source_path.display()),
            ));
        }

        if report.ranges.is_empty() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("CIDR file '{}' contains no usable ranges", config.source_path.display()),
            ));
            return warnings;
        }

        let address_space: u64 = report.ranges.iter().map(|r| r.size()).sum();
        if address_space < config.target_count as u64 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Only {} addresses are available but {} were requested; fewer will be tested",
                    address_space, config.target_count),
            ));
        }

        warnings
    }

    /// Validate performance-related settings
    fn validate_performance_settings(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.timeout_ms < LOW_TIMEOUT_MS {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Timeout of {}ms may be too short to complete a TCP handshake", config.timeout_ms),
            ));
        } else if config.timeout_ms > HIGH_TIMEOUT_MS {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Long timeout of {}ms will slow down runs with many unreachable addresses", config.timeout_ms),
            ));
        }

        if config.max_workers > config.target_count {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("{} workers exceed the {} addresses to test; at most {} will be busy",
                    config.max_workers, config.target_count, config.target_count),
            ));
        }

        if config.max_workers > HIGH_WORKER_COUNT {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("{} concurrent connections may hit file descriptor limits or skew latencies", config.max_workers),
            ));
        }

        warnings
    }

    fn validate_port(port: u16) -> Vec<ValidationWarning> {
        if port == 443 || port == 80 {
            return Vec::new();
        }

        vec![ValidationWarning::new(
            ValidationLevel::Info,
            format!("Testing non-standard port {}", port),
        )]
    }
}

/// Validation warning levels
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationLevel {
    Info,
    Warning,
}

impl ValidationLevel {
    /// Get display string for level
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }

    /// Get color for terminal display
    pub fn color(&self) -> &'static str {
        match self {
            Self::Info => "blue",
            Self::Warning => "yellow",
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    /// Create a new validation warning
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        let tag = format!("[{}]", self.level.as_str());
        if use_color {
            format!("{} {}", tag.color(self.level.color()).bold(), self.message)
        } else {
            format!("{} {}", tag, self.message)
        }
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}
