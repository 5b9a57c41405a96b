//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env file if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        if Path::new(".env").exists() {
            dotenv::from_filename(".env")
                .map_err(|e| AppError::config(format!("Failed to load .env file: {}", e)))?;

            if debug {
                eprintln!("Loaded configuration from .env file");
            }
        } else if debug {
            eprintln!("No .env file found, using defaults and CLI arguments");
        }

        Ok(())
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        r#"# CIDR Speedtest Configuration
#
# Values here are used as defaults and can be overridden by command-line
# arguments.

# File with one IPv4 CIDR range (or bare address) per line
# CIDR_FILE=ip.txt

# Maximum number of concurrent connection attempts
# MAX_WORKERS=50

# Number of distinct addresses to sample and test
# IP_COUNT=200

# Destination TCP port
# TEST_PORT=443

# Connect timeout in milliseconds
# TIMEOUT_MS=500

# Enable colored output (true/false)
# ENABLE_COLOR=true

# Example configurations for different scenarios:
#
# Quick scan of a small list:
# IP_COUNT=50
# MAX_WORKERS=25
#
# Slow or distant networks:
# TIMEOUT_MS=1500
# TEST_PORT=80
"#.to_string()
    }

    /// Save example .env file to disk
    pub fn save_example_env_file(path: &Path) -> Result<()> {
        let content = Self::create_example_env_content();
        std::fs::write(path, content)
            .map_err(|e| AppError::config(format!("Failed to write example .env file: {}", e)))?;

        Ok(())
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        match key {
            "CIDR_FILE" => {
                if value.trim().is_empty() {
                    return Err(AppError::config("CIDR_FILE cannot be empty"));
                }
            }
            "MAX_WORKERS" => {
                let workers: usize = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid MAX_WORKERS value '{}': {}", value, e)))?;
                if workers == 0 || workers > 1000 {
                    return Err(AppError::config(format!("MAX_WORKERS must be between 1 and 1000, got: {}", workers)));
                }
            }
            "IP_COUNT" => {
                let count: usize = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid IP_COUNT value '{}': {}", value, e)))?;
                if count == 0 || count > 100_000 {
                    return Err(AppError::config(format!("IP_COUNT must be between 1 and 100000, got: {}", count)));
                }
            }
            "TEST_PORT" => {
                let port: u16 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid TEST_PORT value '{}': {}", value, e)))?;
                if port == 0 {
                    return Err(AppError::config("TEST_PORT must be between 1 and 65535"));
                }
            }
            "TIMEOUT_MS" => {
                let timeout: u64 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid TIMEOUT_MS value '{}': {}", value, e)))?;
                if timeout == 0 || timeout > 60_000 {
                    return Err(AppError::config(format!("TIMEOUT_MS must be between 1 and 60000, got: {}", timeout)));
                }
            }
            "ENABLE_COLOR" => {
                value.parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", value, e)))?;
            }
            _ => {
                // Unknown environment variable, ignore
            }
        }

        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("CIDR_FILE", "Path of the CIDR list", "ip.txt"),
            ("MAX_WORKERS", "Concurrent connection attempts (1-1000)", "50"),
            ("IP_COUNT", "Addresses to sample (1-100000)", "200"),
            ("TEST_PORT", "Destination TCP port", "443"),
            ("TIMEOUT_MS", "Connect timeout in milliseconds (1-60000)", "500"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<14} {}\n", var, description));
            help.push_str(&format!("  {:<14} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Validate all currently set environment variables
    pub fn validate_current_env() -> Vec<String> {
        Self::get_supported_env_vars()
            .into_iter()
            .filter_map(|(name, _, _)| {
                let value = std::env::var(name).ok()?;
                Self::validate_env_var(name, value.trim()).err().map(|e| format!("Warning: {}", e))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_example_content_lists_every_variable() {
        let content = EnvManager::create_example_env_content();
        for (name, _, _) in EnvManager::get_supported_env_vars() {
            assert!(content.contains(&format!("{}=", name)), "missing {}", name);
        }
    }

    #[test]
    fn test_save_example_file() {
        let temp_file = NamedTempFile::new().unwrap();
        EnvManager::save_example_env_file(temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("CIDR Speedtest Configuration"));
    }

    #[test]
    fn test_save_example_file_to_missing_dir_fails() {
        let result = EnvManager::save_example_env_file(Path::new("/no/such/dir/.env"));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_env_var() {
        assert!(EnvManager::validate_env_var("CIDR_FILE", "ranges.txt").is_ok());
        assert!(EnvManager::validate_env_var("MAX_WORKERS", "50").is_ok());
        assert!(EnvManager::validate_env_var("IP_COUNT", "200").is_ok());
        assert!(EnvManager::validate_env_var("TEST_PORT", "80").is_ok());
        assert!(EnvManager::validate_env_var("TIMEOUT_MS", "750").is_ok());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "false").is_ok());
        assert!(EnvManager::validate_env_var("UNRELATED", "anything").is_ok());

        assert!(EnvManager::validate_env_var("CIDR_FILE", "  ").is_err());
        assert!(EnvManager::validate_env_var("MAX_WORKERS", "0").is_err());
        assert!(EnvManager::validate_env_var("MAX_WORKERS", "1001").is_err());
        assert!(EnvManager::validate_env_var("IP_COUNT", "lots").is_err());
        assert!(EnvManager::validate_env_var("TEST_PORT", "0").is_err());
        assert!(EnvManager::validate_env_var("TEST_PORT", "70000").is_err());
        assert!(EnvManager::validate_env_var("TIMEOUT_MS", "60001").is_err());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "maybe").is_err());
    }

    #[test]
    fn test_env_help_mentions_priority() {
        let help = EnvManager::display_env_help();
        assert!(help.contains("MAX_WORKERS"));
        assert!(help.contains("Command-line arguments"));
    }
}
