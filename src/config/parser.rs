//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::Result,
    models::Config,
};

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        self.load_env_file()?;
        config.merge_from_env()?;
        self.apply_cli_overrides(&mut config);
        config.validate()?;

        Ok(config)
    }

    fn load_env_file(&self) -> Result<()> {
        EnvManager::load_env_file(self.cli.debug)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) {
        if let Some(ref file) = self.cli.file {
            config.source_path = file.clone();
        }

        if let Some(workers) = self.cli.workers {
            config.max_workers = workers;
        }

        if let Some(count) = self.cli.count {
            config.target_count = count;
        }

        if let Some(port) = self.cli.port {
            config.port = port;
        }

        if let Some(timeout) = self.cli.timeout {
            config.timeout_ms = timeout;
        }

        if self.cli.color {
            config.enable_color = true;
        }

        if self.cli.no_color || self.cli.json {
            config.enable_color = false;
        }

        // CLI-only flags
        config.verbose = self.cli.verbose;
        config.debug = self.cli.debug;

        if config.debug {
            eprintln!(
                "Applied CLI overrides: file={}, workers={}, count={}, port={}, timeout={}ms",
                config.source_path.display(),
                config.max_workers,
                config.target_count,
                config.port,
                config.timeout_ms
            );
        }
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("CIDR file: {}", config.source_path.display()));
    summary.push(format!("Workers: {}", config.max_workers));
    summary.push(format!("Address count: {}", config.target_count));
    summary.push(format!("Port: {}", config.port));
    summary.push(format!("Timeout: {}ms", config.timeout_ms));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}
