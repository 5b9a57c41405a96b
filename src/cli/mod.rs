//! Command-line interface module

pub mod help;

pub use help::HelpSystem;

use clap::Parser;
use std::path::PathBuf;

/// CIDR Speedtest - find the fastest-connecting addresses in a set of IPv4 ranges
#[derive(Parser, Debug, Clone)]
#[command(name = "cst")]
#[command(version, long_version = crate::LONG_VERSION, about, long_about = None)]
pub struct Cli {
    /// File with one IPv4 CIDR range or address per line [default: ip.txt]
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Maximum concurrent connection attempts, 1-1000 [default: 50]
    #[arg(short, long, value_parser = parse_workers)]
    pub workers: Option<usize>,

    /// Number of distinct addresses to sample, 1-100000 [default: 200]
    #[arg(short = 'n', long, value_parser = parse_count)]
    pub count: Option<usize>,

    /// Destination TCP port [default: 443]
    #[arg(short, long, value_parser = parse_port)]
    pub port: Option<u16>,

    /// Connect timeout in milliseconds, 1-60000 [default: 500]
    #[arg(short, long, value_name = "MS", value_parser = parse_timeout_ms)]
    pub timeout: Option<u64>,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Print the final report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Ignore keyboard controls on stdin
    #[arg(long)]
    pub no_input: bool,

    /// Write an example .env file to PATH and exit
    #[arg(long, value_name = "PATH")]
    pub init_env: Option<PathBuf>,

    /// Show help for a specific topic (controls, config, examples, output)
    #[arg(long, value_name = "TOPIC")]
    pub help_topic: Option<String>,
}

impl Cli {
    /// Validate CLI arguments for conflicts and requirements
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        if self.json && self.color {
            return Err("--color has no effect with --json".to_string());
        }

        Ok(())
    }

    /// Check if help should be displayed for a specific topic
    pub fn should_show_topic_help(&self) -> bool {
        self.help_topic.is_some()
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.color {
            true
        } else if self.no_color || self.json {
            false
        } else {
            supports_color()
        }
    }

    /// Display help for the specified topic or the overview
    pub fn display_help(&self) -> String {
        let help_system = HelpSystem::new();
        let use_colors = self.use_colors();

        match &self.help_topic {
            Some(topic) => help_system.display_topic_help(topic, use_colors).unwrap_or_else(|| {
                format!(
                    "Unknown help topic: '{}'\n\nAvailable topics: {}\n\n{}",
                    topic,
                    HelpSystem::topics().join(", "),
                    help_system.display_main_help(use_colors)
                )
            }),
            None => help_system.display_main_help(use_colors),
        }
    }

    /// Get configuration summary for display
    pub fn get_config_summary(&self) -> String {
        fn or_default<T: ToString>(value: &Option<T>) -> String {
            value.as_ref().map(|v| v.to_string()).unwrap_or_else(|| "(default)".to_string())
        }

        let mut summary = String::new();
        summary.push_str("Command-line Overrides:\n");
        summary.push_str(&format!(
            "  CIDR file: {}\n",
            self.file.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "(default)".to_string())
        ));
        summary.push_str(&format!("  Workers: {}\n", or_default(&self.workers)));
        summary.push_str(&format!("  Address count: {}\n", or_default(&self.count)));
        summary.push_str(&format!("  Port: {}\n", or_default(&self.port)));
        summary.push_str(&format!("  Timeout (ms): {}\n", or_default(&self.timeout)));
        summary.push_str(&format!("  Colored output: {}\n", self.use_colors()));
        summary.push_str(&format!("  JSON report: {}\n", self.json));
        summary.push_str(&format!("  Keyboard controls: {}\n", !self.no_input));
        summary
    }
}

fn parse_bounded<T>(s: &str, name: &str, min: T, max: T) -> Result<T, String>
where
    T: std::str::FromStr + PartialOrd + std::fmt::Display + Copy,
{
    // Reject strings with leading + sign or other invalid formats
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid {}: {}", name, s));
    }

    let value = s.parse::<T>().map_err(|_| format!("Invalid {}: {}", name, s))?;
    if value < min || value > max {
        return Err(format!("{} must be between {} and {}", name, min, max));
    }
    Ok(value)
}

fn parse_workers(s: &str) -> Result<usize, String> {
    parse_bounded(s, "worker count", 1, 1000)
}

fn parse_count(s: &str) -> Result<usize, String> {
    parse_bounded(s, "address count", 1, 100_000)
}

fn parse_port(s: &str) -> Result<u16, String> {
    parse_bounded(s, "port", 1, u16::MAX)
}

fn parse_timeout_ms(s: &str) -> Result<u64, String> {
    parse_bounded(s, "timeout", 1, 60_000)
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    // Default to true on Unix-like systems, false on Windows
    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_defaults_are_unset() {
        let cli = Cli::parse_from(["cst"]);
        assert!(cli.file.is_none());
        assert!(cli.workers.is_none());
        assert!(cli.count.is_none());
        assert!(cli.port.is_none());
        assert!(cli.timeout.is_none());
        assert!(!cli.json);
        assert!(!cli.no_input);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_cli_parsing_all_options() {
        let cli = Cli::parse_from([
            "cst",
            "--file", "ranges.txt",
            "--workers", "20",
            "--count", "500",
            "--port", "80",
            "--timeout", "750",
            "--no-color",
            "--verbose",
            "--debug",
            "--json",
            "--no-input",
            "--help-topic", "controls",
        ]);

        assert_eq!(cli.file, Some(PathBuf::from("ranges.txt")));
        assert_eq!(cli.workers, Some(20));
        assert_eq!(cli.count, Some(500));
        assert_eq!(cli.port, Some(80));
        assert_eq!(cli.timeout, Some(750));
        assert!(cli.no_color);
        assert!(cli.verbose);
        assert!(cli.debug);
        assert!(cli.json);
        assert!(cli.no_input);
        assert!(cli.should_show_topic_help());
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::parse_from(["cst", "-f", "a.txt", "-w", "4", "-n", "9", "-p", "8443", "-t", "100"]);
        assert_eq!(cli.file, Some(PathBuf::from("a.txt")));
        assert_eq!(cli.workers, Some(4));
        assert_eq!(cli.count, Some(9));
        assert_eq!(cli.port, Some(8443));
        assert_eq!(cli.timeout, Some(100));
    }

    #[test]
    fn test_bounded_parsers() {
        assert_eq!(parse_workers("1").unwrap(), 1);
        assert_eq!(parse_workers("1000").unwrap(), 1000);
        assert!(parse_workers("0").is_err());
        assert!(parse_workers("1001").is_err());

        assert!(parse_count("100001").is_err());
        assert!(parse_port("0").is_err());
        assert!(parse_port("65536").is_err());
        assert_eq!(parse_port("65535").unwrap(), 65535);

        assert!(parse_timeout_ms("60001").is_err());
        assert!(parse_timeout_ms("").is_err());
        assert!(parse_timeout_ms("+10").is_err());
        assert!(parse_timeout_ms("0x10").is_err());
        assert!(parse_timeout_ms("-5").is_err());
        assert!(parse_timeout_ms("10.5").is_err());
    }

    #[test]
    fn test_out_of_range_flag_rejected_by_clap() {
        assert!(Cli::try_parse_from(["cst", "--workers", "0"]).is_err());
        assert!(Cli::try_parse_from(["cst", "--port", "0"]).is_err());
    }

    #[test]
    fn test_validation_conflicts() {
        let cli = Cli::parse_from(["cst", "--color", "--no-color"]);
        assert!(cli.validate().is_err());

        let cli = Cli::parse_from(["cst", "--color", "--json"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_use_colors_method() {
        assert!(!Cli::parse_from(["cst", "--no-color"]).use_colors());
        assert!(Cli::parse_from(["cst", "--color"]).use_colors());
        assert!(!Cli::parse_from(["cst", "--json"]).use_colors());
    }

    #[test]
    fn test_help_display() {
        let cli = Cli::parse_from(["cst", "--no-color", "--help-topic", "controls"]);
        assert!(cli.display_help().contains("KEYBOARD CONTROLS"));

        let cli = Cli::parse_from(["cst", "--no-color", "--help-topic", "bogus"]);
        assert!(cli.display_help().contains("Unknown help topic"));
    }

    #[test]
    fn test_config_summary() {
        let cli = Cli::parse_from(["cst", "--no-color", "-w", "8"]);
        let summary = cli.get_config_summary();
        assert!(summary.contains("Workers: 8"));
        assert!(summary.contains("Port: (default)"));
    }
}
