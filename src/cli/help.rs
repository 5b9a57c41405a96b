//! Topic help with usage examples and keyboard controls

use crate::config::env::EnvManager;
use colored::*;

/// Topic-oriented help on top of clap's generated `--help`
pub struct HelpSystem {
    platform: String,
}

impl HelpSystem {
    pub fn new() -> Self {
        Self {
            platform: std::env::consts::OS.to_string(),
        }
    }

    /// Names accepted by `display_topic_help`
    pub fn topics() -> &'static [&'static str] {
        &["controls", "config", "examples", "output"]
    }

    /// Overview with every section
    pub fn display_main_help(&self, use_colors: bool) -> String {
        let mut help = String::new();
        help.push_str(&self.format_header(use_colors));
        help.push('\n');
        help.push_str(&self.format_controls_help(use_colors));
        help.push('\n');
        help.push_str(&self.format_examples_section(use_colors));
        help.push('\n');
        help.push_str(&self.format_configuration_help(use_colors));
        help.push('\n');
        help.push_str(&self.format_footer(use_colors));
        help
    }

    /// Display quick help for specific topics
    pub fn display_topic_help(&self, topic: &str, use_colors: bool) -> Option<String> {
        match topic.to_lowercase().as_str() {
            "controls" | "keys" => Some(self.format_controls_help(use_colors)),
            "config" | "configuration" | "env" => Some(self.format_configuration_help(use_colors)),
            "examples" => Some(self.format_examples_section(use_colors)),
            "output" => Some(self.format_output_help(use_colors)),
            _ => None,
        }
    }

    fn heading(text: &str, use_colors: bool) -> String {
        if use_colors {
            text.bright_green().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, use_colors: bool) -> String {
        let title = "CIDR Speedtest";
        let subtitle = "Rank randomly sampled IPv4 addresses by TCP connect latency";
        let version = env!("CARGO_PKG_VERSION");

        if use_colors {
            format!(
                "{}\n{}\nVersion: {} | Platform: {}\n",
                title.bright_cyan().bold(),
                subtitle.bright_blue(),
                version.green(),
                self.platform.yellow()
            )
        } else {
            format!("{}\n{}\nVersion: {} | Platform: {}\n", title, subtitle, version, self.platform)
        }
    }

    fn format_controls_help(&self, use_colors: bool) -> String {
        let mut help = format!("{}\n", Self::heading("KEYBOARD CONTROLS:", use_colors));
        let keys = [
            ("p + Enter", "Pause or resume submitting new addresses"),
            ("s + Enter", "Stop: no new addresses, in-flight probes finish"),
            ("q + Enter", "Same as s"),
            ("Ctrl-C", "Same as s; a second Ctrl-C aborts immediately"),
        ];
        for (key, description) in keys {
            if use_colors {
                help.push_str(&format!("  {:<12} {}\n", key.bright_yellow(), description));
            } else {
                help.push_str(&format!("  {:<12} {}\n", key, description));
            }
        }
        help.push_str("\nKeyboard controls are disabled with --no-input.\n");
        help
    }

    fn format_examples_section(&self, use_colors: bool) -> String {
        let examples = [
            ExampleHelp {
                title: "Default run",
                command: "cst",
                description: "Sample 200 addresses from ip.txt and probe port 443",
            },
            ExampleHelp {
                title: "Larger sample, more workers",
                command: "cst -f ranges.txt -n 2000 -w 200",
                description: "Probe 2000 addresses with up to 200 connections in flight",
            },
            ExampleHelp {
                title: "Plain HTTP with a longer timeout",
                command: "cst -p 80 -t 1500",
                description: "Useful for distant or congested networks",
            },
            ExampleHelp {
                title: "Scripting",
                command: "cst --json --no-input > report.json",
                description: "Machine-readable report, no keyboard handling",
            },
        ];

        let mut output = format!("{}\n", Self::heading("EXAMPLES:", use_colors));
        for example in examples {
            output.push_str(&example.format(use_colors));
            output.push('\n');
        }
        output
    }

    fn format_configuration_help(&self, use_colors: bool) -> String {
        let mut help = format!("{}\n", Self::heading("CONFIGURATION REFERENCE:", use_colors));
        help.push_str(&EnvManager::display_env_help());
        help.push_str("\nCIDR FILE FORMAT:\n");
        help.push_str("  One IPv4 network per line, e.g. 104.16.0.0/13 or 1.1.1.1\n");
        help.push_str("  Blank lines are ignored. Lines with host bits set, IPv6 networks\n");
        help.push_str("  and anything unparseable are skipped.\n");
        help
    }

    fn format_output_help(&self, use_colors: bool) -> String {
        let mut help = format!("{}\n", Self::heading("OUTPUT:", use_colors));
        help.push_str("  While running, a progress line shows tested/total and the current best.\n");
        help.push_str("  The final table lists every responsive address, fastest first.\n");
        help.push_str("  Latency levels: <50ms excellent, <100ms good, <300ms fair,\n");
        help.push_str("  <1000ms poor, otherwise very poor.\n");
        help.push_str("  --json prints the full report on stdout; progress and logs go to stderr.\n");
        help
    }

    fn format_footer(&self, use_colors: bool) -> String {
        let mut footer = format!("{}\n", Self::heading("ADDITIONAL HELP:", use_colors));
        for topic in Self::topics() {
            footer.push_str(&format!("  --help-topic {}\n", topic));
        }
        footer
    }
}

impl Default for HelpSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper struct for formatting examples
struct ExampleHelp {
    title: &'static str,
    command: &'static str,
    description: &'static str,
}

impl ExampleHelp {
    fn format(&self, use_colors: bool) -> String {
        if use_colors {
            format!("  {}:\n    {}\n    {}\n",
                self.title.bright_yellow().bold(),
                self.command.bright_white(),
                self.description.bright_blue().italic()
            )
        } else {
            format!("  {}:\n    {}\n    {}\n", self.title, self.command, self.description)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_listed_topic_resolves() {
        let help_system = HelpSystem::new();
        for topic in HelpSystem::topics() {
            assert!(help_system.display_topic_help(topic, false).is_some(), "topic {}", topic);
        }
        assert!(help_system.display_topic_help("dns", false).is_none());
    }

    #[test]
    fn test_main_help_sections() {
        let help = HelpSystem::new().display_main_help(false);
        assert!(help.contains("CIDR Speedtest"));
        assert!(help.contains("KEYBOARD CONTROLS:"));
        assert!(help.contains("EXAMPLES:"));
        assert!(help.contains("MAX_WORKERS"));
    }

    #[test]
    fn test_topic_lookup_is_case_insensitive() {
        let help = HelpSystem::new().display_topic_help("CONFIG", false).unwrap();
        assert!(help.contains("CIDR FILE FORMAT"));
    }
}
