//! Colored formatter implementation with terminal color support
//!
//! This module provides a rich colored output formatter that uses
//! ANSI colors and Unicode symbols for enhanced visual presentation.

use super::formatter::{
    elapsed_ms, format_duration, format_percentage, visible_rows, FinalStatus, FormattingOptions,
    OutputFormatter,
};
use crate::{
    error::{AppError, Result},
    models::{ProbeResult, ProgressSnapshot, RunSummary},
};
use colored::*;
use std::fmt::Write as _;

/// Latency classification for color coding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyLevel {
    Excellent, // < 50ms
    Good,      // 50-100ms
    Fair,      // 100-300ms
    Poor,      // 300-1000ms
    VeryPoor,  // > 1000ms
}

impl LatencyLevel {
    /// Determine level from a connect latency in milliseconds
    pub fn from_latency(latency_ms: f64) -> Self {
        if latency_ms < 50.0 {
            Self::Excellent
        } else if latency_ms < 100.0 {
            Self::Good
        } else if latency_ms < 300.0 {
            Self::Fair
        } else if latency_ms < 1000.0 {
            Self::Poor
        } else {
            Self::VeryPoor
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Excellent => Color::Green,
            Self::Good => Color::Cyan,
            Self::Fair => Color::Yellow,
            Self::Poor => Color::Magenta,
            Self::VeryPoor => Color::Red,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Excellent => "🚀",
            Self::Good => "⚡",
            Self::Fair => "🔶",
            Self::Poor => "⚠️",
            Self::VeryPoor => "🔴",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::VeryPoor => "Very Poor",
        }
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub highlight: Color,
    pub muted: Color,
    pub border: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            info: Color::Cyan,
            highlight: Color::Magenta,
            muted: Color::BrightBlack,
            border: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self::with_color_scheme(options, ColorScheme::default())
    }

    /// Create a colored formatter with custom color scheme
    pub fn with_color_scheme(options: FormattingOptions, color_scheme: ColorScheme) -> Self {
        Self { options, color_scheme }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    fn bold(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    /// Bold and colored, or plain when colors are disabled
    fn emphasize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.bold().color(color)
        } else {
            text.normal()
        }
    }

    fn dimmed(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.dimmed()
        } else {
            text.normal()
        }
    }

    /// Latency colored by its level
    fn format_latency_colored(&self, result: &ProbeResult) -> ColoredString {
        let level = LatencyLevel::from_latency(result.latency_ms);
        self.colorize(&result.format_latency(), level.color())
    }

    /// Format percentage with color coding based on value
    fn format_percentage_colored(&self, percentage: f64) -> ColoredString {
        let formatted = format_percentage(percentage);
        let color = if percentage >= 50.0 {
            self.color_scheme.success
        } else if percentage >= 10.0 {
            self.color_scheme.warning
        } else {
            self.color_scheme.error
        };
        self.colorize(&formatted, color)
    }

    /// Progress bar for the live display
    fn create_progress_bar(&self, fraction: f64, width: usize) -> String {
        let filled = ((fraction.clamp(0.0, 1.0)) * width as f64) as usize;
        let empty = width - filled;

        if !self.options.enable_color {
            return format!("[{}{}]", "=".repeat(filled), " ".repeat(empty));
        }

        format!("[{}{}]",
            "█".repeat(filled).color(self.color_scheme.success),
            "░".repeat(empty).color(Color::BrightBlack))
    }

    fn create_section_header(&self, title: &str, icon: &str) -> String {
        if self.options.enable_color {
            format!("{} {}", icon, title.bold().color(self.color_scheme.header))
        } else {
            format!("{} {}", icon, title)
        }
    }

    fn status_color(&self, status: &FinalStatus) -> Color {
        match status {
            FinalStatus::Complete => self.color_scheme.success,
            FinalStatus::NoResponsive => self.color_scheme.warning,
            FinalStatus::Stopped | FinalStatus::Failed(_) => self.color_scheme.error,
        }
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let mut output = String::new();

        let decorated_title = format!("🎯 {}", title);
        let border = "═".repeat(decorated_title.chars().count() + 4);

        writeln!(output, "{}", self.colorize(&border, self.color_scheme.border))
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;
        writeln!(output, "  {}  ", self.emphasize(&decorated_title, self.color_scheme.header))
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;
        write!(output, "{}", self.colorize(&border, self.color_scheme.border))
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;

        Ok(output)
    }

    fn format_run_summary(&self, summary: &RunSummary, status: &FinalStatus) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "{}", self.create_section_header("Run Summary", "📊"))
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        writeln!(output, "🏁 Status:      {}", self.colorize(&status.label(), self.status_color(status)))
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        writeln!(output, "🧪 Tested:      {}/{}",
            self.colorize(&summary.tested.to_string(), self.color_scheme.info), summary.total)
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        writeln!(output, "✅ Responsive:  {} ({})",
            self.colorize(&summary.responsive().to_string(), self.color_scheme.success),
            self.format_percentage_colored(summary.success_rate()))
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;

        let unanswered = summary.tested.saturating_sub(summary.responsive());
        if unanswered > 0 {
            writeln!(output, "❌ No answer:   {}", self.colorize(&unanswered.to_string(), self.color_scheme.error))
                .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        }

        if let Some(best) = summary.results.first() {
            writeln!(output, "🏆 Best:        {} ({})",
                self.colorize(&best.address.to_string(), self.color_scheme.highlight),
                self.format_latency_colored(best))
                .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        }

        write!(output, "⏱️  Duration:    {}", format_duration(elapsed_ms(summary)))
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;

        if self.options.verbose_mode {
            write!(output, "\n🔖 Run ID:      {}", self.dimmed(&summary.run_id))
                .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        }

        Ok(output)
    }

    fn format_results_table(&self, results: &[ProbeResult]) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "{}", self.create_section_header("Fastest Responders", "🚀"))
            .map_err(|e| AppError::io(format!("Failed to format table: {}", e)))?;

        if results.is_empty() {
            write!(output, "{}", self.colorize("No responsive addresses.", self.color_scheme.muted))
                .map_err(|e| AppError::io(format!("Failed to format table: {}", e)))?;
            return Ok(output);
        }

        let header = format!("{:<6} {:<16} {:>10}   {}", "Rank", "Address", "Latency", "Level");
        writeln!(output, "{}", self.bold(&header))
            .map_err(|e| AppError::io(format!("Failed to format table: {}", e)))?;
        writeln!(output, "{}", "─".repeat(48).color(self.color_scheme.border))
            .map_err(|e| AppError::io(format!("Failed to format table: {}", e)))?;

        let shown = visible_rows(results, self.options.max_rows);
        for (index, result) in shown.iter().enumerate() {
            let rank = match index {
                0 => "🥇".to_string(),
                1 => "🥈".to_string(),
                2 => "🥉".to_string(),
                _ => format!("{:>2}", index + 1),
            };
            let level = LatencyLevel::from_latency(result.latency_ms);
            let level_display = format!("{} {}", level.symbol(), level.description());

            // Pad before coloring so escape codes do not break alignment
            writeln!(output, "{:<6} {:<16} {}   {}",
                rank,
                result.address.to_string(),
                self.colorize(&format!("{:>10}", result.format_latency()), level.color()),
                self.colorize(&level_display, level.color()))
                .map_err(|e| AppError::io(format!("Failed to format table: {}", e)))?;
        }

        if shown.len() < results.len() {
            write!(output, "{}",
                self.dimmed(&format!("... and {} more (use --verbose to list all)", results.len() - shown.len())))
                .map_err(|e| AppError::io(format!("Failed to format table: {}", e)))?;
        }

        Ok(output.trim_end().to_string())
    }

    fn format_progress(&self, snapshot: &ProgressSnapshot) -> String {
        let best = snapshot
            .best()
            .map(|r| format!("🏆 {} {}", self.colorize(&r.address.to_string(), self.color_scheme.highlight), self.format_latency_colored(r)))
            .unwrap_or_else(|| self.dimmed("no responses yet").to_string());

        format!(
            "{} {}/{} {} | {}",
            self.create_progress_bar(snapshot.progress(), 20),
            snapshot.tested,
            snapshot.total,
            self.colorize(&format_percentage(snapshot.progress() * 100.0), self.color_scheme.info),
            best
        )
    }

    fn format_status(&self, status: &FinalStatus) -> String {
        let icon = match status {
            FinalStatus::Complete => "✅",
            FinalStatus::NoResponsive => "⚠️ ",
            FinalStatus::Stopped => "⏹️ ",
            FinalStatus::Failed(_) => "❌",
        };
        format!("{} {}", icon, self.emphasize(&status.label(), self.status_color(status)))
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("❌ {}", self.colorize(error, self.color_scheme.error)))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("⚠️  {}", self.colorize(warning, self.color_scheme.warning)))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("✅ {}", self.colorize(message, self.color_scheme.success)))
    }
}
