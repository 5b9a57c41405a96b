//! Core formatting traits and implementations
//!
//! This module defines the output formatting interface and provides
//! a plain text implementation with table formatting capabilities.

use super::colored::LatencyLevel;
use crate::{
    error::{AppError, Result, RunError},
    models::{ProbeResult, ProgressSnapshot, RunSummary},
};
use std::fmt::Write as _;

/// Main trait for output formatting
pub trait OutputFormatter: Send + Sync {
    /// Format a header section
    fn format_header(&self, title: &str) -> Result<String>;

    /// Format the counters and status of a finished run
    fn format_run_summary(&self, summary: &RunSummary, status: &FinalStatus) -> Result<String>;

    /// Format ranked results as a table
    fn format_results_table(&self, results: &[ProbeResult]) -> Result<String>;

    /// Single-line progress for a live display
    fn format_progress(&self, snapshot: &ProgressSnapshot) -> String;

    /// Final status line
    fn format_status(&self, status: &FinalStatus) -> String;

    /// Format error messages
    fn format_error(&self, error: &str) -> Result<String>;

    /// Format warning messages
    fn format_warning(&self, warning: &str) -> Result<String>;

    /// Format success messages
    fn format_success(&self, message: &str) -> Result<String>;
}

/// How a finished run is presented to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalStatus {
    /// Every sampled address was probed and at least one answered
    Complete,
    /// Every sampled address was probed and none answered
    NoResponsive,
    /// The user stopped the run
    Stopped,
    /// Preparation failed before any probing
    Failed(String),
}

impl FinalStatus {
    /// Classify the outcome delivered to `on_finish`
    pub fn from_outcome(outcome: Option<&RunError>, responsive: usize) -> Self {
        match outcome {
            None if responsive == 0 => Self::NoResponsive,
            None => Self::Complete,
            Some(RunError::Cancelled) => Self::Stopped,
            Some(error @ RunError::NoAddresses(_)) => Self::Failed(error.to_string()),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Complete => "Complete".to_string(),
            Self::NoResponsive => "No responsive addresses found".to_string(),
            Self::Stopped => "Stopped by user".to_string(),
            Self::Failed(reason) => format!("Error: {}", reason),
        }
    }

    /// Process exit code for this status
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Complete | Self::NoResponsive => 0,
            Self::Stopped => RunError::Cancelled.exit_code(),
            Self::Failed(reason) => RunError::no_addresses(reason.as_str()).exit_code(),
        }
    }
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// Enable verbose mode with detailed information
    pub verbose_mode: bool,
    /// Show table borders
    pub table_borders: bool,
    /// Rows shown in the results table; `None` shows every result
    pub max_rows: Option<usize>,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
            table_borders: true,
            max_rows: Some(DEFAULT_TABLE_ROWS),
        }
    }
}

/// Rows in the results table outside verbose mode
pub const DEFAULT_TABLE_ROWS: usize = 20;

/// Table formatting configuration
#[derive(Debug, Clone)]
pub struct TableFormat {
    /// Column definitions
    pub columns: Vec<Column>,
    /// Show borders around table
    pub show_borders: bool,
    /// Show header row
    pub show_header: bool,
    /// Minimum column width
    pub min_column_width: usize,
    /// Maximum column width
    pub max_column_width: usize,
}

/// Column definition for table formatting
#[derive(Debug, Clone)]
pub struct Column {
    pub header: String,
    pub alignment: Alignment,
    pub min_width: usize,
    pub max_width: usize,
}

/// Text alignment options
#[derive(Debug, Clone)]
pub enum Alignment {
    Left,
    Right,
    Center,
}

/// Row data for table formatting
pub type RowData = Vec<String>;

/// Rows to display given the configured limit
pub(crate) fn visible_rows(results: &[ProbeResult], max_rows: Option<usize>) -> &[ProbeResult] {
    match max_rows {
        Some(limit) if limit < results.len() => &results[..limit],
        _ => results,
    }
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    /// Create a table with the given format and data
    fn create_table(&self, format: &TableFormat, rows: &[RowData]) -> String {
        if rows.is_empty() {
            return String::new();
        }

        let column_widths = self.calculate_column_widths(format, rows);
        let mut output = String::new();

        if format.show_header && !format.columns.is_empty() {
            if format.show_borders {
                output.push_str(&self.create_horizontal_border(&column_widths));
                output.push('\n');
            }

            let headers: Vec<String> = format.columns.iter().map(|c| c.header.clone()).collect();
            output.push_str(&self.create_row(&headers, &column_widths, format));
            output.push('\n');

            if format.show_borders {
                output.push_str(&self.create_horizontal_border(&column_widths));
                output.push('\n');
            }
        }

        for row in rows {
            output.push_str(&self.create_row(row, &column_widths, format));
            output.push('\n');
        }

        if format.show_borders {
            output.push_str(&self.create_horizontal_border(&column_widths));
        }

        output
    }

    /// Calculate optimal column widths
    fn calculate_column_widths(&self, format: &TableFormat, rows: &[RowData]) -> Vec<usize> {
        let num_columns = format.columns.len().max(rows.iter().map(|r| r.len()).max().unwrap_or(0));

        (0..num_columns)
            .map(|col_idx| {
                let column = format.columns.get(col_idx);
                let mut width = column
                    .map(|c| c.min_width.max(c.header.len()))
                    .unwrap_or(format.min_column_width);

                for row in rows {
                    if let Some(cell) = row.get(col_idx) {
                        width = width.max(cell.len());
                    }
                }

                width.min(column.map(|c| c.max_width).unwrap_or(format.max_column_width))
            })
            .collect()
    }

    /// Create a table row
    fn create_row(&self, data: &[String], widths: &[usize], format: &TableFormat) -> String {
        let mut row = String::new();

        if format.show_borders {
            row.push('|');
        }

        for (idx, (cell, &width)) in data.iter().zip(widths.iter()).enumerate() {
            let alignment = format.columns.get(idx).map(|c| &c.alignment).unwrap_or(&Alignment::Left);

            if format.show_borders {
                row.push(' ');
            }
            row.push_str(&self.align_text(cell, width, alignment));
            if format.show_borders {
                row.push_str(" |");
            } else {
                row.push_str("  ");
            }
        }

        row.trim_end().to_string()
    }

    /// Create horizontal border for table
    fn create_horizontal_border(&self, widths: &[usize]) -> String {
        let mut border = String::new();

        if !widths.is_empty() {
            border.push('+');
            for &width in widths {
                border.push_str(&"-".repeat(width + 2));
                border.push('+');
            }
        }

        border
    }

    /// Align text within specified width
    fn align_text(&self, text: &str, width: usize, alignment: &Alignment) -> String {
        if text.len() >= width {
            return text.chars().take(width).collect();
        }

        let padding = width - text.len();
        match alignment {
            Alignment::Left => format!("{}{}", text, " ".repeat(padding)),
            Alignment::Right => format!("{}{}", " ".repeat(padding), text),
            Alignment::Center => {
                let left_pad = padding / 2;
                let right_pad = padding - left_pad;
                format!("{}{}{}", " ".repeat(left_pad), text, " ".repeat(right_pad))
            }
        }
    }

    fn results_table_format(&self) -> TableFormat {
        TableFormat {
            columns: vec![
                Column {
                    header: "Rank".to_string(),
                    alignment: Alignment::Right,
                    min_width: 4,
                    max_width: 6,
                },
                Column {
                    header: "Address".to_string(),
                    alignment: Alignment::Left,
                    min_width: 15,
                    max_width: 15,
                },
                Column {
                    header: "Latency".to_string(),
                    alignment: Alignment::Right,
                    min_width: 9,
                    max_width: 12,
                },
                Column {
                    header: "Level".to_string(),
                    alignment: Alignment::Center,
                    min_width: 10,
                    max_width: 10,
                },
            ],
            show_borders: self.options.table_borders,
            show_header: true,
            min_column_width: 4,
            max_column_width: 20,
        }
    }
}

/// Format duration in human-readable format
pub(crate) fn format_duration(duration_ms: f64) -> String {
    if duration_ms < 1000.0 {
        format!("{:.0}ms", duration_ms)
    } else if duration_ms < 60000.0 {
        format!("{:.2}s", duration_ms / 1000.0)
    } else {
        let minutes = (duration_ms / 60000.0) as u32;
        let seconds = (duration_ms % 60000.0) / 1000.0;
        format!("{}m{:.1}s", minutes, seconds)
    }
}

/// Format percentage with appropriate precision
pub(crate) fn format_percentage(percentage: f64) -> String {
    if percentage >= 99.95 {
        "100.0%".to_string()
    } else if percentage < 0.05 {
        "0.0%".to_string()
    } else {
        format!("{:.1}%", percentage)
    }
}

/// Elapsed milliseconds of a summary, zero when unknown
pub(crate) fn elapsed_ms(summary: &RunSummary) -> f64 {
    summary.elapsed().map(|d| d.num_milliseconds().max(0) as f64).unwrap_or(0.0)
}

impl OutputFormatter for PlainFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let mut output = String::new();
        let border = "=".repeat(title.len() + 4);

        writeln!(output, "{}", border)
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;
        writeln!(output, "  {}  ", title)
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;
        write!(output, "{}", border)
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;

        Ok(output)
    }

    fn format_run_summary(&self, summary: &RunSummary, status: &FinalStatus) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "Run Summary:")
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        writeln!(output, "------------")
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        writeln!(output, "Status:       {}", status.label())
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        writeln!(output, "Tested:       {}/{}", summary.tested, summary.total)
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        writeln!(output, "Responsive:   {} ({})", summary.responsive(), format_percentage(summary.success_rate()))
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        if let Some(best) = summary.results.first() {
            writeln!(output, "Best:         {} ({})", best.address, best.format_latency())
                .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        }
        write!(output, "Duration:     {}", format_duration(elapsed_ms(summary)))
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;

        if self.options.verbose_mode {
            write!(output, "\nRun ID:       {}", summary.run_id)
                .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        }

        Ok(output)
    }

    fn format_results_table(&self, results: &[ProbeResult]) -> Result<String> {
        if results.is_empty() {
            return Ok("No responsive addresses.".to_string());
        }

        let shown = visible_rows(results, self.options.max_rows);
        let rows: Vec<RowData> = shown
            .iter()
            .enumerate()
            .map(|(index, result)| {
                vec![
                    (index + 1).to_string(),
                    result.address.to_string(),
                    result.format_latency(),
                    LatencyLevel::from_latency(result.latency_ms).description().to_string(),
                ]
            })
            .collect();

        let mut output = self.create_table(&self.results_table_format(), &rows);
        if shown.len() < results.len() {
            write!(output, "\n... and {} more (use --verbose to list all)", results.len() - shown.len())
                .map_err(|e| AppError::io(format!("Failed to format table: {}", e)))?;
        }

        Ok(output)
    }

    fn format_progress(&self, snapshot: &ProgressSnapshot) -> String {
        let best = snapshot
            .best()
            .map(|r| format!("best {} {}", r.address, r.format_latency()))
            .unwrap_or_else(|| "no responses yet".to_string());

        format!(
            "Testing {}/{} ({}) | {}",
            snapshot.tested,
            snapshot.total,
            format_percentage(snapshot.progress() * 100.0),
            best
        )
    }

    fn format_status(&self, status: &FinalStatus) -> String {
        status.label()
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("ERROR: {}", error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("WARNING: {}", warning))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("SUCCESS: {}", message))
    }
}
