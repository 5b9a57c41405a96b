//! Output formatting and display system
//!
//! Colored or plain rendering of progress, the final leaderboard and the
//! run summary, plus the JSON report used with `--json`.

mod colored;
mod console;
mod formatter;
mod report;

pub use colored::{ColorScheme, ColoredFormatter, LatencyLevel};
pub use console::ProgressDisplay;
pub use formatter::{
    Alignment, Column, FinalStatus, FormattingOptions, OutputFormatter, PlainFormatter, RowData,
    TableFormat, DEFAULT_TABLE_ROWS,
};
pub use report::JsonReport;

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool, verbose: bool) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
            table_borders: true,
            max_rows: if verbose { None } else { Some(DEFAULT_TABLE_ROWS) },
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }
}
