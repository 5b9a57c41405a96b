//! Error handling for the CIDR speedtest

use thiserror::Error;

/// Custom error types for the CIDR speedtest
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(String),

    /// Parsing errors (CIDR lines, JSON, numbers)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// An orchestrator operation was requested in a phase that does not allow it
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new invalid state error
    pub fn invalid_state<S: Into<String>>(message: S) -> Self {
        Self::InvalidState(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Validation(_) => "VALIDATION",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::InvalidState(_) => "STATE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Get user-friendly error message with suggestions
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Config(msg) => {
                format!("Configuration problem: {}\n\nSuggestion: Check your .env file or command line arguments.", msg)
            }
            Self::Validation(msg) => {
                format!("Invalid input: {}\n\nSuggestion: Check worker count, address count, port and timeout values.", msg)
            }
            Self::Io(msg) => {
                format!("File operation failed: {}\n\nSuggestion: Check file permissions and that the CIDR file path is correct.", msg)
            }
            Self::Parse(msg) => {
                format!("Failed to parse data: {}\n\nSuggestion: Check the format of your input data or configuration values.", msg)
            }
            Self::InvalidState(msg) => {
                format!("Operation not allowed right now: {}\n\nSuggestion: Wait for the current run to finish before starting another.", msg)
            }
            Self::Internal(msg) => {
                format!("Internal error: {}\n\nThis is likely a bug. Please report this issue with the error details.", msg)
            }
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) => 1,
            Self::Io(_) => 5,
            Self::InvalidState(_) => 6,
            Self::Internal(_) => 99,
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Validation(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Io(_) | Self::InvalidState(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {}", error))
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::parse(format!("Integer parse error: {}", error))
    }
}

impl From<std::str::ParseBoolError> for AppError {
    fn from(error: std::str::ParseBoolError) -> Self {
        Self::parse(format!("Boolean parse error: {}", error))
    }
}

impl From<ipnet::AddrParseError> for AppError {
    fn from(error: ipnet::AddrParseError) -> Self {
        Self::parse(format!("CIDR parse error: {}", error))
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Terminal status of a run that did not complete naturally.
///
/// Delivered exactly once through `RunObserver::on_finish`; `None` there means
/// every sampled address was probed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    /// No usable address ranges: missing source, empty source or all lines invalid
    #[error("no addresses available: {0}")]
    NoAddresses(String),

    /// The user requested a stop before all addresses were probed
    #[error("stopped by user")]
    Cancelled,
}

impl RunError {
    /// Preparation failure for a given source path
    pub fn no_addresses<S: Into<String>>(detail: S) -> Self {
        Self::NoAddresses(detail.into())
    }

    /// Whether this status came from a user stop request
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Process exit code used by the binary for this status
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoAddresses(_) => 2,
            Self::Cancelled => 130,
        }
    }
}

/// Error reporter for structured error logging and user feedback
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    /// Create a new error reporter
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    /// Render an error the way `report_error` prints it
    pub fn render(&self, error: &AppError) -> String {
        let mut output = error.format_for_console(self.use_color);
        if self.verbose {
            output.push_str("\n\n");
            output.push_str(&error.user_friendly_message());
        }
        output
    }

    /// Report an error to the user
    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", self.render(error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_error = AppError::config("Invalid worker count");
        assert_eq!(config_error.category(), "CONFIG");
        assert_eq!(config_error.exit_code(), 1);

        let state_error = AppError::invalid_state("run already started");
        assert_eq!(state_error.category(), "STATE");
        assert_eq!(state_error.exit_code(), 6);
    }

    #[test]
    fn test_error_display() {
        let error = AppError::parse("bad value");
        assert_eq!(error.to_string(), "Parsing error: bad value");
    }

    #[test]
    fn test_error_conversions() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "ip.txt missing");
        let app_error: AppError = io_error.into();
        assert!(matches!(app_error, AppError::Io(_)));

        let parse_error = "abc".parse::<u32>().unwrap_err();
        let app_error: AppError = parse_error.into();
        assert!(matches!(app_error, AppError::Parse(_)));

        let cidr_error = "not-a-cidr".parse::<ipnet::Ipv4Net>().unwrap_err();
        let app_error: AppError = cidr_error.into();
        assert!(app_error.to_string().contains("CIDR"));
    }

    #[test]
    fn test_console_formatting_without_color() {
        let error = AppError::validation("port must be non-zero");
        let formatted = error.format_for_console(false);
        assert_eq!(formatted, "[VALIDATION] Validation error: port must be non-zero");
    }

    #[test]
    fn test_run_error_labels() {
        assert_eq!(RunError::Cancelled.to_string(), "stopped by user");
        assert!(RunError::Cancelled.is_cancellation());

        let prep = RunError::no_addresses("ip.txt");
        assert!(prep.to_string().starts_with("no addresses available"));
        assert!(!prep.is_cancellation());
        assert_ne!(prep.exit_code(), RunError::Cancelled.exit_code());
    }

    #[test]
    fn test_reporter_render_verbose() {
        let reporter = ErrorReporter::new(false, true);
        let rendered = reporter.render(&AppError::config("MAX_WORKERS must be positive"));
        assert!(rendered.starts_with("[CONFIG]"));
        assert!(rendered.contains("Suggestion"));

        let terse = ErrorReporter::new(false, false).render(&AppError::config("x"));
        assert!(!terse.contains("Suggestion"));
    }
}
