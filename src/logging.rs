//! Structured logging system for the CIDR speedtest
//!
//! This module provides:
//! - Structured logging with multiple levels and contexts
//! - Run lifecycle logging with correlation IDs
//! - Per-address probe outcome tracing in debug mode
//! - JSON structured output for integration with log aggregators
//!
//! All entries go to stderr so that stdout stays reserved for results.

use crate::error::{AppError, Result, RunError};
use crate::models::{Config, RunConfig};
use crate::probe::ProbeAttempt;
use crate::types::RunPhase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, Write};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// Trace level - most detailed
    Trace = 0,
    /// Debug level - detailed information for debugging
    Debug = 1,
    /// Info level - general application information
    Info = 2,
    /// Warning level - potentially harmful situations
    Warn = 3,
    /// Error level - error events but application can continue
    Error = 4,
    /// Fatal level - severe error events that cause application termination
    Fatal = 5,
}

impl LogLevel {
    /// Get log level name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// Get ANSI color code for console output
    pub fn color_code(&self) -> &'static str {
        match self {
            LogLevel::Trace => "\x1b[37m",
            LogLevel::Debug => "\x1b[36m",
            LogLevel::Info => "\x1b[32m",
            LogLevel::Warn => "\x1b[33m",
            LogLevel::Error => "\x1b[31m",
            LogLevel::Fatal => "\x1b[35m",
        }
    }

    /// Reset ANSI color code
    pub fn reset_code() -> &'static str {
        "\x1b[0m"
    }
}

impl std::str::FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(AppError::parse(format!("Invalid log level: {}", s))),
        }
    }
}

/// Log entry structure for structured logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Timestamp when log entry was created
    pub timestamp: DateTime<Utc>,
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Logger name/component
    pub logger: String,
    /// Correlation ID for tracking related events
    pub correlation_id: Option<String>,
    /// Additional structured fields
    pub fields: HashMap<String, serde_json::Value>,
    /// Thread name if available
    pub thread_id: Option<String>,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// Human-readable console format
    Console,
    /// JSON format for structured logging
    Json,
    /// Compact single-line format
    Compact,
}

/// Shared logging context for correlation and session tracking
#[derive(Debug, Default)]
struct LogContext {
    /// Global correlation ID for the session
    session_id: Option<String>,
    /// Additional context fields
    context_fields: HashMap<String, serde_json::Value>,
}

/// Logger implementation with multiple output formats
#[derive(Debug, Clone)]
pub struct Logger {
    /// Minimum log level to output
    min_level: LogLevel,
    /// Whether to use colored output
    use_color: bool,
    /// Output format
    format: LogFormat,
    /// Logger name
    name: String,
    /// Shared context storage
    context: Arc<RwLock<LogContext>>,
}

impl Logger {
    /// Create a new logger
    pub fn new(name: String) -> Self {
        Self {
            min_level: LogLevel::Info,
            use_color: true,
            format: LogFormat::Console,
            name,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    /// Create a logger that only reports warnings and above
    pub fn quiet(name: String) -> Self {
        let mut logger = Self::new(name);
        logger.min_level = LogLevel::Warn;
        logger
    }

    /// Create a logger with specific configuration
    pub fn with_config(name: String, config: &Config) -> Self {
        let min_level = if config.debug {
            LogLevel::Debug
        } else if config.verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };

        Self {
            min_level,
            use_color: config.enable_color,
            format: if config.debug { LogFormat::Json } else { LogFormat::Console },
            name,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    /// Set minimum log level
    pub fn set_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    /// Set output format
    pub fn set_format(&mut self, format: LogFormat) {
        self.format = format;
    }

    /// Enable or disable colored output
    pub fn set_color(&mut self, use_color: bool) {
        self.use_color = use_color;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set session correlation ID
    pub async fn set_session_id(&self, session_id: String) {
        let mut context = self.context.write().await;
        context.session_id = Some(session_id);
    }

    /// Add context field for all subsequent log entries
    pub async fn add_context_field<T: Serialize>(&self, key: String, value: T) {
        if let Ok(json_value) = serde_json::to_value(value) {
            let mut context = self.context.write().await;
            context.context_fields.insert(key, json_value);
        }
    }

    /// Create a log entry builder
    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    /// Convenience methods for different log levels
    pub fn trace(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Trace, message)
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Error, message)
    }

    /// Check if a log level would be output
    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Write log entry to stderr
    async fn write_entry(&self, mut entry: LogEntry) {
        if entry.level < self.min_level {
            return;
        }

        let context = self.context.read().await;
        if let Some(session_id) = &context.session_id {
            entry.fields.insert("session_id".to_string(), serde_json::Value::String(session_id.clone()));
        }

        for (key, value) in &context.context_fields {
            entry.fields.insert(key.clone(), value.clone());
        }
        drop(context);

        let output = match self.format {
            LogFormat::Console => self.format_console(&entry),
            LogFormat::Json => self.format_json(&entry),
            LogFormat::Compact => self.format_compact(&entry),
        };

        let _ = writeln!(io::stderr(), "{}", output);
    }

    /// Format log entry for console output
    fn format_console(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
        let level_str = entry.level.as_str();

        let formatted_level = if self.use_color {
            format!("{}{:>5}{}", entry.level.color_code(), level_str, LogLevel::reset_code())
        } else {
            format!("{:>5}", level_str)
        };

        let mut output = format!("{} {} [{}] {}",
            timestamp,
            formatted_level,
            entry.logger,
            entry.message
        );

        if let Some(correlation_id) = &entry.correlation_id {
            let short: String = correlation_id.chars().take(8).collect();
            output.push_str(&format!(" [{}]", short));
        }

        if !entry.fields.is_empty() {
            let mut fields_str: Vec<String> = entry.fields.iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            fields_str.sort();
            output.push_str(&format!(" {{{}}}", fields_str.join(", ")));
        }

        output
    }

    /// Format log entry as JSON
    fn format_json(&self, entry: &LogEntry) -> String {
        match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(_) => format!("{{\"error\": \"Failed to serialize log entry\", \"message\": \"{}\"}}", entry.message),
        }
    }

    /// Format log entry in compact format
    fn format_compact(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%H:%M:%S");
        format!("{} {} {}: {}",
            timestamp,
            entry.level.as_str().chars().next().unwrap_or('?'),
            entry.logger,
            entry.message
        )
    }
}

/// Builder pattern for creating log entries
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                correlation_id: None,
                fields: HashMap::new(),
                thread_id: std::thread::current().name().map(String::from),
            },
        }
    }

    /// Add a correlation ID
    pub fn correlation_id(mut self, id: &str) -> Self {
        self.entry.correlation_id = Some(id.to_string());
        self
    }

    /// Add a structured field
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    /// Add error information
    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_exit_code", error.exit_code())
    }

    /// Finalize and write the log entry
    pub async fn log(self) {
        self.logger.write_entry(self.entry).await;
    }
}

/// Lifecycle events of orchestrated runs
#[derive(Debug, Clone)]
pub struct RunLogger {
    logger: Logger,
}

impl RunLogger {
    /// Create a run logger from application configuration
    pub fn new(config: &Config) -> Self {
        Self::from_logger(Logger::with_config("RUN".to_string(), config))
    }

    pub fn from_logger(logger: Logger) -> Self {
        Self { logger }
    }

    /// Logger that stays silent below warnings
    pub fn quiet() -> Self {
        Self::from_logger(Logger::quiet("RUN".to_string()))
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Log the start of a correlated run
    pub async fn log_run_started(&self, run_id: &str, config: &RunConfig) {
        self.logger.info(&format!("Started run: {} addresses from {}", config.target_count, config.source_path.display()))
            .correlation_id(run_id)
            .field("source_path", config.source_path.display().to_string())
            .field("max_workers", config.max_workers)
            .field("target_count", config.target_count)
            .field("port", config.port)
            .field("timeout_ms", config.timeout_ms)
            .log()
            .await;
    }

    /// Log the outcome of range loading and sampling
    pub async fn log_preparation(
        &self,
        run_id: &str,
        ranges: usize,
        skipped_lines: usize,
        read_error: Option<&str>,
        sampled: usize,
        attempts: usize,
    ) {
        let level = if sampled == 0 { LogLevel::Warn } else { LogLevel::Info };
        let message = format!(
            "Prepared run: {} ranges ({} lines skipped), {} addresses sampled in {} draws",
            ranges, skipped_lines, sampled, attempts
        );

        let mut builder = self.logger.log(level, &message)
            .correlation_id(run_id)
            .field("ranges", ranges)
            .field("skipped_lines", skipped_lines)
            .field("sampled", sampled)
            .field("attempts", attempts);

        if let Some(err) = read_error {
            builder = builder.field("read_error", err);
        }

        builder.log().await;
    }

    /// Log a pause, resume or stop request
    pub async fn log_control(&self, run_id: &str, action: &str, phase: RunPhase) {
        self.logger.info(&format!("Control request: {} (phase: {})", action, phase))
            .correlation_id(run_id)
            .field("action", action)
            .field("phase", phase)
            .log()
            .await;
    }

    /// Log the terminal status of a run
    pub async fn log_run_finished(
        &self,
        run_id: &str,
        outcome: Option<&RunError>,
        tested: usize,
        total: usize,
        responsive: usize,
        elapsed_ms: i64,
    ) {
        let status = outcome.map_or_else(|| "completed".to_string(), |e| e.to_string());
        let level = match outcome {
            Some(RunError::NoAddresses(_)) => LogLevel::Error,
            _ => LogLevel::Info,
        };

        self.logger.log(level, &format!("Finished run: {} ({}/{} tested, {} responsive)", status, tested, total, responsive))
            .correlation_id(run_id)
            .field("status", status)
            .field("tested", tested)
            .field("total", total)
            .field("responsive", responsive)
            .field("duration_ms", elapsed_ms)
            .log()
            .await;
    }
}

/// Per-address probe outcome logger
#[derive(Debug, Clone)]
pub struct ProbeLogger {
    logger: Logger,
}

impl ProbeLogger {
    /// Create a new probe logger
    pub fn new(config: &Config) -> Self {
        Self::from_logger(Logger::with_config("PROBE".to_string(), config))
    }

    pub fn from_logger(logger: Logger) -> Self {
        Self { logger }
    }

    pub fn quiet() -> Self {
        Self::from_logger(Logger::quiet("PROBE".to_string()))
    }

    /// Whether per-address entries would be written at all
    pub fn enabled(&self) -> bool {
        self.logger.would_log(LogLevel::Debug)
    }

    /// Log one connection attempt
    pub async fn log_attempt(&self, run_id: &str, address: Ipv4Addr, port: u16, attempt: &ProbeAttempt) {
        if !self.enabled() {
            return;
        }

        let target = format!("{}:{}", address, port);
        let message = if attempt.is_success() {
            format!("Connected to {} in {}", target, attempt.describe())
        } else {
            format!("No result from {}: {}", target, attempt.describe())
        };

        let mut builder = self.logger.debug(&message)
            .correlation_id(run_id)
            .field("target", &target)
            .field("success", attempt.is_success());

        if let Some(ms) = attempt.latency_ms() {
            builder = builder.field("latency_ms", ms);
        }

        builder.log().await;
    }
}

/// Factory for creating loggers that share one session id
pub struct LoggerFactory {
    config: Config,
    session_id: String,
}

impl LoggerFactory {
    /// Create a new logger factory
    pub fn new(config: Config) -> Self {
        Self {
            config,
            session_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create a logger with a specific name
    pub async fn create_logger(&self, name: &str) -> Logger {
        let logger = Logger::with_config(name.to_string(), &self.config);
        logger.set_session_id(self.session_id.clone()).await;
        logger
    }

    /// Create the run lifecycle logger
    pub async fn create_run_logger(&self) -> RunLogger {
        RunLogger::from_logger(self.create_logger("RUN").await)
    }

    /// Create the per-address probe logger
    pub async fn create_probe_logger(&self) -> ProbeLogger {
        ProbeLogger::from_logger(self.create_logger("PROBE").await)
    }

    /// Get session ID
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("warning").unwrap(), LogLevel::Warn);
        assert!(LogLevel::from_str("invalid").is_err());
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Fatal);
    }

    #[tokio::test]
    async fn test_logger_with_config() {
        let config = Config {
            debug: true,
            verbose: true,
            enable_color: false,
            ..Default::default()
        };

        let logger = Logger::with_config("TEST".to_string(), &config);
        assert_eq!(logger.min_level, LogLevel::Debug);
        assert_eq!(logger.format, LogFormat::Json);
        assert!(!logger.use_color);

        let quiet = Logger::with_config("TEST".to_string(), &Config::default());
        assert_eq!(quiet.min_level, LogLevel::Warn);
    }

    #[tokio::test]
    async fn test_session_id_management() {
        let logger = Logger::new("TEST".to_string());
        logger.set_session_id("test-session".to_string()).await;

        let context = logger.context.read().await;
        assert_eq!(context.session_id.as_deref(), Some("test-session"));
    }

    #[tokio::test]
    async fn test_context_fields_shared_between_clones() {
        let logger = Logger::new("TEST".to_string());
        let clone = logger.clone();
        logger.add_context_field("source".to_string(), "ip.txt").await;

        let context = clone.context.read().await;
        assert!(context.context_fields.contains_key("source"));
    }

    #[tokio::test]
    async fn test_would_log() {
        let mut logger = Logger::new("TEST".to_string());
        logger.set_level(LogLevel::Warn);

        assert!(!logger.would_log(LogLevel::Debug));
        assert!(!logger.would_log(LogLevel::Info));
        assert!(logger.would_log(LogLevel::Warn));
        assert!(logger.would_log(LogLevel::Error));
    }

    #[test]
    fn test_log_formats() {
        let entry = LogEntry {
            timestamp: Utc::now(),
            level: LogLevel::Info,
            message: "Test message".to_string(),
            logger: "TEST".to_string(),
            correlation_id: Some("0123456789abcdef".to_string()),
            fields: {
                let mut map = HashMap::new();
                map.insert("key".to_string(), serde_json::Value::String("value".to_string()));
                map
            },
            thread_id: None,
        };

        let mut logger = Logger::new("TEST".to_string());
        logger.set_color(false);

        let console_output = logger.format_console(&entry);
        assert!(console_output.contains("INFO"));
        assert!(console_output.contains("Test message"));
        assert!(console_output.contains("[01234567]"));
        assert!(console_output.contains("key=\"value\""));

        let json_output = logger.format_json(&entry);
        assert!(json_output.starts_with('{'));
        assert!(json_output.ends_with('}'));

        let compact_output = logger.format_compact(&entry);
        assert!(compact_output.contains(" I TEST: Test message"));
    }

    #[tokio::test]
    async fn test_run_logger_lifecycle() {
        let run_logger = RunLogger::quiet();
        let run_id = Uuid::new_v4().to_string();
        run_logger.log_run_started(&run_id, &RunConfig::default()).await;

        run_logger.log_preparation(&run_id, 3, 1, None, 200, 214).await;
        run_logger.log_control(&run_id, "pause", RunPhase::Paused).await;
        run_logger.log_run_finished(&run_id, Some(&RunError::Cancelled), 10, 200, 4, 1500).await;
        run_logger.log_run_finished(&run_id, None, 200, 200, 40, 9000).await;
    }

    #[tokio::test]
    async fn test_probe_logger_respects_level() {
        let quiet = ProbeLogger::quiet();
        assert!(!quiet.enabled());
        quiet.log_attempt("run", Ipv4Addr::LOCALHOST, 443, &ProbeAttempt::TimedOut).await;

        let debug = ProbeLogger::new(&Config { debug: true, ..Default::default() });
        assert!(debug.enabled());
    }

    #[tokio::test]
    async fn test_logger_factory() {
        let factory = LoggerFactory::new(Config::default());

        let logger = factory.create_logger("TEST").await;
        assert_eq!(logger.name(), "TEST");
        assert_eq!(factory.create_run_logger().await.logger().name(), "RUN");

        assert!(!factory.session_id().is_empty());
    }

    #[test]
    fn test_log_entry_serialization() {
        let entry = LogEntry {
            timestamp: Utc::now(),
            level: LogLevel::Info,
            message: "Test".to_string(),
            logger: "TEST".to_string(),
            correlation_id: None,
            fields: HashMap::new(),
            thread_id: None,
        };

        let json = serde_json::to_string(&entry).unwrap();
        let deserialized: LogEntry = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.level, LogLevel::Info);
        assert_eq!(deserialized.message, "Test");
        assert_eq!(deserialized.logger, "TEST");
    }
}
