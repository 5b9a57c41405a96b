//! Live progress line on stderr

use super::formatter::OutputFormatter;
use crate::models::ProgressSnapshot;
use std::io::{IsTerminal, Write};

/// Redraws a single status line in place with carriage returns.
///
/// Disabled automatically when stderr is not a terminal so redirected output
/// does not fill up with partial lines.
pub struct ProgressDisplay {
    enabled: bool,
    drawn: bool,
}

impl ProgressDisplay {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, drawn: false }
    }

    /// Enabled only when stderr is a terminal
    pub fn for_stderr(requested: bool) -> Self {
        Self::new(requested && std::io::stderr().is_terminal())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Replace the current line with the rendered snapshot
    pub fn update(&mut self, formatter: &dyn OutputFormatter, snapshot: &ProgressSnapshot) {
        if !self.enabled {
            return;
        }

        let line = formatter.format_progress(snapshot);
        let mut stderr = std::io::stderr().lock();
        // Errors writing to the terminal are not worth aborting a run for
        let _ = write!(stderr, "\r\x1b[2K{}", line);
        let _ = stderr.flush();
        self.drawn = true;
    }

    /// Print a message on its own line without losing the progress line
    pub fn message(&mut self, text: &str) {
        self.clear();
        eprintln!("{}", text);
    }

    /// Erase the progress line, if one was drawn
    pub fn clear(&mut self) {
        if self.drawn {
            let mut stderr = std::io::stderr().lock();
            let _ = write!(stderr, "\r\x1b[2K");
            let _ = stderr.flush();
            self.drawn = false;
        }
    }
}
