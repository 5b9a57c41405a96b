//! Type definitions and aliases

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use crate::error::{AppError, Result, RunError};

/// Lifecycle phase of a single speedtest run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// No run has been started
    Idle,
    /// Loading ranges and sampling addresses
    Preparing,
    /// Dispatching probes
    Running,
    /// Dispatch suspended; admitted probes still complete
    Paused,
    /// No new work is admitted; waiting for in-flight probes to drain
    Stopping,
    /// Terminal
    Finished,
}

impl RunPhase {
    /// Whether the run has reached its terminal phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }

    /// Whether `pause()` is meaningful in this phase
    pub fn accepts_pause(&self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }

    /// Whether `stop()` cancels anything in this phase
    pub fn accepts_stop(&self) -> bool {
        matches!(self, Self::Preparing | Self::Running | Self::Paused)
    }

    /// Short status label for display
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Ready",
            Self::Preparing => "Preparing",
            Self::Running => "Testing",
            Self::Paused => "Paused",
            Self::Stopping => "Stopping",
            Self::Finished => "Finished",
        }
    }
}

impl Default for RunPhase {
    fn default() -> Self {
        Self::Idle
    }
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
