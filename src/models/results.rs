//! Probe result and progress data models

use crate::types::RunPhase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// One successful TCP-connect measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Probed address
    pub address: Ipv4Addr,
    /// Connect latency in milliseconds
    pub latency_ms: f64,
}

impl ProbeResult {
    pub fn new(address: Ipv4Addr, latency_ms: f64) -> Self {
        Self { address, latency_ms }
    }

    /// Format latency with one decimal place
    pub fn format_latency(&self) -> String {
        format!("{:.1}ms", self.latency_ms)
    }
}

/// Read-only progress view handed to observers after every completed probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Number of addresses sampled for this run
    pub total: usize,
    /// Number of probes completed so far
    pub tested: usize,
    /// Up to five fastest results, ascending by latency
    pub top_results: Vec<ProbeResult>,
}

impl ProgressSnapshot {
    /// Completed fraction in `[0, 1]`; zero when nothing was sampled
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.tested as f64 / self.total as f64
        }
    }

    /// Fastest responder so far
    pub fn best(&self) -> Option<&ProbeResult> {
        self.top_results.first()
    }
}

/// Full account of a run, available once it has finished
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Correlation id shared with the run's log entries
    pub run_id: String,
    pub phase: RunPhase,
    pub total: usize,
    pub tested: usize,
    /// Every successful result, ascending by latency
    pub results: Vec<ProbeResult>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunSummary {
    /// Number of probes that produced a result
    pub fn responsive(&self) -> usize {
        self.results.len()
    }

    /// Share of tested addresses that answered, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.tested == 0 {
            0.0
        } else {
            (self.results.len() as f64 / self.tested as f64) * 100.0
        }
    }

    /// Wall-clock duration of the run, when both ends are known
    pub fn elapsed(&self) -> Option<chrono::Duration> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}
