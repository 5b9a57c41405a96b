//! Shared aggregate of a run
//!
//! `RunState` is only ever touched under the orchestrator's single mutex.
//! `tested_count` and `results` change together in `record`, and the
//! snapshot handed to observers is taken in the same critical section.

use crate::models::{ProbeResult, ProgressSnapshot, RunSummary};
use crate::types::RunPhase;
use chrono::{DateTime, Utc};
use std::net::Ipv4Addr;

/// Mutable aggregate guarded by the orchestrator mutex
#[derive(Debug, Default)]
pub struct RunState {
    pub phase: RunPhase,
    pub run_id: String,
    pub total_count: usize,
    pub tested_count: usize,
    /// Ascending by latency
    pub results: Vec<ProbeResult>,
    pub cancel_requested: bool,
    pub pause_requested: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunState {
    /// Fresh state for a run entering `Preparing`
    pub fn preparing(run_id: String) -> Self {
        Self {
            phase: RunPhase::Preparing,
            run_id,
            started_at: Some(Utc::now()),
            ..Self::default()
        }
    }

    /// Reset counters once the sample size is known
    pub fn begin(&mut self, total: usize) {
        self.total_count = total;
        self.tested_count = 0;
        self.results.clear();
    }

    /// Fold one probe outcome into the aggregate and return the new snapshot.
    ///
    /// Returns `None` once the run is terminal or every address is accounted for.
    pub fn record(&mut self, address: Ipv4Addr, latency_ms: Option<f64>) -> Option<ProgressSnapshot> {
        if self.phase.is_terminal() || self.tested_count >= self.total_count {
            return None;
        }

        self.tested_count += 1;
        if let Some(latency_ms) = latency_ms {
            insert_sorted(&mut self.results, ProbeResult::new(address, latency_ms));
        }

        Some(self.snapshot())
    }

    /// Copy of the counters and the current leaderboard
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            total: self.total_count,
            tested: self.tested_count,
            top_results: top_results(&self.results, crate::defaults::LEADERBOARD_SIZE),
        }
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            run_id: self.run_id.clone(),
            phase: self.phase,
            total: self.total_count,
            tested: self.tested_count,
            results: self.results.clone(),
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
    }

    /// Move to `Finished`; the state is read-only from here on
    pub fn finish(&mut self) {
        self.phase = RunPhase::Finished;
        self.finished_at = Some(Utc::now());
    }

    /// Milliseconds between start and finish, zero if either is unknown
    pub fn elapsed_ms(&self) -> i64 {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => (end - start).num_milliseconds(),
            _ => 0,
        }
    }
}

/// Insert keeping ascending latency order; equal latencies keep arrival order
pub fn insert_sorted(results: &mut Vec<ProbeResult>, result: ProbeResult) {
    let index = results.partition_point(|r| r.latency_ms <= result.latency_ms);
    results.insert(index, result);
}

/// First `k` results, cloned
pub fn top_results(results: &[ProbeResult], k: usize) -> Vec<ProbeResult> {
    results.iter().take(k).cloned().collect()
}
