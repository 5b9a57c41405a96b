//! Machine-readable run report

use super::formatter::FinalStatus;
use crate::{
    error::Result,
    models::{ProbeResult, RunConfig, RunSummary},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// JSON document printed by `--json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    pub run_id: String,
    /// Human-readable final status, same text as the console status line
    pub status: String,
    pub exit_code: i32,
    pub config: RunConfig,
    pub total: usize,
    pub tested: usize,
    pub responsive: usize,
    pub success_rate: f64,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub elapsed_ms: Option<i64>,
    /// Every responsive address, fastest first
    pub results: Vec<ProbeResult>,
}

impl JsonReport {
    pub fn new(summary: &RunSummary, config: &RunConfig, status: &FinalStatus) -> Self {
        Self {
            run_id: summary.run_id.clone(),
            status: status.label(),
            exit_code: status.exit_code(),
            config: config.clone(),
            total: summary.total,
            tested: summary.tested,
            responsive: summary.responsive(),
            success_rate: summary.success_rate(),
            started_at: summary.started_at,
            finished_at: summary.finished_at,
            elapsed_ms: summary.elapsed().map(|d| d.num_milliseconds()),
            results: summary.results.clone(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RunPhase;
    use std::net::Ipv4Addr;

    #[test]
    fn test_report_fields() {
        let summary = RunSummary {
            run_id: "abc".to_string(),
            phase: RunPhase::Finished,
            total: 4,
            tested: 2,
            results: vec![ProbeResult::new(Ipv4Addr::new(8, 8, 8, 8), 11.5)],
            started_at: Some(Utc::now()),
            finished_at: Some(Utc::now()),
        };

        let report = JsonReport::new(&summary, &RunConfig::default(), &FinalStatus::Stopped);
        let json: serde_json::Value = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();

        assert_eq!(json["status"], "Stopped by user");
        assert_eq!(json["exit_code"], 130);
        assert_eq!(json["tested"], 2);
        assert_eq!(json["responsive"], 1);
        assert_eq!(json["results"][0]["address"], "8.8.8.8");
        assert_eq!(json["results"][0]["latency_ms"], 11.5);
        assert_eq!(json["config"]["port"], 443);
    }
}
