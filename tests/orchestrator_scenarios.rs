//! End-to-end orchestrator scenarios with scripted probes
//!
//! These tests drive full runs through the public API and observe them via
//! the channel observer, without touching the network.

use async_trait::async_trait;
use cidr_speedtest::{
    executor::{ChannelObserver, Orchestrator, RunEvent},
    models::RunConfig,
    probe::{LatencyProbe, ProbeAttempt},
    types::RunPhase,
    AppError, RunError,
};
use std::collections::VecDeque;
use std::io::Write;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::sync::mpsc::UnboundedReceiver;

const SCENARIO_DEADLINE: Duration = Duration::from_secs(10);

/// Returns queued latencies in call order and tracks peak concurrency
struct ScriptedProbe {
    latencies: Mutex<VecDeque<f64>>,
    delay: Duration,
    active: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl ScriptedProbe {
    fn new(latencies: &[f64], delay: Duration) -> Self {
        Self {
            latencies: Mutex::new(latencies.iter().copied().collect()),
            delay,
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    /// Every call fails after `delay`
    fn unreachable(delay: Duration) -> Self {
        Self::new(&[], delay)
    }
}

#[async_trait]
impl LatencyProbe for ScriptedProbe {
    async fn attempt(&self, _address: Ipv4Addr, _port: u16, _timeout: Duration) -> ProbeAttempt {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;
        let next = self.latencies.lock().unwrap().pop_front();

        self.active.fetch_sub(1, Ordering::SeqCst);
        match next {
            Some(ms) => ProbeAttempt::Connected(ms),
            None => ProbeAttempt::Failed("connection refused".to_string()),
        }
    }
}

fn source_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

fn run_config(file: &NamedTempFile, target_count: usize, max_workers: usize) -> RunConfig {
    RunConfig {
        source_path: file.path().to_path_buf(),
        target_count,
        max_workers,
        port: 443,
        timeout_ms: 500,
    }
}

fn orchestrator_with(probe: Arc<ScriptedProbe>) -> (Orchestrator, UnboundedReceiver<RunEvent>) {
    let (observer, events) = ChannelObserver::new();
    (Orchestrator::with_probe(Arc::new(observer), probe), events)
}

/// Collect events up to and including the final one
async fn collect_until_finished(events: &mut UnboundedReceiver<RunEvent>) -> Vec<RunEvent> {
    let collect = async {
        let mut seen = Vec::new();
        while let Some(event) = events.recv().await {
            let done = event.is_finished();
            seen.push(event);
            if done {
                break;
            }
        }
        seen
    };
    tokio::time::timeout(SCENARIO_DEADLINE, collect)
        .await
        .expect("run did not finish in time")
}

fn final_outcome(events: &[RunEvent]) -> Option<RunError> {
    match events.last() {
        Some(RunEvent::Finished(outcome)) => outcome.clone(),
        other => panic!("last event is not a finish: {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_source_finishes_with_no_addresses() {
    let file = source_file(&["", "# comment", "not-a-range", "2001:db8::/32"]);
    let probe = Arc::new(ScriptedProbe::new(&[], Duration::ZERO));
    let (orchestrator, mut events) = orchestrator_with(probe.clone());

    orchestrator.start(run_config(&file, 10, 4)).await.unwrap();
    let seen = collect_until_finished(&mut events).await;

    assert_eq!(seen.len(), 1, "no progress is expected before the failure");
    assert!(matches!(final_outcome(&seen), Some(RunError::NoAddresses(_))));
    assert_eq!(probe.calls.load(Ordering::SeqCst), 0);

    let summary = orchestrator.summary().await;
    assert_eq!(summary.phase, RunPhase::Finished);
    assert_eq!(summary.tested, 0);
    assert!(summary.results.is_empty());
}

#[tokio::test]
async fn test_natural_completion_ranks_fastest_first() {
    let file = source_file(&["198.51.100.0/24"]);
    let latencies = [50.0, 10.0, 30.0, 20.0, 40.0, 60.0, 70.0, 80.0, 90.0, 100.0];
    let probe = Arc::new(ScriptedProbe::new(&latencies, Duration::from_millis(5)));
    let (orchestrator, mut events) = orchestrator_with(probe.clone());

    orchestrator.start(run_config(&file, 10, 2)).await.unwrap();
    let seen = collect_until_finished(&mut events).await;

    assert_eq!(final_outcome(&seen), None);

    let progress: Vec<_> = seen
        .iter()
        .filter_map(|event| match event {
            RunEvent::Progress(snapshot) => Some(snapshot.clone()),
            RunEvent::Finished(_) => None,
        })
        .collect();
    assert_eq!(progress.len(), 10);
    assert!(progress.windows(2).all(|w| w[0].tested < w[1].tested));

    let last = progress.last().unwrap();
    assert_eq!(last.tested, 10);
    assert_eq!(last.total, 10);
    let top: Vec<f64> = last.top_results.iter().map(|r| r.latency_ms).collect();
    assert_eq!(top, vec![10.0, 20.0, 30.0, 40.0, 50.0]);

    let summary = orchestrator.summary().await;
    assert_eq!(summary.tested, 10);
    assert_eq!(summary.total, 10);
    assert_eq!(summary.responsive(), 10);
    assert!(summary.results.iter().all(|r| r.address.octets()[..3] == [198, 51, 100]));

    assert!(probe.peak.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn test_unresponsive_addresses_are_counted_not_ranked() {
    let file = source_file(&["203.0.113.0/28"]);
    let probe = Arc::new(ScriptedProbe::new(&[25.0, 15.0], Duration::ZERO));
    let (orchestrator, mut events) = orchestrator_with(probe);

    orchestrator.start(run_config(&file, 8, 1)).await.unwrap();
    let seen = collect_until_finished(&mut events).await;
    assert_eq!(final_outcome(&seen), None);

    let summary = orchestrator.summary().await;
    assert_eq!(summary.tested, 8);
    assert_eq!(summary.responsive(), 2);
    assert_eq!(summary.results[0].latency_ms, 15.0);
    assert_eq!(summary.results[1].latency_ms, 25.0);
}

#[tokio::test]
async fn test_target_larger_than_address_space_tests_every_address() {
    let file = source_file(&["192.0.2.8/30"]);
    let probe = Arc::new(ScriptedProbe::new(&[1.0, 2.0, 3.0, 4.0], Duration::ZERO));
    let (orchestrator, mut events) = orchestrator_with(probe);

    orchestrator.start(run_config(&file, 100, 8)).await.unwrap();
    let seen = collect_until_finished(&mut events).await;
    assert_eq!(final_outcome(&seen), None);

    let summary = orchestrator.summary().await;
    assert_eq!(summary.total, 4);
    assert_eq!(summary.tested, 4);

    let mut addresses: Vec<_> = summary.results.iter().map(|r| r.address).collect();
    addresses.sort();
    addresses.dedup();
    assert_eq!(addresses.len(), 4);
}

#[tokio::test]
async fn test_stop_drains_and_reports_cancellation() {
    let file = source_file(&["10.20.0.0/16"]);
    let probe = Arc::new(ScriptedProbe::unreachable(Duration::from_millis(20)));
    let (orchestrator, mut events) = orchestrator_with(probe.clone());

    orchestrator.start(run_config(&file, 500, 4)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    orchestrator.stop().await.unwrap();

    // A repeated stop while draining is accepted
    assert!(orchestrator.stop().await.is_ok());

    let seen = collect_until_finished(&mut events).await;
    assert_eq!(final_outcome(&seen), Some(RunError::Cancelled));

    let summary = orchestrator.summary().await;
    assert_eq!(summary.phase, RunPhase::Finished);
    assert!(summary.tested <= summary.total);
    assert!(summary.tested < 500);
    assert_eq!(summary.tested, probe.calls.load(Ordering::SeqCst));

    // Nothing arrives after the final status
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(events.try_recv().is_err());
    assert!(matches!(orchestrator.stop().await, Err(AppError::InvalidState(_))));
}

#[tokio::test]
async fn test_pause_holds_dispatch_until_resumed() {
    let file = source_file(&["172.16.0.0/20"]);
    let probe = Arc::new(ScriptedProbe::unreachable(Duration::from_millis(5)));
    let (orchestrator, mut events) = orchestrator_with(probe.clone());
    let config = run_config(&file, 200, 2);
    let backlog = config.submission_tokens();

    orchestrator.start(config).await.unwrap();

    // Wait until dispatch is under way before pausing
    loop {
        match tokio::time::timeout(SCENARIO_DEADLINE, events.recv()).await.unwrap() {
            Some(RunEvent::Progress(_)) => break,
            other => panic!("unexpected event before first progress: {:?}", other),
        }
    }

    assert!(orchestrator.pause().await.unwrap());
    assert_eq!(orchestrator.phase().await, RunPhase::Paused);
    let at_pause = orchestrator.snapshot().await.tested;

    // Admitted probes drain, then the count stalls
    tokio::time::sleep(Duration::from_millis(300)).await;
    let stalled = orchestrator.snapshot().await.tested;
    assert!(stalled <= at_pause + backlog);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(orchestrator.snapshot().await.tested, stalled);
    assert!(stalled < 200);

    assert!(!orchestrator.pause().await.unwrap());
    assert_eq!(orchestrator.phase().await, RunPhase::Running);

    let seen = collect_until_finished(&mut events).await;
    assert_eq!(final_outcome(&seen), None);

    let summary = orchestrator.summary().await;
    assert_eq!(summary.tested, 200);
    assert_eq!(summary.responsive(), 0);
}

#[tokio::test]
async fn test_stop_while_paused_finishes_cancelled() {
    let file = source_file(&["10.1.0.0/16"]);
    let probe = Arc::new(ScriptedProbe::unreachable(Duration::from_millis(5)));
    let (orchestrator, mut events) = orchestrator_with(probe);

    orchestrator.start(run_config(&file, 300, 3)).await.unwrap();
    match tokio::time::timeout(SCENARIO_DEADLINE, events.recv()).await.unwrap() {
        Some(RunEvent::Progress(_)) => {}
        other => panic!("unexpected event: {:?}", other),
    }

    orchestrator.pause().await.unwrap();
    orchestrator.stop().await.unwrap();
    assert!(matches!(orchestrator.pause().await, Err(AppError::InvalidState(_))));

    let seen = collect_until_finished(&mut events).await;
    assert_eq!(final_outcome(&seen), Some(RunError::Cancelled));
    assert!(orchestrator.summary().await.tested < 300);
}

#[tokio::test]
async fn test_stop_during_preparation_skips_probing() {
    let file = source_file(&["10.0.0.0/8"]);
    let probe = Arc::new(ScriptedProbe::new(&[5.0], Duration::ZERO));
    let (orchestrator, mut events) = orchestrator_with(probe.clone());

    orchestrator.start(run_config(&file, 50_000, 50)).await.unwrap();
    orchestrator.stop().await.unwrap();

    let seen = collect_until_finished(&mut events).await;
    assert_eq!(seen.len(), 1, "no progress is expected after an early stop");
    assert_eq!(final_outcome(&seen), Some(RunError::Cancelled));
    assert_eq!(probe.calls.load(Ordering::SeqCst), 0);

    let summary = orchestrator.summary().await;
    assert_eq!(summary.phase, RunPhase::Finished);
    assert_eq!(summary.tested, 0);
    assert_eq!(summary.total, 50_000);
}

#[tokio::test]
async fn test_zero_workers_is_rejected_before_any_work() {
    let file = source_file(&["10.0.0.0/24"]);
    let probe = Arc::new(ScriptedProbe::new(&[], Duration::ZERO));
    let (orchestrator, mut events) = orchestrator_with(probe.clone());

    let result = orchestrator.start(run_config(&file, 5, 0)).await;
    assert!(matches!(result, Err(AppError::Config(_))));
    assert_eq!(orchestrator.phase().await, RunPhase::Idle);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(events.try_recv().is_err());
    assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
}
