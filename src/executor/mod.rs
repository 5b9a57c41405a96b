//! Test orchestration engine
//!
//! This module owns the lifecycle of a speedtest run:
//! - Range loading and address sampling off the caller's task
//! - Bounded-concurrency probe dispatch with a submission token pool
//! - Cooperative pause/resume and stop
//! - Incremental aggregation into a single mutex-guarded `RunState`
//!
//! Two semaphores shape the pipeline. The worker pool (`max_workers`
//! permits) bounds how many probes are connecting at once. The token pool
//! (`max_workers + BACKLOG_SLACK` permits) bounds how many addresses have been
//! admitted but not yet folded into the aggregate, so pause and stop take
//! effect after at most that many further completions.

pub mod observer;
pub mod state;

pub use observer::{ChannelObserver, RunEvent, RunObserver};
pub use state::RunState;

use crate::{
    error::{AppError, Result, RunError},
    logging::{ProbeLogger, RunLogger},
    models::{ProgressSnapshot, RunConfig, RunSummary},
    probe::{LatencyProbe, TcpConnectProbe},
    ranges,
    sampler::{AddressSampler, Sample},
    types::RunPhase,
};
use futures::future::join_all;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, OwnedSemaphorePermit, Semaphore};
use uuid::Uuid;

/// Control requests published to the dispatch loop and probe tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ControlFlags {
    paused: bool,
    cancelled: bool,
}

/// Drives one speedtest run and reports to a `RunObserver`
pub struct Orchestrator {
    state: Arc<Mutex<RunState>>,
    control: Arc<watch::Sender<ControlFlags>>,
    observer: Arc<dyn RunObserver>,
    probe: Arc<dyn LatencyProbe>,
    sampler: AddressSampler,
    run_logger: RunLogger,
    probe_logger: ProbeLogger,
}

/// Everything a background task of the run needs
#[derive(Clone)]
struct RunContext {
    state: Arc<Mutex<RunState>>,
    control: Arc<watch::Sender<ControlFlags>>,
    observer: Arc<dyn RunObserver>,
    probe: Arc<dyn LatencyProbe>,
    run_logger: RunLogger,
    probe_logger: ProbeLogger,
    run_id: Arc<str>,
}

/// Output of the preparation phase
struct Prepared {
    ranges: usize,
    skipped_lines: usize,
    read_error: Option<String>,
    sample: Sample,
}

impl Orchestrator {
    /// Orchestrator probing with real TCP connections
    pub fn new(observer: Arc<dyn RunObserver>) -> Self {
        Self::with_probe(observer, Arc::new(TcpConnectProbe::new()))
    }

    /// Orchestrator with a custom probe implementation
    pub fn with_probe(observer: Arc<dyn RunObserver>, probe: Arc<dyn LatencyProbe>) -> Self {
        let (control, _) = watch::channel(ControlFlags::default());
        Self {
            state: Arc::new(Mutex::new(RunState::default())),
            control: Arc::new(control),
            observer,
            probe,
            sampler: AddressSampler::default(),
            run_logger: RunLogger::quiet(),
            probe_logger: ProbeLogger::quiet(),
        }
    }

    /// Replace the default quiet loggers
    pub fn with_loggers(mut self, run_logger: RunLogger, probe_logger: ProbeLogger) -> Self {
        self.run_logger = run_logger;
        self.probe_logger = probe_logger;
        self
    }

    /// Start a run in the background and return immediately.
    ///
    /// Only valid while `Idle`, and only with at least one worker and a
    /// non-zero timeout. Must be called from within a Tokio runtime.
    pub async fn start(&self, config: RunConfig) -> Result<()> {
        config.validate()?;

        let mut state = self.state.lock().await;
        if state.phase != RunPhase::Idle {
            return Err(AppError::invalid_state(format!("cannot start a run while {}", state.phase)));
        }

        let run_id = Uuid::new_v4().to_string();
        *state = RunState::preparing(run_id.clone());
        self.control.send_replace(ControlFlags::default());
        drop(state);

        let ctx = RunContext {
            state: self.state.clone(),
            control: self.control.clone(),
            observer: self.observer.clone(),
            probe: self.probe.clone(),
            run_logger: self.run_logger.clone(),
            probe_logger: self.probe_logger.clone(),
            run_id: Arc::from(run_id),
        };

        tokio::spawn(run(ctx, self.sampler, config));
        Ok(())
    }

    /// Toggle pause; returns whether the run is now paused.
    ///
    /// Probes already admitted keep running; no new address is submitted
    /// until the next toggle or a stop.
    pub async fn pause(&self) -> Result<bool> {
        let mut state = self.state.lock().await;
        if !state.phase.accepts_pause() {
            return Err(AppError::invalid_state(format!("cannot pause while {}", state.phase)));
        }

        state.pause_requested = !state.pause_requested;
        state.phase = if state.pause_requested { RunPhase::Paused } else { RunPhase::Running };
        let paused = state.pause_requested;
        self.control.send_modify(|flags| flags.paused = paused);

        let (run_id, phase) = (state.run_id.clone(), state.phase);
        drop(state);

        let action = if paused { "pause" } else { "resume" };
        self.run_logger.log_control(&run_id, action, phase).await;
        Ok(paused)
    }

    /// Request cancellation: nothing new is admitted and in-flight probes drain.
    ///
    /// A no-op while `Idle` or already `Stopping`; an error once `Finished`.
    pub async fn stop(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        match state.phase {
            RunPhase::Idle | RunPhase::Stopping => return Ok(()),
            phase if !phase.accepts_stop() => {
                return Err(AppError::invalid_state(format!("cannot stop while {}", phase)));
            }
            _ => {}
        }

        state.cancel_requested = true;
        state.phase = RunPhase::Stopping;
        self.control.send_modify(|flags| flags.cancelled = true);

        let run_id = state.run_id.clone();
        drop(state);

        self.run_logger.log_control(&run_id, "stop", RunPhase::Stopping).await;
        Ok(())
    }

    pub async fn phase(&self) -> RunPhase {
        self.state.lock().await.phase
    }

    pub async fn is_paused(&self) -> bool {
        self.state.lock().await.pause_requested
    }

    /// Current counters and leaderboard
    pub async fn snapshot(&self) -> ProgressSnapshot {
        self.state.lock().await.snapshot()
    }

    /// Full sorted result list and counters
    pub async fn summary(&self) -> RunSummary {
        self.state.lock().await.summary()
    }
}

/// Body of the detached run task
async fn run(ctx: RunContext, sampler: AddressSampler, config: RunConfig) {
    ctx.run_logger.log_run_started(&ctx.run_id, &config).await;

    let prepared = prepare(sampler, &config).await;
    ctx.run_logger.log_preparation(
        &ctx.run_id,
        prepared.ranges,
        prepared.skipped_lines,
        prepared.read_error.as_deref(),
        prepared.sample.len(),
        prepared.sample.attempts,
    ).await;

    if prepared.sample.is_empty() {
        let detail = prepared.read_error.unwrap_or_else(|| {
            format!("{} contains no valid IPv4 CIDR ranges", config.source_path.display())
        });
        finish(&ctx, Some(RunError::no_addresses(detail))).await;
        return;
    }

    {
        let mut state = ctx.state.lock().await;
        state.begin(prepared.sample.len());
        if state.cancel_requested {
            drop(state);
            finish(&ctx, Some(RunError::Cancelled)).await;
            return;
        }
        state.phase = RunPhase::Running;
    }

    let outcome = dispatch(&ctx, &config, prepared.sample.addresses).await;
    finish(&ctx, outcome).await;
}

/// Load ranges and sample addresses on the blocking pool
async fn prepare(sampler: AddressSampler, config: &RunConfig) -> Prepared {
    let source = config.source_path.clone();
    let target = config.target_count;

    let task = tokio::task::spawn_blocking(move || {
        let report = ranges::load_with_report(&source);
        let sample = sampler.sample(&report.ranges, target, &mut rand::thread_rng());
        Prepared {
            ranges: report.ranges.len(),
            skipped_lines: report.blank_lines + report.invalid_lines,
            read_error: report.read_error,
            sample,
        }
    });

    match task.await {
        Ok(prepared) => prepared,
        Err(e) => Prepared {
            ranges: 0,
            skipped_lines: 0,
            read_error: Some(format!("preparation task failed: {}", e)),
            sample: Sample::default(),
        },
    }
}

/// Submit every address unless stopped, then drain admitted work
async fn dispatch(ctx: &RunContext, config: &RunConfig, addresses: Vec<Ipv4Addr>) -> Option<RunError> {
    let tokens = Arc::new(Semaphore::new(config.submission_tokens()));
    let workers = Arc::new(Semaphore::new(config.max_workers));
    let mut control = ctx.control.subscribe();
    let mut admitted = Vec::with_capacity(addresses.len());

    for address in addresses {
        let Some(token) = acquire_token(&tokens, &mut control).await else {
            break;
        };
        // Last check before submission so a pause takes effect immediately
        if !wait_while_paused(&mut control).await {
            break;
        }

        admitted.push(tokio::spawn(probe_address(
            ctx.clone(),
            workers.clone(),
            token,
            address,
            config.port,
            config.timeout(),
        )));
    }

    ctx.state.lock().await.phase = RunPhase::Stopping;

    let aborted = join_all(admitted)
        .await
        .into_iter()
        .filter(|joined| joined.is_err())
        .count();
    if aborted > 0 {
        ctx.run_logger.logger()
            .warn(&format!("{} probe tasks ended abnormally", aborted))
            .correlation_id(&ctx.run_id)
            .field("aborted", aborted)
            .log()
            .await;
    }

    tokens.close();
    workers.close();

    let cancelled = ctx.state.lock().await.cancel_requested;
    cancelled.then_some(RunError::Cancelled)
}

/// Wait for a submission token; `None` once cancellation is requested
async fn acquire_token(
    tokens: &Arc<Semaphore>,
    control: &mut watch::Receiver<ControlFlags>,
) -> Option<OwnedSemaphorePermit> {
    tokio::select! {
        permit = tokens.clone().acquire_owned() => permit.ok(),
        _ = control.wait_for(|flags| flags.cancelled) => None,
    }
}

/// Block while paused; returns false if the run was cancelled instead
async fn wait_while_paused(control: &mut watch::Receiver<ControlFlags>) -> bool {
    match control.wait_for(|flags| flags.cancelled || !flags.paused).await {
        Ok(flags) => !flags.cancelled,
        Err(_) => false,
    }
}

/// Run one probe on the worker pool and fold its outcome into the state
async fn probe_address(
    ctx: RunContext,
    workers: Arc<Semaphore>,
    token: OwnedSemaphorePermit,
    address: Ipv4Addr,
    port: u16,
    timeout: Duration,
) {
    let Ok(worker) = workers.acquire_owned().await else {
        return;
    };

    // Admitted but not started when the stop arrived
    let cancelled = ctx.control.borrow().cancelled;
    if cancelled {
        return;
    }

    let attempt = ctx.probe.attempt(address, port, timeout).await;
    drop(worker);

    ctx.probe_logger.log_attempt(&ctx.run_id, address, port, &attempt).await;

    let mut state = ctx.state.lock().await;
    if let Some(snapshot) = state.record(address, attempt.latency_ms()) {
        ctx.observer.on_progress(snapshot);
    }
    drop(state);

    // The token goes back only after the result is folded in
    drop(token);
}

/// Enter `Finished` and notify the observer exactly once
async fn finish(ctx: &RunContext, outcome: Option<RunError>) {
    let (tested, total, responsive, elapsed_ms) = {
        let mut state = ctx.state.lock().await;
        state.finish();
        (state.tested_count, state.total_count, state.results.len(), state.elapsed_ms())
    };

    ctx.run_logger.log_run_finished(&ctx.run_id, outcome.as_ref(), tested, total, responsive, elapsed_ms).await;
    ctx.observer.on_finish(outcome);
}
