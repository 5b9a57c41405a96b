//! Observer contract between the orchestrator and whatever presents a run

use crate::error::RunError;
use crate::models::ProgressSnapshot;
use tokio::sync::mpsc;

/// Receives progress and completion events from a run.
///
/// Callbacks run on the orchestrator's background tasks while the run state
/// is locked, so implementations must return quickly and must not call back
/// into the orchestrator.
pub trait RunObserver: Send + Sync {
    /// Called after every completed probe
    fn on_progress(&self, snapshot: ProgressSnapshot);

    /// Called exactly once per run; `None` means natural completion
    fn on_finish(&self, error: Option<RunError>);
}

/// Event forwarded by `ChannelObserver`
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    Progress(ProgressSnapshot),
    Finished(Option<RunError>),
}

impl RunEvent {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished(_))
    }
}

/// Observer that forwards every event into an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: mpsc::UnboundedSender<RunEvent>,
}

impl ChannelObserver {
    /// Create the observer and the receiving end of its channel
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RunEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl RunObserver for ChannelObserver {
    fn on_progress(&self, snapshot: ProgressSnapshot) {
        // A dropped receiver only means nobody is watching
        let _ = self.sender.send(RunEvent::Progress(snapshot));
    }

    fn on_finish(&self, error: Option<RunError>) {
        let _ = self.sender.send(RunEvent::Finished(error));
    }
}
