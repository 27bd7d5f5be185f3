//! Batch orchestrator split into focused submodules.
//!
//! The `BatchOrchestrator` struct and its methods are organized by concern:
//! - [`admission`] - Adding files (validation and local staging) and clearing the queue
//! - [`batch`] - The sequential remote processing loop and result handoff

mod admission;
mod batch;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

use crate::config::Config;
use crate::error::Result;
use crate::handoff::ResultSlot;
use crate::notifier::NotificationCenter;
use crate::queue::QueueStore;
use crate::types::Event;
use crate::uploader::{HttpProcessor, RemoteProcessor, UploadTaskRunner};
use crate::validator::Validator;
use crate::view::{self, TriggerState, ViewModel};

/// Drives queued documents through admission, remote processing and handoff
///
/// All commands take `&mut self`, so a second batch run cannot start while
/// one is in progress and the queue is never mutated concurrently.
pub struct BatchOrchestrator {
    /// Configuration (shared with helpers)
    pub(crate) config: Arc<Config>,
    /// Ordered queue of items
    pub(crate) queue: QueueStore,
    /// Admission policy
    pub(crate) validator: Validator,
    /// Per-item remote processing
    pub(crate) runner: UploadTaskRunner,
    /// User-facing notifications
    pub(crate) notifier: NotificationCenter,
    /// Where each run's results are handed off
    pub(crate) handoff: ResultSlot,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<Event>,
    /// Set while a batch run is in progress
    pub(crate) running: Arc<AtomicBool>,
}

impl BatchOrchestrator {
    /// Create an orchestrator talking to the configured HTTP endpoint
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let processor = HttpProcessor::new(&config.remote)?;
        Self::with_processor(config, Arc::new(processor))
    }

    /// Create an orchestrator over any remote processor
    ///
    /// The configuration is validated first. The notification center is
    /// started immediately.
    pub fn with_processor(config: Config, processor: Arc<dyn RemoteProcessor>) -> Result<Self> {
        config.validate()?;

        let (event_tx, _rx) = broadcast::channel(config.event_capacity.max(1));

        let notifier =
            NotificationCenter::new(&config.notifications).with_events(event_tx.clone());
        notifier.start();

        let runner = UploadTaskRunner::new(processor, config.retry.clone(), notifier.clone());

        Ok(Self {
            validator: Validator::new(&config.validation),
            config: Arc::new(config),
            queue: QueueStore::new(),
            runner,
            notifier,
            handoff: ResultSlot::default(),
            event_tx,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Hand results off through `slot` instead of a private one
    pub fn with_handoff(mut self, slot: ResultSlot) -> Self {
        self.handoff = slot;
        self
    }

    /// Subscribe to orchestrator events
    ///
    /// The channel is lossy: slow subscribers may miss events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Notification center used for user-facing messages
    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifier
    }

    /// Handle to the result handoff slot
    pub fn results(&self) -> ResultSlot {
        self.handoff.clone()
    }

    /// Current queue contents
    pub fn queue(&self) -> &QueueStore {
        &self.queue
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether a batch run is in progress
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Project the current queue for display
    pub fn view(&self) -> ViewModel {
        let trigger = if self.is_running() {
            TriggerState::Running
        } else {
            TriggerState::Idle
        };
        view::render(self.queue.items(), trigger)
    }

    /// Stop the notification center; the queue is left as is
    pub fn shutdown(&self) {
        tracing::info!("Shutting down batch orchestrator");
        self.notifier.shutdown();
    }

    pub(crate) fn emit(&self, event: Event) {
        // No subscribers is fine
        self.event_tx.send(event).ok();
    }
}

impl std::fmt::Debug for BatchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchOrchestrator")
            .field("queue_len", &self.queue.len())
            .field("running", &self.is_running())
            .field("handoff_key", &self.handoff.key())
            .finish_non_exhaustive()
    }
}
