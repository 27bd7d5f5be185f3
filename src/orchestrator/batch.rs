//! Sequential batch processing loop and result handoff.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{PreconditionError, Result};
use crate::notifier::Severity;
use crate::types::{BatchSummary, Event, ProcessingResult, RemoteState, Status};

use super::BatchOrchestrator;

/// Reason recorded for items that never reached remote processing
pub(crate) const SKIPPED_REASON: &str = "skipped: local staging failed";

// Keeps the trigger disabled for the lifetime of a run and re-enables it on
// every exit path, including the run's future being dropped.
struct RunGuard(Arc<AtomicBool>);

impl RunGuard {
    fn engage(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(Arc::clone(flag))
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// round(processed / total * 100)
pub(crate) fn overall_progress(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((processed as f64 / total as f64) * 100.0).round() as u8
}

impl BatchOrchestrator {
    /// Process every queued item, one remote call at a time
    ///
    /// Refused (with a warning notification and no state change) when the
    /// queue is empty or an item is still staging. Otherwise items are visited
    /// in queue order: `Completed` items are sent to the remote processor,
    /// `Errored` items are skipped but still yield a degraded result, so the
    /// handed-off list always has one entry per queued item. Aggregate progress
    /// is published after every item. The complete list is written to the
    /// handoff slot in a single step at the end.
    pub async fn process(&mut self) -> Result<BatchSummary> {
        if self.queue.is_empty() {
            self.notifier.notify("No files to process", Severity::Warning);
            return Err(PreconditionError::EmptyQueue.into());
        }

        if !self.queue.all_terminal() {
            let pending = self.queue.pending();
            self.notifier.notify(
                format!("Wait until {} file(s) finish uploading", pending),
                Severity::Warning,
            );
            return Err(PreconditionError::UploadsPending { pending }.into());
        }

        let _guard = RunGuard::engage(&self.running);

        let items: Vec<_> = self
            .queue
            .items()
            .iter()
            .map(|item| (item.id, item.status, item.file.clone()))
            .collect();
        let total = items.len();

        tracing::info!(total, "Starting batch run");
        self.emit(Event::BatchStarted { total });
        self.notifier
            .notify(format!("Processing {} file(s)...", total), Severity::Info);

        let mut results: Vec<ProcessingResult> = Vec::with_capacity(total);
        let mut degraded = 0;

        for (index, (id, status, file)) in items.into_iter().enumerate() {
            let result = if status == Status::Completed {
                self.runner.run(&file).await
            } else {
                tracing::info!(item_id = %id, name = %file.name, "Skipping item that failed staging");
                ProcessingResult::degraded(file.name.clone(), SKIPPED_REASON)
            };

            let remote = if result.degraded {
                degraded += 1;
                RemoteState::Degraded
            } else {
                RemoteState::Processed
            };
            self.queue.set_remote(id, remote);
            results.push(result);

            let processed = index + 1;
            let percent = overall_progress(processed, total);
            tracing::debug!(item_id = %id, processed, total, percent, "Batch progress");
            self.emit(Event::ItemProcessed { id, remote });
            self.emit(Event::BatchProgress {
                processed,
                total,
                percent,
            });
        }

        self.handoff.put(results);

        tracing::info!(total, degraded, "Batch run complete, results handed off");
        self.emit(Event::BatchDone { total, degraded });
        if degraded == 0 {
            self.notifier
                .notify(format!("Processed {} file(s)", total), Severity::Success);
        } else {
            self.notifier.notify(
                format!("Processed {} file(s), {} failed", total, degraded),
                Severity::Warning,
            );
        }

        Ok(BatchSummary {
            total,
            degraded,
            handoff_key: self.handoff.key().to_string(),
        })
    }
}
