//! Adding files to the queue and clearing it.

use tokio::sync::broadcast;

use crate::error::AdmissionError;
use crate::notifier::{NotificationCenter, Severity};
use crate::queue::QueueStore;
use crate::staging::{StagingError, stage_file};
use crate::types::{AddReport, Event, FileRef, ItemId, Status};

use super::BatchOrchestrator;

impl BatchOrchestrator {
    /// Validate and enqueue files (from a picker or a drop)
    ///
    /// Each file is checked against the queue as it stands at that moment, so
    /// two files with the same name in one call are caught as duplicates.
    /// Rejected files never enter the queue; each rejection is notified.
    /// Accepted files are staged before the next file is looked at.
    pub async fn add_files(&mut self, files: impl IntoIterator<Item = FileRef>) -> AddReport {
        let mut report = AddReport::default();

        for file in files {
            if let Err(reason) = self.validator.validate(&file, &self.queue) {
                tracing::info!(name = %file.name, reason = reason.code(), "File rejected");
                self.notifier
                    .notify(reason.to_string(), rejection_severity(&reason));
                self.emit(Event::Rejected {
                    name: file.name.clone(),
                    reason: reason.code().to_string(),
                });
                report.rejected.push(reason);
                continue;
            }

            let name = file.name.clone();
            let id = self.queue.add(file);
            tracing::info!(item_id = %id, name = %name, "File queued");
            self.emit(Event::Queued { id, name });
            self.emit(Event::StatusChanged {
                id,
                status: Status::Uploading,
            });

            self.stage(id).await;
            report.accepted.push(id);
        }

        if !report.accepted.is_empty() {
            self.notifier.notify(
                format!("Added {} file(s)", report.accepted.len()),
                Severity::Success,
            );
        }

        report
    }

    /// Remove every queued item
    ///
    /// Returns the number of items removed.
    pub fn clear(&mut self) -> usize {
        if self.queue.is_empty() {
            self.notifier.notify("No files to clear", Severity::Info);
            return 0;
        }

        let count = self.queue.clear();
        tracing::info!(count, "Queue cleared");
        self.emit(Event::Cleared { count });
        self.notifier
            .notify("All files cleared", Severity::Success);
        count
    }

    // Run the readiness check for a freshly queued item and move it to its
    // terminal state.
    async fn stage(&mut self, id: ItemId) {
        let Some(file) = self.queue.get(id).map(|item| item.file.clone()) else {
            return;
        };

        let chunk_size = self.config.staging.chunk_size;
        let timeout = self.config.staging.timeout;

        let mut guard = StagingGuard {
            queue: &mut self.queue,
            event_tx: &self.event_tx,
            notifier: &self.notifier,
            id,
            name: &file.name,
            armed: true,
        };
        let staging = stage_file(&file, chunk_size, |percent| guard.progress(percent));
        let outcome = match timeout {
            Some(after) => tokio::time::timeout(after, staging)
                .await
                .unwrap_or_else(|_| {
                    Err(StagingError::TimedOut {
                        name: file.name.clone(),
                        after,
                    })
                }),
            None => staging.await,
        };
        guard.disarm();

        match outcome {
            Ok(()) => {
                self.queue.update_status(id, Status::Completed);
                self.emit(Event::StatusChanged {
                    id,
                    status: Status::Completed,
                });
                self.notifier
                    .notify(format!("\"{}\" uploaded", file.name), Severity::Success);
            }
            Err(e) => {
                tracing::warn!(item_id = %id, error = %e, "Staging failed");
                self.queue.update_status(id, Status::Errored);
                self.emit(Event::StatusChanged {
                    id,
                    status: Status::Errored,
                });
                self.notifier.notify(
                    format!("Failed to upload \"{}\": {}", file.name, e),
                    Severity::Error,
                );
            }
        }
    }
}

// Owns the item for the duration of its staging. If staging never reaches an
// outcome (the `add_files` future was dropped mid-read), the item is moved to
// `Errored` so it cannot block batch processing.
struct StagingGuard<'a> {
    queue: &'a mut QueueStore,
    event_tx: &'a broadcast::Sender<Event>,
    notifier: &'a NotificationCenter,
    id: ItemId,
    name: &'a str,
    armed: bool,
}

impl StagingGuard<'_> {
    fn progress(&mut self, percent: f32) {
        if self.queue.update_progress(self.id, percent) {
            self.event_tx
                .send(Event::StagingProgress {
                    id: self.id,
                    percent,
                })
                .ok();
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for StagingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed || !self.queue.update_status(self.id, Status::Errored) {
            return;
        }

        tracing::warn!(item_id = %self.id, name = %self.name, "Staging abandoned, marking item errored");
        self.event_tx
            .send(Event::StatusChanged {
                id: self.id,
                status: Status::Errored,
            })
            .ok();
        self.notifier.notify(
            format!("Failed to upload \"{}\": staging interrupted", self.name),
            Severity::Error,
        );
    }
}

fn rejection_severity(reason: &AdmissionError) -> Severity {
    match reason {
        AdmissionError::InvalidType { .. } | AdmissionError::TooLarge { .. } => Severity::Error,
        AdmissionError::DuplicateName { .. } => Severity::Warning,
    }
}
