//! Shared test helpers for creating BatchOrchestrator instances in tests.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

use crate::config::Config;
use crate::error::RemoteCallError;
use crate::orchestrator::BatchOrchestrator;
use crate::types::{Event, FileRef, Section};
use crate::uploader::{RemoteOutput, RemoteProcessor};

/// Remote processor with scripted failures that records how it was called
#[derive(Default)]
pub(crate) struct ScriptedProcessor {
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedProcessor {
    /// Processor that fails for the given file names and succeeds otherwise
    pub(crate) fn failing_for(names: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            failing: names.iter().map(|n| n.to_string()).collect(),
            ..Default::default()
        })
    }

    /// Processor that always succeeds
    pub(crate) fn succeeding() -> Arc<Self> {
        Self::failing_for(&[])
    }

    /// File names in call order
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Highest number of overlapping calls observed
    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteProcessor for ScriptedProcessor {
    async fn process(&self, file: &FileRef) -> Result<RemoteOutput, RemoteCallError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.calls.lock().unwrap().push(file.name.clone());

        // Give overlapping calls a chance to show up
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&file.name) {
            return Err(RemoteCallError::Status {
                status: 500,
                body: "scripted failure".to_string(),
            });
        }

        Ok(RemoteOutput {
            source_name: Some(file.name.clone()),
            sections: vec![Section {
                title: "BAB I".to_string(),
                summary: format!("summary of {}", file.name),
            }],
            artifacts: Vec::new(),
        })
    }
}

/// Helper to create a test orchestrator over a scripted processor
pub(crate) fn create_test_orchestrator(processor: Arc<ScriptedProcessor>) -> BatchOrchestrator {
    create_test_orchestrator_with_config(Config::default(), processor)
}

/// Helper to create a test orchestrator with a custom config
pub(crate) fn create_test_orchestrator_with_config(
    config: Config,
    processor: Arc<ScriptedProcessor>,
) -> BatchOrchestrator {
    BatchOrchestrator::with_processor(config, processor).expect("test config should be valid")
}

/// PDF-named FIFO whose reads block until a writer shows up
///
/// Call [`release_fifo`] once the test is done so the blocked reader can exit.
#[cfg(unix)]
pub(crate) fn fifo_pdf(dir: &std::path::Path, name: &str) -> FileRef {
    let path = dir.join(name);
    let status = std::process::Command::new("mkfifo")
        .arg(&path)
        .status()
        .expect("failed to run mkfifo");
    assert!(status.success(), "mkfifo failed for {}", path.display());

    FileRef {
        name: name.to_string(),
        size: 16,
        mime_type: "application/pdf".to_string(),
        source: crate::types::FileSource::Path(path),
    }
}

/// Open the FIFO's write end so a reader stuck in `open` can return
#[cfg(unix)]
pub(crate) fn release_fifo(file: &FileRef) {
    if let crate::types::FileSource::Path(path) = &file.source {
        let path = path.clone();
        // Join so the write end is opened before the caller drops the tempdir
        let _ = std::thread::spawn(move || {
            let _ = std::fs::OpenOptions::new().write(true).open(path);
        })
        .join();
    }
}

/// In-memory PDF file
pub(crate) fn pdf(name: &str) -> FileRef {
    FileRef::from_bytes(name, "application/pdf", format!("%PDF-1.4 {}", name).into_bytes())
}

/// Drain every event currently buffered on `rx`
pub(crate) fn drain_events(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Percentages from the BatchProgress events in `events`
pub(crate) fn progress_sequence(events: &[Event]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::BatchProgress { percent, .. } => Some(*percent),
            _ => None,
        })
        .collect()
}
