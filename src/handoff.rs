//! Single-use handoff of batch results to the next stage.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::Result;
use crate::types::ProcessingResult;

/// Short-lived slot holding one batch run's results until read
///
/// The orchestrator writes the complete ordered list once per run; the
/// receiving stage takes it exactly once, after which the slot is empty.
/// Clones share the same slot.
#[derive(Clone, Debug)]
pub struct ResultSlot {
    key: String,
    results: Arc<Mutex<Option<Vec<ProcessingResult>>>>,
}

impl Default for ResultSlot {
    fn default() -> Self {
        Self::new(Self::DEFAULT_KEY)
    }
}

impl ResultSlot {
    /// Key used when none is given
    pub const DEFAULT_KEY: &'static str = "processing_results";

    /// Create an empty slot
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            results: Arc::new(Mutex::new(None)),
        }
    }

    /// Slot key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Store a run's results, replacing any that were never read
    pub fn put(&self, results: Vec<ProcessingResult>) {
        let replaced = self.lock().replace(results);
        if let Some(old) = replaced {
            tracing::warn!(
                key = %self.key,
                unread = old.len(),
                "Replacing unread batch results"
            );
        }
    }

    /// Take the results, leaving the slot empty
    pub fn take(&self) -> Option<Vec<ProcessingResult>> {
        self.lock().take()
    }

    /// Take the results as a JSON array
    pub fn take_json(&self) -> Result<Option<String>> {
        match self.take() {
            Some(results) => Ok(Some(serde_json::to_string(&results)?)),
            None => Ok(None),
        }
    }

    /// Whether unread results are waiting
    pub fn is_occupied(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Vec<ProcessingResult>>> {
        self.results.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
