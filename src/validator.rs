//! Admission checks for candidate files.

use crate::config::ValidationConfig;
use crate::error::AdmissionError;
use crate::queue::QueueStore;
use crate::types::FileRef;

/// Decides whether a candidate file may enter the queue
#[derive(Clone, Debug)]
pub struct Validator {
    accepted_subtype: String,
    max_file_size: Option<u64>,
}

impl Validator {
    /// Create a validator from the admission policy
    pub fn new(config: &ValidationConfig) -> Self {
        Self {
            accepted_subtype: config.accepted_subtype.to_ascii_lowercase(),
            max_file_size: config.max_file_size,
        }
    }

    /// Validate `candidate` against the current queue contents
    ///
    /// Checks run in order and stop at the first failure:
    /// 1. MIME type carries the accepted subtype
    /// 2. Size within the configured maximum (if any)
    /// 3. Name not already queued
    pub fn validate(&self, candidate: &FileRef, queue: &QueueStore) -> Result<(), AdmissionError> {
        if !candidate
            .mime_type
            .to_ascii_lowercase()
            .contains(&self.accepted_subtype)
        {
            return Err(AdmissionError::InvalidType {
                name: candidate.name.clone(),
                mime_type: candidate.mime_type.clone(),
                accepted: self.accepted_subtype.to_ascii_uppercase(),
            });
        }

        if let Some(max) = self.max_file_size
            && candidate.size > max
        {
            return Err(AdmissionError::TooLarge {
                name: candidate.name.clone(),
                size: candidate.size,
                max,
            });
        }

        if queue.contains_name(&candidate.name) {
            return Err(AdmissionError::DuplicateName {
                name: candidate.name.clone(),
            });
        }

        Ok(())
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(&ValidationConfig::default())
    }
}
