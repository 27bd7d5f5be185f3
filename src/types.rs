//! Core types for docsum-batch

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::notifier::Severity;

/// Unique identifier for a queued item
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl ItemId {
    /// Create a new ItemId
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner u64 value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a file's bytes live
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileSource {
    /// Payload already in memory
    Memory(Bytes),
    /// Payload read from disk when needed
    Path(PathBuf),
}

/// Handle to a document payload and its metadata
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRef {
    /// File name as shown to the user and sent to the endpoint
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// MIME type (e.g., "application/pdf")
    pub mime_type: String,
    /// Payload location
    pub source: FileSource,
}

impl FileRef {
    /// Create a file handle over an in-memory payload
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            mime_type: mime_type.into(),
            source: FileSource::Memory(bytes),
        }
    }

    /// Create a file handle for a file on disk
    ///
    /// Reads the file's metadata; the MIME type is guessed from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("'{}' is not a regular file", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            name,
            size: metadata.len(),
            mime_type: crate::utils::guess_mime(path),
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    /// Load the full payload
    pub async fn read_bytes(&self) -> std::io::Result<Bytes> {
        match &self.source {
            FileSource::Memory(bytes) => Ok(bytes.clone()),
            FileSource::Path(path) => Ok(Bytes::from(tokio::fs::read(path).await?)),
        }
    }
}

/// Item status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Admitted, not yet staging
    Queued,
    /// Local staging in progress
    Uploading,
    /// Staged and ready for remote processing
    Completed,
    /// Staging failed
    Errored,
}

impl Status {
    /// True for `Completed` and `Errored`
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Completed | Status::Errored)
    }

    /// Position in the lifecycle (terminal states share the last rank)
    fn rank(&self) -> u8 {
        match self {
            Status::Queued => 0,
            Status::Uploading => 1,
            Status::Completed | Status::Errored => 2,
        }
    }

    /// Whether `next` is the following step of the lifecycle
    ///
    /// Items move `Queued` -> `Uploading` -> `Completed` | `Errored`, one step
    /// at a time and never out of a terminal state.
    pub fn can_transition_to(&self, next: Status) -> bool {
        !self.is_terminal() && next.rank() == self.rank() + 1
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Status::Queued => "queued",
            Status::Uploading => "uploading",
            Status::Completed => "completed",
            Status::Errored => "errored",
        };
        f.write_str(s)
    }
}

/// Outcome of remote processing as displayed for an item
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteState {
    /// Not yet processed in a batch run
    #[default]
    Pending,
    /// Processed normally
    Processed,
    /// Processing failed or was skipped; a degraded result was produced
    Degraded,
}

/// An item held by the queue store
#[derive(Clone, Debug)]
pub struct QueueItem {
    /// Store-assigned identifier
    pub id: ItemId,
    /// Underlying document
    pub file: FileRef,
    /// Lifecycle status
    pub status: Status,
    /// Staging progress percentage (0.0 to 100.0)
    pub progress: f32,
    /// Remote processing outcome from the latest batch run
    pub remote: RemoteState,
    /// When the item was admitted
    pub added_at: DateTime<Utc>,
}

/// One summarized section of a processed document
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Section heading (e.g., a chapter title)
    pub title: String,
    /// Section summary, empty when the service had nothing to summarize
    pub summary: String,
}

/// Kind of downloadable artifact
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Rendered PDF summary
    Pdf,
    /// Word document export
    Docx,
}

/// Locator of a downloadable artifact
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// Artifact kind
    pub kind: ArtifactKind,
    /// Absolute download URL
    pub url: Url,
}

/// Result of processing one item in a batch run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingResult {
    /// Name reported by the service, or the local file name
    pub source_name: String,
    /// Ordered section summaries (possibly empty)
    pub sections: Vec<Section>,
    /// Downloadable artifacts (empty on failure)
    pub artifacts: Vec<ArtifactRef>,
    /// True when produced by the failure path
    pub degraded: bool,
    /// Failure reason for degraded results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessingResult {
    /// Build the degraded result for a file whose processing failed
    pub fn degraded(file_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            source_name: file_name.into(),
            sections: Vec::new(),
            artifacts: Vec::new(),
            degraded: true,
            error: Some(reason.into()),
        }
    }

    /// Find an artifact by kind
    pub fn artifact(&self, kind: ArtifactKind) -> Option<&ArtifactRef> {
        self.artifacts.iter().find(|a| a.kind == kind)
    }
}

/// Summary returned by a completed batch run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Number of results handed off (equals the queue length)
    pub total: usize,
    /// Number of degraded results
    pub degraded: usize,
    /// Key of the slot the results were written to
    pub handoff_key: String,
}

/// Outcome of an `add_files` command
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AddReport {
    /// Items admitted to the queue, in order
    pub accepted: Vec<ItemId>,
    /// Rejections, in input order
    pub rejected: Vec<crate::error::AdmissionError>,
}

/// Event emitted by the orchestrator
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// File admitted to the queue
    Queued {
        /// Item ID
        id: ItemId,
        /// File name
        name: String,
    },

    /// File refused at admission
    Rejected {
        /// File name
        name: String,
        /// Machine-readable reason ("invalid_type", "too_large", "duplicate_name")
        reason: String,
    },

    /// Local staging progress
    StagingProgress {
        /// Item ID
        id: ItemId,
        /// Progress percentage (0.0 to 100.0)
        percent: f32,
    },

    /// Item status changed
    StatusChanged {
        /// Item ID
        id: ItemId,
        /// New status
        status: Status,
    },

    /// Queue cleared
    Cleared {
        /// Number of items removed
        count: usize,
    },

    /// Batch run started
    BatchStarted {
        /// Number of items in the run
        total: usize,
    },

    /// One item finished remote processing
    ItemProcessed {
        /// Item ID
        id: ItemId,
        /// Remote outcome
        remote: RemoteState,
    },

    /// Aggregate batch progress
    BatchProgress {
        /// Items processed so far
        processed: usize,
        /// Items in the run
        total: usize,
        /// round(processed / total * 100)
        percent: u8,
    },

    /// Batch run finished and results were handed off
    BatchDone {
        /// Items in the run
        total: usize,
        /// Degraded results
        degraded: usize,
    },

    /// A notification became visible
    Notification {
        /// Notification sequence number
        seq: u64,
        /// Message text
        message: String,
        /// Severity
        severity: Severity,
    },

    /// A notification expired without being superseded
    NotificationExpired {
        /// Notification sequence number
        seq: u64,
    },
}
