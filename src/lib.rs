//! # docsum-batch
//!
//! Batch upload and processing pipeline for document summarization.
//!
//! ## Design Philosophy
//!
//! docsum-batch is designed to be:
//! - **Library-first** - The queue, validation and batch loop are plain Rust types a UI drives
//! - **Sensible defaults** - PDF-only admission with a 10 MB cap, talking to a local service
//! - **Degrade, don't abort** - A failing document yields a degraded result, never a failed batch
//! - **Event-driven** - Consumers subscribe to events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use docsum_batch::{BatchOrchestrator, Config, FileRef};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut orchestrator = BatchOrchestrator::new(Config::default())?;
//!
//!     // Subscribe to events
//!     let mut events = orchestrator.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let file = FileRef::from_path("thesis.pdf").await?;
//!     orchestrator.add_files([file]).await;
//!
//!     let summary = orchestrator.process().await?;
//!     println!("{} processed, {} degraded", summary.total, summary.degraded);
//!
//!     if let Some(results) = orchestrator.results().take() {
//!         for result in results {
//!             println!("{}: {} section(s)", result.source_name, result.sections.len());
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Result handoff to the next stage
pub mod handoff;
/// Transient user-facing notifications
pub mod notifier;
/// Batch orchestrator (decomposed into focused submodules)
pub mod orchestrator;
/// Ordered queue of items and their lifecycle
pub mod queue;
/// Retry logic with exponential backoff
pub mod retry;
/// Local readiness check for admitted files
pub mod staging;
/// Core types and events
pub mod types;
/// Remote processing client and per-item runner
pub mod uploader;
/// Utility functions
pub mod utils;
/// Admission checks
pub mod validator;
/// Display projection of the queue
pub mod view;

// Re-export commonly used types
pub use config::{
    Config, NotificationConfig, RemoteConfig, RetryConfig, StagingConfig, ValidationConfig,
};
pub use error::{AdmissionError, Error, PreconditionError, RemoteCallError, Result};
pub use handoff::ResultSlot;
pub use notifier::{Notification, NotificationCenter, Severity};
pub use orchestrator::BatchOrchestrator;
pub use queue::QueueStore;
pub use types::{
    AddReport, ArtifactKind, ArtifactRef, BatchSummary, Event, FileRef, FileSource, ItemId,
    ProcessingResult, QueueItem, RemoteState, Section, Status,
};
pub use uploader::{HttpProcessor, RemoteOutput, RemoteProcessor, UploadTaskRunner};
pub use validator::Validator;
pub use view::{ItemRow, ProcessButton, TriggerState, ViewModel};
