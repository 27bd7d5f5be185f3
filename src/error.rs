//! Error types for docsum-batch
//!
//! This module provides the error taxonomy for the library:
//! - Admission rejections ([`AdmissionError`]) raised while validating candidate files
//! - Remote call failures ([`RemoteCallError`]) caught inside the upload task runner
//! - Batch precondition violations ([`PreconditionError`])
//!
//! None of these are fatal. Admission and precondition errors leave the queue
//! untouched, and remote call failures are downgraded to degraded results.

use thiserror::Error;

/// Result type alias for docsum-batch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for docsum-batch
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "remote.base_url")
        key: Option<String>,
    },

    /// Candidate file was rejected at admission
    #[error("admission rejected: {0}")]
    Admission(#[from] AdmissionError),

    /// Batch processing was requested while its preconditions did not hold
    #[error("cannot process batch: {0}")]
    Precondition(#[from] PreconditionError),

    /// Remote processing call failed
    #[error("remote call failed: {0}")]
    Remote(#[from] RemoteCallError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid URL
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Admission(e) => e.code(),
            Error::Precondition(PreconditionError::EmptyQueue) => "empty_queue",
            Error::Precondition(PreconditionError::UploadsPending { .. }) => "uploads_pending",
            Error::Remote(_) => "remote_call_failure",
            Error::Io(_) => "io_error",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::InvalidUrl(_) => "invalid_url",
        }
    }
}

/// Reasons a candidate file is refused entry into the queue
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    /// MIME type does not match the accepted document type
    #[error("\"{name}\" has type \"{mime_type}\", only {accepted} files are allowed")]
    InvalidType {
        /// Candidate file name
        name: String,
        /// The candidate's MIME type
        mime_type: String,
        /// The accepted document subtype (e.g., "pdf")
        accepted: String,
    },

    /// File exceeds the configured size limit
    #[error("\"{name}\" is too large ({size} bytes, maximum {max} bytes)")]
    TooLarge {
        /// Candidate file name
        name: String,
        /// Candidate size in bytes
        size: u64,
        /// Configured maximum in bytes
        max: u64,
    },

    /// A file with the same name is already queued
    #[error("\"{name}\" is already in the queue")]
    DuplicateName {
        /// Candidate file name
        name: String,
    },
}

impl AdmissionError {
    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            AdmissionError::InvalidType { .. } => "invalid_type",
            AdmissionError::TooLarge { .. } => "too_large",
            AdmissionError::DuplicateName { .. } => "duplicate_name",
        }
    }

    /// Name of the rejected file
    pub fn file_name(&self) -> &str {
        match self {
            AdmissionError::InvalidType { name, .. }
            | AdmissionError::TooLarge { name, .. }
            | AdmissionError::DuplicateName { name } => name,
        }
    }
}

/// Batch processing preconditions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    /// Nothing is queued
    #[error("no files to process")]
    EmptyQueue,

    /// At least one item is still being staged
    #[error("{pending} file(s) still uploading")]
    UploadsPending {
        /// Number of items not yet in a terminal state
        pending: usize,
    },
}

/// Failures of a single remote processing call
#[derive(Debug, Error)]
pub enum RemoteCallError {
    /// Connection or transport-level failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request did not complete within the configured timeout
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The endpoint answered with a non-success status
    #[error("endpoint returned status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body (may be empty)
        body: String,
    },

    /// The response body could not be decoded
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The endpoint answered but reported that processing failed
    #[error("service reported failure")]
    Unsuccessful,

    /// Reading the payload from disk failed
    #[error("failed to read payload: {0}")]
    Io(#[from] std::io::Error),
}
