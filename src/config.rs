//! Configuration types for docsum-batch

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Admission policy for candidate files
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// MIME subtype a file must carry to be accepted (default: "pdf")
    ///
    /// Matched case-insensitively as a substring of the candidate's MIME type,
    /// so both `application/pdf` and `application/x-pdf` pass.
    #[serde(default = "default_accepted_subtype")]
    pub accepted_subtype: String,

    /// Maximum file size in bytes (default: 10 MiB, None = unlimited)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: Option<u64>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            accepted_subtype: default_accepted_subtype(),
            max_file_size: default_max_file_size(),
        }
    }
}

/// Remote processing endpoint
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the processing service (default: "http://localhost:8000")
    ///
    /// Artifact paths returned by the service are resolved against this URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Upload path appended to the base URL (default: "/api/upload")
    #[serde(default = "default_upload_path")]
    pub upload_path: String,

    /// Multipart form field carrying the document (default: "file")
    #[serde(default = "default_file_field")]
    pub file_field: String,

    /// Per-request timeout (None = wait indefinitely)
    #[serde(default, with = "optional_duration_serde")]
    pub timeout: Option<Duration>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            upload_path: default_upload_path(),
            file_field: default_file_field(),
            timeout: None,
        }
    }
}

/// Notification center settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// How long a notification stays visible unless superseded (default: 3 seconds)
    #[serde(default = "default_notification_ttl", with = "duration_serde")]
    pub ttl: Duration,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            ttl: default_notification_ttl(),
        }
    }
}

/// Local staging (readiness check) settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Read size used when staging path-backed files (default: 64 KiB)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Longest a single file may take to stage before it is marked errored
    /// (default: 60 seconds, None = wait indefinitely)
    #[serde(default = "default_staging_timeout", with = "optional_duration_serde")]
    pub timeout: Option<Duration>,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            timeout: default_staging_timeout(),
        }
    }
}

/// Retry configuration for transient remote failures
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 0, a single attempt per item)
    #[serde(default)]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 60 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 0,
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

/// Main configuration for [`BatchOrchestrator`](crate::BatchOrchestrator)
///
/// Fields are organized into sub-configs:
/// - [`validation`](ValidationConfig) — admission policy
/// - [`remote`](RemoteConfig) — processing endpoint
/// - [`notifications`](NotificationConfig) — notification lifetime
/// - [`staging`](StagingConfig) — local readiness check
/// - [`retry`](RetryConfig) — remote call retries
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Admission policy
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Remote processing endpoint
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Notification settings
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Local staging settings
    #[serde(default)]
    pub staging: StagingConfig,

    /// Retry settings for remote calls
    #[serde(default)]
    pub retry: RetryConfig,

    /// Event channel buffer size (default: 1000)
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            validation: ValidationConfig::default(),
            remote: RemoteConfig::default(),
            notifications: NotificationConfig::default(),
            staging: StagingConfig::default(),
            retry: RetryConfig::default(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file and validate it
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config '{}': {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that serde cannot enforce
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.remote.base_url).map_err(|e| Error::Config {
            message: format!("invalid base URL '{}': {}", self.remote.base_url, e),
            key: Some("remote.base_url".to_string()),
        })?;

        if !self.remote.upload_path.starts_with('/') {
            return Err(Error::Config {
                message: format!(
                    "upload path '{}' must start with '/'",
                    self.remote.upload_path
                ),
                key: Some("remote.upload_path".to_string()),
            });
        }

        if self.validation.accepted_subtype.trim().is_empty() {
            return Err(Error::Config {
                message: "accepted subtype must not be empty".to_string(),
                key: Some("validation.accepted_subtype".to_string()),
            });
        }

        if self.notifications.ttl.is_zero() {
            return Err(Error::Config {
                message: "notification ttl must be greater than zero".to_string(),
                key: Some("notifications.ttl".to_string()),
            });
        }

        if self.staging.chunk_size == 0 {
            return Err(Error::Config {
                message: "staging chunk size must be greater than zero".to_string(),
                key: Some("staging.chunk_size".to_string()),
            });
        }

        if self.staging.timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::Config {
                message: "staging timeout must be greater than zero".to_string(),
                key: Some("staging.timeout".to_string()),
            });
        }

        if self.event_capacity == 0 {
            return Err(Error::Config {
                message: "event capacity must be greater than zero".to_string(),
                key: Some("event_capacity".to_string()),
            });
        }

        Ok(())
    }
}

fn default_accepted_subtype() -> String {
    "pdf".to_string()
}

fn default_max_file_size() -> Option<u64> {
    Some(10 * 1024 * 1024)
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_upload_path() -> String {
    "/api/upload".to_string()
}

fn default_file_field() -> String {
    "file".to_string()
}

fn default_notification_ttl() -> Duration {
    Duration::from_secs(3)
}

fn default_chunk_size() -> usize {
    64 * 1024
}

fn default_staging_timeout() -> Option<Duration> {
    Some(Duration::from_secs(60))
}

fn default_true() -> bool {
    true
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_event_capacity() -> usize {
    1000
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
