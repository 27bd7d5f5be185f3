//! Upload task runner: one remote processing call per item.
//!
//! [`RemoteProcessor`] is the seam to the processing service; [`HttpProcessor`]
//! is the production implementation posting the document as multipart form
//! data. [`UploadTaskRunner`] wraps a processor and never fails: transport or
//! server errors become degraded [`ProcessingResult`]s so a batch run always
//! reaches its end.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::config::{RemoteConfig, RetryConfig};
use crate::error::{RemoteCallError, Result};
use crate::notifier::{NotificationCenter, Severity};
use crate::retry::with_retry;
use crate::types::{ArtifactKind, ArtifactRef, FileRef, ProcessingResult, Section};

/// Successful output of one remote call
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemoteOutput {
    /// File name echoed or inferred by the service
    pub source_name: Option<String>,
    /// Ordered section summaries
    pub sections: Vec<Section>,
    /// Downloadable artifacts with absolute URLs
    pub artifacts: Vec<ArtifactRef>,
}

/// A service that processes one document per call
#[async_trait]
pub trait RemoteProcessor: Send + Sync {
    /// Send `file` for processing and wait for the outcome
    async fn process(&self, file: &FileRef) -> std::result::Result<RemoteOutput, RemoteCallError>;
}

// Response body of the upload endpoint. The service names section fields
// either in English or with its native keys, so both are accepted.
#[derive(Debug, Default, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    sections: Vec<WireSection>,
    #[serde(default)]
    download_pdf: Option<String>,
    #[serde(default)]
    download_docx: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireSection {
    #[serde(default, alias = "judul")]
    title: String,
    #[serde(default, alias = "ringkasan_bab")]
    summary: Option<String>,
}

/// Processing service reached over HTTP
#[derive(Clone, Debug)]
pub struct HttpProcessor {
    client: reqwest::Client,
    base_url: Url,
    upload_url: Url,
    file_field: String,
    timeout: Option<Duration>,
}

impl HttpProcessor {
    /// Build a processor for the configured endpoint
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        let upload_url = base_url.join(&config.upload_path)?;
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            base_url,
            upload_url,
            file_field: config.file_field.clone(),
            timeout: config.timeout,
        })
    }

    /// Endpoint documents are posted to
    pub fn upload_url(&self) -> &Url {
        &self.upload_url
    }

    fn resolve_artifact(&self, kind: ArtifactKind, location: &str) -> Option<ArtifactRef> {
        match self.base_url.join(location) {
            Ok(url) => Some(ArtifactRef { kind, url }),
            Err(e) => {
                tracing::warn!(location = %location, error = %e, "Ignoring unresolvable artifact link");
                None
            }
        }
    }

    fn decode(&self, body: &str) -> std::result::Result<RemoteOutput, RemoteCallError> {
        let response: UploadResponse =
            serde_json::from_str(body).map_err(|e| RemoteCallError::Decode(e.to_string()))?;

        if response.success == Some(false) {
            return Err(RemoteCallError::Unsuccessful);
        }

        let mut artifacts = Vec::new();
        if let Some(location) = response.download_pdf.as_deref() {
            artifacts.extend(self.resolve_artifact(ArtifactKind::Pdf, location));
        }
        if let Some(location) = response.download_docx.as_deref() {
            artifacts.extend(self.resolve_artifact(ArtifactKind::Docx, location));
        }

        Ok(RemoteOutput {
            source_name: response.file,
            sections: response
                .sections
                .into_iter()
                .map(|s| Section {
                    title: s.title,
                    summary: s.summary.unwrap_or_default(),
                })
                .collect(),
            artifacts,
        })
    }
}

#[async_trait]
impl RemoteProcessor for HttpProcessor {
    async fn process(&self, file: &FileRef) -> std::result::Result<RemoteOutput, RemoteCallError> {
        let payload = file.read_bytes().await?;
        let part = reqwest::multipart::Part::bytes(payload.to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)?;
        let form = reqwest::multipart::Form::new().part(self.file_field.clone(), part);

        let request = self.client.post(self.upload_url.clone()).multipart(form).send();
        let response = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, request)
                .await
                .map_err(|_| RemoteCallError::Timeout(timeout))??,
            None => request.await?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteCallError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.text().await?;
        self.decode(&body)
    }
}

/// Runs remote processing for single items, isolating failures
#[derive(Clone)]
pub struct UploadTaskRunner {
    processor: Arc<dyn RemoteProcessor>,
    retry: RetryConfig,
    notifier: NotificationCenter,
}

impl UploadTaskRunner {
    /// Create a runner over `processor`
    pub fn new(
        processor: Arc<dyn RemoteProcessor>,
        retry: RetryConfig,
        notifier: NotificationCenter,
    ) -> Self {
        Self {
            processor,
            retry,
            notifier,
        }
    }

    /// Process one file; always resolves
    ///
    /// Failures are logged, notified and converted into a degraded result
    /// carrying the local file name.
    pub async fn run(&self, file: &FileRef) -> ProcessingResult {
        self.notifier
            .notify(format!("Sending \"{}\" to server...", file.name), Severity::Info);

        let outcome = with_retry(&self.retry, || self.processor.process(file)).await;

        match outcome {
            Ok(output) => {
                tracing::info!(
                    name = %file.name,
                    sections = output.sections.len(),
                    artifacts = output.artifacts.len(),
                    "Document processed"
                );
                self.notifier
                    .notify(format!("\"{}\" processed", file.name), Severity::Success);

                ProcessingResult {
                    source_name: output
                        .source_name
                        .filter(|name| !name.trim().is_empty())
                        .unwrap_or_else(|| file.name.clone()),
                    sections: output.sections,
                    artifacts: output.artifacts,
                    degraded: false,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(name = %file.name, error = %e, "Remote processing failed, producing degraded result");
                self.notifier
                    .notify(format!("Failed to process \"{}\"", file.name), Severity::Error);
                ProcessingResult::degraded(file.name.clone(), e.to_string())
            }
        }
    }
}

impl std::fmt::Debug for UploadTaskRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadTaskRunner")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
