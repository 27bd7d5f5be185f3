//! Common test utilities for docsum-batch integration tests

#![allow(dead_code)]

use docsum_batch::{BatchOrchestrator, Config, Event, FileRef, RemoteConfig};
use serde_json::{Value, json};
use std::path::Path;
use tokio::sync::broadcast;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Upload endpoint path used by the default configuration
pub const UPLOAD_PATH: &str = "/api/upload";

/// Orchestrator pointed at a mock server
pub fn orchestrator_for(server: &MockServer) -> BatchOrchestrator {
    let config = Config {
        remote: RemoteConfig {
            base_url: server.uri(),
            ..Default::default()
        },
        ..Default::default()
    };
    BatchOrchestrator::new(config).expect("valid config")
}

/// Successful service response for `name`
pub fn success_body(name: &str) -> Value {
    json!({
        "success": true,
        "file": name,
        "sections": [
            {"judul": "BAB I PENDAHULUAN", "ringkasan_bab": format!("Ringkasan {}", name)},
            {"judul": "BAB II TINJAUAN PUSTAKA", "ringkasan_bab": "Ringkasan teori"}
        ],
        "download_pdf": format!("/download/{}.pdf", name),
        "download_docx": format!("/download/{}.docx", name)
    })
}

/// Respond to uploads whose multipart body mentions `name`
pub async fn mount_for_file(server: &MockServer, name: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(UPLOAD_PATH))
        .and(body_string_contains(format!("filename=\"{}\"", name)))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Write a small PDF-looking file and load it as a path-backed reference
pub async fn pdf_on_disk(dir: &Path, name: &str) -> FileRef {
    let file_path = dir.join(name);
    std::fs::write(&file_path, format!("%PDF-1.4\n% {}\n%%EOF\n", name)).expect("write fixture");
    FileRef::from_path(&file_path).await.expect("load fixture")
}

/// Drain every event currently buffered on `rx`
pub fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
