//! Pure projection of queue state into something a UI can draw.
//!
//! [`render`] has no side effects and no knowledge of any UI toolkit; a
//! terminal front-end, a web view, or a test can call it with any snapshot.

use serde::Serialize;

use crate::types::{ItemId, QueueItem, RemoteState, Status};
use crate::utils::{format_file_size, truncate_filename};

/// Longest file name shown before truncation
pub const MAX_DISPLAY_NAME: usize = 30;

/// Whether the "process" trigger may be used
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerState {
    /// No batch run in progress
    Idle,
    /// A batch run is in progress; the trigger is disabled
    Running,
}

/// One queued file as displayed
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ItemRow {
    /// Item ID
    pub id: ItemId,
    /// File name, truncated for display
    pub display_name: String,
    /// Human-readable size
    pub size_text: String,
    /// Lifecycle status
    pub status: Status,
    /// Status line
    pub status_text: String,
    /// Show the busy animation
    pub show_spinner: bool,
    /// Remote processing label, once a batch run has touched the item
    pub remote_text: Option<&'static str>,
}

/// The batch trigger as displayed
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProcessButton {
    /// Whether it can be pressed
    pub enabled: bool,
    /// Button label
    pub label: String,
}

/// Everything needed to draw the queue
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ViewModel {
    /// Rows in queue order
    pub rows: Vec<ItemRow>,
    /// Batch trigger
    pub process_button: ProcessButton,
    /// Queue is empty (show the drop-zone hint)
    pub is_empty: bool,
}

/// Project a queue snapshot into a view model
pub fn render(items: &[QueueItem], trigger: TriggerState) -> ViewModel {
    let rows = items.iter().map(render_row).collect();
    let all_terminal = items.iter().all(|item| item.status.is_terminal());

    let process_button = match trigger {
        TriggerState::Running => ProcessButton {
            enabled: false,
            label: "Processing...".to_string(),
        },
        TriggerState::Idle if all_terminal => ProcessButton {
            enabled: !items.is_empty(),
            label: format!("Process {} file(s)", items.len()),
        },
        TriggerState::Idle => ProcessButton {
            enabled: false,
            label: "Waiting for uploads to finish".to_string(),
        },
    };

    ViewModel {
        rows,
        process_button,
        is_empty: items.is_empty(),
    }
}

fn render_row(item: &QueueItem) -> ItemRow {
    ItemRow {
        id: item.id,
        display_name: truncate_filename(&item.file.name, MAX_DISPLAY_NAME),
        size_text: format_file_size(item.file.size),
        status: item.status,
        status_text: status_text(item),
        show_spinner: item.status == Status::Uploading,
        remote_text: match item.remote {
            RemoteState::Pending => None,
            RemoteState::Processed => Some("Processed"),
            RemoteState::Degraded => Some("Processing failed"),
        },
    }
}

fn status_text(item: &QueueItem) -> String {
    match item.status {
        Status::Uploading => format!("{}% • Uploading...", item.progress.round() as u32),
        Status::Completed => "Done ✅".to_string(),
        Status::Errored => "Error ❌".to_string(),
        Status::Queued => "Waiting...".to_string(),
    }
}
