//! Ephemeral user-facing notifications.
//!
//! [`NotificationCenter`] holds at most one visible [`Notification`]. Issuing a
//! new one replaces the current one, and each notification expires on its own
//! after the configured time-to-live. The center is a pure sink: it never
//! fails, and nothing in the queue or batch logic depends on its state.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::NotificationConfig;
use crate::types::Event;

/// Notification severity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Operation succeeded
    Success,
    /// Operation failed
    Error,
    /// Needs attention
    Warning,
    /// Informational
    Info,
    /// Fallback presentation for unrecognized severities
    Generic,
}

impl Severity {
    /// Parse a severity name, falling back to [`Severity::Generic`]
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "success" => Severity::Success,
            "error" => Severity::Error,
            "warning" => Severity::Warning,
            "info" => Severity::Info,
            _ => Severity::Generic,
        }
    }

    /// Icon shown next to the message
    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Success => "✅",
            Severity::Error => "❌",
            Severity::Warning => "⏳",
            Severity::Info => "💡",
            Severity::Generic => "📄",
        }
    }
}

/// A visible notification
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    /// Sequence number, increasing per center
    pub seq: u64,
    /// Message text
    pub message: String,
    /// Severity
    pub severity: Severity,
    /// When it stops being visible
    pub expires_at: Instant,
}

impl Notification {
    /// Message prefixed with the severity icon
    pub fn display_text(&self) -> String {
        format!("{} {}", self.severity.icon(), self.message)
    }
}

#[derive(Debug, Default)]
struct CenterState {
    running: bool,
    next_seq: u64,
    current: Option<Notification>,
    expiry: Option<JoinHandle<()>>,
}

/// Holder of the single visible notification
///
/// Cloning yields another handle to the same center.
#[derive(Clone, Debug)]
pub struct NotificationCenter {
    ttl: Duration,
    state: Arc<Mutex<CenterState>>,
    event_tx: Option<broadcast::Sender<Event>>,
}

impl NotificationCenter {
    /// Create a stopped center; call [`start`](Self::start) before use
    pub fn new(config: &NotificationConfig) -> Self {
        Self {
            ttl: config.ttl,
            state: Arc::new(Mutex::new(CenterState::default())),
            event_tx: None,
        }
    }

    /// Mirror notifications onto an event channel
    pub fn with_events(mut self, event_tx: broadcast::Sender<Event>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    /// Begin accepting notifications
    pub fn start(&self) {
        self.lock().running = true;
    }

    /// Stop accepting notifications and drop the visible one
    pub fn shutdown(&self) {
        let mut state = self.lock();
        state.running = false;
        state.current = None;
        if let Some(handle) = state.expiry.take() {
            handle.abort();
        }
    }

    /// Whether the center accepts notifications
    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    /// Show a notification, replacing any visible one
    ///
    /// Returns the sequence number, or None when the center is stopped.
    pub fn notify(&self, message: impl Into<String>, severity: Severity) -> Option<u64> {
        let message = message.into();
        let mut state = self.lock();

        if !state.running {
            tracing::debug!(message = %message, "Notification center stopped, dropping notification");
            return None;
        }

        state.next_seq += 1;
        let seq = state.next_seq;
        let notification = Notification {
            seq,
            message: message.clone(),
            severity,
            expires_at: Instant::now() + self.ttl,
        };

        tracing::debug!(seq, severity = ?severity, message = %message, "notification");

        if let Some(previous) = state.expiry.take() {
            previous.abort();
        }
        state.current = Some(notification);
        state.expiry = self.spawn_expiry(seq);
        drop(state);

        if let Some(tx) = &self.event_tx {
            tx.send(Event::Notification {
                seq,
                message,
                severity,
            })
            .ok();
        }

        Some(seq)
    }

    /// The visible notification, if any has not yet expired
    pub fn current(&self) -> Option<Notification> {
        let mut state = self.lock();
        match &state.current {
            Some(n) if Instant::now() < n.expires_at => Some(n.clone()),
            Some(_) => {
                state.current = None;
                None
            }
            None => None,
        }
    }

    // Timer that clears the notification once its TTL elapses, if it is still
    // the visible one. Without a runtime, expiry is only observed lazily.
    fn spawn_expiry(&self, seq: u64) -> Option<JoinHandle<()>> {
        let handle = tokio::runtime::Handle::try_current().ok()?;
        let state = Arc::clone(&self.state);
        let event_tx = self.event_tx.clone();
        let ttl = self.ttl;

        Some(handle.spawn(async move {
            tokio::time::sleep(ttl).await;

            let expired = {
                let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                match &state.current {
                    Some(n) if n.seq == seq => {
                        state.current = None;
                        state.expiry = None;
                        true
                    }
                    _ => false,
                }
            };

            if expired && let Some(tx) = event_tx {
                tx.send(Event::NotificationExpired { seq }).ok();
            }
        }))
    }

    fn lock(&self) -> MutexGuard<'_, CenterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
