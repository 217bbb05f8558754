//! Routing service.
//!
//! Guards only ever replace the current entry, so a user who was redirected
//! away from a protected page cannot navigate back to it.

use std::sync::Mutex;

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

/// Default broadcast channel capacity for navigation events.
const DEFAULT_BROADCAST_CAPACITY: usize = 64;

/// Something that can move the user to another page.
pub trait Navigator: Send + Sync {
    /// Replace the current history entry with `path`.
    fn navigate_replace(&self, path: &str);
}

/// A navigation that happened, as seen by subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NavigationEvent {
    Push { path: String },
    Replace { from: String, to: String },
    Back { to: String },
}

/// In-memory navigation history with push/replace/back semantics.
pub struct History {
    entries: Mutex<Vec<String>>,
    tx: broadcast::Sender<NavigationEvent>,
}

impl History {
    /// Create a history positioned at `initial`.
    pub fn new(initial: impl Into<String>) -> Self {
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        Self {
            entries: Mutex::new(vec![initial.into()]),
            tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NavigationEvent> {
        self.tx.subscribe()
    }

    /// The path the user is currently on.
    pub fn current(&self) -> String {
        let entries = self.lock();
        entries.last().cloned().unwrap_or_default()
    }

    /// Number of entries on the stack.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn push(&self, path: &str) {
        self.lock().push(path.to_string());
        debug!(path, "Navigation push");
        let _ = self.tx.send(NavigationEvent::Push {
            path: path.to_string(),
        });
    }

    /// Go back one entry. Returns the new current path, or `None` when
    /// already at the first entry.
    pub fn back(&self) -> Option<String> {
        let to = {
            let mut entries = self.lock();
            if entries.len() <= 1 {
                return None;
            }
            entries.pop();
            entries.last().cloned()?
        };
        debug!(to = %to, "Navigation back");
        let _ = self.tx.send(NavigationEvent::Back { to: to.clone() });
        Some(to)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        // Poisoning leaves the entries intact.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Navigator for History {
    fn navigate_replace(&self, path: &str) {
        let from = {
            let mut entries = self.lock();
            match entries.last_mut() {
                Some(last) => std::mem::replace(last, path.to_string()),
                None => {
                    entries.push(path.to_string());
                    String::new()
                }
            }
        };
        debug!(from = %from, to = path, "Navigation replace");
        let _ = self.tx.send(NavigationEvent::Replace {
            from,
            to: path.to_string(),
        });
    }
}

/// Navigator that records every request.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingNavigator {
    calls: Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// All paths requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[cfg(test)]
impl Navigator for RecordingNavigator {
    fn navigate_replace(&self, path: &str) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(path.to_string());
    }
}
