//! Blocking user notifications.
//!
//! A GUI shows these as modal message boxes; the CLI prints them. Store
//! access failures are always reported with [`STORE_ACCESS_MESSAGE`].

use std::sync::{Mutex, MutexGuard};

use tracing::error;

pub const ERROR_TITLE: &str = "Error";

pub const STORE_ACCESS_MESSAGE: &str =
    "Failed to write to registry. Please make sure the app is running elevated.";

pub trait Notifier: Send + Sync {
    /// Shows an error and returns once the user has acknowledged it.
    fn error(&self, title: &str, message: &str);
}

/// Forwards notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn error(&self, title: &str, message: &str) {
        error!("{}: {}", title, message);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

/// Keeps every notification, for tests and for batching output.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn seen(&self) -> MutexGuard<'_, Vec<Notification>> {
        match self.seen.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.seen().clone()
    }

    pub fn count(&self) -> usize {
        self.seen().len()
    }

    pub fn clear(&self) {
        self.seen().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, title: &str, message: &str) {
        self.seen().push(Notification {
            title: title.to_string(),
            message: message.to_string(),
        });
    }
}
