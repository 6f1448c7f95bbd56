// ── User notifications ──
//
// Outcomes the user should see (saved, deleted, refresh failed) are
// pushed through a `Notifier`. The CLI renders them on the terminal;
// tests collect them.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: Level,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(level: Level, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Level::Success, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Level::Warning, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Level::Error, title, message)
    }

    /// Validation problems are warnings; everything else is an error.
    pub fn from_error(title: impl Into<String>, err: &CoreError) -> Self {
        let level = if err.is_validation() {
            Level::Warning
        } else {
            Level::Error
        };
        Self::new(level, title, err.to_string())
    }
}

/// Sink for user-facing notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Forwards notifications to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, n: Notification) {
        match n.level {
            Level::Info | Level::Success => info!(title = %n.title, "{}", n.message),
            Level::Warning => warn!(title = %n.title, "{}", n.message),
            Level::Error => error!(title = %n.title, "{}", n.message),
        }
    }
}

/// Buffers notifications in memory.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    items: Mutex<Vec<Notification>>,
}

impl CollectingNotifier {
    pub fn snapshot(&self) -> Vec<Notification> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.items.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn count(&self, level: Level) -> usize {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|n| n.level == level)
            .count()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notification: Notification) {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}
