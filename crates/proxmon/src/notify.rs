//! Terminal sinks for core notifications.

use std::sync::{Mutex, PoisonError};

use proxmon_core::{Level, Notification, Notifier};

use crate::output;

/// Prints success and info notifications to stderr.
///
/// Warnings and errors are skipped: one-shot commands return them as a
/// `CliError`, which `main` reports with its diagnostic.
#[derive(Debug, Clone, Copy)]
pub struct TerminalNotifier {
    color: bool,
    quiet: bool,
}

impl TerminalNotifier {
    pub fn new(color: bool, quiet: bool) -> Self {
        Self { color, quiet }
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, n: Notification) {
        if self.quiet || matches!(n.level, Level::Warning | Level::Error) {
            return;
        }
        eprintln!("{} {}", output::level_marker(n.level, self.color), n.message);
    }
}

/// Keeps the most recent notification so a redrawn screen can show it
/// under the table.
#[derive(Debug, Default)]
pub struct StatusLine {
    last: Mutex<Option<Notification>>,
}

impl StatusLine {
    pub fn current(&self) -> Option<Notification> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn render(&self, color: bool) -> Option<String> {
        self.current().map(|n| {
            format!(
                "{} {}: {}",
                output::level_marker(n.level, color),
                n.title,
                n.message
            )
        })
    }
}

impl Notifier for StatusLine {
    fn notify(&self, n: Notification) {
        tracing::debug!(level = %n.level, title = %n.title, "status line updated");
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_keeps_latest() {
        let line = StatusLine::default();
        assert!(line.render(false).is_none());
        line.notify(Notification::error("Refresh failed", "Internal server error"));
        line.notify(Notification::warning("Slow", "took 4s"));
        assert_eq!(line.render(false).as_deref(), Some("! Slow: took 4s"));
        line.clear();
        assert!(line.current().is_none());
    }
}
