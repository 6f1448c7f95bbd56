// ── Status-code messages ──
//
// Maps HTTP statuses to human-readable text. Call sites can override
// individual codes; the backend's own detail is appended when present.

use std::borrow::Cow;
use std::collections::BTreeMap;

/// Built-in message for a status code, if the table knows it.
pub fn default_message(status: u16) -> Option<&'static str> {
    let text = match status {
        400 => "Invalid request",
        401 => "Authentication required",
        403 => "Permission denied",
        404 => "Resource not found",
        409 => "Conflicts with existing data",
        422 => "Input could not be processed",
        500 => "Internal server error",
        502 => "Bad gateway",
        503 => "Service unavailable",
        504 => "Gateway timeout",
        _ => return None,
    };
    Some(text)
}

/// Status message table with per-call overrides.
#[derive(Debug, Clone, Default)]
pub struct StatusMessages {
    overrides: BTreeMap<u16, Cow<'static, str>>,
}

impl StatusMessages {
    #[must_use]
    pub fn with(mut self, status: u16, message: impl Into<Cow<'static, str>>) -> Self {
        self.overrides.insert(status, message.into());
        self
    }

    /// Message for `status`: override, then the built-in table, then
    /// `HTTP <code>`.
    pub fn message_for(&self, status: u16) -> Cow<'static, str> {
        if let Some(text) = self.overrides.get(&status) {
            return text.clone();
        }
        default_message(status).map_or_else(|| Cow::Owned(format!("HTTP {status}")), Cow::Borrowed)
    }

    /// Full description: the status message, plus the backend's detail.
    pub fn describe(&self, status: u16, detail: Option<&str>) -> String {
        let base = self.message_for(status);
        match detail.map(str::trim).filter(|d| !d.is_empty()) {
            Some(detail) => format!("{base}: {detail}"),
            None => base.into_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_replaces_only_its_code() {
        let messages = StatusMessages::default().with(409, "group name already exists");
        assert_eq!(messages.message_for(409), "group name already exists");
        assert_eq!(messages.message_for(404), "Resource not found");
    }

    #[test]
    fn blank_detail_is_ignored() {
        let messages = StatusMessages::default();
        assert_eq!(messages.describe(500, Some("  ")), "Internal server error");
        assert_eq!(
            messages.describe(400, Some("Missing fields")),
            "Invalid request: Missing fields"
        );
        assert_eq!(messages.describe(599, None), "HTTP 599");
    }
}
