// ── Core error types ──
//
// User-facing errors from proxmon-core. Consumers never see raw HTTP
// failures: `CoreError::from_api` translates transport-layer errors into
// domain variants, rendering HTTP statuses through a `StatusMessages`
// table so each call site can phrase its own conflicts.

use thiserror::Error;

use crate::status::StatusMessages;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Backend request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("{message}")]
    Conflict { message: String },

    #[error("Operation rejected by backend: {message}")]
    Rejected { message: String },

    #[error("{field}: {reason}")]
    ValidationFailed { field: String, reason: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("{message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(entity_type: &str, identifier: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_owned(),
            identifier: identifier.to_string(),
        }
    }

    /// Translate an API error, phrasing HTTP statuses through `messages`.
    pub fn from_api(err: proxmon_api::Error, messages: &StatusMessages) -> Self {
        match err {
            proxmon_api::Error::Http { status, message } => {
                let text = messages.describe(status, message.as_deref());
                match status {
                    409 => CoreError::Conflict { message: text },
                    400 | 422 => CoreError::Rejected { message: text },
                    _ => CoreError::Api {
                        message: text,
                        status: Some(status),
                    },
                }
            }
            proxmon_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    let status = e.status().map(|s| s.as_u16());
                    CoreError::Api {
                        message: match status {
                            Some(code) => messages.describe(code, None),
                            None => e.to_string(),
                        },
                        status,
                    }
                }
            }
            proxmon_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            proxmon_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            proxmon_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            proxmon_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Unexpected backend response: {message}"))
            }
        }
    }

    /// HTTP status behind this error, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => *status,
            Self::Conflict { .. } => Some(409),
            Self::NotFound { .. } => Some(404),
            _ => None,
        }
    }

    /// Returns `true` for client-side input errors.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationFailed { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<proxmon_api::Error> for CoreError {
    fn from(err: proxmon_api::Error) -> Self {
        Self::from_api(err, &StatusMessages::default())
    }
}
