//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use proxmon_config::ConfigError;
use proxmon_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const VALIDATION: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to backend at {url}: {reason}")]
    #[diagnostic(
        code(proxmon::connection_failed),
        help(
            "Check that the monitoring backend is running and reachable.\n\
             URL: {url}\n\
             Try: proxmon --server <url> monitor summary"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Proxy {proxy} is unreachable: {reason}")]
    #[diagnostic(
        code(proxmon::proxy_unreachable),
        help("Check the proxy's SSH/SNMP ports and credentials with: proxmon proxies get {proxy}")
    )]
    ProxyUnreachable { proxy: i64, reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(proxmon::timeout),
        help("Increase timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(proxmon::not_found),
        help("Run: proxmon {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{message}")]
    #[diagnostic(code(proxmon::conflict))]
    Conflict { message: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("Request rejected: {message}")]
    #[diagnostic(code(proxmon::rejected))]
    Rejected { message: String },

    #[error("{message}")]
    #[diagnostic(code(proxmon::api_error))]
    ApiError {
        message: String,
        status: Option<u16>,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(proxmon::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(proxmon::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: proxmon config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No backend configured")]
    #[diagnostic(
        code(proxmon::no_config),
        help(
            "Create a profile with: proxmon config init\n\
             or pass --server / set PROXMON_SERVER.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(
        code(proxmon::config),
        help("Check the config file with: proxmon config show")
    )]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(proxmon::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error("Prompt failed: {0}")]
    #[diagnostic(code(proxmon::prompt))]
    Prompt(String),

    // ── Internal / IO ────────────────────────────────────────────────

    #[error("{0}")]
    #[diagnostic(code(proxmon::internal))]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::ProxyUnreachable { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Validation { .. } => exit_code::VALIDATION,
            Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },

            CoreError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => Self::NotFound {
                list_command: list_command_for(&entity_type),
                resource_type: entity_type,
                identifier,
            },

            CoreError::Conflict { message } => Self::Conflict { message },

            CoreError::Rejected { message } => Self::Rejected { message },

            CoreError::ValidationFailed { field, reason } => Self::Validation { field, reason },

            CoreError::Api { message, status } => Self::ApiError { message, status },

            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

fn list_command_for(entity_type: &str) -> String {
    match entity_type {
        "proxy" => "proxies list".into(),
        "session" => "sessions search".into(),
        other => format!("{other}s list"),
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::UnknownProfile(name) => Self::ProfileNotFound {
                name,
                available: "(see: proxmon config profiles)".into(),
            },
            other => Self::Config(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let cases = [
            (
                CoreError::ConnectionFailed {
                    url: "http://x".into(),
                    reason: "refused".into(),
                },
                exit_code::CONNECTION,
            ),
            (CoreError::Timeout { timeout_secs: 3 }, exit_code::TIMEOUT),
            (
                CoreError::NotFound {
                    entity_type: "proxy".into(),
                    identifier: "9".into(),
                },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::Conflict {
                    message: "dup".into(),
                },
                exit_code::CONFLICT,
            ),
            (
                CoreError::ValidationFailed {
                    field: "host".into(),
                    reason: "bad".into(),
                },
                exit_code::VALIDATION,
            ),
            (CoreError::Internal("boom".into()), exit_code::GENERAL),
        ];
        for (core, code) in cases {
            let label = core.to_string();
            assert_eq!(CliError::from(core).exit_code(), code, "{label}");
        }
    }

    #[test]
    fn proxy_not_found_points_at_proxies_list() {
        let err = CliError::from(CoreError::NotFound {
            entity_type: "proxy".into(),
            identifier: "42".into(),
        });
        match err {
            CliError::NotFound { list_command, .. } => assert_eq!(list_command, "proxies list"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_profile_is_not_found() {
        let err = CliError::from(ConfigError::UnknownProfile("lab".into()));
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        assert!(err.to_string().contains("lab"));
    }
}
