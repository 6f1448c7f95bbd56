// ── Runtime connection configuration ──
//
// These types describe *how* to reach the monitoring backend. They carry
// connection tuning only and never touch disk: the CLI builds a
// `ConsoleConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed backends).
    DangerAcceptInvalid,
}

/// Configuration for talking to a single backend.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Backend root URL (e.g., `http://127.0.0.1:5007`).
    pub url: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// Default refresh period for monitoring views (seconds).
    pub refresh_interval_secs: u64,
}

impl ConsoleConfig {
    pub const DEFAULT_REFRESH_SECS: u64 = 5;

    pub fn new(url: Url) -> Self {
        Self {
            url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            refresh_interval_secs: Self::DEFAULT_REFRESH_SECS,
        }
    }
}
