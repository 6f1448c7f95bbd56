//! Shared configuration for the proxmon CLI.
//!
//! TOML profiles layered with environment overrides, and translation to
//! `proxmon_core::ConsoleConfig`. The CLI adds `GlobalOpts`-aware
//! wrappers on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use proxmon_core::{ConsoleConfig, TlsVerification};

/// Overrides the config file location (used by tests and scripts).
pub const CONFIG_PATH_ENV: &str = "PROXMON_CONFIG";

/// Prefix for environment overrides. Nested keys are separated by a
/// double underscore: `PROXMON_DEFAULTS__TIMEOUT=10`.
pub const ENV_PREFIX: &str = "PROXMON_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{0}' not found")]
    UnknownProfile(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Profile name to use: the explicit choice, else `default_profile`,
    /// else `"default"`.
    pub fn active_profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile(name.into()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds between refreshes in `monitor watch`.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            refresh_interval: default_refresh_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_refresh_interval() -> u64 {
    ConsoleConfig::DEFAULT_REFRESH_SECS
}

/// A named backend profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Backend base URL (e.g., "http://127.0.0.1:5007").
    pub server: String,

    /// Path to custom CA certificate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Override timeout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Override refresh interval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_interval: Option<u64>,

    /// Group (id or name) used when a command takes an optional group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_group: Option<String>,
}

impl Profile {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ca_cert: None,
            insecure: None,
            timeout: None,
            refresh_interval: None,
            default_group: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `PROXMON_CONFIG`, else the platform
/// config directory.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "proxmon", "proxmon").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("proxmon");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, layered as defaults → file → environment.
/// A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile → ConsoleConfig ─────────────────────────────────────────

/// Build a `ConsoleConfig` from a profile, falling back to `defaults`
/// for unset fields. No CLI flag overrides.
pub fn profile_to_console_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<ConsoleConfig, ConfigError> {
    let url: url::Url = profile
        .server
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "server".into(),
            reason: format!("invalid URL: {}", profile.server),
        })?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let refresh_interval_secs = profile.refresh_interval.unwrap_or(defaults.refresh_interval);
    if refresh_interval_secs == 0 {
        return Err(ConfigError::Validation {
            field: "refresh_interval".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    let mut config = ConsoleConfig::new(url);
    config.tls = tls;
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.refresh_interval_secs = refresh_interval_secs;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_config() -> Config {
        let mut profile = Profile::new("http://10.0.0.5:5007");
        profile.refresh_interval = Some(10);
        profile.default_group = Some("Production-Proxy".into());

        let mut cfg = Config::default();
        cfg.profiles.insert("default".into(), profile);
        cfg.profiles
            .insert("lab".into(), Profile::new("https://lab.internal"));
        cfg
    }

    #[test]
    fn save_then_load_preserves_profiles() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");
        let cfg = sample_config();

        save_config_to(&cfg, &path).expect("save");
        let loaded = load_config_from(&path).expect("load");
        assert_eq!(loaded.profiles, cfg.profiles);
        assert_eq!(loaded.defaults.refresh_interval, 5);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loaded = load_config_from(&dir.path().join("absent.toml")).expect("load");
        assert_eq!(loaded.default_profile.as_deref(), Some("default"));
        assert!(loaded.profiles.is_empty());
        assert_eq!(loaded.defaults.timeout, 30);
    }

    #[test]
    fn partial_defaults_are_filled() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "default_profile = \"lab\"\n[defaults]\ntimeout = 5\n[profiles.lab]\nserver = \"http://lab:5007\"\n",
        )
        .expect("write");

        let loaded = load_config_from(&path).expect("load");
        assert_eq!(loaded.active_profile_name(None), "lab");
        assert_eq!(loaded.active_profile_name(Some("x")), "x");
        assert_eq!(loaded.defaults.timeout, 5);
        assert_eq!(loaded.defaults.output, "table");
        assert!(loaded.profile("missing").is_err());
    }

    #[test]
    fn profile_overrides_defaults() {
        let cfg = sample_config();
        let profile = cfg.profile("default").expect("profile");
        let console = profile_to_console_config(profile, &cfg.defaults).expect("valid profile");
        assert_eq!(console.url.as_str(), "http://10.0.0.5:5007/");
        assert_eq!(console.refresh_interval_secs, 10);
        assert_eq!(console.timeout, Duration::from_secs(30));
        assert_eq!(console.tls, TlsVerification::SystemDefaults);

        let mut insecure = Profile::new("https://lab.internal");
        insecure.insecure = Some(true);
        let console = profile_to_console_config(&insecure, &cfg.defaults).expect("valid profile");
        assert_eq!(console.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn invalid_server_url_is_rejected() {
        let err = profile_to_console_config(&Profile::new("not a url"), &Defaults::default())
            .expect_err("invalid url");
        assert!(err.to_string().contains("server"));
    }
}
