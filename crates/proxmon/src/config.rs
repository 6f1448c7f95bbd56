//! CLI configuration: thin wrapper around `proxmon_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--server, --insecure, --timeout).

use proxmon_core::ConsoleConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use proxmon_config::{
    Config, Defaults, Profile, config_path, load_config, load_config_or_default, save_config,
};

/// Connection settings plus the profile bits commands need later.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub console: ConsoleConfig,
    pub default_group: Option<String>,
}

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Apply flag overrides on top of a profile. Flags win over profile
/// values; env vars reach here through clap.
pub fn apply_overrides(mut profile: Profile, global: &GlobalOpts) -> Profile {
    if let Some(ref server) = global.server {
        profile.server.clone_from(server);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    profile
}

/// Build the console settings for a backend-bound command.
///
/// The named profile is used when it exists; otherwise `--server` alone
/// is enough to run against [`Defaults`].
pub fn resolve(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let cfg = load_config()?;
    resolve_with(&cfg, global)
}

pub fn resolve_with(cfg: &Config, global: &GlobalOpts) -> Result<Resolved, CliError> {
    let name = active_profile_name(global, cfg);

    let base = match (cfg.profiles.get(&name), &global.server) {
        (Some(profile), _) => profile.clone(),
        (None, Some(server)) => Profile::new(server.clone()),
        (None, None) if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name,
                available: available_profiles(cfg),
            });
        }
        (None, None) => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    let profile = apply_overrides(base, global);
    let console = proxmon_config::profile_to_console_config(&profile, &cfg.defaults)?;
    Ok(Resolved {
        console,
        default_group: profile.default_group,
    })
}

pub fn available_profiles(cfg: &Config) -> String {
    let mut names: Vec<_> = cfg.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["proxmon"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["groups", "list"]);
        Cli::try_parse_from(argv)
            .map(|cli| cli.global)
            .unwrap_or_else(|e| panic!("parse failed: {e}"))
    }

    fn config_with_lab() -> Config {
        let mut lab = Profile::new("http://10.1.1.1:5007");
        lab.timeout = Some(12);
        lab.default_group = Some("Production-Proxy".into());
        let mut cfg = Config::default();
        cfg.profiles.insert("lab".into(), lab);
        cfg
    }

    #[test]
    fn server_flag_works_without_profile() {
        let resolved = resolve_with(&Config::default(), &global(&["-S", "http://127.0.0.1:9"]))
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(resolved.console.url.as_str(), "http://127.0.0.1:9/");
        assert_eq!(resolved.console.timeout, Duration::from_secs(30));
    }

    #[test]
    fn flags_override_profile_values() {
        let resolved = resolve_with(
            &config_with_lab(),
            &global(&["-p", "lab", "--timeout", "3", "-S", "http://10.9.9.9:5007"]),
        )
        .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(resolved.console.timeout, Duration::from_secs(3));
        assert_eq!(resolved.console.url.host_str(), Some("10.9.9.9"));
        assert_eq!(resolved.default_group.as_deref(), Some("Production-Proxy"));
    }

    #[test]
    fn profile_timeout_applies_without_flag() {
        let resolved = resolve_with(&config_with_lab(), &global(&["-p", "lab"]))
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(resolved.console.timeout, Duration::from_secs(12));
    }

    #[test]
    fn unknown_explicit_profile_lists_available() {
        let err = resolve_with(&config_with_lab(), &global(&["-p", "prod"]))
            .err()
            .unwrap_or_else(|| panic!("expected error"));
        match err {
            CliError::ProfileNotFound { name, available } => {
                assert_eq!(name, "prod");
                assert_eq!(available, "lab");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn nothing_configured_is_no_config() {
        let err = resolve_with(&Config::default(), &global(&[]))
            .err()
            .unwrap_or_else(|| panic!("expected error"));
        assert!(matches!(err, CliError::NoConfig { .. }));
    }
}
