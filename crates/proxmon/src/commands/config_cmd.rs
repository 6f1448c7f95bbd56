//! Config subcommand handlers.

use std::path::PathBuf;

use dialoguer::{Confirm, Input};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config as TOML-like text for the table view.
fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "refresh_interval = {}", cfg.defaults.refresh_interval);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "server = \"{}\"", p.server);
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(interval) = p.refresh_interval {
            let _ = writeln!(out, "refresh_interval = {interval}");
        }
        if let Some(ref group) = p.default_group {
            let _ = writeln!(out, "default_group = \"{group}\"");
        }
    }

    out.trim_end().to_owned()
}

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Prompt(e.to_string())
}

fn parse_value<T: std::str::FromStr>(field: &str, value: &str, hint: &str) -> Result<T, CliError> {
    value.trim().parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: hint.into(),
    })
}

/// Apply `key = value` to a profile.
fn set_profile_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "server" => {
            url::Url::parse(&value).map_err(|_| CliError::Validation {
                field: "server".into(),
                reason: format!("invalid URL: {value}"),
            })?;
            profile.server = value;
        }
        "insecure" => {
            profile.insecure = Some(parse_value(key, &value, "must be 'true' or 'false'")?);
        }
        "timeout" => {
            profile.timeout = Some(parse_value(key, &value, "must be a number (seconds)")?);
        }
        "refresh_interval" | "refresh-interval" => {
            let secs: u64 = parse_value(key, &value, "must be a number (seconds)")?;
            if secs == 0 {
                return Err(CliError::Validation {
                    field: "refresh_interval".into(),
                    reason: "must be at least 1 second".into(),
                });
            }
            profile.refresh_interval = Some(secs);
        }
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(PathBuf::from(value)),
        "default_group" | "default-group" => {
            profile.default_group = (!value.trim().is_empty()).then_some(value);
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: server, insecure, timeout, \
                     refresh_interval, ca_cert, default_group"
                ),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("proxmon configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let mut cfg = config::load_config_or_default();

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let server: String = Input::new()
                .with_prompt("Backend URL")
                .default("http://127.0.0.1:5007".into())
                .validate_with(|s: &String| {
                    url::Url::parse(s).map(|_| ()).map_err(|e| e.to_string())
                })
                .interact_text()
                .map_err(prompt_err)?;

            let mut profile = Profile::new(server);
            if profile.server.starts_with("https://") {
                let insecure = Confirm::new()
                    .with_prompt("Accept self-signed certificates?")
                    .default(false)
                    .interact()
                    .map_err(prompt_err)?;
                profile.insecure = insecure.then_some(true);
            }

            let group: String = Input::new()
                .with_prompt("Default group (blank for none)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;
            profile.default_group = (!group.trim().is_empty()).then(|| group.trim().to_owned());

            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            let path = config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: proxmon monitor summary");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out = output::render_single(&global.output, &cfg, format_config, |_| {
                "config".into()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            // A new profile can only start from its server URL.
            if key != "server" && !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: config::available_profiles(&cfg),
                });
            }
            let profile = cfg
                .profiles
                .entry(profile_name.clone())
                .or_insert_with(|| Profile::new(String::new()));
            set_profile_key(profile, &key, value)?;

            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Set {key} on profile '{profile_name}'");
            }
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: proxmon config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    name,
                    available: config::available_profiles(&cfg),
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_known_keys() {
        let mut p = Profile::new("http://127.0.0.1:5007");
        set_profile_key(&mut p, "timeout", "15".into()).unwrap_or_else(|e| panic!("{e}"));
        set_profile_key(&mut p, "refresh-interval", "7".into()).unwrap_or_else(|e| panic!("{e}"));
        set_profile_key(&mut p, "default_group", "Production-Proxy".into())
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(p.timeout, Some(15));
        assert_eq!(p.refresh_interval, Some(7));
        assert_eq!(p.default_group.as_deref(), Some("Production-Proxy"));
    }

    #[test]
    fn zero_refresh_interval_is_rejected() {
        let mut p = Profile::new("http://127.0.0.1:5007");
        let err = set_profile_key(&mut p, "refresh_interval", "0".into())
            .err()
            .unwrap_or_else(|| panic!("expected error"));
        assert!(matches!(err, CliError::Validation { .. }));
    }

    #[test]
    fn unknown_key_lists_valid_ones() {
        let mut p = Profile::new("http://127.0.0.1:5007");
        let err = set_profile_key(&mut p, "colour", "red".into())
            .err()
            .unwrap_or_else(|| panic!("expected error"));
        assert!(err.to_string().contains("colour"));
    }

    #[test]
    fn show_lists_profiles_sorted() {
        let mut cfg = Config::default();
        cfg.profiles.insert("zeta".into(), Profile::new("http://z:1"));
        cfg.profiles.insert("alpha".into(), Profile::new("http://a:1"));
        let text = format_config(&cfg);
        let alpha = text.find("[profiles.alpha]").unwrap_or(usize::MAX);
        let zeta = text.find("[profiles.zeta]").unwrap_or(0);
        assert!(alpha < zeta);
        assert!(text.contains("refresh_interval = 5"));
    }
}
