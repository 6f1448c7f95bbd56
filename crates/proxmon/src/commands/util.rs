//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use secrecy::SecretString;

use proxmon_core::{Group, GroupId};

use super::Ctx;
use crate::error::CliError;

/// Resolve a group by ID or exact name.
pub async fn resolve_group(ctx: &Ctx, key: &str) -> Result<Group, CliError> {
    Ok(ctx.console.find_group(key).await?)
}

/// Group id for a filter or form field. Numeric keys are taken as-is
/// and checked by the backend; names are looked up.
pub async fn group_id(ctx: &Ctx, key: &str) -> Result<GroupId, CliError> {
    match key.parse::<GroupId>() {
        Ok(id) => Ok(id),
        Err(_) => Ok(resolve_group(ctx, key).await?.id),
    }
}

/// Group scope for commands with an optional `--group`: the flag, else
/// the profile's `default_group`, else no scope.
pub async fn group_scope(ctx: &Ctx, explicit: Option<&str>) -> Result<Option<GroupId>, CliError> {
    explicit_group(ctx, explicit.or(ctx.default_group.as_deref())).await
}

/// Like [`group_scope`] but only honors an explicit flag.
pub async fn explicit_group(
    ctx: &Ctx,
    explicit: Option<&str>,
) -> Result<Option<GroupId>, CliError> {
    match explicit {
        Some(key) => Ok(Some(group_id(ctx, key).await?)),
        None => Ok(None),
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Prompt(e.to_string()))
}

/// Read a password from the terminal without echo.
pub fn prompt_password(label: &str) -> Result<SecretString, CliError> {
    let raw = rpassword::prompt_password(label).map_err(|e| CliError::Prompt(e.to_string()))?;
    Ok(SecretString::from(raw))
}

/// Stderr spinner for slow backend calls; hidden when stderr is not a
/// terminal or output is quiet.
pub fn spinner(message: &str, quiet: bool) -> ProgressBar {
    if quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_owned());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
