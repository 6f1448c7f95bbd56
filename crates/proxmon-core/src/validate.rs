// ── Client-side validation ──
//
// Checks run before any request leaves the process. Each returns a
// `CoreError::ValidationFailed` naming the offending field.

use std::net::IpAddr;

use crate::error::CoreError;
use crate::model::Group;

pub const MIN_PASSWORD_LEN: usize = 8;
/// Character classes (lower, upper, digit, symbol) a password must mix.
pub const MIN_PASSWORD_CLASSES: usize = 3;

/// Reject empty or whitespace-only values.
pub fn require<'a>(field: &str, value: &'a str) -> Result<&'a str, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::validation(field, "is required"));
    }
    Ok(trimmed)
}

/// Host must be a literal IPv4 or IPv6 address.
pub fn host(value: &str) -> Result<IpAddr, CoreError> {
    let trimmed = require("host", value)?;
    trimmed.parse().map_err(|_| {
        CoreError::validation("host", format!("'{trimmed}' is not a valid IP address"))
    })
}

pub fn port(field: &str, value: u16) -> Result<u16, CoreError> {
    if value == 0 {
        return Err(CoreError::validation(field, "must be between 1 and 65535"));
    }
    Ok(value)
}

pub fn password(value: &str) -> Result<(), CoreError> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(CoreError::validation(
            "password",
            format!("must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    let classes = [
        value.chars().any(char::is_lowercase),
        value.chars().any(char::is_uppercase),
        value.chars().any(|c| c.is_ascii_digit()),
        value.chars().any(|c| !c.is_alphanumeric()),
    ]
    .into_iter()
    .filter(|present| *present)
    .count();
    if classes < MIN_PASSWORD_CLASSES {
        return Err(CoreError::validation(
            "password",
            "must mix at least three of: lowercase, uppercase, digits, symbols",
        ));
    }
    Ok(())
}

/// Groups that are protected or still hold proxies cannot be deleted.
pub fn group_deletable(group: &Group) -> Result<(), CoreError> {
    if group.is_protected() {
        return Err(CoreError::validation(
            "group",
            format!("'{}' is the default group and cannot be deleted", group.name),
        ));
    }
    if group.proxy_count > 0 {
        return Err(CoreError::validation(
            "group",
            format!(
                "'{}' still contains {} proxies; move or delete them first",
                group.name, group.proxy_count
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GroupId, PROTECTED_GROUP_NAME};

    fn group(name: &str, proxy_count: u32) -> Group {
        Group {
            id: GroupId(1),
            name: name.into(),
            description: None,
            proxy_count,
            main_server: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn require_trims_and_rejects_blank() {
        assert_eq!(require("name", "  web-01 ").ok(), Some("web-01"));
        let err = require("name", "   ").expect_err("blank rejected");
        assert_eq!(err.to_string(), "name: is required");
    }

    #[test]
    fn host_accepts_both_address_families() {
        assert!(host("192.168.1.10").is_ok());
        assert!(host("fd00::10").is_ok());
        assert!(host("proxy.local").is_err());
        assert!(host("").is_err());
    }

    #[test]
    fn password_needs_length_and_three_classes() {
        assert!(password("Secure1!").is_ok());
        assert!(password("secure12").is_err());
        assert!(password("Sh0rt!").is_err());
        assert!(password("lowerUPPER1").is_ok());
    }

    #[test]
    fn protected_and_populated_groups_are_kept() {
        assert!(group_deletable(&group(PROTECTED_GROUP_NAME, 0)).is_err());
        assert!(group_deletable(&group("Staging", 2)).is_err());
        assert!(group_deletable(&group("Staging", 0)).is_ok());
    }
}
