// ── Edit forms ──
//
// A form is either creating a new entity or editing an existing one.
// `validate` runs every client-side check; payload conversion assumes a
// validated form.

use secrecy::{ExposeSecret, SecretString};

use proxmon_api::models::{GroupPayload, ProxyPayload};

use super::group::Group;
use super::ids::{GroupId, ProxyId};
use super::proxy::{Proxy, SnmpVersion};
use crate::error::CoreError;
use crate::validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode<Id> {
    Create,
    Edit(Id),
}

// ── GroupForm ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupForm {
    pub mode: FormMode<GroupId>,
    pub name: String,
    pub description: String,
}

impl GroupForm {
    pub fn create(name: impl Into<String>) -> Self {
        Self {
            mode: FormMode::Create,
            name: name.into(),
            description: String::new(),
        }
    }

    /// Form pre-filled from an existing group.
    pub fn edit(group: &Group) -> Self {
        Self {
            mode: FormMode::Edit(group.id),
            name: group.name.clone(),
            description: group.description.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        validate::require("name", &self.name)?;
        Ok(())
    }

    pub(crate) fn to_payload(&self) -> GroupPayload {
        GroupPayload {
            name: self.name.trim().to_owned(),
            description: self.description.trim().to_owned(),
        }
    }
}

// ── ProxyForm ───────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ProxyForm {
    pub mode: FormMode<ProxyId>,
    pub name: String,
    pub host: String,
    pub ssh_port: u16,
    pub snmp_port: u16,
    pub snmp_version: SnmpVersion,
    pub snmp_community: String,
    pub username: String,
    /// `None` or empty leaves the password to the backend: an edit keeps
    /// the stored one.
    pub password: Option<SecretString>,
    pub group_id: Option<GroupId>,
    pub is_main: bool,
    pub is_active: bool,
    pub description: String,
}

impl Default for ProxyForm {
    fn default() -> Self {
        Self {
            mode: FormMode::Create,
            name: String::new(),
            host: String::new(),
            ssh_port: 22,
            snmp_port: 161,
            snmp_version: SnmpVersion::default(),
            snmp_community: "public".into(),
            username: "root".into(),
            password: None,
            group_id: None,
            is_main: false,
            is_active: true,
            description: String::new(),
        }
    }
}

impl ProxyForm {
    /// Form pre-filled from an existing proxy. The password is never
    /// echoed back, so it starts empty.
    pub fn edit(proxy: &Proxy) -> Self {
        Self {
            mode: FormMode::Edit(proxy.id),
            name: proxy.name.clone(),
            host: proxy.host.clone(),
            ssh_port: proxy.ssh_port,
            snmp_port: proxy.snmp_port,
            snmp_version: proxy.snmp_version,
            snmp_community: proxy.snmp_community.clone(),
            username: proxy.username.clone(),
            password: None,
            group_id: proxy.group_id,
            is_main: proxy.is_main,
            is_active: proxy.is_active,
            description: proxy.description.clone().unwrap_or_default(),
        }
    }

    /// The password to send, if one was actually entered.
    fn entered_password(&self) -> Option<&SecretString> {
        self.password
            .as_ref()
            .filter(|p| !p.expose_secret().is_empty())
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        validate::require("name", &self.name)?;
        validate::host(&self.host)?;
        validate::port("ssh_port", self.ssh_port)?;
        validate::port("snmp_port", self.snmp_port)?;
        validate::require("username", &self.username)?;
        if let Some(pw) = self.entered_password() {
            validate::password(pw.expose_secret())?;
        }
        if self.group_id.is_none() {
            return Err(CoreError::validation("group_id", "is required"));
        }
        Ok(())
    }

    pub(crate) fn to_payload(&self) -> Result<ProxyPayload, CoreError> {
        let group_id = self
            .group_id
            .ok_or_else(|| CoreError::validation("group_id", "is required"))?;
        Ok(ProxyPayload {
            name: self.name.trim().to_owned(),
            host: self.host.trim().to_owned(),
            ssh_port: self.ssh_port,
            snmp_port: self.snmp_port,
            snmp_version: self.snmp_version.to_string(),
            snmp_community: self.snmp_community.trim().to_owned(),
            username: self.username.trim().to_owned(),
            password: self.entered_password().cloned(),
            group_id: group_id.get(),
            is_main: self.is_main,
            is_active: self.is_active,
            description: self.description.trim().to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> ProxyForm {
        ProxyForm {
            name: "PROD-MAIN-01".into(),
            host: "192.168.1.10".into(),
            password: Some(SecretString::from("Secure1!".to_string())),
            group_id: Some(GroupId(1)),
            ..ProxyForm::default()
        }
    }

    #[test]
    fn weak_password_is_rejected_but_absent_one_is_fine() {
        let mut form = filled();
        form.password = Some(SecretString::from("password".to_string()));
        let err = form.validate().expect_err("weak password");
        assert!(err.to_string().starts_with("password"));

        form.password = None;
        assert!(form.validate().is_ok());
    }

    #[test]
    fn empty_password_on_edit_is_not_sent() {
        let mut form = filled();
        form.mode = FormMode::Edit(ProxyId(4));
        form.password = Some(SecretString::from(String::new()));
        assert!(form.validate().is_ok());
        let payload = form.to_payload().expect("payload");
        assert!(payload.password.is_none());
    }

    #[test]
    fn missing_group_is_rejected() {
        let mut form = filled();
        form.group_id = None;
        assert!(form.validate().is_err());
    }

    #[test]
    fn blank_group_name_is_rejected() {
        assert!(GroupForm::create("  ").validate().is_err());
        assert!(GroupForm::create("Staging").validate().is_ok());
    }
}
