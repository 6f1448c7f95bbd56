use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::{Display, EnumString};

use super::ids::{GroupId, ProxyId};

/// SNMP protocol version used to poll a proxy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SnmpVersion {
    #[strum(to_string = "v1", serialize = "1")]
    V1,
    #[default]
    #[strum(to_string = "v2c", serialize = "2c", serialize = "2")]
    V2c,
    #[strum(to_string = "v3", serialize = "3")]
    V3,
}

/// A monitored proxy appliance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Proxy {
    pub id: ProxyId,
    pub name: String,
    pub host: String,
    pub ssh_port: u16,
    pub snmp_port: u16,
    pub snmp_version: SnmpVersion,
    pub snmp_community: String,
    pub username: String,
    pub group_id: Option<GroupId>,
    pub group_name: Option<String>,
    pub is_main: bool,
    pub is_active: bool,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Filter for proxy listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProxyFilter {
    pub group_id: Option<GroupId>,
    pub main_only: bool,
}

/// Outcome of an SSH/SNMP reachability test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionTestResult {
    pub success: bool,
    pub message: String,
    pub timestamp: Option<String>,
}
