// Backend wire types
//
// Shapes mirror the JSON the backend emits. Fields the backend sometimes
// omits are `Option` or carry `#[serde(default)]`; `proxmon-core`
// converts these into canonical domain types.

use std::collections::BTreeMap;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

// ── Envelopes ───────────────────────────────────────────────────────

/// List endpoints answer either with a bare array or `{ "data": [...] }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Envelope {
        data: Vec<T>,
        #[serde(default)]
        message: Option<String>,
    },
    Bare(Vec<T>),
}

impl<T> Listing<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Envelope { data, .. } | Self::Bare(data) => data,
        }
    }
}

// ── Groups ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiGroup {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub proxy_count: Option<u32>,
    #[serde(default)]
    pub main_server: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Body for `POST /api/groups` and `PUT /api/groups/:id`.
#[derive(Debug, Clone, Serialize)]
pub struct GroupPayload {
    pub name: String,
    pub description: String,
}

// ── Proxies ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiProxy {
    pub id: i64,
    pub name: String,
    pub host: String,
    #[serde(default)]
    pub ssh_port: Option<u16>,
    #[serde(default)]
    pub snmp_port: Option<u16>,
    #[serde(default)]
    pub snmp_version: Option<String>,
    #[serde(default)]
    pub snmp_community: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub is_main: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Body for `POST /api/proxies` and `PUT /api/proxies/:id`.
///
/// `password` is omitted entirely when `None` so an edit keeps the
/// stored credential.
#[derive(Debug, Clone, Serialize)]
pub struct ProxyPayload {
    pub name: String,
    pub host: String,
    pub ssh_port: u16,
    pub snmp_port: u16,
    pub snmp_version: String,
    pub snmp_community: String,
    pub username: String,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_secret"
    )]
    pub password: Option<SecretString>,
    pub group_id: i64,
    pub is_main: bool,
    pub is_active: bool,
    pub description: String,
}

fn serialize_secret<S: Serializer>(
    secret: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(s) => serializer.serialize_str(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}

/// Query for `GET /api/proxies`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProxyQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_main: Option<bool>,
}

/// Result of a connectivity test.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionTest {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

// ── Monitoring ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiMonitoringConfig {
    pub id: Option<i64>,
    pub snmp_oids: BTreeMap<String, String>,
    pub session_cmd: Option<String>,
    pub cpu_threshold: Option<u32>,
    pub memory_threshold: Option<u32>,
    pub default_interval: Option<u64>,
    pub is_active: Option<bool>,
}

/// `PUT /api/monitoring/config` answers `{success, config}`; older
/// backends return the bare config.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ConfigEnvelope {
    Wrapped { config: ApiMonitoringConfig },
    Bare(ApiMonitoringConfig),
}

impl ConfigEnvelope {
    pub fn into_config(self) -> ApiMonitoringConfig {
        match self {
            Self::Wrapped { config } | Self::Bare(config) => config,
        }
    }
}

/// Partial update for the monitoring config. Only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MonitoringConfigPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snmp_oids: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_cmd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_threshold: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_threshold: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_interval: Option<u64>,
}

impl MonitoringConfigPatch {
    pub fn is_empty(&self) -> bool {
        self.snmp_oids.is_none()
            && self.session_cmd.is_none()
            && self.cpu_threshold.is_none()
            && self.memory_threshold.is_none()
            && self.default_interval.is_none()
    }
}

/// Raw metric block. Metric values are numbers, numeric strings, or the
/// literal `"error"` when collection failed.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiResourceData {
    pub date: String,
    pub time: String,
    pub device: Option<String>,
    pub cpu: Value,
    pub memory: Value,
    pub uc: Value,
    pub cc: Value,
    pub cs: Value,
    pub http: Value,
    pub https: Value,
    pub ftp: Value,
    pub total_sessions: Value,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiResourceEntry {
    pub proxy_id: i64,
    #[serde(default)]
    pub proxy_name: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub is_main: bool,
    #[serde(default)]
    pub resource_data: ApiResourceData,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiGroupStat {
    pub group_id: Option<i64>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub active: u32,
    #[serde(default)]
    pub offline: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiSummary {
    #[serde(default)]
    pub total_proxies: u32,
    #[serde(default)]
    pub active_proxies: u32,
    #[serde(default)]
    pub offline_proxies: u32,
    #[serde(default)]
    pub configured_proxies: u32,
    #[serde(default)]
    pub group_stats: Vec<ApiGroupStat>,
}

/// Collector status for one proxy (`GET /api/monitoring/status/{id}`).
/// The `status` block is whatever the collector reported.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiProxyStatus {
    pub proxy_id: i64,
    #[serde(default)]
    pub proxy_name: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub is_main: bool,
    #[serde(default)]
    pub status: BTreeMap<String, Value>,
}

/// Query for `GET /api/monitoring/resources`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResourceQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
}

// ── Sessions ────────────────────────────────────────────────────────

/// Live session summary for one proxy (`GET /api/monitoring/sessions`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiProxySessions {
    pub proxy_id: i64,
    #[serde(default)]
    pub proxy_name: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub is_main: bool,
    #[serde(default)]
    pub unique_clients: u64,
    #[serde(default)]
    pub total_sessions: u64,
    #[serde(default)]
    pub sessions: Vec<BTreeMap<String, Value>>,
}

/// A persisted session record as returned by search/detail endpoints.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiSessionRecord {
    pub id: i64,
    pub proxy_id: Option<i64>,
    pub group_id: Option<i64>,
    pub client_ip: Option<String>,
    pub server_ip: Option<String>,
    pub protocol: Option<String>,
    pub user: Option<String>,
    pub url: Option<String>,
    pub policy: Option<String>,
    pub category: Option<String>,
    pub transaction: Option<String>,
    pub creation_time: Option<String>,
    pub cl_bytes_sent: Option<u64>,
    pub cl_bytes_received: Option<u64>,
    pub srv_bytes_sent: Option<u64>,
    pub srv_bytes_received: Option<u64>,
    pub age_seconds: Option<u64>,
    pub in_use: Option<String>,
    pub created_at: Option<String>,
    pub extra: Option<BTreeMap<String, Value>>,
}

/// Filters shared by `sessions/search` and `sessions/export`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_id: Option<i64>,
    #[serde(rename = "q", skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionSearchPage {
    #[serde(default)]
    pub items: Vec<ApiSessionRecord>,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}
fn default_page_size() -> u32 {
    100
}

/// Server-side paging request for `sessions/datatables`.
#[derive(Debug, Clone, Serialize)]
pub struct DataTablesQuery {
    pub draw: u32,
    pub start: u32,
    pub length: u32,
    #[serde(rename = "search[value]", skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataTablesPage {
    #[serde(default)]
    pub draw: u32,
    #[serde(rename = "recordsTotal", default)]
    pub records_total: u64,
    #[serde(rename = "recordsFiltered", default)]
    pub records_filtered: u64,
    #[serde(default)]
    pub data: Vec<ApiSessionRecord>,
}

/// Outcome of a session collection trigger.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CollectResult {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub saved: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
}
