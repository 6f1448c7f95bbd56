// ── API-to-domain type conversions ──
//
// Bridges raw `proxmon_api` response types into canonical `proxmon_core::model`
// domain types. Each `From` impl parses timestamps, wraps ids, and fills
// sensible defaults for missing optional data.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use proxmon_api::models::{
    ApiGroup, ApiGroupStat, ApiMonitoringConfig, ApiProxy, ApiProxySessions, ApiProxyStatus,
    ApiResourceEntry, ApiSessionRecord, ApiSummary, CollectResult, ConnectionTest, DataTablesPage,
    DataTablesQuery, MonitoringConfigPatch, ProxyQuery, SessionQuery, SessionSearchPage,
};

use crate::model::{
    CollectOutcome, ConfigUpdate, ConnectionTestResult, Group, GroupId, GroupStat, MetricValue,
    Metrics, MonitoringConfig, MonitoringSummary, Proxy, ProxyFilter, ProxyId, ProxySessions,
    ProxyStatus, ResourceSample, SessionFilter, SessionId, SessionPage, SessionRecord,
    SessionWindow, SessionWindowRequest, SnmpVersion,
};

// ── Helpers ────────────────────────────────────────────────────────

/// Parse a backend timestamp. Accepts RFC 3339 and the naive ISO form
/// (`2024-06-15T10:30:00.123456`), which is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn parse_opt_timestamp(raw: Option<&String>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| parse_timestamp(s))
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// ── Groups and proxies ─────────────────────────────────────────────

impl From<ApiGroup> for Group {
    fn from(g: ApiGroup) -> Self {
        Self {
            id: GroupId(g.id),
            created_at: parse_opt_timestamp(g.created_at.as_ref()),
            updated_at: parse_opt_timestamp(g.updated_at.as_ref()),
            name: g.name,
            description: non_empty(g.description),
            proxy_count: g.proxy_count.unwrap_or(0),
            main_server: non_empty(g.main_server),
        }
    }
}

impl From<ApiProxy> for Proxy {
    fn from(p: ApiProxy) -> Self {
        Self {
            id: ProxyId(p.id),
            created_at: parse_opt_timestamp(p.created_at.as_ref()),
            updated_at: parse_opt_timestamp(p.updated_at.as_ref()),
            name: p.name,
            host: p.host,
            ssh_port: p.ssh_port.unwrap_or(22),
            snmp_port: p.snmp_port.unwrap_or(161),
            snmp_version: p
                .snmp_version
                .as_deref()
                .and_then(|v| v.parse().ok())
                .unwrap_or(SnmpVersion::V2c),
            snmp_community: p.snmp_community.unwrap_or_else(|| "public".into()),
            username: p.username.unwrap_or_else(|| "root".into()),
            group_id: p.group_id.map(GroupId),
            group_name: non_empty(p.group_name),
            is_main: p.is_main,
            is_active: p.is_active,
            description: non_empty(p.description),
        }
    }
}

impl From<&ProxyFilter> for ProxyQuery {
    fn from(f: &ProxyFilter) -> Self {
        Self {
            group_id: f.group_id.map(GroupId::get),
            is_main: f.main_only.then_some(true),
        }
    }
}

impl From<ConnectionTest> for ConnectionTestResult {
    fn from(t: ConnectionTest) -> Self {
        Self {
            success: t.success,
            message: t.message,
            timestamp: t.timestamp,
        }
    }
}

// ── Monitoring ─────────────────────────────────────────────────────

impl From<ApiMonitoringConfig> for MonitoringConfig {
    fn from(c: ApiMonitoringConfig) -> Self {
        Self {
            snmp_oids: c.snmp_oids,
            session_cmd: non_empty(c.session_cmd),
            cpu_threshold: c
                .cpu_threshold
                .unwrap_or(MonitoringConfig::DEFAULT_CPU_THRESHOLD),
            memory_threshold: c
                .memory_threshold
                .unwrap_or(MonitoringConfig::DEFAULT_MEMORY_THRESHOLD),
            default_interval: c
                .default_interval
                .unwrap_or(MonitoringConfig::DEFAULT_INTERVAL),
        }
    }
}

impl From<&ConfigUpdate> for MonitoringConfigPatch {
    fn from(u: &ConfigUpdate) -> Self {
        Self {
            snmp_oids: u.snmp_oids.clone(),
            session_cmd: u.session_cmd.clone(),
            cpu_threshold: u.cpu_threshold,
            memory_threshold: u.memory_threshold,
            default_interval: u.default_interval,
        }
    }
}

impl From<ApiResourceEntry> for ResourceSample {
    fn from(e: ApiResourceEntry) -> Self {
        let d = e.resource_data;
        let metrics = Metrics {
            cpu: MetricValue::from_json(&d.cpu),
            memory: MetricValue::from_json(&d.memory),
            uc: MetricValue::from_json(&d.uc),
            cc: MetricValue::from_json(&d.cc),
            cs: MetricValue::from_json(&d.cs),
            http: MetricValue::from_json(&d.http),
            https: MetricValue::from_json(&d.https),
            ftp: MetricValue::from_json(&d.ftp),
        };
        Self {
            proxy_id: ProxyId(e.proxy_id),
            proxy_name: e.proxy_name,
            host: e.host,
            group_name: non_empty(e.group_name),
            is_main: e.is_main,
            date: d.date,
            time: d.time,
            device: non_empty(d.device),
            metrics,
            total_sessions: MetricValue::from_json(&d.total_sessions),
            timestamp: None,
        }
    }
}

impl From<ApiGroupStat> for GroupStat {
    fn from(s: ApiGroupStat) -> Self {
        Self {
            group_id: s.group_id.map(GroupId),
            total: s.total,
            active: s.active,
            offline: s.offline,
        }
    }
}

impl From<ApiSummary> for MonitoringSummary {
    fn from(s: ApiSummary) -> Self {
        Self {
            total: s.total_proxies,
            active: s.active_proxies,
            offline: s.offline_proxies,
            configured: s.configured_proxies,
            groups: s.group_stats.into_iter().map(GroupStat::from).collect(),
        }
    }
}

// ── Sessions ───────────────────────────────────────────────────────

impl From<ApiSessionRecord> for SessionRecord {
    fn from(r: ApiSessionRecord) -> Self {
        Self {
            id: SessionId(r.id),
            proxy_id: r.proxy_id.map(ProxyId),
            group_id: r.group_id.map(GroupId),
            created_at: parse_opt_timestamp(r.created_at.as_ref()),
            client_ip: non_empty(r.client_ip),
            server_ip: non_empty(r.server_ip),
            protocol: non_empty(r.protocol),
            user: non_empty(r.user),
            url: non_empty(r.url),
            policy: non_empty(r.policy),
            category: non_empty(r.category),
            transaction: non_empty(r.transaction),
            creation_time: non_empty(r.creation_time),
            client_bytes_sent: r.cl_bytes_sent,
            client_bytes_received: r.cl_bytes_received,
            server_bytes_sent: r.srv_bytes_sent,
            server_bytes_received: r.srv_bytes_received,
            age_seconds: r.age_seconds,
            in_use: non_empty(r.in_use),
            extra: r.extra.unwrap_or_default(),
        }
    }
}

impl From<SessionSearchPage> for SessionPage {
    fn from(p: SessionSearchPage) -> Self {
        Self {
            items: p.items.into_iter().map(SessionRecord::from).collect(),
            total: p.total,
            page: p.page,
            page_size: p.page_size,
        }
    }
}

impl From<DataTablesPage> for SessionWindow {
    fn from(p: DataTablesPage) -> Self {
        Self {
            draw: p.draw,
            total: p.records_total,
            filtered: p.records_filtered,
            records: p.data.into_iter().map(SessionRecord::from).collect(),
        }
    }
}

impl From<&SessionWindowRequest> for DataTablesQuery {
    fn from(r: &SessionWindowRequest) -> Self {
        Self {
            draw: r.draw,
            start: r.start,
            length: r.length,
            search: r.search.clone().filter(|s| !s.trim().is_empty()),
            group_id: r.group_id.map(GroupId::get),
            proxy_id: r.proxy_id.map(ProxyId::get),
        }
    }
}

impl From<&SessionFilter> for SessionQuery {
    fn from(f: &SessionFilter) -> Self {
        let text = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
        Self {
            group_id: f.group_id.map(GroupId::get),
            proxy_id: f.proxy_id.map(ProxyId::get),
            keyword: text(&f.keyword),
            protocol: text(&f.protocol),
            status: text(&f.status),
            client_ip: text(&f.client_ip),
            server_ip: text(&f.server_ip),
            user: text(&f.user),
            url: text(&f.url),
            page: f.page,
            page_size: f.page_size,
        }
    }
}

impl From<ApiProxyStatus> for ProxyStatus {
    fn from(s: ApiProxyStatus) -> Self {
        Self {
            proxy_id: ProxyId(s.proxy_id),
            proxy_name: s.proxy_name,
            host: s.host,
            group_name: non_empty(s.group_name),
            is_main: s.is_main,
            status: s.status,
        }
    }
}

impl From<ApiProxySessions> for ProxySessions {
    fn from(s: ApiProxySessions) -> Self {
        Self {
            proxy_id: ProxyId(s.proxy_id),
            proxy_name: s.proxy_name,
            host: s.host,
            group_name: non_empty(s.group_name),
            is_main: s.is_main,
            unique_clients: s.unique_clients,
            total_sessions: s.total_sessions,
            sessions: s
                .sessions
                .into_iter()
                .map(|row| {
                    row.iter()
                        .map(|(k, v)| (k.clone(), value_to_text(v)))
                        .collect::<BTreeMap<_, _>>()
                })
                .collect(),
        }
    }
}

impl From<CollectResult> for CollectOutcome {
    fn from(r: CollectResult) -> Self {
        Self {
            success: r.success,
            saved: r.saved,
            message: non_empty(r.message),
        }
    }
}
