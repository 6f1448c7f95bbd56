use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::ids::{GroupId, ProxyId, SessionId};

/// A persisted proxy session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRecord {
    pub id: SessionId,
    pub proxy_id: Option<ProxyId>,
    pub group_id: Option<GroupId>,
    pub client_ip: Option<String>,
    pub server_ip: Option<String>,
    pub protocol: Option<String>,
    pub user: Option<String>,
    pub url: Option<String>,
    pub policy: Option<String>,
    pub category: Option<String>,
    pub transaction: Option<String>,
    /// Session start as reported by the appliance (free-form).
    pub creation_time: Option<String>,
    pub client_bytes_sent: Option<u64>,
    pub client_bytes_received: Option<u64>,
    pub server_bytes_sent: Option<u64>,
    pub server_bytes_received: Option<u64>,
    pub age_seconds: Option<u64>,
    pub in_use: Option<String>,
    /// When the record was collected.
    pub created_at: Option<DateTime<Utc>>,
    /// Appliance columns without a dedicated field.
    pub extra: BTreeMap<String, Value>,
}

impl SessionRecord {
    /// Bytes moved in both directions on both legs.
    pub fn total_bytes(&self) -> u64 {
        [
            self.client_bytes_sent,
            self.client_bytes_received,
            self.server_bytes_sent,
            self.server_bytes_received,
        ]
        .into_iter()
        .flatten()
        .fold(0, u64::saturating_add)
    }
}

/// Search filters for the session browser and CSV export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFilter {
    pub group_id: Option<GroupId>,
    pub proxy_id: Option<ProxyId>,
    /// Free-text match across user, URL, and addresses.
    pub keyword: Option<String>,
    pub protocol: Option<String>,
    pub status: Option<String>,
    pub client_ip: Option<String>,
    pub server_ip: Option<String>,
    pub user: Option<String>,
    pub url: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// One page of session search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionPage {
    pub items: Vec<SessionRecord>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl SessionPage {
    pub fn page_count(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.page_size))
    }
}

/// Offset/length window request for server-side paging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionWindowRequest {
    pub draw: u32,
    pub start: u32,
    pub length: u32,
    pub search: Option<String>,
    pub group_id: Option<GroupId>,
    pub proxy_id: Option<ProxyId>,
}

/// Server-side paging answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionWindow {
    pub draw: u32,
    pub total: u64,
    pub filtered: u64,
    pub records: Vec<SessionRecord>,
}

/// Live session listing for one proxy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProxySessions {
    pub proxy_id: ProxyId,
    pub proxy_name: String,
    pub host: String,
    pub group_name: Option<String>,
    pub is_main: bool,
    pub unique_clients: u64,
    pub total_sessions: u64,
    /// Raw appliance rows, column name to text.
    pub sessions: Vec<BTreeMap<String, String>>,
}

/// Result of triggering a session collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectOutcome {
    pub success: bool,
    pub saved: Option<u64>,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        let page = SessionPage {
            items: Vec::new(),
            total: 201,
            page: 1,
            page_size: 100,
        };
        assert_eq!(page.page_count(), 3);
    }
}
