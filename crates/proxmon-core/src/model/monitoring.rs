use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::ids::{GroupId, ProxyId};
use super::resource::Thresholds;
use crate::error::CoreError;

/// Backend-wide monitoring settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonitoringConfig {
    /// Metric name to SNMP OID.
    pub snmp_oids: BTreeMap<String, String>,
    /// Shell command the collector runs to list sessions.
    pub session_cmd: Option<String>,
    pub cpu_threshold: u32,
    pub memory_threshold: u32,
    /// Collection interval in seconds.
    pub default_interval: u64,
}

impl MonitoringConfig {
    pub const DEFAULT_CPU_THRESHOLD: u32 = 80;
    pub const DEFAULT_MEMORY_THRESHOLD: u32 = 85;
    pub const DEFAULT_INTERVAL: u64 = 5;

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            cpu: f64::from(self.cpu_threshold),
            memory: f64::from(self.memory_threshold),
        }
    }
}

/// Partial monitoring settings update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigUpdate {
    pub snmp_oids: Option<BTreeMap<String, String>>,
    pub session_cmd: Option<String>,
    pub cpu_threshold: Option<u32>,
    pub memory_threshold: Option<u32>,
    pub default_interval: Option<u64>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.is_empty() {
            return Err(CoreError::validation("config", "nothing to update"));
        }
        for (field, value) in [
            ("cpu_threshold", self.cpu_threshold),
            ("memory_threshold", self.memory_threshold),
        ] {
            if let Some(v) = value {
                if !(1..=100).contains(&v) {
                    return Err(CoreError::validation(field, "must be between 1 and 100"));
                }
            }
        }
        if self.default_interval == Some(0) {
            return Err(CoreError::validation(
                "default_interval",
                "must be at least 1 second",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupStat {
    pub group_id: Option<GroupId>,
    pub total: u32,
    pub active: u32,
    pub offline: u32,
}

/// Fleet-wide proxy counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonitoringSummary {
    pub total: u32,
    pub active: u32,
    pub offline: u32,
    /// Proxies with SNMP configured.
    pub configured: u32,
    pub groups: Vec<GroupStat>,
}

/// Collector status for one proxy. `status` holds the collector's
/// report as-is; its keys vary by appliance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProxyStatus {
    pub proxy_id: ProxyId,
    pub proxy_name: String,
    pub host: String,
    pub group_name: Option<String>,
    pub is_main: bool,
    pub status: BTreeMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_updates_are_range_checked() {
        let ok = ConfigUpdate {
            cpu_threshold: Some(70),
            ..ConfigUpdate::default()
        };
        assert!(ok.validate().is_ok());

        let bad = ConfigUpdate {
            memory_threshold: Some(101),
            ..ConfigUpdate::default()
        };
        assert!(bad.validate().is_err());
        assert!(ConfigUpdate::default().validate().is_err());
    }
}
