// ── Resource samples ──
//
// One sample per proxy: CPU/memory utilisation plus session counters.
// The collector reports failed metrics as the literal "error", which is
// kept distinct from a metric that was simply never reported.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use strum::Display;

use super::ids::ProxyId;

/// Metric keys carried by a resource sample, in display order.
pub const METRIC_KEYS: [&str; 8] = ["cpu", "memory", "uc", "cc", "cs", "http", "https", "ftp"];

/// Fraction of a threshold at which a metric turns to `Warning`.
pub const WARNING_RATIO: f64 = 0.8;

// ── MetricValue ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum MetricValue {
    Value(f64),
    /// Collection failed for this metric.
    Error,
    /// Not reported.
    #[default]
    Missing,
}

impl MetricValue {
    /// Interpret a raw JSON metric: numbers and numeric strings are
    /// values, `"error"` or any other text is an error, null is missing.
    pub fn from_json(raw: &Value) -> Self {
        match raw {
            Value::Number(n) => n.as_f64().map_or(Self::Error, Self::Value),
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    Self::Missing
                } else {
                    s.parse::<f64>().map_or(Self::Error, Self::Value)
                }
            }
            Value::Null => Self::Missing,
            _ => Self::Error,
        }
    }

    pub fn as_f64(self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) if v.fract().abs() < f64::EPSILON => write!(f, "{v:.0}"),
            Self::Value(v) => write!(f, "{v:.1}"),
            Self::Error => f.write_str("error"),
            Self::Missing => f.write_str("-"),
        }
    }
}

impl Serialize for MetricValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => serializer.serialize_f64(*v),
            Self::Error => serializer.serialize_str("error"),
            Self::Missing => serializer.serialize_none(),
        }
    }
}

// ── Threshold classification ────────────────────────────────────────

/// Alert level of a metric against its threshold. Ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MetricLevel {
    Normal,
    Unknown,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub cpu: f64,
    pub memory: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cpu: 80.0,
            memory: 85.0,
        }
    }
}

impl Thresholds {
    /// `Critical` at or above `threshold`, `Warning` at or above 80% of
    /// it, `Unknown` when the metric failed or is absent.
    pub fn classify(value: MetricValue, threshold: f64) -> MetricLevel {
        match value {
            MetricValue::Value(v) if v >= threshold => MetricLevel::Critical,
            MetricValue::Value(v) if v >= threshold * WARNING_RATIO => MetricLevel::Warning,
            MetricValue::Value(_) => MetricLevel::Normal,
            MetricValue::Error | MetricValue::Missing => MetricLevel::Unknown,
        }
    }
}

// ── Metrics ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub cpu: MetricValue,
    pub memory: MetricValue,
    /// Unique clients.
    pub uc: MetricValue,
    /// Client connections.
    pub cc: MetricValue,
    /// Server connections.
    pub cs: MetricValue,
    pub http: MetricValue,
    pub https: MetricValue,
    pub ftp: MetricValue,
}

impl Metrics {
    pub fn get(&self, key: &str) -> Option<MetricValue> {
        let value = match key {
            "cpu" => self.cpu,
            "memory" => self.memory,
            "uc" => self.uc,
            "cc" => self.cc,
            "cs" => self.cs,
            "http" => self.http,
            "https" => self.https,
            "ftp" => self.ftp,
            _ => return None,
        };
        Some(value)
    }

    /// Set a metric by key. Returns `false` for unknown keys.
    pub fn set(&mut self, key: &str, value: MetricValue) -> bool {
        let slot = match key {
            "cpu" => &mut self.cpu,
            "memory" => &mut self.memory,
            "uc" => &mut self.uc,
            "cc" => &mut self.cc,
            "cs" => &mut self.cs,
            "http" => &mut self.http,
            "https" => &mut self.https,
            "ftp" => &mut self.ftp,
            _ => return false,
        };
        *slot = value;
        true
    }

    pub fn has_errors(&self) -> bool {
        METRIC_KEYS
            .iter()
            .filter_map(|k| self.get(k))
            .any(MetricValue::is_error)
    }
}

// ── ResourceSample ──────────────────────────────────────────────────

/// Latest resource reading for one proxy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceSample {
    pub proxy_id: ProxyId,
    pub proxy_name: String,
    pub host: String,
    pub group_name: Option<String>,
    pub is_main: bool,
    pub date: String,
    pub time: String,
    pub device: Option<String>,
    pub metrics: Metrics,
    pub total_sessions: MetricValue,
    /// Timestamp of the last pushed update merged into this sample.
    pub timestamp: Option<String>,
}

impl ResourceSample {
    /// Worst of the CPU and memory levels.
    pub fn level(&self, thresholds: &Thresholds) -> MetricLevel {
        Thresholds::classify(self.metrics.cpu, thresholds.cpu)
            .max(Thresholds::classify(self.metrics.memory, thresholds.memory))
    }

    /// Sample seeded from a pushed update for a proxy not yet on the board.
    pub fn from_update(update: &ResourceUpdate) -> Self {
        let mut sample = Self {
            proxy_id: update.proxy_id,
            proxy_name: String::new(),
            host: String::new(),
            group_name: None,
            is_main: false,
            date: String::new(),
            time: String::new(),
            device: None,
            metrics: Metrics::default(),
            total_sessions: MetricValue::Missing,
            timestamp: None,
        };
        sample.merge(update);
        sample
    }

    /// Overlay the fields carried by `update`; everything else is kept.
    pub fn merge(&mut self, update: &ResourceUpdate) {
        if let Some(name) = &update.proxy_name {
            self.proxy_name.clone_from(name);
        }
        if update.timestamp.is_some() {
            self.timestamp.clone_from(&update.timestamp);
        }
        for (key, raw) in &update.data {
            let value = MetricValue::from_json(raw);
            if self.metrics.set(key, value) {
                continue;
            }
            match key.as_str() {
                "total_sessions" => self.total_sessions = value,
                "date" => {
                    if let Some(s) = raw.as_str() {
                        s.clone_into(&mut self.date);
                    }
                }
                "time" => {
                    if let Some(s) = raw.as_str() {
                        s.clone_into(&mut self.time);
                    }
                }
                "device" => self.device = raw.as_str().map(str::to_owned),
                _ => {}
            }
        }
    }
}

/// A pushed resource update for one proxy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResourceUpdate {
    pub proxy_id: ProxyId,
    #[serde(default)]
    pub proxy_name: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub data: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn metric_values_parse_numbers_strings_and_error_markers() {
        assert_eq!(MetricValue::from_json(&json!(42.5)), MetricValue::Value(42.5));
        assert_eq!(MetricValue::from_json(&json!("17")), MetricValue::Value(17.0));
        assert_eq!(MetricValue::from_json(&json!("error")), MetricValue::Error);
        assert_eq!(MetricValue::from_json(&json!(null)), MetricValue::Missing);
        assert_eq!(MetricValue::Value(3.0).to_string(), "3");
        assert_eq!(MetricValue::Value(3.27).to_string(), "3.3");
    }

    #[test]
    fn classification_boundaries() {
        let t = 80.0;
        assert_eq!(Thresholds::classify(MetricValue::Value(80.0), t), MetricLevel::Critical);
        assert_eq!(Thresholds::classify(MetricValue::Value(64.0), t), MetricLevel::Warning);
        assert_eq!(Thresholds::classify(MetricValue::Value(63.9), t), MetricLevel::Normal);
        assert_eq!(Thresholds::classify(MetricValue::Error, t), MetricLevel::Unknown);
    }

    #[test]
    fn merge_overlays_only_reported_fields() {
        let update: ResourceUpdate = serde_json::from_value(json!({
            "proxy_id": 3,
            "proxy_name": "PROD-MAIN-01",
            "timestamp": "2024-06-15T10:30:00",
            "data": { "cpu": 91, "memory": "error", "total_sessions": 120 }
        }))
        .expect("update parses");

        let mut sample = ResourceSample::from_update(&update);
        sample.host = "192.168.1.10".into();
        sample.metrics.uc = MetricValue::Value(12.0);

        let second: ResourceUpdate = serde_json::from_value(json!({
            "proxy_id": 3,
            "data": { "cpu": 10 }
        }))
        .expect("update parses");
        sample.merge(&second);

        assert_eq!(sample.proxy_name, "PROD-MAIN-01");
        assert_eq!(sample.host, "192.168.1.10");
        assert_eq!(sample.metrics.cpu, MetricValue::Value(10.0));
        assert_eq!(sample.metrics.memory, MetricValue::Error);
        assert_eq!(sample.metrics.uc, MetricValue::Value(12.0));
        assert_eq!(sample.total_sessions, MetricValue::Value(120.0));
        assert_eq!(sample.timestamp.as_deref(), Some("2024-06-15T10:30:00"));
        assert!(sample.metrics.has_errors());
        assert_eq!(sample.level(&Thresholds::default()), MetricLevel::Unknown);
    }
}
