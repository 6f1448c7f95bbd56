// ── Domain model ──
//
// Canonical representations of backend entities. Consumers (the CLI)
// depend on these, never on the wire types in `proxmon-api`.

pub mod form;
pub mod group;
pub mod ids;
pub mod monitoring;
pub mod proxy;
pub mod resource;
pub mod session;

// ── Re-exports ──────────────────────────────────────────────────────

pub use form::{FormMode, GroupForm, ProxyForm};
pub use group::{Group, PROTECTED_GROUP_NAME};
pub use ids::{GroupId, ProxyId, SessionId};
pub use monitoring::{ConfigUpdate, GroupStat, MonitoringConfig, MonitoringSummary, ProxyStatus};
pub use proxy::{ConnectionTestResult, Proxy, ProxyFilter, SnmpVersion};
pub use resource::{
    METRIC_KEYS, MetricLevel, MetricValue, Metrics, ResourceSample, ResourceUpdate, Thresholds,
};
pub use session::{
    CollectOutcome, ProxySessions, SessionFilter, SessionPage, SessionRecord, SessionWindow,
    SessionWindowRequest,
};
