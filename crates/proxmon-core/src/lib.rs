//! Data layer between `proxmon-api` and the `proxmon` CLI.
//!
//! This crate owns the business logic and domain model of the console:
//!
//! - **[`Console`]**: Facade over the backend API: group and proxy CRUD
//!   with client-side validation, monitoring queries, and the session
//!   browser. Validation failures never reach the network.
//!
//! - **[`RefreshController`]**: Periodic refresh scheduling with a
//!   countdown display. A single worker runs refresh cycles; a request
//!   arriving while one is in flight is dropped, so cycles never overlap.
//!
//! - **[`ResourceBoard`]**: Latest resource sample per proxy, with
//!   upsert-then-prune snapshot application and push-update merging.
//!
//! - **Domain model** ([`model`]): Canonical types (`Proxy`, `Group`,
//!   `ResourceSample`, `SessionRecord`, forms) converted from wire types.

pub mod config;
pub mod console;
pub mod convert;
pub mod error;
pub mod model;
pub mod notify;
pub mod refresh;
pub mod status;
pub mod store;
pub mod validate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ConsoleConfig, TlsVerification};
pub use console::{Console, ResourceRefresh, TestMode};
pub use error::CoreError;
pub use notify::{CollectingNotifier, Level, Notification, Notifier, TracingNotifier};
pub use refresh::{Countdown, RefreshController, RefreshTask};
pub use status::StatusMessages;
pub use store::ResourceBoard;

pub use model::{
    CollectOutcome, ConfigUpdate, ConnectionTestResult, FormMode, Group, GroupForm, GroupId,
    GroupStat, MetricLevel, MetricValue, Metrics, MonitoringConfig, MonitoringSummary, Proxy,
    ProxyFilter, ProxyForm, ProxyId, ProxySessions, ProxyStatus, ResourceSample, ResourceUpdate,
    SessionFilter, SessionId, SessionPage, SessionRecord, SessionWindow, SessionWindowRequest,
    SnmpVersion, Thresholds,
};
