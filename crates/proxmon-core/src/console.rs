// ── Console facade ──
//
// Entry point for every operation the CLI performs. Forms are validated
// before any request is built; a failed check is surfaced as a warning
// notification and never reaches the network. HTTP failures are phrased
// through per-operation `StatusMessages`.

use std::sync::Arc;

use bytes::Bytes;
use futures_util::future::BoxFuture;
use tracing::{debug, info};

use proxmon_api::models::{ProxyQuery, ResourceQuery, SessionQuery};
use proxmon_api::{ApiClient, TlsMode, TransportConfig};

use crate::config::{ConsoleConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{
    CollectOutcome, ConfigUpdate, ConnectionTestResult, FormMode, Group, GroupForm, GroupId,
    MonitoringConfig, MonitoringSummary, Proxy, ProxyFilter, ProxyForm, ProxyId, ProxySessions,
    ProxyStatus, ResourceSample, SessionFilter, SessionId, SessionPage, SessionRecord,
    SessionWindow, SessionWindowRequest,
};
use crate::notify::{Notification, Notifier, TracingNotifier};
use crate::refresh::RefreshTask;
use crate::status::StatusMessages;
use crate::store::ResourceBoard;
use crate::validate;

/// Connectivity test depth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum TestMode {
    /// SSH reachability only.
    #[default]
    Quick,
    /// SSH plus an SNMP poll through the monitoring service.
    Deep,
}

fn proxy_messages() -> StatusMessages {
    StatusMessages::default().with(409, "duplicate name/IP")
}

fn group_messages() -> StatusMessages {
    StatusMessages::default().with(409, "group name already exists")
}

fn status_messages() -> StatusMessages {
    StatusMessages::default().with(400, "SSH credentials not configured")
}

fn transport_for(config: &ConsoleConfig) -> TransportConfig {
    let tls = match &config.tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    };
    TransportConfig {
        tls,
        timeout: config.timeout,
    }
}

struct ConsoleInner {
    config: ConsoleConfig,
    api: ApiClient,
    board: ResourceBoard,
    notifier: Arc<dyn Notifier>,
}

/// Handle to one monitoring backend. Cheaply cloneable.
#[derive(Clone)]
pub struct Console {
    inner: Arc<ConsoleInner>,
}

impl Console {
    pub fn new(config: ConsoleConfig) -> Result<Self, CoreError> {
        Self::with_notifier(config, Arc::new(TracingNotifier))
    }

    pub fn with_notifier(
        config: ConsoleConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, CoreError> {
        let api = ApiClient::new(config.url.clone(), &transport_for(&config))?;
        debug!(url = %config.url, "console client ready");
        Ok(Self {
            inner: Arc::new(ConsoleInner {
                config,
                api,
                board: ResourceBoard::new(),
                notifier,
            }),
        })
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.inner.config
    }

    /// Latest resource samples fetched by [`Console::refresh_resources`].
    pub fn board(&self) -> &ResourceBoard {
        &self.inner.board
    }

    pub fn notifier(&self) -> Arc<dyn Notifier> {
        Arc::clone(&self.inner.notifier)
    }

    fn notify(&self, notification: Notification) {
        self.inner.notifier.notify(notification);
    }

    /// Surface a client-side rejection and hand the error back.
    fn reject(&self, title: &str, err: CoreError) -> CoreError {
        self.notify(Notification::from_error(title, &err));
        err
    }

    // ── Groups ───────────────────────────────────────────────────────

    pub async fn list_groups(&self) -> Result<Vec<Group>, CoreError> {
        let groups = self.inner.api.list_groups().await?;
        Ok(groups.into_iter().map(Group::from).collect())
    }

    /// Resolve a group by numeric id or exact name.
    pub async fn find_group(&self, key: &str) -> Result<Group, CoreError> {
        let id = key.parse::<GroupId>().ok();
        self.list_groups()
            .await?
            .into_iter()
            .find(|g| Some(g.id) == id || g.name == key)
            .ok_or_else(|| CoreError::not_found("group", key))
    }

    /// Create or update, depending on the form's mode.
    pub async fn save_group(&self, form: &GroupForm) -> Result<Group, CoreError> {
        form.validate().map_err(|e| self.reject("Invalid group", e))?;
        let payload = form.to_payload();
        let messages = group_messages();

        let saved = match form.mode {
            FormMode::Create => self.inner.api.create_group(&payload).await,
            FormMode::Edit(id) => self.inner.api.update_group(id.get(), &payload).await,
        }
        .map_err(|e| CoreError::from_api(e, &messages))?;

        let group = Group::from(saved);
        info!(id = %group.id, name = %group.name, "group saved");
        self.notify(Notification::success(
            "Group saved",
            format!("'{}' saved", group.name),
        ));
        Ok(group)
    }

    /// Delete a group. Protected and non-empty groups are refused
    /// without contacting the backend.
    pub async fn delete_group(&self, group: &Group) -> Result<(), CoreError> {
        validate::group_deletable(group).map_err(|e| self.reject("Cannot delete group", e))?;
        self.inner
            .api
            .delete_group(group.id.get())
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    CoreError::not_found("group", group.id)
                } else {
                    CoreError::from_api(e, &group_messages())
                }
            })?;
        info!(id = %group.id, "group deleted");
        self.notify(Notification::success(
            "Group deleted",
            format!("'{}' deleted", group.name),
        ));
        Ok(())
    }

    // ── Proxies ──────────────────────────────────────────────────────

    pub async fn list_proxies(&self, filter: &ProxyFilter) -> Result<Vec<Proxy>, CoreError> {
        let proxies = self
            .inner
            .api
            .list_proxies(&ProxyQuery::from(filter))
            .await?;
        Ok(proxies.into_iter().map(Proxy::from).collect())
    }

    pub async fn get_proxy(&self, id: ProxyId) -> Result<Proxy, CoreError> {
        self.inner
            .api
            .get_proxy(id.get())
            .await
            .map(Proxy::from)
            .map_err(|e| not_found_or(e, "proxy", id, &StatusMessages::default()))
    }

    /// Create or update, depending on the form's mode.
    pub async fn save_proxy(&self, form: &ProxyForm) -> Result<Proxy, CoreError> {
        form.validate().map_err(|e| self.reject("Invalid proxy", e))?;
        let payload = form.to_payload().map_err(|e| self.reject("Invalid proxy", e))?;
        let messages = proxy_messages();

        let saved = match form.mode {
            FormMode::Create => self.inner.api.create_proxy(&payload).await,
            FormMode::Edit(id) => self.inner.api.update_proxy(id.get(), &payload).await,
        };
        let proxy = match (saved, form.mode) {
            (Ok(p), _) => Proxy::from(p),
            (Err(e), FormMode::Edit(id)) => return Err(not_found_or(e, "proxy", id, &messages)),
            (Err(e), FormMode::Create) => return Err(CoreError::from_api(e, &messages)),
        };

        info!(id = %proxy.id, name = %proxy.name, "proxy saved");
        self.notify(Notification::success(
            "Proxy saved",
            format!("'{}' saved", proxy.name),
        ));
        Ok(proxy)
    }

    pub async fn delete_proxy(&self, id: ProxyId) -> Result<(), CoreError> {
        self.inner
            .api
            .delete_proxy(id.get())
            .await
            .map_err(|e| not_found_or(e, "proxy", id, &proxy_messages()))?;
        info!(%id, "proxy deleted");
        self.notify(Notification::success(
            "Proxy deleted",
            format!("proxy {id} deleted"),
        ));
        Ok(())
    }

    /// Test a proxy. The backend answers 200 with `success: false` when
    /// the proxy itself is unreachable.
    pub async fn test_proxy(
        &self,
        id: ProxyId,
        mode: TestMode,
    ) -> Result<ConnectionTestResult, CoreError> {
        let result = match mode {
            TestMode::Quick => self.inner.api.test_proxy(id.get()).await,
            TestMode::Deep => self.inner.api.monitoring_test(id.get()).await,
        }
        .map_err(|e| not_found_or(e, "proxy", id, &StatusMessages::default()))?;
        debug!(%id, %mode, success = result.success, "connection test finished");
        Ok(ConnectionTestResult::from(result))
    }

    // ── Monitoring ───────────────────────────────────────────────────

    pub async fn monitoring_config(&self) -> Result<MonitoringConfig, CoreError> {
        Ok(MonitoringConfig::from(self.inner.api.monitoring_config().await?))
    }

    pub async fn update_monitoring_config(
        &self,
        update: &ConfigUpdate,
    ) -> Result<MonitoringConfig, CoreError> {
        update
            .validate()
            .map_err(|e| self.reject("Invalid monitoring settings", e))?;
        let saved = self
            .inner
            .api
            .update_monitoring_config(&update.into())
            .await?;
        self.notify(Notification::success(
            "Settings saved",
            "monitoring settings updated",
        ));
        Ok(MonitoringConfig::from(saved))
    }

    pub async fn resources(
        &self,
        group: Option<GroupId>,
    ) -> Result<Vec<ResourceSample>, CoreError> {
        let query = ResourceQuery {
            group_id: group.map(GroupId::get),
        };
        let entries = self.inner.api.resources(&query).await?;
        Ok(entries.into_iter().map(ResourceSample::from).collect())
    }

    pub async fn latest_resources(&self) -> Result<Vec<ResourceSample>, CoreError> {
        let entries = self.inner.api.latest_resources().await?;
        Ok(entries.into_iter().map(ResourceSample::from).collect())
    }

    pub async fn proxy_resources(&self, id: ProxyId) -> Result<ResourceSample, CoreError> {
        self.inner
            .api
            .proxy_resources(id.get())
            .await
            .map(ResourceSample::from)
            .map_err(|e| not_found_or(e, "proxy", id, &StatusMessages::default()))
    }

    /// Full collector status for one proxy, gathered on demand over SSH
    /// and SNMP by the backend.
    pub async fn proxy_status(&self, id: ProxyId) -> Result<ProxyStatus, CoreError> {
        self.inner
            .api
            .proxy_status(id.get())
            .await
            .map(ProxyStatus::from)
            .map_err(|e| not_found_or(e, "proxy", id, &status_messages()))
    }

    pub async fn summary(&self) -> Result<MonitoringSummary, CoreError> {
        Ok(MonitoringSummary::from(self.inner.api.summary().await?))
    }

    /// Fetch resource samples and apply them to the board. Returns the
    /// number of samples received.
    pub async fn refresh_resources(&self, group: Option<GroupId>) -> Result<usize, CoreError> {
        let samples = self.resources(group).await?;
        let count = samples.len();
        self.inner.board.apply_snapshot(samples);
        debug!(count, "resource board refreshed");
        Ok(count)
    }

    // ── Sessions ─────────────────────────────────────────────────────

    pub async fn session_overview(&self) -> Result<Vec<ProxySessions>, CoreError> {
        let overview = self.inner.api.session_overview().await?;
        Ok(overview.into_iter().map(ProxySessions::from).collect())
    }

    pub async fn search_sessions(&self, filter: &SessionFilter) -> Result<SessionPage, CoreError> {
        let page = self
            .inner
            .api
            .search_sessions(&SessionQuery::from(filter))
            .await?;
        Ok(SessionPage::from(page))
    }

    pub async fn session_page(
        &self,
        request: &SessionWindowRequest,
    ) -> Result<SessionWindow, CoreError> {
        if request.length == 0 {
            return Err(self.reject(
                "Invalid page",
                CoreError::validation("length", "must be at least 1"),
            ));
        }
        let page = self.inner.api.session_page(&request.into()).await?;
        Ok(SessionWindow::from(page))
    }

    pub async fn collect_group_sessions(
        &self,
        group: GroupId,
    ) -> Result<CollectOutcome, CoreError> {
        let result = self
            .inner
            .api
            .collect_group_sessions(group.get())
            .await
            .map_err(|e| not_found_or(e, "group", group, &StatusMessages::default()))?;
        let outcome = CollectOutcome::from(result);
        info!(%group, saved = ?outcome.saved, "group sessions collected");
        Ok(outcome)
    }

    pub async fn collect_proxy_sessions(&self, id: ProxyId) -> Result<ProxySessions, CoreError> {
        self.inner
            .api
            .collect_proxy_sessions(id.get())
            .await
            .map(ProxySessions::from)
            .map_err(|e| not_found_or(e, "proxy", id, &StatusMessages::default()))
    }

    pub async fn session_detail(&self, id: SessionId) -> Result<SessionRecord, CoreError> {
        self.inner
            .api
            .session_detail(id.get())
            .await
            .map(SessionRecord::from)
            .map_err(|e| not_found_or(e, "session", id, &StatusMessages::default()))
    }

    /// CSV export of the sessions matching `filter`.
    pub async fn export_sessions(&self, filter: &SessionFilter) -> Result<Bytes, CoreError> {
        Ok(self
            .inner
            .api
            .export_sessions(&SessionQuery::from(filter))
            .await?)
    }
}

fn not_found_or(
    err: proxmon_api::Error,
    entity_type: &str,
    id: impl ToString,
    messages: &StatusMessages,
) -> CoreError {
    if err.is_not_found() {
        CoreError::not_found(entity_type, id)
    } else {
        CoreError::from_api(err, messages)
    }
}

// ── Periodic resource refresh ────────────────────────────────────────

/// Refresh task that re-fetches resource samples into the console's
/// board, optionally scoped to one group.
pub struct ResourceRefresh {
    console: Console,
    group: Option<GroupId>,
}

impl ResourceRefresh {
    pub fn new(console: Console, group: Option<GroupId>) -> Self {
        Self { console, group }
    }
}

impl RefreshTask for ResourceRefresh {
    fn refresh(&self) -> BoxFuture<'_, Result<(), CoreError>> {
        Box::pin(async move {
            self.console.refresh_resources(self.group).await?;
            Ok(())
        })
    }
}
