// Monitoring endpoints
//
// Collection settings, resource snapshots, per-proxy status, the fleet
// summary, and the collector-backed connection test under
// `/api/monitoring/`.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{
    ApiMonitoringConfig, ApiProxyStatus, ApiResourceEntry, ApiSummary, ConfigEnvelope,
    ConnectionTest, Listing, MonitoringConfigPatch, ResourceQuery,
};

impl ApiClient {
    /// Active monitoring configuration.
    ///
    /// `GET /api/monitoring/config`
    pub async fn monitoring_config(&self) -> Result<ApiMonitoringConfig, Error> {
        let url = self.api_url("monitoring/config")?;
        self.get(url).await
    }

    /// Update thresholds and collection settings.
    ///
    /// `PUT /api/monitoring/config`
    pub async fn update_monitoring_config(
        &self,
        patch: &MonitoringConfigPatch,
    ) -> Result<ApiMonitoringConfig, Error> {
        let url = self.api_url("monitoring/config")?;
        debug!(?patch, "updating monitoring config");
        let envelope: ConfigEnvelope = self.put(url, patch).await?;
        Ok(envelope.into_config())
    }

    /// Current resource snapshot for every active proxy.
    ///
    /// `GET /api/monitoring/resources?group_id=`
    pub async fn resources(&self, query: &ResourceQuery) -> Result<Vec<ApiResourceEntry>, Error> {
        let url = self.api_url("monitoring/resources")?;
        debug!(?query, "fetching resources");
        let listing: Listing<ApiResourceEntry> = self.get_with_query(url, query).await?;
        Ok(listing.into_vec())
    }

    /// Most recent stored sample per proxy.
    ///
    /// `GET /api/monitoring/resources/latest`
    pub async fn latest_resources(&self) -> Result<Vec<ApiResourceEntry>, Error> {
        let url = self.api_url("monitoring/resources/latest")?;
        let listing: Listing<ApiResourceEntry> = self.get(url).await?;
        Ok(listing.into_vec())
    }

    /// Resource snapshot for a single proxy.
    ///
    /// `GET /api/monitoring/resources/{id}`
    pub async fn proxy_resources(&self, proxy_id: i64) -> Result<ApiResourceEntry, Error> {
        let url = self.api_url(&format!("monitoring/resources/{proxy_id}"))?;
        self.get(url).await
    }

    /// Comprehensive collector status for a single proxy. The backend
    /// answers 400 when the proxy has no SSH credentials.
    ///
    /// `GET /api/monitoring/status/{id}`
    pub async fn proxy_status(&self, proxy_id: i64) -> Result<ApiProxyStatus, Error> {
        let url = self.api_url(&format!("monitoring/status/{proxy_id}"))?;
        debug!(proxy_id, "fetching proxy status");
        self.get(url).await
    }

    /// Aggregate counts across the fleet.
    ///
    /// `GET /api/monitoring/summary`
    pub async fn summary(&self) -> Result<ApiSummary, Error> {
        let url = self.api_url("monitoring/summary")?;
        self.get(url).await
    }

    /// Collector-backed connection test. A successful test also marks the
    /// proxy active server-side.
    ///
    /// `POST /api/monitoring/test/{id}`
    pub async fn monitoring_test(&self, proxy_id: i64) -> Result<ConnectionTest, Error> {
        let url = self.api_url(&format!("monitoring/test/{proxy_id}"))?;
        debug!(proxy_id, "running collector connection test");
        self.post_empty(url).await
    }
}
