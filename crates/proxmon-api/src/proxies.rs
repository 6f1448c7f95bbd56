// Proxy server endpoints
//
// `/api/proxies` CRUD plus the quick connectivity test. The deep test
// that goes through the collector lives with the monitoring endpoints.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{ApiProxy, ConnectionTest, Listing, ProxyPayload, ProxyQuery};

impl ApiClient {
    /// List proxies, optionally filtered by group or main flag.
    ///
    /// `GET /api/proxies?group_id=&is_main=`
    pub async fn list_proxies(&self, query: &ProxyQuery) -> Result<Vec<ApiProxy>, Error> {
        let url = self.api_url("proxies")?;
        debug!(?query, "listing proxies");
        let listing: Listing<ApiProxy> = self.get_with_query(url, query).await?;
        Ok(listing.into_vec())
    }

    /// Fetch a single proxy.
    ///
    /// `GET /api/proxies/{id}`
    pub async fn get_proxy(&self, id: i64) -> Result<ApiProxy, Error> {
        let url = self.api_url(&format!("proxies/{id}"))?;
        self.get(url).await
    }

    /// Create a proxy.
    ///
    /// `POST /api/proxies`
    pub async fn create_proxy(&self, payload: &ProxyPayload) -> Result<ApiProxy, Error> {
        let url = self.api_url("proxies")?;
        debug!(name = %payload.name, host = %payload.host, "creating proxy");
        self.post(url, payload).await
    }

    /// Update a proxy.
    ///
    /// `PUT /api/proxies/{id}`
    pub async fn update_proxy(&self, id: i64, payload: &ProxyPayload) -> Result<ApiProxy, Error> {
        let url = self.api_url(&format!("proxies/{id}"))?;
        debug!(id, "updating proxy");
        self.put(url, payload).await
    }

    /// Delete a proxy.
    ///
    /// `DELETE /api/proxies/{id}`
    pub async fn delete_proxy(&self, id: i64) -> Result<(), Error> {
        let url = self.api_url(&format!("proxies/{id}"))?;
        debug!(id, "deleting proxy");
        self.delete(url).await
    }

    /// Quick connectivity test.
    ///
    /// `POST /api/proxies/{id}/test`
    pub async fn test_proxy(&self, id: i64) -> Result<ConnectionTest, Error> {
        let url = self.api_url(&format!("proxies/{id}/test"))?;
        debug!(id, "testing proxy connection");
        self.post_empty(url).await
    }
}
