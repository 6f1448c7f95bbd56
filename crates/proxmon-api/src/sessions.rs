// Session endpoints
//
// Live per-proxy summaries, persisted-record search (plain and
// server-side paged), collection triggers, detail, and CSV export.

use bytes::Bytes;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{
    ApiProxySessions, ApiSessionRecord, CollectResult, DataTablesPage, DataTablesQuery, Listing,
    SessionQuery, SessionSearchPage,
};

impl ApiClient {
    /// Live session summary for every active proxy.
    ///
    /// `GET /api/monitoring/sessions`
    pub async fn session_overview(&self) -> Result<Vec<ApiProxySessions>, Error> {
        let url = self.api_url("monitoring/sessions")?;
        let listing: Listing<ApiProxySessions> = self.get(url).await?;
        Ok(listing.into_vec())
    }

    /// Search persisted session records.
    ///
    /// `GET /api/monitoring/sessions/search`
    pub async fn search_sessions(&self, query: &SessionQuery) -> Result<SessionSearchPage, Error> {
        let url = self.api_url("monitoring/sessions/search")?;
        debug!(?query, "searching sessions");
        self.get_with_query(url, query).await
    }

    /// Server-side paged session listing.
    ///
    /// `GET /api/monitoring/sessions/datatables`
    pub async fn session_page(&self, query: &DataTablesQuery) -> Result<DataTablesPage, Error> {
        let url = self.api_url("monitoring/sessions/datatables")?;
        debug!(start = query.start, length = query.length, "fetching session page");
        self.get_with_query(url, query).await
    }

    /// Trigger collection for every active proxy in a group.
    ///
    /// `GET /api/monitoring/sessions/group/{id}`
    pub async fn collect_group_sessions(&self, group_id: i64) -> Result<CollectResult, Error> {
        let url = self.api_url(&format!("monitoring/sessions/group/{group_id}"))?;
        debug!(group_id, "collecting group sessions");
        self.get(url).await
    }

    /// Collect sessions from one proxy.
    ///
    /// `GET /api/monitoring/sessions/{proxy_id}`
    pub async fn collect_proxy_sessions(&self, proxy_id: i64) -> Result<ApiProxySessions, Error> {
        let url = self.api_url(&format!("monitoring/sessions/{proxy_id}"))?;
        debug!(proxy_id, "collecting proxy sessions");
        self.get(url).await
    }

    /// Full detail of one persisted session.
    ///
    /// `GET /api/monitoring/sessions/detail/{id}`
    pub async fn session_detail(&self, id: i64) -> Result<ApiSessionRecord, Error> {
        let url = self.api_url(&format!("monitoring/sessions/detail/{id}"))?;
        self.get(url).await
    }

    /// CSV export of the records matching `query`.
    ///
    /// `GET /api/monitoring/sessions/export`
    pub async fn export_sessions(&self, query: &SessionQuery) -> Result<Bytes, Error> {
        let url = self.api_url("monitoring/sessions/export")?;
        debug!(?query, "exporting sessions");
        self.get_bytes(url, query).await
    }
}

