// Proxy group endpoints
//
// `/api/groups` CRUD. Names are unique server-side; a duplicate name
// answers 409 and a group that still owns proxies refuses deletion.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{ApiGroup, GroupPayload, Listing};

impl ApiClient {
    /// List all proxy groups.
    ///
    /// `GET /api/groups`
    pub async fn list_groups(&self) -> Result<Vec<ApiGroup>, Error> {
        let url = self.api_url("groups")?;
        debug!("listing groups");
        let listing: Listing<ApiGroup> = self.get(url).await?;
        Ok(listing.into_vec())
    }

    /// Create a group.
    ///
    /// `POST /api/groups`
    pub async fn create_group(&self, payload: &GroupPayload) -> Result<ApiGroup, Error> {
        let url = self.api_url("groups")?;
        debug!(name = %payload.name, "creating group");
        self.post(url, payload).await
    }

    /// Update a group's name and description.
    ///
    /// `PUT /api/groups/{id}`
    pub async fn update_group(&self, id: i64, payload: &GroupPayload) -> Result<ApiGroup, Error> {
        let url = self.api_url(&format!("groups/{id}"))?;
        debug!(id, name = %payload.name, "updating group");
        self.put(url, payload).await
    }

    /// Delete a group.
    ///
    /// `DELETE /api/groups/{id}`
    pub async fn delete_group(&self, id: i64) -> Result<(), Error> {
        let url = self.api_url(&format!("groups/{id}"))?;
        debug!(id, "deleting group");
        self.delete(url).await
    }
}
