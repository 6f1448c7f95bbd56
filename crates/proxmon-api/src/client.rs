// Backend HTTP client
//
// Wraps `reqwest::Client` with URL construction under `/api/`, status
// checking, and error-body extraction. Endpoint groups (groups, proxies,
// monitoring, sessions) are implemented as inherent methods in separate
// files to keep this module focused on transport mechanics.

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Error bodies look like `{"error": "..."}` or `{"message": "..."}`.
#[derive(serde::Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Raw HTTP client for the proxy-monitoring backend.
///
/// All methods return decoded payloads; non-2xx responses become
/// [`Error::Http`] carrying the backend's error text when present.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the backend root (e.g. `http://127.0.0.1:5007`);
    /// every endpoint is resolved under `{base_url}/api/`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}/api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/api/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await?;
        Self::parse_json(resp).await
    }

    /// Send a GET request with query parameters and decode the JSON body.
    pub(crate) async fn get_with_query<T, Q>(&self, url: Url, query: &Q) -> Result<T, Error>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        debug!("GET {}", url);
        let resp = self.http.get(url).query(query).send().await?;
        Self::parse_json(resp).await
    }

    /// Send a GET request with query parameters and return the raw body.
    pub(crate) async fn get_bytes<Q>(&self, url: Url, query: &Q) -> Result<Bytes, Error>
    where
        Q: Serialize + ?Sized,
    {
        debug!("GET {} (raw)", url);
        let resp = self.http.get(url).query(query).send().await?;
        let resp = Self::check_status(resp).await?;
        Ok(resp.bytes().await?)
    }

    /// Send a POST request with JSON body and decode the JSON response.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("POST {}", url);
        let resp = self.http.post(url).json(body).send().await?;
        Self::parse_json(resp).await
    }

    /// Send a POST request without a body.
    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("POST {}", url);
        let resp = self.http.post(url).send().await?;
        Self::parse_json(resp).await
    }

    /// Send a PUT request with JSON body and decode the JSON response.
    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("PUT {}", url);
        let resp = self.http.put(url).json(body).send().await?;
        Self::parse_json(resp).await
    }

    /// Send a DELETE request. Any 2xx (typically 204) counts as success.
    pub(crate) async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {}", url);
        let resp = self.http.delete(url).send().await?;
        Self::check_status(resp).await?;
        Ok(())
    }

    // ── Response handling ────────────────────────────────────────────

    /// Map non-2xx responses to `Error::Http`, extracting the backend's
    /// `error` / `message` field when the body is JSON.
    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        trace!(status = status.as_u16(), body = %body, "error response");
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error.or(b.message))
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty() && !trimmed.starts_with('<'))
                    .then(|| trimmed.chars().take(200).collect())
            });

        Err(Error::Http {
            status: status.as_u16(),
            message,
        })
    }

    async fn parse_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let resp = Self::check_status(resp).await?;
        let body = resp.text().await?;

        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::with_client(
            reqwest::Client::new(),
            Url::parse(base).expect("valid base URL"),
        )
    }

    #[test]
    fn api_url_joins_without_double_slashes() {
        let c = client("http://127.0.0.1:5007/");
        let url = c.api_url("/groups").expect("valid URL");
        assert_eq!(url.as_str(), "http://127.0.0.1:5007/api/groups");
    }

    #[test]
    fn api_url_keeps_base_path_prefix() {
        let c = client("https://console.example.net/ppat");
        let url = c.api_url("monitoring/summary").expect("valid URL");
        assert_eq!(
            url.as_str(),
            "https://console.example.net/ppat/api/monitoring/summary"
        );
    }
}
