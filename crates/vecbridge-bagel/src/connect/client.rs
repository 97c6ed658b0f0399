//! BagelDB REST client.

use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;
use vecbridge_vector::{Collection, VectorStore};

use super::BagelConfig;
use crate::cluster::Cluster;
use crate::error::{Error, Result};
use crate::types::CreateCluster;
use crate::{TRACING_TARGET, TRACING_TARGET_CLIENT};

/// Inner client that holds the HTTP client and configuration.
struct BagelClientInner {
    http: Client,
    config: BagelConfig,
    base_url: Url,
}

/// BagelDB client for interacting with the REST API.
///
/// The client is cheap to clone; clones share one connection pool.
///
/// # Examples
///
/// ```rust,ignore
/// use vecbridge_bagel::{BagelClient, BagelConfig};
///
/// let client = BagelClient::new(BagelConfig::default())?;
/// assert_eq!(client.ping().await?, "pong");
///
/// let cluster = client.get_or_create_cluster("convex").await?;
/// let count = cluster.count().await?;
/// ```
#[derive(Clone)]
pub struct BagelClient {
    inner: Arc<BagelClientInner>,
}

impl std::fmt::Debug for BagelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BagelClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("authenticated", &self.inner.config.api_key.is_some())
            .finish_non_exhaustive()
    }
}

impl BagelClient {
    /// Creates a new BagelDB client with the given configuration.
    ///
    /// No request is sent; use [`ping`](Self::ping) to probe the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: BagelConfig) -> Result<Self> {
        config.validate()?;
        let base_url = config.api_url()?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            base_url = %base_url,
            timeout_secs = config.timeout_secs,
            "Creating BagelDB client"
        );

        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(default_user_agent())
            .build()?;

        let inner = BagelClientInner {
            http,
            config,
            base_url,
        };

        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            "BagelDB client created successfully"
        );

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Creates a new BagelDB client pointing at the hosted service.
    pub fn with_defaults() -> Result<Self> {
        Self::new(BagelConfig::default())
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &BagelConfig {
        &self.inner.config
    }

    /// Gets the base URL of the REST API.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Wraps this client in a [`VectorStore`].
    pub fn into_store(self) -> VectorStore {
        VectorStore::new(self)
    }

    /// Sends a liveness probe and returns the server's reply token.
    ///
    /// A live server answers `"pong"`, either as a JSON string, as plain
    /// text, or as `{"message": "pong"}`. A non-success status is a reply
    /// from a server that is not live and yields an empty token; only
    /// transport failures are returned as errors.
    pub async fn ping(&self) -> Result<String> {
        let response = self.request(Method::GET, &["ping"])?.send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                target: TRACING_TARGET_CLIENT,
                status = status.as_u16(),
                "Ping answered with error status"
            );
            return Ok(String::new());
        }

        let body = response.text().await?;

        let token = parse_liveness(&body);
        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            token = %token,
            "Ping answered"
        );

        Ok(token)
    }

    /// Creates a cluster, failing if one with the same name exists.
    pub async fn create_cluster(&self, name: &str) -> Result<Cluster> {
        self.post_cluster(name, false).await
    }

    /// Resolves a cluster by name, creating it if absent.
    pub async fn get_or_create_cluster(&self, name: &str) -> Result<Cluster> {
        self.post_cluster(name, true).await
    }

    /// Looks up an existing cluster by name.
    pub async fn get_cluster(&self, name: &str) -> Result<Cluster> {
        let request = self.request(Method::GET, &["clusters", name])?;
        let info: Collection = Self::send_json(request).await?;
        Ok(Cluster::new(self.clone(), info))
    }

    /// Deletes a cluster and all of its records.
    ///
    /// Returns the server's result object, or `Null` for an empty body.
    pub async fn delete_cluster(&self, name: &str) -> Result<serde_json::Value> {
        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            cluster = %name,
            "Deleting cluster"
        );

        let request = self.request(Method::DELETE, &["clusters", name])?;
        Self::send_value(request).await
    }

    async fn post_cluster(&self, name: &str, get_or_create: bool) -> Result<Cluster> {
        let body = CreateCluster {
            name,
            metadata: None,
            get_or_create,
        };

        let request = self.request(Method::POST, &["clusters"])?.json(&body);
        let info: Collection = Self::send_json(request).await?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            cluster = %info.name,
            cluster_id = %info.id,
            get_or_create,
            "Cluster resolved"
        );

        Ok(Cluster::new(self.clone(), info))
    }

    /// Builds the URL of an API endpoint from its path segments.
    ///
    /// Segments are percent-encoded, so cluster names may contain any
    /// character.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::invalid_config("base URL cannot be used as an API root"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Create a new request builder with base configuration.
    pub(crate) fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.endpoint(segments)?;

        let request = self.inner.http.request(method, url);
        let request = match &self.inner.config.api_key {
            Some(key) => request.header("X-API-Key", key),
            None => request,
        };

        Ok(request)
    }

    /// Sends a request and turns non-success statuses into [`Error::Api`].
    pub(crate) async fn send(request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        tracing::error!(
            target: TRACING_TARGET,
            status = status.as_u16(),
            message = %message,
            "BagelDB request failed"
        );

        Err(Error::api(status.as_u16(), message))
    }

    /// Sends a request and decodes the JSON response body.
    pub(crate) async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let response = Self::send(request).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Sends a request and returns the raw JSON body, `Null` if empty.
    pub(crate) async fn send_value(request: RequestBuilder) -> Result<serde_json::Value> {
        let response = Self::send(request).await?;
        let bytes = response.bytes().await?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn default_user_agent() -> String {
    format!("vecbridge-bagel/{}", env!("CARGO_PKG_VERSION"))
}

/// Extracts the liveness token from a ping reply body.
fn parse_liveness(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::String(token)) => token,
        Ok(serde_json::Value::Object(map)) => map
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map_or_else(|| body.trim().to_owned(), str::to_owned),
        _ => body.trim().to_owned(),
    }
}
