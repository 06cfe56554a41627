//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use url::Url;

use crate::api::{AuthApi, DomainsApi, MetricsApi, ProvidersApi, SystemApi};
use crate::error::{Error, ErrorResponse, Result, status_message};
use crate::interceptor::{SessionExpiryDispatcher, classify};

/// Prefix every API path is resolved under.
pub const API_PREFIX: &str = "api/v1/";

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// ip-hop API client.
///
/// Built once at startup and cloned into every component that issues
/// calls; clones share the HTTP connection pool and the cookie jar that
/// holds the session.
///
/// # Example
///
/// ```no_run
/// use iphop_client::DashboardClient;
///
/// # async fn example() -> iphop_client::Result<()> {
/// let client = DashboardClient::builder()
///     .base_url("http://localhost:8001")
///     .build()?;
///
/// client.auth().login("admin", "secret").await?;
/// let domains = client.domains().list().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DashboardClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
struct ClientInner {
    /// HTTP client.
    http: reqwest::Client,
    /// Server root URL.
    base_url: Url,
    /// Request timeout.
    timeout: Duration,
    /// Session-expiry side channel.
    expiry: Option<SessionExpiryDispatcher>,
}

impl DashboardClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client with default settings pointing to the local backend.
    pub fn localhost() -> Result<Self> {
        Self::builder().base_url("http://127.0.0.1:8001").build()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the auth API.
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    /// Access the system API.
    pub fn system(&self) -> SystemApi {
        SystemApi::new(self.clone())
    }

    /// Access the domains API.
    pub fn domains(&self) -> DomainsApi {
        DomainsApi::new(self.clone())
    }

    /// Access the providers API.
    pub fn providers(&self) -> ProvidersApi {
        ProvidersApi::new(self.clone())
    }

    /// Access the metrics API.
    pub fn metrics(&self) -> MetricsApi {
        MetricsApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner
            .base_url
            .join(&format!("{}{}", API_PREFIX, path))
            .map_err(Error::from)
    }

    /// Make a GET request.
    pub(crate) async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.inner.http.get(self.url(path)?);
        self.json(path, request).await
    }

    /// Make a GET request with query parameters.
    pub(crate) async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let request = self.inner.http.get(self.url(path)?).query(query);
        self.json(path, request).await
    }

    /// Make a GET request that only cares whether the call succeeded.
    pub(crate) async fn get_status(&self, path: &str) -> Result<()> {
        let request = self.inner.http.get(self.url(path)?);
        let result = self.execute(request).await.map(drop);
        self.intercept(path, result)
    }

    /// Make a POST request with a JSON body.
    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let request = self.inner.http.post(self.url(path)?).json(body);
        self.json(path, request).await
    }

    /// Make a POST request without a body.
    pub(crate) async fn post_empty<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.inner.http.post(self.url(path)?);
        self.json(path, request).await
    }

    /// Make a form-encoded POST request.
    pub(crate) async fn post_form<T, F>(&self, path: &str, form: &F) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        F: serde::Serialize + ?Sized,
    {
        let request = self.inner.http.post(self.url(path)?).form(form);
        self.json(path, request).await
    }

    /// Make a PUT request.
    pub(crate) async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let request = self.inner.http.put(self.url(path)?).json(body);
        self.json(path, request).await
    }

    /// Make a DELETE request.
    pub(crate) async fn delete<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.inner.http.delete(self.url(path)?);
        self.json(path, request).await
    }

    /// Send a request and decode its JSON body.
    async fn json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        let result = match self.execute(request).await {
            Ok(response) => response.json().await.map_err(Error::from),
            Err(err) => Err(err),
        };
        self.intercept(path, result)
    }

    /// Send a request, turning non-2xx responses into errors.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request.timeout(self.inner.timeout).send().await?;
        tracing::debug!(
            url = %response.url(),
            status = response.status().as_u16(),
            "api response"
        );

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Classify a completed call and hand it to the expiry dispatcher.
    fn intercept<T>(&self, path: &str, result: Result<T>) -> Result<T> {
        if let Some(dispatcher) = &self.inner.expiry {
            dispatcher.dispatch(classify(path, &result));
        }
        result
    }

    /// Extract an error from a failed response.
    async fn extract_error(&self, response: reqwest::Response) -> Error {
        let status = response.status().as_u16();

        // Try to parse error response
        match response.json::<ErrorResponse>().await {
            Ok(body) => body.into_error(status),
            Err(_) => Error::Api {
                status,
                detail: None,
                message: status_message(status),
            },
        }
    }
}

impl std::fmt::Debug for DashboardClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

/// Builder for creating a DashboardClient.
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    timeout: Duration,
    user_agent: Option<String>,
    expiry: Option<SessionExpiryDispatcher>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            expiry: None,
        }
    }

    /// Set the base URL for the server.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Install the session-expiry side channel.
    pub fn session_expiry(mut self, dispatcher: SessionExpiryDispatcher) -> Self {
        self.expiry = Some(dispatcher);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<DashboardClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        // Parse and normalize base URL
        let mut base_url = Url::parse(&base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        // Build default headers
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // Build HTTP client
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("iphop-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .user_agent(user_agent)
            .build()?;

        Ok(DashboardClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                timeout: self.timeout,
                expiry: self.expiry,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
