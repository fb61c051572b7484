//! HTTP transport used by the release resolver and the installer.
//!
//! The pipeline only needs "GET this URL and give me the status and body",
//! so that is the whole trait. Production code uses [`ReqwestTransport`];
//! tests inject a scripted fake (see `test_utils::FakeTransport`).

use futures::future::BoxFuture;
use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::constants::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_DOWNLOAD_TIMEOUT, DEFAULT_HTTP_TIMEOUT, USER_AGENT,
};

/// `Accept` header for the GitHub REST API.
pub const ACCEPT_JSON: &str = "application/vnd.github+json";

/// `Accept` header for binary asset downloads.
pub const ACCEPT_BINARY: &str = "application/octet-stream";

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Full response body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Build a response.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request never produced a response (connection, TLS, DNS, timeout).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError(pub String);

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for TransportError {}

/// Minimal GET-only HTTP client.
///
/// Implementations must not retry: a failure is reported once and the caller
/// decides what to do. Timeouts belong to the implementation, configured by
/// whoever builds it.
pub trait HttpTransport: Send + Sync {
    /// Issue one GET request with the given `Accept` header.
    fn get<'a>(
        &'a self,
        url: &'a str,
        accept: &'a str,
    ) -> BoxFuture<'a, Result<HttpResponse, TransportError>>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    fn get<'a>(
        &'a self,
        url: &'a str,
        accept: &'a str,
    ) -> BoxFuture<'a, Result<HttpResponse, TransportError>> {
        (**self).get(url, accept)
    }
}

/// [`HttpTransport`] backed by a shared `reqwest` client.
///
/// Every request gets a connect timeout. The total deadline depends on the
/// `Accept` header: [`ACCEPT_BINARY`] requests are asset downloads and get the
/// download timeout, everything else gets the (much shorter) API timeout.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    token: Option<String>,
    api_timeout: Duration,
    download_timeout: Duration,
}

impl ReqwestTransport {
    /// Client with the default user agent and timeouts.
    ///
    /// # Errors
    ///
    /// Fails if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, TransportError> {
        Self::builder().build()
    }

    /// Start configuring a client.
    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::default()
    }

    fn timeout_for(&self, accept: &str) -> Duration {
        if accept == ACCEPT_BINARY {
            self.download_timeout
        } else {
            self.api_timeout
        }
    }
}

impl HttpTransport for ReqwestTransport {
    fn get<'a>(
        &'a self,
        url: &'a str,
        accept: &'a str,
    ) -> BoxFuture<'a, Result<HttpResponse, TransportError>> {
        Box::pin(async move {
            debug!("GET {}", url);
            let mut request = self
                .client
                .get(url)
                .header(reqwest::header::ACCEPT, accept)
                .timeout(self.timeout_for(accept));
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }

            let response = request.send().await.map_err(|e| TransportError(format!("{e:#}")))?;
            let status = response.status().as_u16();
            debug!("GET {} -> {}", url, status);

            let body =
                response.bytes().await.map_err(|e| TransportError(format!("{e:#}")))?.to_vec();
            Ok(HttpResponse {
                status,
                body,
            })
        })
    }
}

/// Builder for [`ReqwestTransport`].
#[derive(Debug, Clone)]
pub struct ReqwestTransportBuilder {
    user_agent: String,
    timeout: Duration,
    connect_timeout: Duration,
    download_timeout: Duration,
    token: Option<String>,
}

impl Default for ReqwestTransportBuilder {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            timeout: DEFAULT_HTTP_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            token: None,
        }
    }
}

impl ReqwestTransportBuilder {
    /// `User-Agent` header. GitHub rejects requests without one.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Total deadline for API (release feed) requests.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Deadline for establishing a connection, for any request.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Total deadline for an asset download.
    pub fn download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    /// Bearer token sent with every request, e.g. to lift API rate limits.
    pub fn token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    /// Build the transport.
    ///
    /// # Errors
    ///
    /// Fails if the TLS backend cannot be initialized.
    pub fn build(self) -> Result<ReqwestTransport, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(self.user_agent)
            .connect_timeout(self.connect_timeout)
            .build()
            .map_err(|e| TransportError(format!("cannot build HTTP client: {e}")))?;
        Ok(ReqwestTransport {
            client,
            token: self.token,
            api_timeout: self.timeout,
            download_timeout: self.download_timeout,
        })
    }
}
