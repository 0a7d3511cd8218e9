use std::time::Duration;

use dingbridge_domain::constants::DEFAULT_HTTP_TIMEOUT_SECS;
use dingbridge_domain::DingBridgeError;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::errors::InfraError;

/// HTTP client with a per-request timeout.
///
/// Each request is attempted exactly once; callers decide whether a failure
/// is worth repeating.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Client with the default timeout.
    pub fn new() -> Result<Self, DingBridgeError> {
        Self::builder().build()
    }

    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the request and return the raw response, whatever its status.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, DingBridgeError> {
        let request = builder.build().map_err(|err| DingBridgeError::from(InfraError::from(err)))?;

        let method = request.method().clone();
        let path = request.url().path().to_string();
        debug!(%method, %path, "sending HTTP request");

        match self.client.execute(request).await {
            Ok(response) => {
                debug!(%method, %path, status = %response.status(), "received HTTP response");
                Ok(response)
            }
            Err(err) => {
                let err = err.without_url();
                debug!(%method, %path, error = %err, "HTTP request failed");
                Err(DingBridgeError::from(InfraError::from(err)))
            }
        }
    }
}

const USER_AGENT: &str = concat!("dingbridge/", env!("CARGO_PKG_VERSION"));

/// Builder for [`HttpClient`]
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS) }
    }
}

impl HttpClientBuilder {
    /// Whole-request timeout, covering connect and body.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<HttpClient, DingBridgeError> {
        let client = ReqwestClient::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .no_proxy()
            .build()
            .map_err(|err| {
                DingBridgeError::Config(format!("failed to build HTTP client: {err}"))
            })?;

        Ok(HttpClient { client })
    }
}
