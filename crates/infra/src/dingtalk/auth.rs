//! Access token acquisition for DingTalk
//!
//! The token from `gettoken` authorizes calls on both API hosts. It is
//! fetched lazily on first use and reused until shortly before it expires.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dingbridge_domain::AppCredential;
use reqwest::Method;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::errors::DingTalkError;
use super::types::{OapiEnvelope, TokenBody};
use crate::http::HttpClient;

/// Refresh this long before the platform-reported expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(300);

/// Trait for providing access tokens
///
/// Allows tests to inject fixed tokens.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Get a valid access token, fetching a new one if needed.
    async fn access_token(&self) -> Result<String, DingTalkError>;
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Exchanges an app key / secret pair for an access token
pub struct AppTokenProvider {
    http: HttpClient,
    oapi_base_url: String,
    credential: AppCredential,
    cached: Mutex<Option<CachedToken>>,
}

impl AppTokenProvider {
    pub fn new(http: HttpClient, oapi_base_url: impl Into<String>, credential: AppCredential) -> Self {
        Self { http, oapi_base_url: oapi_base_url.into(), credential, cached: Mutex::new(None) }
    }

    async fn fetch(&self) -> Result<CachedToken, DingTalkError> {
        let url = format!("{}/gettoken", self.oapi_base_url);
        let request = self.http.request(Method::GET, &url).query(&[
            ("appkey", self.credential.app_key.as_str()),
            ("appsecret", self.credential.app_secret.as_str()),
        ]);

        let response = self.http.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DingTalkError::Auth(format!("gettoken returned status {status}: {body}")));
        }

        let envelope: OapiEnvelope<TokenBody> = response.json().await.map_err(|err| {
            DingTalkError::Decode { endpoint: "gettoken", message: err.without_url().to_string() }
        })?;

        // Any refusal from gettoken means the credential itself is bad.
        if envelope.errcode != 0 {
            return Err(DingTalkError::Auth(format!(
                "gettoken rejected credential (errcode {}): {}",
                envelope.errcode, envelope.errmsg
            )));
        }

        let value = envelope
            .body
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| DingTalkError::Auth("gettoken returned no access_token".into()))?;
        let lifetime = Duration::from_secs(envelope.body.expires_in);

        info!(agent_id = %self.credential.agent_id, expires_in = lifetime.as_secs(), "access token acquired");
        Ok(CachedToken { value, refresh_at: Instant::now() + lifetime.saturating_sub(EXPIRY_MARGIN) })
    }
}

#[async_trait]
impl AccessTokenProvider for AppTokenProvider {
    async fn access_token(&self) -> Result<String, DingTalkError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
            debug!("access token due for refresh");
        }

        let token = self.fetch().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }
}
