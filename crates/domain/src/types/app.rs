//! DingTalk application records
//!
//! A [`DingApp`] is the configuration record a sync is triggered against. Its
//! [`AppCredential`] identifies the remote application context for every
//! request made on its behalf.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{DingBridgeError, Result};

/// App key / secret pair plus the agent id messages are sent as.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppCredential {
    pub app_key: String,
    pub app_secret: String,
    pub agent_id: String,
}

impl AppCredential {
    pub fn new(
        app_key: impl Into<String>,
        app_secret: impl Into<String>,
        agent_id: impl Into<String>,
    ) -> Self {
        Self { app_key: app_key.into(), app_secret: app_secret.into(), agent_id: agent_id.into() }
    }

    /// Reject credentials with blank fields before they are stored or used.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in
            [("app_key", &self.app_key), ("app_secret", &self.app_secret), ("agent_id", &self.agent_id)]
        {
            if value.trim().is_empty() {
                return Err(DingBridgeError::Validation(format!("{field} is required")));
            }
        }
        Ok(())
    }
}

// Secrets stay out of logs and panic messages.
impl fmt::Debug for AppCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppCredential")
            .field("app_key", &"<redacted>")
            .field("app_secret", &"<redacted>")
            .field("agent_id", &self.agent_id)
            .finish()
    }
}

/// Persisted DingTalk application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DingApp {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub credential: AppCredential,
    /// Owning organization (company) reference
    pub company_id: i64,
    /// Also mirror department members when syncing the hierarchy
    pub sync_with_user: bool,
    /// Callback settings
    pub callback_token: Option<String>,
    pub encoding_aes_key: Option<String>,
}

/// Insert payload for a new application record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDingApp {
    pub name: String,
    pub description: Option<String>,
    pub credential: AppCredential,
    pub company_id: i64,
    #[serde(default = "default_sync_with_user")]
    pub sync_with_user: bool,
    pub callback_token: Option<String>,
    pub encoding_aes_key: Option<String>,
}

impl NewDingApp {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(DingBridgeError::Validation("name is required".into()));
        }
        self.credential.validate()
    }
}

fn default_sync_with_user() -> bool {
    true
}
