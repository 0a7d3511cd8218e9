//! Builds one request client per app credential

use std::sync::Arc;

use dingbridge_core::{DingTalkApi, RequestClientFactory};
use dingbridge_domain::{AppCredential, DingTalkConfig, Result};
use tracing::debug;

use super::client::{DingTalkClient, DingTalkClientConfig};

/// [`RequestClientFactory`] backed by [`DingTalkClient`]
#[derive(Debug, Clone)]
pub struct DingTalkClientFactory {
    config: DingTalkClientConfig,
}

impl DingTalkClientFactory {
    pub fn new(config: &DingTalkConfig) -> Self {
        Self { config: DingTalkClientConfig::from(config) }
    }
}

impl RequestClientFactory for DingTalkClientFactory {
    fn create(&self, credential: &AppCredential) -> Result<Arc<dyn DingTalkApi>> {
        credential.validate()?;
        debug!(agent_id = %credential.agent_id, "building DingTalk client");
        Ok(Arc::new(DingTalkClient::new(self.config.clone(), credential)?))
    }
}
