//! Configuration structures
//!
//! Loaded by `dingbridge_infra::config` from the environment or a JSON/TOML
//! file.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_API_BASE_URL, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_OAPI_BASE_URL};

/// Top-level application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub dingtalk: DingTalkConfig,
}

/// SQLite storage settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

/// Remote platform endpoints and transport settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DingTalkConfig {
    /// Legacy open API host (`gettoken`, `topapi/*`, `media/upload`)
    pub oapi_base_url: String,
    /// v1.0 API host (workflow templates)
    pub api_base_url: String,
    /// Per-request transport timeout
    pub timeout_seconds: u64,
}

impl Default for DingTalkConfig {
    fn default() -> Self {
        Self {
            oapi_base_url: DEFAULT_OAPI_BASE_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

fn default_pool_size() -> u32 {
    4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dingtalk_section_is_optional() {
        let config: Config =
            serde_json::from_str(r#"{"database":{"path":"/tmp/ding.db"}}"#).unwrap();
        assert_eq!(config.database.pool_size, 4);
        assert_eq!(config.dingtalk, DingTalkConfig::default());
    }
}
