//! Configuration loader
//!
//! The environment wins when `DINGBRIDGE_DB_PATH` is set; otherwise the first
//! config file found next to the working directory or the executable is
//! parsed as JSON or TOML, chosen by extension.
//!
//! | variable | meaning | default |
//! |---|---|---|
//! | `DINGBRIDGE_DB_PATH` | SQLite database file | required |
//! | `DINGBRIDGE_DB_POOL_SIZE` | pooled connections | 4 |
//! | `DINGBRIDGE_OAPI_URL` | legacy open API host | `https://oapi.dingtalk.com` |
//! | `DINGBRIDGE_API_URL` | v1.0 API host | `https://api.dingtalk.com` |
//! | `DINGBRIDGE_HTTP_TIMEOUT_SECS` | per-request timeout | 30 |
//!
//! File names tried, in order, under the working directory and then the
//! executable's directory: `config.json`, `config.toml`, `dingbridge.json`,
//! `dingbridge.toml`, `../config.json`, `../config.toml`.

use std::path::{Path, PathBuf};

use dingbridge_domain::{Config, DatabaseConfig, DingBridgeError, DingTalkConfig, Result};

const DEFAULT_POOL_SIZE: u32 = 4;

const CONFIG_FILE_NAMES: [&str; 6] = [
    "config.json",
    "config.toml",
    "dingbridge.json",
    "dingbridge.toml",
    "../config.json",
    "../config.toml",
];

/// Environment first, then the first config file that exists.
///
/// # Errors
/// `DingBridgeError::Config` when neither source yields a configuration.
pub fn load() -> Result<Config> {
    load_from_env()
        .inspect(|_| tracing::info!(source = "environment", "configuration loaded"))
        .or_else(|env_err| {
            tracing::debug!(error = %env_err, "environment incomplete, probing config files");
            load_from_file(None)
        })
}

/// Build the configuration from `DINGBRIDGE_*` variables.
///
/// # Errors
/// `DingBridgeError::Config` when the database path is unset or a numeric
/// variable does not parse.
pub fn load_from_env() -> Result<Config> {
    let db_path = env_var("DINGBRIDGE_DB_PATH")?;
    let pool_size = env_parse("DINGBRIDGE_DB_POOL_SIZE", DEFAULT_POOL_SIZE)?;

    let defaults = DingTalkConfig::default();
    let dingtalk = DingTalkConfig {
        oapi_base_url: std::env::var("DINGBRIDGE_OAPI_URL").unwrap_or(defaults.oapi_base_url),
        api_base_url: std::env::var("DINGBRIDGE_API_URL").unwrap_or(defaults.api_base_url),
        timeout_seconds: env_parse("DINGBRIDGE_HTTP_TIMEOUT_SECS", defaults.timeout_seconds)?,
    };

    Ok(Config { database: DatabaseConfig { path: db_path, pool_size }, dingtalk })
}

/// Read `path`, or the first probed config file when `path` is `None`.
///
/// # Errors
/// `DingBridgeError::Config` when no file is found or it does not parse.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(explicit) if explicit.exists() => explicit,
        Some(missing) => {
            return Err(DingBridgeError::Config(format!(
                "config file {} does not exist",
                missing.display()
            )))
        }
        None => probe_config_paths().ok_or_else(|| {
            DingBridgeError::Config(format!(
                "DINGBRIDGE_DB_PATH is unset and none of {} was found",
                CONFIG_FILE_NAMES.join(", ")
            ))
        })?,
    };

    tracing::info!(source = %config_path.display(), "reading configuration file");

    let raw = std::fs::read_to_string(&config_path).map_err(|e| {
        DingBridgeError::Config(format!("cannot read {}: {e}", config_path.display()))
    })?;

    parse_config(&raw, &config_path)
}

fn parse_config(raw: &str, path: &Path) -> Result<Config> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(raw)
            .map_err(|e| DingBridgeError::Config(format!("Invalid TOML format: {e}"))),
        Some("json") | None => serde_json::from_str(raw)
            .map_err(|e| DingBridgeError::Config(format!("Invalid JSON format: {e}"))),
        Some(other) => Err(DingBridgeError::Config(format!("Unsupported config format: {other}"))),
    }
}

/// First existing config file, if any.
pub fn probe_config_paths() -> Option<PathBuf> {
    let exe_dir = std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf));
    let roots = std::env::current_dir().ok().into_iter().chain(exe_dir);

    roots
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|candidate| candidate.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| DingBridgeError::Config(format!("{key} must be set")))
}

/// Parse an optional numeric variable, using `default` when unset.
fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| DingBridgeError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}
