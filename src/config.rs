//! Process configuration.
//!
//! Built once at startup from environment variables and the network
//! settings file named on the command line, then shared read-only.
//!
//! # Environment Variables
//!
//! - `API_PORT` - listener port on the loopback interface (default: 8090)
//! - `API_AUTH_TOKEN` - bearer token required on protected routes
//! - `API_DEV_MODE` - when truthy (default), a missing token falls back to `test-token`
//! - `NODE_RPC_URL` / `WALLET_RPC_URL` - override the URLs from the settings file
//! - `CONTRACT_HASH` - override the contract hash from the settings file
//! - `STATUS_LOG_INTERVAL_SECS` - period of the chain status log line (default: 60)
//! - `REQUEST_TIMEOUT_SECS` - deadline for one protected request (default: 30)

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use tracing::warn;

use crate::domain::ConfigError;

pub const DEFAULT_API_PORT: u16 = 8090;
pub const DEV_AUTH_TOKEN: &str = "test-token";
pub const DEFAULT_NODE_RPC_URL: &str = "http://127.0.0.1:20332";
pub const DEFAULT_CONTRACT_HASH: &str = "645c4dcdc6cc4b69a8b8d7c0a532795d0312d5e6";
pub const DEFAULT_STATUS_LOG_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Contents of the network settings file (`-c/--config`).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSettings {
    pub network: String,
    #[serde(default)]
    pub node_rpc_url: Option<String>,
    #[serde(default)]
    pub wallet_rpc_url: Option<String>,
    #[serde(default)]
    pub contract_hash: Option<String>,
}

impl NetworkSettings {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let settings: Self =
            serde_json::from_str(raw).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        if settings.network.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "network".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&raw)
    }
}

/// Gateway configuration. Immutable after construction.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub api_port: u16,
    pub auth_token: SecretString,
    pub config_file_path: PathBuf,
    pub network_name: String,
    pub node_rpc_url: String,
    pub wallet_rpc_url: String,
    pub contract_hash: String,
    pub status_log_interval: Duration,
    pub request_timeout: Duration,
}

impl GatewayConfig {
    /// Load the settings file and read the environment.
    pub fn load(config_file_path: PathBuf) -> Result<Self, ConfigError> {
        let settings = NetworkSettings::load(&config_file_path)?;
        Self::from_lookup(|key| std::env::var(key).ok(), config_file_path, settings)
    }

    /// Build the configuration from a key lookup instead of the process environment.
    pub fn from_lookup<F>(
        lookup: F,
        config_file_path: PathBuf,
        settings: NetworkSettings,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_port = match lookup("API_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: "API_PORT".to_string(),
                    message: e.to_string(),
                })?,
            None => DEFAULT_API_PORT,
        };

        let dev_mode = match lookup("API_DEV_MODE") {
            Some(raw) => parse_flag("API_DEV_MODE", &raw)?,
            None => true,
        };

        let auth_token = match lookup("API_AUTH_TOKEN") {
            Some(token) if token.is_empty() => {
                return Err(ConfigError::InvalidValue {
                    key: "API_AUTH_TOKEN".to_string(),
                    message: "must not be empty".to_string(),
                });
            }
            Some(token) => token,
            None if dev_mode => {
                warn!("API_AUTH_TOKEN not set, using the development token");
                DEV_AUTH_TOKEN.to_string()
            }
            None => return Err(ConfigError::MissingEnvVar("API_AUTH_TOKEN".to_string())),
        };

        let node_rpc_url = lookup("NODE_RPC_URL")
            .or(settings.node_rpc_url)
            .unwrap_or_else(|| DEFAULT_NODE_RPC_URL.to_string());
        let wallet_rpc_url = lookup("WALLET_RPC_URL")
            .or(settings.wallet_rpc_url)
            .unwrap_or_else(|| node_rpc_url.clone());
        let contract_hash = lookup("CONTRACT_HASH")
            .or(settings.contract_hash)
            .unwrap_or_else(|| DEFAULT_CONTRACT_HASH.to_string());

        let status_log_interval =
            positive_secs(&lookup, "STATUS_LOG_INTERVAL_SECS", DEFAULT_STATUS_LOG_INTERVAL)?;
        let request_timeout =
            positive_secs(&lookup, "REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT)?;

        Ok(Self {
            api_port,
            auth_token: SecretString::from(auth_token),
            config_file_path,
            network_name: settings.network,
            node_rpc_url,
            wallet_rpc_url,
            contract_hash,
            status_log_interval,
            request_timeout,
        })
    }

    /// Configuration for tests: fixed token, default port, dummy settings path.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn for_token(token: &str) -> Self {
        Self {
            api_port: DEFAULT_API_PORT,
            auth_token: SecretString::from(token.to_string()),
            config_file_path: PathBuf::from("protocol.testnet.json"),
            network_name: "testnet".to_string(),
            node_rpc_url: DEFAULT_NODE_RPC_URL.to_string(),
            wallet_rpc_url: DEFAULT_NODE_RPC_URL.to_string(),
            contract_hash: DEFAULT_CONTRACT_HASH.to_string(),
            status_log_interval: DEFAULT_STATUS_LOG_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

fn positive_secs<F>(lookup: &F, key: &str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must be positive".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a boolean, got '{}'", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn settings() -> NetworkSettings {
        NetworkSettings::from_json(r#"{"network": "privnet"}"#).unwrap()
    }

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_in_dev_mode() {
        let config =
            GatewayConfig::from_lookup(lookup_from(&[]), PathBuf::from("p.json"), settings())
                .unwrap();

        assert_eq!(config.api_port, 8090);
        assert_eq!(config.auth_token.expose_secret(), "test-token");
        assert_eq!(config.network_name, "privnet");
        assert_eq!(config.node_rpc_url, DEFAULT_NODE_RPC_URL);
        assert_eq!(config.wallet_rpc_url, DEFAULT_NODE_RPC_URL);
        assert_eq!(config.contract_hash, DEFAULT_CONTRACT_HASH);
        assert_eq!(config.status_log_interval, Duration::from_secs(60));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_env_overrides() {
        let lookup = lookup_from(&[
            ("API_PORT", "9000"),
            ("API_AUTH_TOKEN", "secret"),
            ("NODE_RPC_URL", "http://node:1"),
            ("CONTRACT_HASH", "abc"),
            ("STATUS_LOG_INTERVAL_SECS", "5"),
            ("REQUEST_TIMEOUT_SECS", "12"),
        ]);
        let config =
            GatewayConfig::from_lookup(lookup, PathBuf::from("p.json"), settings()).unwrap();

        assert_eq!(config.api_port, 9000);
        assert_eq!(config.auth_token.expose_secret(), "secret");
        assert_eq!(config.node_rpc_url, "http://node:1");
        assert_eq!(config.wallet_rpc_url, "http://node:1");
        assert_eq!(config.contract_hash, "abc");
        assert_eq!(config.status_log_interval, Duration::from_secs(5));
        assert_eq!(config.request_timeout, Duration::from_secs(12));
    }

    #[test]
    fn test_settings_file_values_used_when_env_missing() {
        let settings = NetworkSettings::from_json(
            r#"{"network": "testnet", "nodeRpcUrl": "http://a", "walletRpcUrl": "http://b", "contractHash": "c"}"#,
        )
        .unwrap();
        let config =
            GatewayConfig::from_lookup(lookup_from(&[]), PathBuf::from("p.json"), settings)
                .unwrap();

        assert_eq!(config.node_rpc_url, "http://a");
        assert_eq!(config.wallet_rpc_url, "http://b");
        assert_eq!(config.contract_hash, "c");
    }

    #[test]
    fn test_missing_token_outside_dev_mode_fails() {
        let lookup = lookup_from(&[("API_DEV_MODE", "false")]);
        let result = GatewayConfig::from_lookup(lookup, PathBuf::from("p.json"), settings());
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(key)) if key == "API_AUTH_TOKEN"));
    }

    #[test]
    fn test_empty_token_rejected() {
        let lookup = lookup_from(&[("API_AUTH_TOKEN", "")]);
        let result = GatewayConfig::from_lookup(lookup, PathBuf::from("p.json"), settings());
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_invalid_port_rejected() {
        let lookup = lookup_from(&[("API_PORT", "eighty")]);
        let result = GatewayConfig::from_lookup(lookup, PathBuf::from("p.json"), settings());
        assert!(matches!(result, Err(ConfigError::InvalidValue { key, .. }) if key == "API_PORT"));
    }

    #[test]
    fn test_zero_status_interval_rejected() {
        let lookup = lookup_from(&[("STATUS_LOG_INTERVAL_SECS", "0")]);
        let result = GatewayConfig::from_lookup(lookup, PathBuf::from("p.json"), settings());
        assert!(result.is_err());

        let lookup = lookup_from(&[("REQUEST_TIMEOUT_SECS", "0")]);
        let result = GatewayConfig::from_lookup(lookup, PathBuf::from("p.json"), settings());
        assert!(
            matches!(result, Err(ConfigError::InvalidValue { key, .. }) if key == "REQUEST_TIMEOUT_SECS")
        );
    }

    #[test]
    fn test_settings_parse_errors() {
        assert!(NetworkSettings::from_json("not json").is_err());
        assert!(NetworkSettings::from_json(r#"{"nodeRpcUrl": "x"}"#).is_err());
        assert!(NetworkSettings::from_json(r#"{"network": "  "}"#).is_err());
    }

    #[test]
    fn test_settings_load_missing_file() {
        let result = NetworkSettings::load(Path::new("/definitely/not/here.json"));
        assert!(matches!(result, Err(ConfigError::Unreadable { .. })));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("K", "Yes").unwrap());
        assert!(!parse_flag("K", "0").unwrap());
        assert!(parse_flag("K", "maybe").is_err());
    }
}
