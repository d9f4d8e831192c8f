//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files and
//! every section falls back to defaults, so a minimal file only names the
//! endpoints (or a network preset) and the account.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::broadcast::handler::BroadcastOptions;
use crate::chain::signer::PRIVATE_KEY_ENV_VAR;
use crate::chain::types::{NameError, PermissionLevel};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BroadcasterConfig {
    /// Network preset supplying endpoints when `endpoints` is empty.
    pub network: Option<Network>,

    /// Ordered endpoint base URLs. Order is failover order.
    pub endpoints: Vec<String>,

    /// Authorizing account.
    pub account: AccountConfig,

    /// Broadcast race settings.
    pub broadcast: BroadcastConfig,

    /// Endpoint transport settings.
    pub rpc: RpcConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

impl BroadcasterConfig {
    /// Explicit endpoints, or the preset's when none are listed.
    pub fn resolved_endpoints(&self) -> Vec<String> {
        if !self.endpoints.is_empty() {
            return self.endpoints.clone();
        }
        self.network
            .map(|n| n.endpoints().iter().map(|s| s.to_string()).collect())
            .unwrap_or_default()
    }
}

/// Known public networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub fn endpoints(self) -> &'static [&'static str] {
        match self {
            Network::Mainnet => &[
                "https://wax.greymass.com",
                "https://api.waxsweden.org",
                "https://wax.eosphere.io",
                "https://wax.cryptolions.io",
            ],
            Network::Testnet => &[
                "https://testnet.waxsweden.org",
                "https://waxtestnet.greymass.com",
                "https://testnet.wax.pink.gg",
            ],
        }
    }
}

/// Authorizing account identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Account name (actor).
    pub name: String,

    /// Permission level used to authorize actions.
    pub permission: String,

    /// Environment variable holding the private key. The key itself never
    /// appears in the config file.
    pub private_key_env: String,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            permission: "active".to_string(),
            private_key_env: PRIVATE_KEY_ENV_VAR.to_string(),
        }
    }
}

impl AccountConfig {
    pub fn permission_level(&self) -> Result<PermissionLevel, NameError> {
        Ok(PermissionLevel::new(self.name.parse()?, self.permission.parse()?))
    }
}

/// Broadcast race settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// Deadline for the whole broadcast in seconds.
    pub timeout_secs: u64,

    /// Transaction lifetime in seconds.
    pub expiration_secs: u64,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            expiration_secs: 120,
        }
    }
}

impl BroadcastConfig {
    pub fn options(&self) -> BroadcastOptions {
        BroadcastOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            expiration: Duration::from_secs(self.expiration_secs),
        }
    }
}

/// Endpoint transport settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Per-request transport timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 10,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BroadcasterConfig::default();
        assert!(config.resolved_endpoints().is_empty());
        assert_eq!(config.account.permission, "active");
        assert_eq!(config.account.private_key_env, "WAX_PRIVATE_KEY");
        assert_eq!(config.broadcast.options().timeout, Duration::from_secs(10));
        assert_eq!(config.broadcast.options().expiration, Duration::from_secs(120));
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_preset_used_only_without_endpoints() {
        let mut config = BroadcasterConfig {
            network: Some(Network::Testnet),
            ..Default::default()
        };
        assert_eq!(config.resolved_endpoints().len(), Network::Testnet.endpoints().len());

        config.endpoints = vec!["http://localhost:8888".into()];
        assert_eq!(config.resolved_endpoints(), vec!["http://localhost:8888"]);
    }

    #[test]
    fn test_permission_level() {
        let account = AccountConfig {
            name: "alice".into(),
            ..Default::default()
        };
        let level = account.permission_level().unwrap();
        assert_eq!(level.actor.to_string(), "alice");
        assert_eq!(level.permission.to_string(), "active");

        let bad = AccountConfig {
            name: "Alice".into(),
            ..Default::default()
        };
        assert!(bad.permission_level().is_err());
    }
}
