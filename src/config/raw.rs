use std::path::PathBuf;

use reveal_chain::{ChainConfig, ChainConfigRaw};
use reveal_domain::CollectionProfile;
use reveal_key_value_store::KeyValueStoreManagerConfig;
use serde::{Deserialize, Serialize};

use crate::{
    config::ConfigError,
    controllers::http_api_controller::router::HttpApiConfig,
    logger::{LoggerConfig, TelemetryConfig},
    periodic_tasks::tasks::reveal_watcher::RevealWatcherConfig,
};

/// Filesystem paths derived from the root data directory.
///
/// ```text
/// {root}/
/// └── key-value-store/
///     └── reveal_state.redb
/// ```
#[derive(Debug, Clone)]
pub(crate) struct AppPaths {
    pub key_value_store: PathBuf,
}

impl AppPaths {
    pub(crate) fn from_root(root: PathBuf) -> Self {
        Self {
            key_value_store: root.join("key-value-store/reveal_state.redb"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct ConfigRaw {
    pub environment: String,
    pub app_data_path: PathBuf,
    pub chain: ChainConfigRaw,
    pub reveal: RevealWatcherConfig,
    pub collection: CollectionProfile,
    pub http_api: HttpApiConfig,
    pub key_value_store: KeyValueStoreManagerConfig,
    pub logger: LoggerConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub app_data_path: PathBuf,
    pub chain: ChainConfig,
    pub reveal: RevealWatcherConfig,
    pub collection: CollectionProfile,
    pub http_api: HttpApiConfig,
    pub key_value_store: KeyValueStoreManagerConfig,
    pub logger: LoggerConfig,
    pub telemetry: TelemetryConfig,
}

impl ConfigRaw {
    pub(crate) fn resolve(self) -> Result<Config, ConfigError> {
        if self.collection.max_supply == 0 {
            return Err(ConfigError::InvalidConfig(
                "collection.max_supply must be at least 1".to_string(),
            ));
        }
        self.reveal.validate()?;
        self.http_api.validate()?;

        Ok(Config {
            app_data_path: self.app_data_path,
            chain: self.chain.resolve()?,
            reveal: self.reveal,
            collection: self.collection,
            http_api: self.http_api,
            key_value_store: self.key_value_store,
            logger: self.logger,
            telemetry: self.telemetry,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::config::defaults;

    #[test]
    fn development_defaults_resolve() {
        let config = defaults::config_for("development").unwrap().resolve().unwrap();

        assert_eq!(config.collection.max_supply, 10_000);
        assert_eq!(config.chain.rpc_endpoints(), ["http://localhost:8545"]);
        assert!(config.reveal.enabled);
    }

    #[test]
    fn testnet_defaults_require_contract_address() {
        let err = defaults::config_for("testnet").unwrap().resolve().unwrap_err();
        assert!(matches!(err, ConfigError::Chain(_)));
    }

    #[test]
    fn testnet_defaults_resolve_once_address_is_set() {
        let mut raw = defaults::config_for("testnet").unwrap();
        raw.chain.token_contract_address = "0x1111111111111111111111111111111111111111".to_string();

        let config = raw.resolve().unwrap();
        assert_eq!(
            config.chain.rpc_endpoints(),
            ["https://data-seed-prebsc-2-s2.binance.org:8545/"]
        );
    }

    #[test]
    fn zero_max_supply_is_rejected() {
        let mut raw = defaults::config_for("development").unwrap();
        raw.collection.max_supply = 0;

        assert!(matches!(
            raw.resolve().unwrap_err(),
            ConfigError::InvalidConfig(_)
        ));
    }

    #[test]
    fn backoff_ceiling_below_poll_interval_is_rejected() {
        let mut raw = defaults::config_for("development").unwrap();
        raw.reveal.poll_interval_secs = 30;
        raw.reveal.max_backoff_secs = 10;

        assert!(matches!(
            raw.resolve().unwrap_err(),
            ConfigError::InvalidConfig(_)
        ));
    }
}
