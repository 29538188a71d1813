//! Typed default configurations for each environment.
//!
//! Each environment (development, testnet, mainnet) gets a fully constructed
//! [`ConfigRaw`] via [`config_for`]. Shared defaults are factored into helper
//! functions so the per-environment differences stay visible.

use std::path::PathBuf;

use reveal_chain::{ChainConfigRaw, Network};
use reveal_domain::CollectionProfile;
use reveal_key_value_store::KeyValueStoreManagerConfig;

use super::{ConfigError, ConfigRaw};
use crate::{
    controllers::http_api_controller::{middleware::RateLimiterConfig, router::HttpApiConfig},
    logger::{LogFormat, LoggerConfig, TelemetryConfig, TelemetryMetricsConfig},
    periodic_tasks::tasks::reveal_watcher::{RevealConditionKind, RevealWatcherConfig},
};

/// Returns the default [`ConfigRaw`] for the given environment name.
pub(crate) fn config_for(environment: &str) -> Result<ConfigRaw, ConfigError> {
    match environment {
        "development" => Ok(development()),
        "testnet" => Ok(testnet()),
        "mainnet" => Ok(mainnet()),
        _ => Err(ConfigError::UnknownEnvironment(environment.to_string())),
    }
}

// ── Shared defaults (identical across all environments) ─────────

fn collection() -> CollectionProfile {
    CollectionProfile {
        max_supply: 10_000,
        name_prefix: "CHIBI".to_string(),
        description: "A collection of 10,000 NFTs minted on the Ethereum blockchain. Every \
                      character is created by a random algorithm which ensures that each \
                      character is unique and differentiated from the others."
            .to_string(),
        image: "ipfs://QmdttDSCMFk3o6vseaNGjimQ2VFCfkcqwdv2uvjAmNQKxC".to_string(),
        animation_url: Some("ipfs://QmSUoZUxAfjfXoF5aMYL1GuAPDrHGGjr72CdNB4Bni672Q".to_string()),
        external_url: Some("https://chibiverse.fun".to_string()),
        creator: Some("Maxvoy".to_string()),
    }
}

fn reveal(poll_interval_secs: u64) -> RevealWatcherConfig {
    RevealWatcherConfig {
        enabled: true,
        metadata_path: PathBuf::from("assets/json"),
        script_path: PathBuf::from("scripts/reveal.sh"),
        script_timeout_secs: 1800,
        condition: RevealConditionKind::SupplyReached,
        poll_interval_secs,
        max_backoff_secs: 60,
    }
}

fn http_api() -> HttpApiConfig {
    HttpApiConfig {
        enabled: true,
        port: 1323,
        request_timeout_secs: 10,
        allow_origin: "*".to_string(),
        rate_limiter: RateLimiterConfig {
            enabled: true,
            time_window_seconds: 1,
            max_requests: 50,
            burst_size: Some(100),
        },
    }
}

fn key_value_store() -> KeyValueStoreManagerConfig {
    KeyValueStoreManagerConfig {
        max_concurrent_operations: 16,
    }
}

fn telemetry(metrics_enabled: bool) -> TelemetryConfig {
    TelemetryConfig {
        metrics: TelemetryMetricsConfig {
            enabled: metrics_enabled,
            bind_address: "127.0.0.1:9464".to_string(),
        },
    }
}

// ── Parameterized helpers (shared structure, varying values) ────

fn chain(network: Network, token_contract_address: &str) -> ChainConfigRaw {
    ChainConfigRaw {
        network,
        rpc_endpoints: Vec::new(),
        token_contract_address: token_contract_address.to_string(),
        rpc_timeout_ms: 15_000,
        max_rpc_requests_per_second: None,
    }
}

// ── Per-environment constructors ────────────────────────────────

fn development() -> ConfigRaw {
    ConfigRaw {
        environment: "development".to_string(),
        app_data_path: PathBuf::from("data"),
        // First contract deployed by the deterministic ganache account.
        chain: chain(Network::Ganache, "0xe78A0F7E598Cc8b0Bb87894B0F60dD2a88d6a8Ab"),
        reveal: reveal(5),
        collection: collection(),
        http_api: http_api(),
        key_value_store: key_value_store(),
        logger: LoggerConfig {
            level: "reveal_engine=debug,reveal_chain=debug,info".to_string(),
            format: LogFormat::Pretty,
        },
        telemetry: telemetry(false),
    }
}

fn testnet() -> ConfigRaw {
    ConfigRaw {
        environment: "testnet".to_string(),
        app_data_path: PathBuf::from("data"),
        chain: chain(Network::BscTestnet, ""),
        reveal: reveal(15),
        collection: collection(),
        http_api: http_api(),
        key_value_store: key_value_store(),
        logger: LoggerConfig {
            level: "reveal_engine=info,info".to_string(),
            format: LogFormat::Pretty,
        },
        telemetry: telemetry(false),
    }
}

fn mainnet() -> ConfigRaw {
    ConfigRaw {
        environment: "mainnet".to_string(),
        app_data_path: PathBuf::from("data"),
        chain: chain(Network::BscMainnet, ""),
        reveal: reveal(15),
        collection: collection(),
        http_api: http_api(),
        key_value_store: key_value_store(),
        logger: LoggerConfig {
            level: "reveal_engine=info,info".to_string(),
            format: LogFormat::Json,
        },
        telemetry: telemetry(true),
    }
}
