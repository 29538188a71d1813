use std::time::Duration;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, Network};

/// Chain access settings as they appear in configuration files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainConfigRaw {
    /// Network the collection contract lives on.
    pub network: Network,

    /// RPC endpoints (HTTP or WebSocket). When empty, the network's public
    /// endpoints are used. Multiple endpoints enable failover.
    #[serde(default)]
    pub rpc_endpoints: Vec<String>,

    /// Address of the collection contract.
    pub token_contract_address: String,

    /// Upper bound for a single contract read, including its retries.
    pub rpc_timeout_ms: u64,

    /// Maximum RPC requests per second. `None` means unlimited.
    #[serde(default)]
    pub max_rpc_requests_per_second: Option<u32>,
}

impl ChainConfigRaw {
    pub fn resolve(self) -> Result<ChainConfig, ConfigError> {
        let token_contract_address: Address =
            self.token_contract_address.trim().parse().map_err(|_| {
                ConfigError::InvalidContractAddress {
                    address: self.token_contract_address.clone(),
                }
            })?;

        if token_contract_address == Address::ZERO {
            return Err(ConfigError::InvalidContractAddress {
                address: self.token_contract_address,
            });
        }

        if self.rpc_timeout_ms == 0 {
            return Err(ConfigError::InvalidConfig(
                "rpc_timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.max_rpc_requests_per_second == Some(0) {
            return Err(ConfigError::InvalidConfig(
                "max_rpc_requests_per_second must be greater than 0 when set".to_string(),
            ));
        }

        let rpc_endpoints = if self.rpc_endpoints.is_empty() {
            self.network.default_rpc_endpoints()
        } else {
            self.rpc_endpoints
        };

        Ok(ChainConfig {
            network: self.network,
            rpc_endpoints,
            token_contract_address,
            rpc_timeout: Duration::from_millis(self.rpc_timeout_ms),
            max_rpc_requests_per_second: self.max_rpc_requests_per_second,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ChainConfig {
    network: Network,
    rpc_endpoints: Vec<String>,
    token_contract_address: Address,
    rpc_timeout: Duration,
    max_rpc_requests_per_second: Option<u32>,
}

impl ChainConfig {
    pub fn network(&self) -> Network {
        self.network
    }

    pub fn rpc_endpoints(&self) -> &[String] {
        &self.rpc_endpoints
    }

    pub fn token_contract_address(&self) -> Address {
        self.token_contract_address
    }

    pub fn rpc_timeout(&self) -> Duration {
        self.rpc_timeout
    }

    pub fn max_rpc_requests_per_second(&self) -> Option<u32> {
        self.max_rpc_requests_per_second
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn raw() -> ChainConfigRaw {
        ChainConfigRaw {
            network: Network::BscTestnet,
            rpc_endpoints: Vec::new(),
            token_contract_address: "0x5FbDB2315678afecb367f032d93F642f64180aa3".to_string(),
            rpc_timeout_ms: 10_000,
            max_rpc_requests_per_second: None,
        }
    }

    #[test]
    fn empty_endpoints_fall_back_to_network_defaults() {
        let config = raw().resolve().unwrap();
        assert_eq!(
            config.rpc_endpoints(),
            Network::BscTestnet.default_rpc_endpoints().as_slice()
        );
        assert_eq!(config.rpc_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn explicit_endpoints_win() {
        let config = ChainConfigRaw {
            rpc_endpoints: vec!["http://node:8545".to_string()],
            ..raw()
        }
        .resolve()
        .unwrap();
        assert_eq!(config.rpc_endpoints(), ["http://node:8545".to_string()]);
    }

    #[test]
    fn rejects_malformed_and_zero_addresses() {
        let malformed = ChainConfigRaw {
            token_contract_address: "0x1234".to_string(),
            ..raw()
        };
        assert!(matches!(
            malformed.resolve(),
            Err(ConfigError::InvalidContractAddress { .. })
        ));

        let zero = ChainConfigRaw {
            token_contract_address: format!("{:?}", Address::ZERO),
            ..raw()
        };
        assert!(matches!(
            zero.resolve(),
            Err(ConfigError::InvalidContractAddress { .. })
        ));
    }

    #[test]
    fn rejects_zero_rate_limit_and_timeout() {
        let rate = ChainConfigRaw {
            max_rpc_requests_per_second: Some(0),
            ..raw()
        };
        assert!(matches!(rate.resolve(), Err(ConfigError::InvalidConfig(_))));

        let timeout = ChainConfigRaw {
            rpc_timeout_ms: 0,
            ..raw()
        };
        assert!(matches!(timeout.resolve(), Err(ConfigError::InvalidConfig(_))));
    }
}
