use serde::{Deserialize, Serialize};

/// Networks the collection contract can be deployed on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    /// Local development chain.
    Ganache,
    BscTestnet,
    BscMainnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Ganache => "ganache",
            Network::BscTestnet => "bsc-testnet",
            Network::BscMainnet => "bsc-mainnet",
        }
    }

    /// Public RPC endpoints used when the configuration does not list any.
    pub fn default_rpc_endpoints(&self) -> Vec<String> {
        let endpoints: &[&str] = match self {
            Network::Ganache => &["http://localhost:8545"],
            Network::BscTestnet => &["https://data-seed-prebsc-2-s2.binance.org:8545/"],
            Network::BscMainnet => &["https://bsc-dataseed.binance.org/"],
        };
        endpoints.iter().map(|e| e.to_string()).collect()
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn deserializes_kebab_case_names() {
        let network: Network = serde_json::from_str("\"bsc-testnet\"").unwrap();
        assert_eq!(network, Network::BscTestnet);
        assert_eq!(network.to_string(), "bsc-testnet");
    }

    #[test]
    fn every_network_has_a_default_endpoint() {
        for network in [Network::Ganache, Network::BscTestnet, Network::BscMainnet] {
            assert!(!network.default_rpc_endpoints().is_empty());
        }
    }
}
