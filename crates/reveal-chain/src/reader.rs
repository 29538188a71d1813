use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use crate::{ChainError, Network};

/// Network and contract a reader is bound to, used as log context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainTarget {
    pub network: Network,
    pub contract_address: Address,
}

impl std::fmt::Display for ChainTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.network, self.contract_address)
    }
}

/// Read-only view of the collection contract.
///
/// Implementations bound every call in time; a call that runs past its timeout
/// fails with [`ChainError::Timeout`].
#[async_trait]
pub trait ChainReader: Send + Sync {
    fn target(&self) -> &ChainTarget;

    /// Latest block height known to the endpoint.
    async fn block_number(&self) -> Result<u64, ChainError>;

    async fn total_supply(&self) -> Result<U256, ChainError>;

    async fn paused(&self) -> Result<bool, ChainError>;

    /// Explicit on-chain reveal flag.
    async fn revealed(&self) -> Result<bool, ChainError>;
}
