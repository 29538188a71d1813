mod config;
mod config_error;
mod error;
mod error_classification;
mod evm;
mod network;
mod reader;
mod rpc_executor;
mod rpc_rate_limiter;

pub use alloy::primitives::{Address, U256};
pub use config::{ChainConfig, ChainConfigRaw};
pub use config_error::ConfigError;
pub use error::ChainError;
pub use evm::EvmChainReader;
pub use network::Network;
pub use reader::{ChainReader, ChainTarget};
pub use rpc_executor::RetryPolicy;
