use std::time::Duration;

use alloy::{
    contract::Error as ContractError,
    transports::{RpcError, TransportErrorKind},
};

#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("Contract call {call} failed: {source}")]
    Contract {
        call: &'static str,
        #[source]
        source: ContractError,
    },

    #[error("RPC call {call} failed: {source}")]
    Rpc {
        call: &'static str,
        #[source]
        source: RpcError<TransportErrorKind>,
    },

    #[error("RPC call {call} timed out after {}ms", timeout.as_millis())]
    Timeout {
        call: &'static str,
        timeout: Duration,
    },

    #[error("RPC connection failed after trying {attempts} endpoint(s)")]
    RpcConnectionFailed { attempts: usize },

    #[error("{0}")]
    Custom(String),
}
