mod contract;
mod provider;

use std::time::Duration;

use alloy::{
    primitives::U256,
    providers::Provider,
};
use async_trait::async_trait;

use self::{
    contract::RevealableCollection::{self, RevealableCollectionInstance},
    provider::{ChainProvider, initialize_provider},
};
use crate::{
    ChainConfig, ChainError, ChainReader, ChainTarget,
    rpc_executor::{RetryPolicy, RetryableError, backoff_delay},
    rpc_rate_limiter::RpcRateLimiter,
};

/// [`ChainReader`] over EVM JSON-RPC.
pub struct EvmChainReader {
    target: ChainTarget,
    provider: ChainProvider,
    contract: RevealableCollectionInstance<ChainProvider>,
    rpc_rate_limiter: RpcRateLimiter,
    rpc_retry_policy: RetryPolicy,
    rpc_timeout: Duration,
}

impl EvmChainReader {
    pub async fn connect(config: &ChainConfig) -> Result<Self, ChainError> {
        let provider = initialize_provider(config.rpc_endpoints()).await?;
        let contract = RevealableCollection::new(config.token_contract_address(), provider.clone());

        let rpc_rate_limiter = RpcRateLimiter::new(config.max_rpc_requests_per_second());
        if let Some(rps) = config.max_rpc_requests_per_second() {
            tracing::info!(
                network = %config.network(),
                "RPC rate limiting enabled at {} requests/second",
                rps
            );
        }

        Ok(Self {
            target: ChainTarget {
                network: config.network(),
                contract_address: config.token_contract_address(),
            },
            provider,
            contract,
            rpc_rate_limiter,
            rpc_retry_policy: RetryPolicy::rpc_default(),
            rpc_timeout: config.rpc_timeout(),
        })
    }

    /// Execute an RPC call with rate limiting, retries for transient
    /// failures, and an overall deadline covering every attempt.
    async fn rpc_call<T, E, F, O>(&self, call: &'static str, operation: F) -> Result<T, ChainError>
    where
        E: RetryableError,
        F: FnMut() -> O,
        O: std::future::IntoFuture<Output = Result<T, E>>,
    {
        match tokio::time::timeout(self.rpc_timeout, self.retry_call(call, operation)).await {
            Ok(result) => result,
            Err(_) => Err(ChainError::Timeout {
                call,
                timeout: self.rpc_timeout,
            }),
        }
    }

    async fn retry_call<T, E, F, O>(
        &self,
        call: &'static str,
        mut operation: F,
    ) -> Result<T, ChainError>
    where
        E: RetryableError,
        F: FnMut() -> O,
        O: std::future::IntoFuture<Output = Result<T, E>>,
    {
        let mut attempt = 1;
        loop {
            self.rpc_rate_limiter.acquire().await;
            match operation().into_future().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= self.rpc_retry_policy.max_attempts || !err.is_retryable() {
                        return Err(err.into_chain_error(call));
                    }

                    let delay = backoff_delay(&self.rpc_retry_policy, attempt, err.backoff_hint());
                    tracing::warn!(
                        call,
                        attempt,
                        max_attempts = self.rpc_retry_policy.max_attempts,
                        delay_ms = delay.as_millis(),
                        error = %err,
                        "rpc_call failed; retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[async_trait]
impl ChainReader for EvmChainReader {
    fn target(&self) -> &ChainTarget {
        &self.target
    }

    async fn block_number(&self) -> Result<u64, ChainError> {
        self.rpc_call("eth_blockNumber", || self.provider.get_block_number())
            .await
    }

    async fn total_supply(&self) -> Result<U256, ChainError> {
        self.rpc_call("totalSupply", || async {
            self.contract.totalSupply().call().await
        })
        .await
    }

    async fn paused(&self) -> Result<bool, ChainError> {
        self.rpc_call("paused", || async { self.contract.paused().call().await })
            .await
    }

    async fn revealed(&self) -> Result<bool, ChainError> {
        self.rpc_call("revealed", || async { self.contract.revealed().call().await })
            .await
    }
}
