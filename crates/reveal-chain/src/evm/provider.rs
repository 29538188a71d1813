use std::num::NonZeroUsize;

use alloy::{
    network::Ethereum,
    providers::{DynProvider, Provider, ProviderBuilder, WsConnect},
    rpc::client::RpcClient,
    transports::{
        BoxTransport, IntoBoxTransport,
        http::{Http, reqwest::Url},
        layers::FallbackLayer,
    },
};
use tower::ServiceBuilder;

use crate::ChainError;

pub(crate) type ChainProvider = DynProvider<Ethereum>;

/// Creates a read-only provider over the given RPC endpoints.
/// Supports both HTTP and WebSocket endpoints with automatic failover.
pub(crate) async fn initialize_provider(
    rpc_endpoints: &[String],
) -> Result<ChainProvider, ChainError> {
    let mut transports: Vec<BoxTransport> = Vec::new();
    let mut valid_endpoints = Vec::new();

    for endpoint in rpc_endpoints {
        if endpoint.starts_with("ws://") || endpoint.starts_with("wss://") {
            let ws_connect = WsConnect::new(endpoint);
            match RpcClient::connect_pubsub(ws_connect).await {
                Ok(client) => {
                    transports.push(client.transport().clone().into_box_transport());
                    valid_endpoints.push(endpoint.clone());
                    tracing::debug!("WebSocket RPC endpoint added: {}", endpoint);
                }
                Err(e) => {
                    tracing::warn!("Failed to connect to WebSocket RPC '{}': {}", endpoint, e);
                }
            }
        } else {
            match endpoint.parse::<Url>() {
                Ok(url) => {
                    transports.push(Http::new(url).into_box_transport());
                    valid_endpoints.push(endpoint.clone());
                    tracing::debug!("HTTP RPC endpoint added: {}", endpoint);
                }
                Err(e) => {
                    tracing::warn!("Invalid RPC URL '{}': {}", endpoint, e);
                }
            }
        }
    }

    if transports.is_empty() {
        return Err(ChainError::RpcConnectionFailed {
            attempts: rpc_endpoints.len(),
        });
    }

    // One transport at a time; the next one is only tried on failure.
    let fallback_layer = FallbackLayer::default().with_active_transport_count(NonZeroUsize::MIN);

    let transport = ServiceBuilder::new()
        .layer(fallback_layer)
        .service(transports);

    let client = RpcClient::builder().transport(transport, false);
    let provider = ProviderBuilder::new().connect_client(client);

    // The endpoint may be down at startup; the watcher retries on its own
    // schedule, so an unreachable chain is only worth a warning here.
    match provider.get_block_number().await {
        Ok(block) => tracing::info!(
            "Chain provider initialized with {} RPC endpoints (block: {}): {:?}",
            valid_endpoints.len(),
            block,
            valid_endpoints
        ),
        Err(e) => tracing::warn!(
            endpoints = ?valid_endpoints,
            error = %e,
            "RPC endpoints failed initial connectivity check"
        ),
    }

    Ok(provider.erased())
}
