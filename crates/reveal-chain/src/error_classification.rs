use std::time::Duration;

use alloy::{
    contract::Error as ContractError,
    transports::{RpcError, TransportErrorKind},
};

pub(crate) fn is_retryable_rpc_error(err: &RpcError<TransportErrorKind>) -> bool {
    match err {
        RpcError::Transport(kind) => match kind {
            TransportErrorKind::MissingBatchResponse(_) => true,
            TransportErrorKind::BackendGone => true,
            TransportErrorKind::HttpError(http) => {
                http.is_rate_limit_err() || http.is_temporarily_unavailable()
            }
            TransportErrorKind::Custom(custom) => {
                let msg = custom.to_string().to_ascii_lowercase();
                msg.contains("too many requests") || msg.contains("rate limit")
            }
            _ => false,
        },
        RpcError::ErrorResp(payload) => payload.is_retry_err(),
        RpcError::NullResp => true,
        RpcError::DeserError { text, .. } => {
            let lowered = text.to_ascii_lowercase();
            lowered.contains("rate limit")
                || lowered.contains("too many requests")
                || lowered.contains("request limit")
        }
        _ => false,
    }
}

pub(crate) fn rpc_backoff_hint(err: &RpcError<TransportErrorKind>) -> Option<Duration> {
    let RpcError::ErrorResp(payload) = err else {
        return None;
    };

    let data = payload.try_data_as::<serde_json::Value>()?;
    let Ok(data) = data else {
        return None;
    };

    let backoff_seconds = data["rate"]["backoff_seconds"].as_f64()?;
    Some(Duration::from_secs(backoff_seconds.ceil() as u64))
}

/// Reverts are deterministic for a view call, so only transport-level
/// failures are worth retrying.
pub(crate) fn is_retryable_contract_error(err: &ContractError) -> bool {
    if err.as_revert_data().is_some() {
        return false;
    }

    match err {
        ContractError::TransportError(inner) => is_retryable_rpc_error(inner),
        _ => false,
    }
}

pub(crate) fn contract_error_backoff_hint(err: &ContractError) -> Option<Duration> {
    match err {
        ContractError::TransportError(inner) => rpc_backoff_hint(inner),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_response_is_retryable() {
        assert!(is_retryable_rpc_error(&RpcError::NullResp));
    }

    #[test]
    fn backend_gone_is_retryable() {
        let err: RpcError<TransportErrorKind> = RpcError::Transport(TransportErrorKind::BackendGone);
        assert!(is_retryable_rpc_error(&err));
        assert!(is_retryable_contract_error(&ContractError::TransportError(
            err
        )));
    }

    #[test]
    fn unsupported_feature_is_not_retryable() {
        let err: RpcError<TransportErrorKind> = RpcError::UnsupportedFeature("eth_call");
        assert!(!is_retryable_rpc_error(&err));
    }
}
