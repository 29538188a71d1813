use std::sync::Arc;

use axum::body::Body;
use governor::middleware::NoOpMiddleware;
use serde::{Deserialize, Serialize};
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::PeerIpKeyExtractor,
};

use crate::config::ConfigError;

/// Per-client-IP token bucket for the HTTP API.
///
/// Tokens are replenished at `max_requests / time_window_seconds`; a client may
/// spend up to `burst_size` tokens at once.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RateLimiterConfig {
    pub enabled: bool,
    pub time_window_seconds: u64,
    pub max_requests: u32,
    /// Defaults to `max_requests` if not specified.
    #[serde(default)]
    pub burst_size: Option<u32>,
}

impl RateLimiterConfig {
    pub(crate) fn effective_burst_size(&self) -> u32 {
        self.burst_size.unwrap_or(self.max_requests)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        if self.time_window_seconds == 0 || self.max_requests == 0 {
            return Err(ConfigError::InvalidConfig(
                "http_api.rate_limiter needs a non-zero time_window_seconds and max_requests"
                    .to_string(),
            ));
        }
        if self.effective_burst_size() == 0 {
            return Err(ConfigError::InvalidConfig(
                "http_api.rate_limiter.burst_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the rate limiter layer.
    ///
    /// Returns `None` if rate limiting is disabled.
    pub(crate) fn build_layer(
        &self,
    ) -> Option<GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware, Body>> {
        if !self.enabled {
            return None;
        }

        // e.g. 1 second / 50 requests = one token every 20ms
        let replenish_interval_ms =
            ((self.time_window_seconds * 1000) / u64::from(self.max_requests.max(1))).max(1);

        let Some(config) = GovernorConfigBuilder::default()
            .per_millisecond(replenish_interval_ms)
            .burst_size(self.effective_burst_size())
            .finish()
        else {
            tracing::warn!(
                burst_size = self.effective_burst_size(),
                "Rate limiter settings rejected; rate limiting disabled"
            );
            return None;
        };

        Some(GovernorLayer::new(Arc::new(config)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_requests: u32, burst_size: Option<u32>) -> RateLimiterConfig {
        RateLimiterConfig {
            enabled: true,
            time_window_seconds: 1,
            max_requests,
            burst_size,
        }
    }

    #[test]
    fn burst_size_defaults_to_max_requests() {
        assert_eq!(config(20, None).effective_burst_size(), 20);
        assert_eq!(config(20, Some(5)).effective_burst_size(), 5);
    }

    #[test]
    fn build_layer_returns_none_when_disabled() {
        let config = RateLimiterConfig {
            enabled: false,
            ..config(50, Some(100))
        };
        assert!(config.build_layer().is_none());
    }

    #[test]
    fn build_layer_returns_some_when_enabled() {
        assert!(config(50, Some(100)).build_layer().is_some());
    }

    #[test]
    fn zero_burst_is_rejected() {
        assert!(config(50, Some(0)).validate().is_err());
        assert!(config(0, None).validate().is_err());
        assert!(config(50, None).validate().is_ok());
    }
}
