use std::{
    net::{Ipv4Addr, SocketAddr},
    time::Duration,
};

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::oneshot};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use super::{
    HttpApiDeps,
    middleware::RateLimiterConfig,
    v1::{
        info_http_api_controller::InfoHttpApiController,
        metadata_http_api_controller::MetadataHttpApiController,
    },
};
use crate::config::ConfigError;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct HttpApiConfig {
    /// Whether the HTTP API server is enabled.
    pub enabled: bool,
    pub port: u16,
    pub request_timeout_secs: u64,
    /// `*` or a single origin.
    pub allow_origin: String,
    pub rate_limiter: RateLimiterConfig,
}

impl HttpApiConfig {
    pub(crate) fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "http_api.request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.allow_origin != "*" && HeaderValue::from_str(&self.allow_origin).is_err() {
            return Err(ConfigError::InvalidConfig(format!(
                "http_api.allow_origin '{}' is not a valid header value",
                self.allow_origin
            )));
        }
        self.rate_limiter.validate()
    }

    fn cors_layer(&self) -> CorsLayer {
        let allow_origin = if self.allow_origin == "*" {
            AllowOrigin::any()
        } else {
            match HeaderValue::from_str(&self.allow_origin) {
                Ok(origin) => AllowOrigin::exact(origin),
                Err(_) => {
                    tracing::warn!(
                        allow_origin = %self.allow_origin,
                        "Invalid CORS origin; cross-origin requests will be refused"
                    );
                    AllowOrigin::list([])
                }
            }
        };

        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET])
    }
}

pub(crate) struct HttpApiRouter {
    config: HttpApiConfig,
    router: Router,
}

impl HttpApiRouter {
    pub(crate) fn new(config: &HttpApiConfig, deps: HttpApiDeps) -> Self {
        let mut router = Router::new()
            .route(
                "/metadata/{id}",
                get(MetadataHttpApiController::handle_request),
            )
            .route("/info", get(InfoHttpApiController::handle_request))
            .with_state(deps);

        // Layer order (bottom-to-top, last added runs first):
        // 1. Rate limiter (innermost)
        // 2. Request timeout
        // 3. Request tracing
        // 4. CORS (outermost)

        if let Some(layer) = config.rate_limiter.build_layer() {
            router = router.layer(layer);
            tracing::info!(
                "Rate limiter enabled: {} requests per {} seconds (burst: {})",
                config.rate_limiter.max_requests,
                config.rate_limiter.time_window_seconds,
                config.rate_limiter.effective_burst_size()
            );
        } else {
            tracing::info!("Rate limiter disabled");
        }

        router = router.layer(TimeoutLayer::new(config.request_timeout()));
        router = router.layer(TraceLayer::new_for_http());
        router = router.layer(config.cors_layer());

        HttpApiRouter {
            config: config.to_owned(),
            router,
        }
    }

    #[cfg(test)]
    pub(crate) fn router(&self) -> Router {
        self.router.clone()
    }

    pub(crate) async fn listen_and_handle_http_requests(
        self,
        shutdown_rx: oneshot::Receiver<()>,
    ) -> std::io::Result<()> {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.config.port));
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, "HTTP API listening");

        // Connect info makes the client IP available to the rate limiter.
        axum::serve(
            listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
            tracing::info!("HTTP server shutting down gracefully");
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::{os::unix::fs::PermissionsExt, sync::Arc, time::Duration};

    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use chrono::Utc;
    use http_body_util::BodyExt;
    use reveal_domain::{CollectionProfile, TokenId};
    use reveal_key_value_store::{
        KeyValueStoreManager, KeyValueStoreManagerConfig, RevealState, RevealStateStorage,
    };
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::services::{MetadataStore, RevealExecutor, ScriptRevealExecutor};

    const REVEALED_42: &str = r#"{"name":"CHIBI #42","description":"d","image":"ipfs://42.png","attributes":[{"trait_type":"Hat","value":"Crown"}]}"#;

    struct Fixture {
        dir: TempDir,
        store: MetadataStore,
        state: Arc<dyn RevealStateStorage>,
        router: Router,
    }

    fn collection() -> CollectionProfile {
        CollectionProfile {
            max_supply: 10_000,
            name_prefix: "CHIBI".to_string(),
            description: "A collection of 10,000 NFTs.".to_string(),
            image: "ipfs://placeholder-image".to_string(),
            animation_url: None,
            external_url: None,
            creator: None,
        }
    }

    fn config() -> HttpApiConfig {
        HttpApiConfig {
            enabled: true,
            port: 0,
            request_timeout_secs: 5,
            allow_origin: "*".to_string(),
            // The peer IP extractor needs a real socket.
            rate_limiter: RateLimiterConfig {
                enabled: false,
                time_window_seconds: 1,
                max_requests: 50,
                burst_size: None,
            },
        }
    }

    async fn fixture() -> Fixture {
        fixture_with(collection()).await
    }

    async fn fixture_with(collection: CollectionProfile) -> Fixture {
        let dir = TempDir::new().unwrap();
        let store = MetadataStore::new(dir.path().join("json"));
        store.ensure_root().await.unwrap();
        let manager = KeyValueStoreManager::connect(
            dir.path().join("state.redb"),
            &KeyValueStoreManagerConfig::default(),
        )
        .await
        .unwrap();
        let state: Arc<dyn RevealStateStorage> =
            Arc::new(manager.reveal_state_store());
        let deps = HttpApiDeps {
            collection: Arc::new(collection),
            metadata_store: store.clone(),
            reveal_state_store: Arc::clone(&state),
        };
        let router = HttpApiRouter::new(&config(), deps).router();
        Fixture {
            dir,
            store,
            state,
            router,
        }
    }

    async fn get(router: &Router, uri: &str) -> (StatusCode, Option<HeaderValue>, Vec<u8>) {
        let response = router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, content_type, body.to_vec())
    }

    #[tokio::test]
    async fn placeholder_is_served_before_reveal() {
        let fixture = fixture().await;

        let (status, content_type, body) = get(&fixture.router, "/metadata/42").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.unwrap(), "application/json");
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["name"], "CHIBI #42");
        assert_eq!(json["attributes"][0]["trait_type"], "CHIBI #42");
        assert_eq!(json["attributes"][0]["value"], "?");

        let (_, _, again) = get(&fixture.router, "/metadata/42").await;
        assert_eq!(body, again);
    }

    #[tokio::test]
    async fn plus_prefixed_id_serves_placeholder() {
        let fixture = fixture().await;

        let (status, _, body) = get(&fixture.router, "/metadata/+42").await;

        assert_eq!(status, StatusCode::OK);
        let (_, _, canonical) = get(&fixture.router, "/metadata/42").await;
        assert_eq!(body, canonical);
    }

    #[tokio::test]
    async fn revealed_file_is_served_verbatim() {
        let fixture = fixture().await;
        let id = TokenId::new(42, 10_000).unwrap();
        std::fs::write(fixture.store.token_path(id), REVEALED_42).unwrap();

        let (status, content_type, body) = get(&fixture.router, "/metadata/42").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.unwrap(), "application/json");
        assert_eq!(body, REVEALED_42.as_bytes());
    }

    #[tokio::test]
    async fn invalid_ids_are_not_found() {
        let fixture = fixture().await;

        for uri in [
            "/metadata/0",
            "/metadata/10001",
            "/metadata/abc",
            "/metadata/-1",
            "/metadata/++42",
            "/metadata/+-1",
            "/metadata/4.2",
        ] {
            let (status, _, body) = get(&fixture.router, uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert!(json["error"].is_string(), "{uri}");
        }
    }

    const LARGE_RECORDS_SCRIPT: &str = r#"#!/bin/sh
set -e
pad=$(head -c 32768 /dev/zero | tr '\0' 'x')
i="$REVEAL_TOKEN_MIN"
while [ "$i" -le "$REVEAL_TOKEN_MAX" ]; do
  printf '{"name":"CHIBI #%s","description":"%s","image":"ipfs://img/%s","attributes":[{"trait_type":"Hat","value":"Crown"}]}' "$i" "$pad" "$i" > "$1/$i.json"
  i=$((i + 1))
done
"#;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn reads_during_publish_see_placeholder_or_revealed() {
        const SUPPLY: u64 = 64;
        let fixture = fixture_with(CollectionProfile {
            max_supply: SUPPLY,
            ..collection()
        })
        .await;
        let script = fixture.dir.path().join("reveal.sh");
        std::fs::write(&script, LARGE_RECORDS_SCRIPT).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        let executor = ScriptRevealExecutor::new(
            fixture.store.clone(),
            script,
            Duration::from_secs(60),
            SUPPLY,
        );

        let reveal = tokio::spawn(async move { executor.execute().await });

        let mut revealed = vec![false; SUPPLY as usize + 1];
        loop {
            let finished = reveal.is_finished();
            for value in 1..=SUPPLY {
                let uri = format!("/metadata/{value}");
                let (status, _, body) = get(&fixture.router, &uri).await;
                assert_eq!(status, StatusCode::OK, "{uri}");
                let json: serde_json::Value = serde_json::from_slice(&body)
                    .unwrap_or_else(|e| panic!("{uri} returned unparsable JSON: {e}"));
                assert_eq!(json["name"], format!("CHIBI #{value}"));

                let is_revealed = json["attributes"][0]["value"] != "?";
                assert!(
                    is_revealed || !revealed[value as usize],
                    "{uri} went back to the placeholder"
                );
                revealed[value as usize] |= is_revealed;
            }
            if finished {
                break;
            }
        }

        let report = reveal.await.unwrap().unwrap();
        assert_eq!(report.published, SUPPLY as usize);
        assert!(revealed[1..].iter().all(|seen| *seen));
    }

    #[tokio::test]
    async fn corrupt_revealed_file_is_a_server_error() {
        let fixture = fixture().await;
        let id = TokenId::new(7, 10_000).unwrap();
        std::fs::write(fixture.store.token_path(id), b"{\"name\": ").unwrap();

        let (status, _, body) = get(&fixture.router, "/metadata/7").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn info_reports_reveal_state() {
        let fixture = fixture().await;

        let (status, _, body) = get(&fixture.router, "/info").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(json["max_supply"], 10_000);
        assert_eq!(json["revealed"], false);

        fixture
            .state
            .save(RevealState::triggered_at_block(Some(9), Utc::now()))
            .await
            .unwrap();
        let (_, _, body) = get(&fixture.router, "/info").await;
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["revealed"], true);
        assert_eq!(json["reveal_block_number"], 9);
        assert!(fixture.dir.path().join("state.redb").exists());
    }

    #[test]
    fn invalid_origin_is_rejected() {
        let mut config = config();
        config.allow_origin = "bad\norigin".to_string();
        assert!(config.validate().is_err());

        config.allow_origin = "https://chibiverse.fun".to_string();
        assert!(config.validate().is_ok());
    }
}
