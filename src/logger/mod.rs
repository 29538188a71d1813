//! Tracing subscriber and Prometheus exporter setup.
//!
//! `RUST_LOG` takes precedence over the configured level.

mod config;

use std::net::SocketAddr;

pub(crate) use config::{LogFormat, LoggerConfig, TelemetryConfig, TelemetryMetricsConfig};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// RPC transport crates that log every request at debug level. They stay at
/// `warn` unless the configured level names them explicitly.
const QUIET_DEPENDENCIES: &[&str] = &["hyper_util", "alloy_transport_http", "alloy_rpc_client"];

pub(crate) fn initialize(logger_config: &LoggerConfig, telemetry_config: &TelemetryConfig) {
    let (filter, source) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, "RUST_LOG"),
        Err(_) => (
            EnvFilter::new(configured_directives(&logger_config.level)),
            "config",
        ),
    };

    let fmt_layer = match logger_config.format {
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed(),
        LogFormat::Json => fmt::layer().json().with_current_span(true).boxed(),
    };

    if let Err(error) = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .try_init()
    {
        eprintln!("Logger already initialized: {error}");
        return;
    }

    tracing::info!(
        format = ?logger_config.format,
        filter_source = source,
        "Reveal engine logging initialized"
    );

    initialize_metrics(&telemetry_config.metrics);
}

/// Expand the configured level into filter directives.
fn configured_directives(level: &str) -> String {
    let mut directives = level.trim().to_string();
    for dependency in QUIET_DEPENDENCIES {
        if !directives.contains(dependency) {
            directives.push_str(&format!(",{dependency}=warn"));
        }
    }
    directives
}

fn initialize_metrics(metrics_config: &TelemetryMetricsConfig) {
    if !metrics_config.enabled {
        tracing::debug!("Prometheus metrics exporter disabled");
        return;
    }

    let bind_address: SocketAddr = match metrics_config.bind_address.parse() {
        Ok(address) => address,
        Err(error) => {
            tracing::warn!(
                bind_address = %metrics_config.bind_address,
                error = %error,
                "Invalid metrics bind address; metrics exporter disabled"
            );
            return;
        }
    };

    if let Err(error) = PrometheusBuilder::new()
        .with_http_listener(bind_address)
        .install()
    {
        tracing::warn!(
            bind_address = %bind_address,
            error = %error,
            "Failed to start Prometheus metrics exporter"
        );
        return;
    }

    tracing::info!(bind_address = %bind_address, "Serving reveal metrics");
}
