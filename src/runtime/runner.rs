use tokio::{select, signal::unix::SignalKind, sync::oneshot};
use tokio_util::sync::CancellationToken;

use super::{RuntimeDeps, ShutdownReason, shutdown};
use crate::{controllers::HttpApiRouter, periodic_tasks};

pub(crate) async fn run(deps: RuntimeDeps, http_router: Option<HttpApiRouter>) -> ShutdownReason {
    let RuntimeDeps {
        periodic_tasks_deps,
        reveal_config,
        max_supply,
        halt,
    } = deps;

    // Create HTTP shutdown channel (oneshot for single signal)
    let (http_shutdown_tx, http_shutdown_rx) = oneshot::channel::<()>();

    let periodic_shutdown = CancellationToken::new();
    let periodic_handle = tokio::task::spawn(periodic_tasks::run_all(
        periodic_tasks_deps,
        reveal_config,
        max_supply,
        periodic_shutdown.clone(),
    ));

    // Spawn HTTP API task if enabled
    let http_halt = halt.clone();
    let handle_http_events_task = tokio::task::spawn(async move {
        if let Some(router) = http_router {
            if let Err(error) = router.listen_and_handle_http_requests(http_shutdown_rx).await {
                tracing::error!(error = %error, "HTTP server failed");
                http_halt.cancel();
            }
        } else {
            // HTTP API disabled - wait for shutdown signal
            let _ = http_shutdown_rx.await;
        }
    });

    let reason = wait_for_shutdown_signal(&halt).await;

    shutdown::graceful_shutdown(shutdown::ShutdownContext {
        periodic_shutdown,
        periodic_handle,
        http_shutdown_tx,
        handle_http_events_task,
    })
    .await;

    reason
}

/// Wait for SIGINT, SIGTERM or a halted component.
async fn wait_for_shutdown_signal(halt: &CancellationToken) -> ShutdownReason {
    let mut sigterm = match tokio::signal::unix::signal(SignalKind::terminate()) {
        Ok(sigterm) => Some(sigterm),
        Err(error) => {
            tracing::warn!(error = %error, "Failed to install SIGTERM handler");
            None
        }
    };
    let sigterm_recv = async {
        match sigterm.as_mut() {
            Some(sigterm) => {
                sigterm.recv().await;
            }
            None => std::future::pending::<()>().await,
        }
    };

    select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received SIGINT, initiating shutdown...");
            ShutdownReason::Signal
        }
        _ = sigterm_recv => {
            tracing::info!("Received SIGTERM, initiating shutdown...");
            ShutdownReason::Signal
        }
        _ = halt.cancelled() => {
            tracing::error!("A component halted, initiating shutdown...");
            ShutdownReason::Halted
        }
    }
}
