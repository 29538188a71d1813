use std::time::Duration;

use tokio::{sync::oneshot, task::JoinHandle};
use tokio_util::sync::CancellationToken;

/// Bounds how long an in-flight reveal script may delay shutdown.
const PERIODIC_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);
const HTTP_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

pub(super) struct ShutdownContext {
    pub(super) periodic_shutdown: CancellationToken,
    pub(super) periodic_handle: JoinHandle<()>,
    pub(super) http_shutdown_tx: oneshot::Sender<()>,
    pub(super) handle_http_events_task: JoinHandle<()>,
}

pub(super) async fn graceful_shutdown(context: ShutdownContext) {
    // Ordered shutdown:
    // 1. Stop HTTP server from accepting new connections
    // 2. Cancel periodic tasks; the watcher finishes or abandons its tick
    // 3. Wait for periodic tasks, aborting on timeout (kills the reveal script)
    // 4. Wait for HTTP to finish in-flight requests
    let ShutdownContext {
        periodic_shutdown,
        mut periodic_handle,
        http_shutdown_tx,
        mut handle_http_events_task,
    } = context;

    tracing::info!("Shutting down gracefully...");

    let _ = http_shutdown_tx.send(());

    periodic_shutdown.cancel();

    wait_for_shutdown_task(
        "periodic_tasks",
        PERIODIC_SHUTDOWN_TIMEOUT,
        &mut periodic_handle,
        true,
    )
    .await;

    wait_for_shutdown_task(
        "http_server",
        HTTP_SHUTDOWN_TIMEOUT,
        &mut handle_http_events_task,
        false,
    )
    .await;

    tracing::info!("Shutdown complete");
}

async fn wait_for_shutdown_task(
    task: &str,
    timeout: Duration,
    handle: &mut JoinHandle<()>,
    abort_on_timeout: bool,
) {
    match tokio::time::timeout(timeout, &mut *handle).await {
        Ok(Ok(())) => {}
        Ok(Err(error)) => tracing::error!(
            task,
            error = ?error,
            "Shutdown task panicked"
        ),
        Err(_) if abort_on_timeout => {
            tracing::warn!(
                task,
                timeout_secs = timeout.as_secs(),
                "Shutdown timeout reached, aborting task"
            );
            handle.abort();
            let _ = handle.await;
        }
        Err(_) => tracing::warn!(
            task,
            timeout_secs = timeout.as_secs(),
            "Shutdown timeout reached"
        ),
    }
}
