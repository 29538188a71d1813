use std::{future::Future, ops::ControlFlow, time::Duration};

use tokio_util::sync::CancellationToken;

/// Drive `run_once` until shutdown is requested or it asks to stop.
///
/// `run_once` returns the delay before the next iteration, or `Break` when
/// the task cannot safely continue.
pub(crate) async fn run_with_shutdown<F, Fut>(
    task_name: &'static str,
    shutdown: CancellationToken,
    mut run_once: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = ControlFlow<(), Duration>>,
{
    loop {
        let delay = match run_once().await {
            ControlFlow::Continue(delay) => delay,
            ControlFlow::Break(()) => {
                tracing::error!(task = task_name, "Periodic task halted");
                break;
            }
        };

        reveal_observability::record_task_cadence(task_name, delay);
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown.cancelled() => {
                tracing::info!(task = task_name, "Periodic task shutting down");
                break;
            }
        }
    }
}
