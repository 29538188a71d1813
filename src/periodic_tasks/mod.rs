mod deps;
mod runner;
pub(crate) mod tasks;

use std::sync::Arc;

pub(crate) use deps::{PeriodicTasksDeps, RevealWatcherDeps};
use tasks::reveal_watcher::{RevealWatcherConfig, RevealWatcherTask};
use tokio_util::sync::CancellationToken;

/// Spawn all periodic tasks and wait for them to complete.
///
/// Under normal operation, tasks only exit during shutdown.
pub(crate) async fn run_all(
    deps: Arc<PeriodicTasksDeps>,
    reveal_config: RevealWatcherConfig,
    max_supply: u64,
    shutdown: CancellationToken,
) {
    let mut set = tokio::task::JoinSet::new();

    if reveal_config.enabled {
        let task =
            RevealWatcherTask::new(deps.reveal_watcher.clone(), &reveal_config, max_supply);
        set.spawn(task.run(shutdown.clone()));
    } else {
        tracing::info!("Reveal watcher disabled");
    }

    while let Some(result) = set.join_next().await {
        if let Err(error) = result {
            tracing::error!(error = ?error, "Periodic task panicked");
        }
    }
}
