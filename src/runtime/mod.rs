mod runner;
mod shutdown;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::periodic_tasks::{self, tasks::reveal_watcher::RevealWatcherConfig};

pub(crate) struct RuntimeDeps {
    pub(crate) periodic_tasks_deps: Arc<periodic_tasks::PeriodicTasksDeps>,
    pub(crate) reveal_config: RevealWatcherConfig,
    pub(crate) max_supply: u64,
    /// Cancelled by a component that cannot continue.
    pub(crate) halt: CancellationToken,
}

/// Why the runtime stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShutdownReason {
    Signal,
    Halted,
}

pub(crate) use runner::run;
