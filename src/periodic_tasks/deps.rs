use std::sync::Arc;

use reveal_chain::ChainReader;
use reveal_key_value_store::RevealStateStorage;
use tokio_util::sync::CancellationToken;

use crate::services::{MetadataStore, RevealExecutor};

#[derive(Clone)]
pub(crate) struct RevealWatcherDeps {
    pub(crate) chain_reader: Arc<dyn ChainReader>,
    pub(crate) reveal_state_store: Arc<dyn RevealStateStorage>,
    pub(crate) reveal_executor: Arc<dyn RevealExecutor>,
    pub(crate) metadata_store: MetadataStore,
    /// Cancelled by the watcher when it stops on an unrecoverable error.
    pub(crate) halt: CancellationToken,
}

#[derive(Clone)]
pub(crate) struct PeriodicTasksDeps {
    pub(crate) reveal_watcher: RevealWatcherDeps,
}
