use std::sync::Arc;

use reveal_chain::{ChainReader, EvmChainReader};
use reveal_key_value_store::{KeyValueStoreManager, RevealStateStorage};
use tokio_util::sync::CancellationToken;

use crate::{
    config::{self, AppPaths, Config},
    controllers::{self, HttpApiDeps},
    error::EngineError,
    periodic_tasks::{PeriodicTasksDeps, RevealWatcherDeps},
    services::{MetadataStore, RevealExecutor, ScriptRevealExecutor},
};

pub(crate) struct CoreBootstrap {
    pub(crate) config: Arc<Config>,
    pub(crate) chain_reader: Arc<dyn ChainReader>,
    pub(crate) reveal_state_store: Arc<dyn RevealStateStorage>,
    pub(crate) metadata_store: MetadataStore,
    pub(crate) reveal_executor: Arc<dyn RevealExecutor>,
}

pub(crate) async fn build_core() -> Result<CoreBootstrap, EngineError> {
    let config = Arc::new(config::load_configuration()?);
    crate::logger::initialize(&config.logger, &config.telemetry);

    tracing::info!(
        network = %config.chain.network(),
        contract = %config.chain.token_contract_address(),
        max_supply = config.collection.max_supply,
        condition = ?config.reveal.condition,
        "Configuration loaded"
    );

    let paths = AppPaths::from_root(config.app_data_path.clone());
    let key_value_store =
        KeyValueStoreManager::connect(&paths.key_value_store, &config.key_value_store).await?;
    let reveal_state_store: Arc<dyn RevealStateStorage> =
        Arc::new(key_value_store.reveal_state_store());

    let metadata_store = MetadataStore::new(config.reveal.metadata_path.clone());
    metadata_store.ensure_root().await?;

    let chain_reader: Arc<dyn ChainReader> = Arc::new(EvmChainReader::connect(&config.chain).await?);

    let reveal_executor: Arc<dyn RevealExecutor> = Arc::new(ScriptRevealExecutor::new(
        metadata_store.clone(),
        config.reveal.script_path.clone(),
        config.reveal.script_timeout(),
        config.collection.max_supply,
    ));

    Ok(CoreBootstrap {
        config,
        chain_reader,
        reveal_state_store,
        metadata_store,
        reveal_executor,
    })
}

pub(crate) fn build_periodic_tasks_deps(
    core: &CoreBootstrap,
    halt: &CancellationToken,
) -> Arc<PeriodicTasksDeps> {
    Arc::new(PeriodicTasksDeps {
        reveal_watcher: RevealWatcherDeps {
            chain_reader: Arc::clone(&core.chain_reader),
            reveal_state_store: Arc::clone(&core.reveal_state_store),
            reveal_executor: Arc::clone(&core.reveal_executor),
            metadata_store: core.metadata_store.clone(),
            halt: halt.clone(),
        },
    })
}

pub(crate) fn build_controllers(core: &CoreBootstrap) -> controllers::Controllers {
    controllers::initialize(
        &core.config.http_api,
        HttpApiDeps {
            collection: Arc::new(core.config.collection.clone()),
            metadata_store: core.metadata_store.clone(),
            reveal_state_store: Arc::clone(&core.reveal_state_store),
        },
    )
}
