use thiserror::Error;

/// Top-level application error that composes all subsystem errors
#[derive(Error, Debug)]
pub(crate) enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Chain error: {0}")]
    Chain(#[from] reveal_chain::ChainError),

    #[error("Key-value store error: {0}")]
    KeyValueStore(#[from] reveal_key_value_store::KeyValueStoreError),

    #[error("Metadata store error: {0}")]
    MetadataStore(#[from] crate::services::MetadataStoreError),
}
