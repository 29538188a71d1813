mod metadata_store;
mod reveal_executor;

pub(crate) use metadata_store::{MetadataStore, MetadataStoreError};
#[cfg(test)]
pub(crate) use metadata_store::RevealCompletion;
pub(crate) use reveal_executor::{
    ExecutorError, RevealExecutor, RevealReport, ScriptRevealExecutor,
};
