use std::sync::Arc;

use axum::extract::FromRef;
use reveal_domain::CollectionProfile;
use reveal_key_value_store::RevealStateStorage;

use crate::services::MetadataStore;

#[derive(Clone)]
pub(crate) struct HttpApiDeps {
    pub(crate) collection: Arc<CollectionProfile>,
    pub(crate) metadata_store: MetadataStore,
    /// Read-only here; only the reveal watcher writes.
    pub(crate) reveal_state_store: Arc<dyn RevealStateStorage>,
}

#[derive(Clone)]
pub(crate) struct MetadataHttpApiControllerDeps {
    pub(crate) collection: Arc<CollectionProfile>,
    pub(crate) metadata_store: MetadataStore,
}

impl FromRef<HttpApiDeps> for MetadataHttpApiControllerDeps {
    fn from_ref(input: &HttpApiDeps) -> Self {
        Self {
            collection: Arc::clone(&input.collection),
            metadata_store: input.metadata_store.clone(),
        }
    }
}

#[derive(Clone)]
pub(crate) struct InfoHttpApiControllerDeps {
    pub(crate) collection: Arc<CollectionProfile>,
    pub(crate) reveal_state_store: Arc<dyn RevealStateStorage>,
}

impl FromRef<HttpApiDeps> for InfoHttpApiControllerDeps {
    fn from_ref(input: &HttpApiDeps) -> Self {
        Self {
            collection: Arc::clone(&input.collection),
            reveal_state_store: Arc::clone(&input.reveal_state_store),
        }
    }
}
