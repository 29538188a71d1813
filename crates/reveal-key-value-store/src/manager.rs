use std::{path::Path, sync::Arc};

use redb::{Database, TableDefinition};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::Semaphore;

use super::{
    KeyValueStoreError, KeyValueStoreManagerConfig,
    stores::{RevealStateStore, reveal_state_store as reveal_state_store_mod},
    table::{Table, TableDef},
};

/// Key-Value Store Manager
///
/// Owns the redb database file and hands out typed table handles.
/// Values are JSON-serialized.
pub struct KeyValueStoreManager {
    db: Arc<Database>,
    concurrency_limiter: Arc<Semaphore>,
    reveal_state_store: RevealStateStore,
}

impl KeyValueStoreManager {
    pub async fn connect(
        path: impl AsRef<Path>,
        config: &KeyValueStoreManagerConfig,
    ) -> Result<Self, KeyValueStoreError> {
        let path = path.as_ref().to_path_buf();
        let config = config.clone();
        tokio::task::spawn_blocking(move || {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let db = Database::create(&path)?;
            let max_concurrent = config.max_concurrent_operations.max(1);
            if max_concurrent != config.max_concurrent_operations {
                tracing::warn!(
                    configured = config.max_concurrent_operations,
                    effective = max_concurrent,
                    "Key-value store max_concurrent_operations too low; clamped"
                );
            }

            // Required tables exist once connect returns.
            let write_txn = db.begin_write()?;
            {
                let reveal_state_def: TableDef =
                    TableDefinition::new(reveal_state_store_mod::TABLE_NAME);
                let _reveal_state = write_txn.open_table(reveal_state_def)?;
            }
            write_txn.commit()?;

            tracing::info!(
                path = %path.display(),
                max_concurrent,
                "Key-value store opened"
            );

            let db = Arc::new(db);
            let concurrency_limiter = Arc::new(Semaphore::new(max_concurrent));
            let reveal_state_store = RevealStateStore::from_table(Table::new(
                Arc::clone(&db),
                TableDefinition::new(reveal_state_store_mod::TABLE_NAME),
                Arc::clone(&concurrency_limiter),
            ));

            Ok(Self {
                db,
                concurrency_limiter,
                reveal_state_store,
            })
        })
        .await?
    }

    /// Get a typed table handle, creating the table if it doesn't exist.
    pub fn table<V: Serialize + DeserializeOwned>(
        &self,
        name: &'static str,
    ) -> Result<Table<V>, KeyValueStoreError> {
        let table_def: TableDef = TableDefinition::new(name);

        let write_txn = self.db.begin_write()?;
        {
            let _table = write_txn.open_table(table_def)?;
        }
        write_txn.commit()?;

        Ok(Table::new(
            Arc::clone(&self.db),
            table_def,
            Arc::clone(&self.concurrency_limiter),
        ))
    }

    pub fn reveal_state_store(&self) -> RevealStateStore {
        self.reveal_state_store.clone()
    }
}
