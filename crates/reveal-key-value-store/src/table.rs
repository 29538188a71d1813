use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use super::KeyValueStoreError;

pub type TableDef = TableDefinition<'static, &'static [u8], &'static [u8]>;

/// A table handle with byte keys and JSON-serialized values.
pub struct Table<V> {
    db: Arc<Database>,
    table_def: TableDef,
    concurrency_limiter: Arc<Semaphore>,
    _marker: std::marker::PhantomData<V>,
}

impl<V> Clone for Table<V> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            table_def: self.table_def,
            concurrency_limiter: Arc::clone(&self.concurrency_limiter),
            _marker: std::marker::PhantomData,
        }
    }
}

impl<V: Serialize + DeserializeOwned> Table<V> {
    pub(super) fn new(
        db: Arc<Database>,
        table_def: TableDef,
        concurrency_limiter: Arc<Semaphore>,
    ) -> Self {
        Self {
            db,
            table_def,
            concurrency_limiter,
            _marker: std::marker::PhantomData,
        }
    }

    async fn acquire_permit(&self) -> Result<OwnedSemaphorePermit, KeyValueStoreError> {
        self.concurrency_limiter
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| KeyValueStoreError::SemaphoreClosed)
    }

    async fn run_blocking<F, T>(&self, f: F) -> Result<T, KeyValueStoreError>
    where
        F: FnOnce(&Table<V>) -> Result<T, KeyValueStoreError> + Send + 'static,
        T: Send + 'static,
        V: Send + Sync + 'static,
    {
        let table = (*self).clone();
        let permit = self.acquire_permit().await?;
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            f(&table)
        })
        .await?
    }

    fn store_blocking(&self, key: &[u8], value: &V) -> Result<(), KeyValueStoreError> {
        let value_bytes = serde_json::to_vec(value)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(self.table_def)?;
            table.insert(key, value_bytes.as_slice())?;
        }
        write_txn.commit()?;

        Ok(())
    }

    pub async fn store(&self, key: Vec<u8>, value: V) -> Result<(), KeyValueStoreError>
    where
        V: Send + Sync + 'static,
    {
        self.run_blocking(move |table| table.store_blocking(&key, &value))
            .await
    }

    fn get_blocking(&self, key: &[u8]) -> Result<Option<V>, KeyValueStoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(self.table_def)?;

        match table.get(key)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub async fn get(&self, key: Vec<u8>) -> Result<Option<V>, KeyValueStoreError>
    where
        V: Send + Sync + 'static,
    {
        self.run_blocking(move |table| table.get_blocking(&key))
            .await
    }

    /// Read-modify-write inside one write transaction.
    ///
    /// `update_fn` sees the current value (if any) and returns the value to
    /// store. When it returns an error the transaction is dropped and nothing
    /// is written.
    fn try_update_blocking<F, E>(
        &self,
        key: &[u8],
        update_fn: F,
    ) -> Result<Result<(), E>, KeyValueStoreError>
    where
        F: FnOnce(Option<V>) -> Result<V, E>,
    {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(self.table_def)?;

            let current: Option<V> = match table.get(key)? {
                Some(existing) => Some(serde_json::from_slice(existing.value())?),
                None => None,
            };

            let next = match update_fn(current) {
                Ok(next) => next,
                Err(err) => return Ok(Err(err)),
            };

            let value_bytes = serde_json::to_vec(&next)?;
            table.insert(key, value_bytes.as_slice())?;
        }
        write_txn.commit()?;

        Ok(Ok(()))
    }

    pub async fn try_update<F, E>(&self, key: Vec<u8>, update_fn: F) -> Result<(), E>
    where
        F: FnOnce(Option<V>) -> Result<V, E> + Send + 'static,
        E: From<KeyValueStoreError> + Send + 'static,
        V: Send + Sync + 'static,
    {
        self.run_blocking(move |table| table.try_update_blocking(&key, update_fn))
            .await?
    }
}
