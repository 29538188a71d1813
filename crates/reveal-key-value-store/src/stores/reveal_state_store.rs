use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{KeyValueStoreError, Table};

pub(crate) const TABLE_NAME: &str = "reveal_state";
const STATE_KEY: &[u8] = b"current";

/// Durable record of whether the collection has been revealed.
///
/// Created as not-triggered on first start and flipped exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealState {
    pub triggered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggered_at: Option<DateTime<Utc>>,
    /// Block height at which the reveal condition was observed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

impl RevealState {
    pub fn triggered_at_block(block_number: Option<u64>, triggered_at: DateTime<Utc>) -> Self {
        Self {
            triggered: true,
            triggered_at: Some(triggered_at),
            block_number,
        }
    }
}

#[derive(Error, Debug)]
pub enum RevealStateError {
    #[error("Key-value store error: {0}")]
    Store(#[from] KeyValueStoreError),

    #[error("Refusing to reset a triggered reveal state (triggered at block {block_number:?})")]
    Regression { block_number: Option<u64> },
}

/// Load/save access to the reveal state record.
#[async_trait]
pub trait RevealStateStorage: Send + Sync {
    /// Current state; not-triggered when nothing has been saved yet.
    async fn load(&self) -> Result<RevealState, RevealStateError>;

    /// Persist `state`. A triggered record is never replaced by a
    /// not-triggered one.
    async fn save(&self, state: RevealState) -> Result<(), RevealStateError>;
}

#[derive(Clone)]
pub struct RevealStateStore {
    table: Table<RevealState>,
}

impl RevealStateStore {
    pub(crate) fn from_table(table: Table<RevealState>) -> Self {
        Self { table }
    }
}

#[async_trait]
impl RevealStateStorage for RevealStateStore {
    async fn load(&self) -> Result<RevealState, RevealStateError> {
        Ok(self
            .table
            .get(STATE_KEY.to_vec())
            .await?
            .unwrap_or_default())
    }

    async fn save(&self, state: RevealState) -> Result<(), RevealStateError> {
        self.table
            .try_update(STATE_KEY.to_vec(), move |current| match current {
                Some(existing) if existing.triggered && !state.triggered => {
                    Err(RevealStateError::Regression {
                        block_number: existing.block_number,
                    })
                }
                // Re-saving a triggered state keeps the original trigger point.
                Some(existing) if existing.triggered => Ok(existing),
                _ => Ok(state),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::TimeZone;
    use tempfile::TempDir;

    use super::*;
    use crate::{KeyValueStoreManager, KeyValueStoreManagerConfig};

    async fn open_store(temp_dir: &TempDir) -> RevealStateStore {
        KeyValueStoreManager::connect(
            temp_dir.path().join("state.redb"),
            &KeyValueStoreManagerConfig::default(),
        )
        .await
        .unwrap()
        .reveal_state_store()
    }

    fn triggered(block: u64) -> RevealState {
        RevealState::triggered_at_block(
            Some(block),
            Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
        )
    }

    #[tokio::test]
    async fn load_defaults_to_not_triggered() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir).await;

        assert_eq!(store.load().await.unwrap(), RevealState::default());
    }

    #[tokio::test]
    async fn triggered_state_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        {
            let store = open_store(&temp_dir).await;
            store.save(triggered(1234)).await.unwrap();
        }

        let reopened = open_store(&temp_dir).await;
        let state = reopened.load().await.unwrap();
        assert!(state.triggered);
        assert_eq!(state.block_number, Some(1234));
        assert!(state.triggered_at.is_some());
    }

    #[tokio::test]
    async fn save_refuses_to_reset_triggered_state() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir).await;
        store.save(triggered(10)).await.unwrap();

        let err = store.save(RevealState::default()).await.unwrap_err();
        assert!(matches!(
            err,
            RevealStateError::Regression {
                block_number: Some(10)
            }
        ));
        assert!(store.load().await.unwrap().triggered);
    }

    #[tokio::test]
    async fn resaving_triggered_keeps_first_trigger_point() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir).await;
        store.save(triggered(10)).await.unwrap();
        store.save(triggered(99)).await.unwrap();

        assert_eq!(store.load().await.unwrap().block_number, Some(10));
    }

    #[tokio::test]
    async fn not_triggered_can_be_saved_repeatedly() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir).await;
        store.save(RevealState::default()).await.unwrap();
        store.save(RevealState::default()).await.unwrap();

        assert!(!store.load().await.unwrap().triggered);
    }
}
