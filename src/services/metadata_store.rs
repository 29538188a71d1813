use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use reveal_domain::{MetadataRecord, TokenId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use uuid::Uuid;

const COMPLETION_MARKER: &str = ".reveal-complete";
const STAGING_PREFIX: &str = ".staging-";

#[derive(Error, Debug)]
pub(crate) enum MetadataStoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Metadata file {path} is not a valid metadata document: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl MetadataStoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub(crate) type Result<T> = std::result::Result<T, MetadataStoreError>;

/// Written once every generated file has been published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RevealCompletion {
    pub completed_at: DateTime<Utc>,
    pub published: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PublishOutcome {
    Published,
    /// A file for this token was already in place and was left untouched.
    AlreadyPresent,
}

/// Directory of revealed metadata, one `<id>.json` per token.
///
/// Files only ever enter the directory through an atomic link or rename, so
/// a reader sees either no file or a complete one.
#[derive(Debug, Clone)]
pub(crate) struct MetadataStore {
    root: PathBuf,
}

impl MetadataStore {
    pub(crate) fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn token_path(&self, id: TokenId) -> PathBuf {
        self.root.join(id.file_name())
    }

    pub(crate) async fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| MetadataStoreError::io(&self.root, e))
    }

    /// Published bytes for `id`, or `None` before the token is revealed.
    ///
    /// The bytes are returned as stored; they are only parsed to make sure a
    /// damaged file is reported instead of served.
    pub(crate) async fn read(&self, id: TokenId) -> Result<Option<Vec<u8>>> {
        let path = self.token_path(id);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(MetadataStoreError::io(&path, e)),
        };

        MetadataRecord::validate(&bytes)
            .map_err(|source| MetadataStoreError::Corrupt { path, source })?;

        Ok(Some(bytes))
    }

    /// Fresh, empty staging directory inside the store root. Staging
    /// directories are hidden, so nothing in them is ever served.
    pub(crate) async fn create_staging_dir(&self) -> Result<PathBuf> {
        self.ensure_root().await?;
        let path = self
            .root
            .join(format!("{STAGING_PREFIX}{}", Uuid::new_v4().simple()));
        fs::create_dir(&path)
            .await
            .map_err(|e| MetadataStoreError::io(&path, e))?;
        Ok(path)
    }

    pub(crate) async fn remove_staging_dir(&self, path: &Path) {
        if let Err(error) = fs::remove_dir_all(path).await
            && error.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "Failed to remove staging directory"
            );
        }
    }

    /// Move a validated staged file into place as `<id>.json`.
    ///
    /// Uses a hard link, which fails instead of replacing an existing file,
    /// so a token that is already published is never rewritten.
    pub(crate) async fn publish_staged(&self, id: TokenId, staged: &Path) -> Result<PublishOutcome> {
        let target = self.token_path(id);
        let outcome = match fs::hard_link(staged, &target).await {
            Ok(()) => PublishOutcome::Published,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                PublishOutcome::AlreadyPresent
            }
            Err(e) => return Err(MetadataStoreError::io(&target, e)),
        };

        if let Err(error) = fs::remove_file(staged).await {
            tracing::debug!(
                path = %staged.display(),
                error = %error,
                "Failed to remove staged file after publish"
            );
        }

        Ok(outcome)
    }

    pub(crate) async fn completion(&self) -> Result<Option<RevealCompletion>> {
        let path = self.root.join(COMPLETION_MARKER);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(MetadataStoreError::io(&path, e)),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| MetadataStoreError::Corrupt { path, source })
    }

    pub(crate) async fn mark_complete(&self, completion: &RevealCompletion) -> Result<()> {
        let path = self.root.join(COMPLETION_MARKER);
        let bytes = serde_json::to_vec_pretty(completion).map_err(|source| {
            MetadataStoreError::Corrupt {
                path: path.clone(),
                source,
            }
        })?;
        self.write_atomic(&path, &bytes).await
    }

    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let tmp = path.with_extension(format!("tmp-{}", Uuid::new_v4().simple()));
        fs::write(&tmp, bytes)
            .await
            .map_err(|e| MetadataStoreError::io(&tmp, e))?;
        if let Err(e) = fs::rename(&tmp, path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(MetadataStoreError::io(path, e));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use tempfile::TempDir;

    use super::*;

    const RECORD: &str = r#"{"name":"CHIBI #7","description":"d","image":"ipfs://x","attributes":[{"trait_type":"Hat","value":"Red"}]}"#;

    fn id(value: u64) -> TokenId {
        TokenId::new(value, 10_000).unwrap()
    }

    #[tokio::test]
    async fn read_missing_token_is_none() {
        let dir = TempDir::new().unwrap();
        let store = MetadataStore::new(dir.path().to_path_buf());

        assert!(store.read(id(7)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn read_returns_bytes_verbatim() {
        let dir = TempDir::new().unwrap();
        let store = MetadataStore::new(dir.path().to_path_buf());
        std::fs::write(dir.path().join("7.json"), RECORD).unwrap();

        assert_eq!(store.read(id(7)).await.unwrap().unwrap(), RECORD.as_bytes());
    }

    #[tokio::test]
    async fn read_reports_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let store = MetadataStore::new(dir.path().to_path_buf());
        std::fs::write(dir.path().join("7.json"), "{\"name\": \"CHI").unwrap();

        assert!(matches!(
            store.read(id(7)).await.unwrap_err(),
            MetadataStoreError::Corrupt { .. }
        ));
    }

    #[tokio::test]
    async fn publish_staged_never_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let store = MetadataStore::new(dir.path().to_path_buf());
        let staging = store.create_staging_dir().await.unwrap();

        let first = staging.join("7.json");
        std::fs::write(&first, RECORD).unwrap();
        assert_eq!(
            store.publish_staged(id(7), &first).await.unwrap(),
            PublishOutcome::Published
        );
        assert!(!first.exists());

        let second = staging.join("7.json");
        std::fs::write(&second, r#"{"name":"other","description":"","image":""}"#).unwrap();
        assert_eq!(
            store.publish_staged(id(7), &second).await.unwrap(),
            PublishOutcome::AlreadyPresent
        );

        assert_eq!(store.read(id(7)).await.unwrap().unwrap(), RECORD.as_bytes());
        store.remove_staging_dir(&staging).await;
        assert!(!staging.exists());
    }

    #[tokio::test]
    async fn staging_dirs_are_unique_and_hidden() {
        let dir = TempDir::new().unwrap();
        let store = MetadataStore::new(dir.path().join("nested"));

        let a = store.create_staging_dir().await.unwrap();
        let b = store.create_staging_dir().await.unwrap();

        assert_ne!(a, b);
        for path in [a, b] {
            let name = path.file_name().unwrap().to_str().unwrap();
            assert!(name.starts_with('.'));
            assert_eq!(path.parent().unwrap(), store.root());
        }
    }

    #[tokio::test]
    async fn completion_marker_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = MetadataStore::new(dir.path().to_path_buf());
        assert!(store.completion().await.unwrap().is_none());

        let completion = RevealCompletion {
            completed_at: Utc::now(),
            published: 3,
        };
        store.mark_complete(&completion).await.unwrap();

        assert_eq!(store.completion().await.unwrap(), Some(completion));
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().contains("tmp-"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
