use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    process::Stdio,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use chrono::Utc;
use reveal_domain::{MetadataRecord, TokenId};
use thiserror::Error;
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    process::Command,
};

use super::metadata_store::{MetadataStore, MetadataStoreError, PublishOutcome, RevealCompletion};

/// Upper bound on the script stderr kept in an error.
const STDERR_TAIL_BYTES: usize = 2048;

#[derive(Error, Debug)]
pub(crate) enum ExecutorError {
    #[error("Failed to launch reveal script {path}: {source}")]
    Launch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Reveal script exited with {status}: {stderr_tail}")]
    NonZeroExit { status: String, stderr_tail: String },

    #[error("Reveal script did not finish within {}s", timeout.as_secs())]
    Timeout { timeout: Duration },

    #[error("Reveal script produced an invalid file {file}: {reason}")]
    InvalidOutput { file: String, reason: String },

    #[error(transparent)]
    Store(#[from] MetadataStoreError),
}

impl ExecutorError {
    /// Short label used for metrics.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Launch { .. } => "launch",
            Self::NonZeroExit { .. } => "non_zero_exit",
            Self::Timeout { .. } => "timeout",
            Self::InvalidOutput { .. } => "invalid_output",
            Self::Store(_) => "store",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RevealReport {
    pub published: usize,
    pub already_present: usize,
    pub ignored: usize,
}

/// Produces and publishes the revealed metadata.
///
/// Success means every file the generator produced is now readable under the
/// metadata directory and the completion marker has been written.
#[async_trait]
pub(crate) trait RevealExecutor: Send + Sync {
    async fn execute(&self) -> Result<RevealReport, ExecutorError>;
}

/// Runs the external generation script into a staging directory, validates
/// its output and publishes it into the [`MetadataStore`].
pub(crate) struct ScriptRevealExecutor {
    store: MetadataStore,
    script_path: PathBuf,
    timeout: Duration,
    max_supply: u64,
}

impl ScriptRevealExecutor {
    pub(crate) fn new(
        store: MetadataStore,
        script_path: PathBuf,
        timeout: Duration,
        max_supply: u64,
    ) -> Self {
        Self {
            store,
            script_path,
            timeout,
            max_supply,
        }
    }

    async fn run_script(&self, staging_dir: &Path) -> Result<(), ExecutorError> {
        // kill_on_drop also covers the task being aborted on shutdown.
        let mut child = Command::new(&self.script_path)
            .arg(staging_dir)
            .env("REVEAL_TOKEN_MIN", "1")
            .env("REVEAL_TOKEN_MAX", self.max_supply.to_string())
            .env("REVEAL_OUTPUT_DIR", staging_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExecutorError::Launch {
                path: self.script_path.clone(),
                source,
            })?;

        let stderr = child.stderr.take();
        let finished = async move {
            let stderr_tail = async {
                match stderr {
                    Some(stderr) => read_tail(stderr, STDERR_TAIL_BYTES).await,
                    None => Ok(Vec::new()),
                }
            };
            let (status, stderr_tail) = tokio::join!(child.wait(), stderr_tail);
            status.map(|status| (status, stderr_tail.unwrap_or_default()))
        };

        let (status, stderr_tail) = match tokio::time::timeout(self.timeout, finished).await {
            Ok(Ok(finished)) => finished,
            Ok(Err(source)) => {
                return Err(ExecutorError::Launch {
                    path: self.script_path.clone(),
                    source,
                });
            }
            Err(_) => {
                return Err(ExecutorError::Timeout {
                    timeout: self.timeout,
                });
            }
        };

        if !status.success() {
            return Err(ExecutorError::NonZeroExit {
                status: status.to_string(),
                stderr_tail: String::from_utf8_lossy(&stderr_tail).trim().to_string(),
            });
        }

        Ok(())
    }

    /// Collect and validate every token file in the staging directory.
    async fn validate_output(
        &self,
        staging_dir: &Path,
    ) -> Result<(BTreeMap<TokenId, PathBuf>, usize), ExecutorError> {
        let mut staged = BTreeMap::new();
        let mut ignored = 0;

        let mut entries = tokio::fs::read_dir(staging_dir)
            .await
            .map_err(|e| MetadataStoreError::Io {
                path: staging_dir.to_path_buf(),
                source: e,
            })?;

        while let Some(entry) = entries.next_entry().await.map_err(|e| MetadataStoreError::Io {
            path: staging_dir.to_path_buf(),
            source: e,
        })? {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let Some(id) = self.staged_token_id(&file_name)? else {
                ignored += 1;
                continue;
            };

            let path = entry.path();
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| MetadataStoreError::Io {
                    path: path.clone(),
                    source: e,
                })?;
            MetadataRecord::validate(&bytes).map_err(|e| ExecutorError::InvalidOutput {
                file: file_name.clone(),
                reason: e.to_string(),
            })?;

            if staged.insert(id, path).is_some() {
                return Err(ExecutorError::InvalidOutput {
                    file: file_name,
                    reason: format!("duplicate file for token {id}"),
                });
            }
        }

        Ok((staged, ignored))
    }

    fn staged_token_id(&self, file_name: &str) -> Result<Option<TokenId>, ExecutorError> {
        TokenId::from_file_name(file_name, self.max_supply).map_err(|error| {
            ExecutorError::InvalidOutput {
                file: file_name.to_string(),
                reason: error.to_string(),
            }
        })
    }

    async fn stage_and_publish(&self, staging_dir: &Path) -> Result<RevealReport, ExecutorError> {
        self.run_script(staging_dir).await?;

        let (staged, ignored) = self.validate_output(staging_dir).await?;
        if staged.len() < self.max_supply as usize {
            tracing::warn!(
                produced = staged.len(),
                max_supply = self.max_supply,
                "Reveal script produced fewer files than the collection size"
            );
        }

        let mut report = RevealReport {
            ignored,
            ..RevealReport::default()
        };
        for (id, path) in staged {
            match self.store.publish_staged(id, &path).await? {
                PublishOutcome::Published => report.published += 1,
                PublishOutcome::AlreadyPresent => report.already_present += 1,
            }
        }

        self.store
            .mark_complete(&RevealCompletion {
                completed_at: Utc::now(),
                published: report.published + report.already_present,
            })
            .await?;

        Ok(report)
    }
}

#[async_trait]
impl RevealExecutor for ScriptRevealExecutor {
    #[tracing::instrument(
        name = "reveal_executor.execute",
        skip(self),
        fields(script = %self.script_path.display(), metadata_path = %self.store.root().display())
    )]
    async fn execute(&self) -> Result<RevealReport, ExecutorError> {
        let started = Instant::now();
        let staging_dir = self.store.create_staging_dir().await?;

        let result = self.stage_and_publish(&staging_dir).await;
        self.store.remove_staging_dir(&staging_dir).await;

        let elapsed = started.elapsed();
        match &result {
            Ok(report) => {
                reveal_observability::record_reveal_execution("ok", elapsed, report.published);
                tracing::info!(
                    published = report.published,
                    already_present = report.already_present,
                    ignored = report.ignored,
                    elapsed_ms = elapsed.as_millis(),
                    "Reveal metadata published"
                );
            }
            Err(error) => {
                reveal_observability::record_reveal_execution(error.kind(), elapsed, 0);
            }
        }

        result
    }
}

/// Drain `reader`, keeping only its last `limit` bytes.
async fn read_tail<R>(mut reader: R, limit: usize) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut tail = Vec::with_capacity(limit);
    let mut chunk = [0u8; 4096];
    loop {
        let read = reader.read(&mut chunk).await?;
        if read == 0 {
            return Ok(tail);
        }
        tail.extend_from_slice(&chunk[..read]);
        if tail.len() > limit {
            tail.drain(..tail.len() - limit);
        }
    }
}
