use std::{
    ops::ControlFlow,
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::Utc;
use reveal_chain::{ChainError, ChainReader};
use reveal_key_value_store::{RevealState, RevealStateError, RevealStateStorage};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use super::{
    RevealWatcherConfig,
    backoff::Backoff,
    condition::{ChainSnapshot, RevealCondition},
    cursor::PollCursor,
};
use crate::{
    periodic_tasks::{RevealWatcherDeps, runner::run_with_shutdown},
    services::{ExecutorError, MetadataStore, MetadataStoreError, RevealExecutor},
};

const TASK_NAME: &str = "reveal_watcher";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TickOutcome {
    /// Reveal state was already triggered; nothing to do.
    AlreadyTriggered,
    ConditionNotMet,
    /// Condition held but shutdown was requested before the reveal started.
    Skipped,
    Revealed,
    /// A previous run published everything but never persisted the state.
    Reconciled,
}

impl TickOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            Self::AlreadyTriggered => "already_triggered",
            Self::ConditionNotMet => "condition_not_met",
            Self::Skipped => "skipped",
            Self::Revealed => "revealed",
            Self::Reconciled => "reconciled",
        }
    }
}

#[derive(Error, Debug)]
pub(super) enum TickError {
    #[error("Failed to load reveal state: {0}")]
    StateLoad(#[source] RevealStateError),

    #[error("Failed to read reveal completion marker: {0}")]
    CompletionMarker(#[source] MetadataStoreError),

    #[error("Chain query failed: {0}")]
    Chain(#[from] ChainError),

    #[error("Inconsistent chain value: {0}")]
    InconsistentChainValue(String),

    #[error("Failed to persist reconciled reveal state: {0}")]
    Reconcile(#[source] RevealStateError),

    #[error("Reveal execution failed: {0}")]
    Execution(#[from] ExecutorError),

    #[error("Reveal succeeded but its state could not be persisted: {0}")]
    StateSaveAfterReveal(#[source] RevealStateError),
}

impl TickError {
    /// Retrying after a reveal whose state was not saved could run the
    /// generation script twice.
    pub(super) fn is_fatal(&self) -> bool {
        matches!(self, Self::StateSaveAfterReveal(_))
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::StateLoad(_) => "state_load_failed",
            Self::CompletionMarker(_) => "marker_read_failed",
            Self::Chain(_) => "chain_query_failed",
            Self::InconsistentChainValue(_) => "inconsistent_chain_value",
            Self::Reconcile(_) => "reconcile_failed",
            Self::Execution(_) => "execution_failed",
            Self::StateSaveAfterReveal(_) => "fatal",
        }
    }
}

struct WatcherState {
    cursor: PollCursor,
    backoff: Backoff,
    triggered: bool,
}

/// Polls the collection contract and runs the reveal exactly once.
pub(crate) struct RevealWatcherTask {
    chain_reader: Arc<dyn ChainReader>,
    reveal_state_store: Arc<dyn RevealStateStorage>,
    reveal_executor: Arc<dyn RevealExecutor>,
    metadata_store: MetadataStore,
    halt: CancellationToken,
    condition: Box<dyn RevealCondition>,
    max_supply: u64,
    state: Mutex<WatcherState>,
}

impl RevealWatcherTask {
    pub(crate) fn new(deps: RevealWatcherDeps, config: &RevealWatcherConfig, max_supply: u64) -> Self {
        Self {
            chain_reader: deps.chain_reader,
            reveal_state_store: deps.reveal_state_store,
            reveal_executor: deps.reveal_executor,
            metadata_store: deps.metadata_store,
            halt: deps.halt,
            condition: config.condition.build(),
            max_supply,
            state: Mutex::new(WatcherState {
                cursor: PollCursor::default(),
                backoff: Backoff::new(config.poll_interval(), config.max_backoff()),
                triggered: false,
            }),
        }
    }

    pub(crate) async fn run(self, shutdown: CancellationToken) {
        let tick_shutdown = shutdown.clone();
        run_with_shutdown(TASK_NAME, shutdown, || self.execute(&tick_shutdown)).await;
    }

    #[tracing::instrument(
        name = "periodic_tasks.reveal_watcher",
        skip(self, shutdown),
        fields(
            target = %self.chain_reader.target(),
            condition = self.condition.name(),
        )
    )]
    pub(super) async fn execute(&self, shutdown: &CancellationToken) -> ControlFlow<(), Duration> {
        let started = Instant::now();
        let mut state = self.state.lock().await;

        let (status, flow) = match self.tick(&mut state, shutdown).await {
            Ok(outcome) => (outcome.as_str(), ControlFlow::Continue(state.backoff.on_success())),
            Err(error) if error.is_fatal() => {
                tracing::error!(
                    error = %error,
                    "Reveal state could not be persisted after a successful reveal; \
                     halting instead of risking a second reveal"
                );
                self.halt.cancel();
                (error.kind(), ControlFlow::Break(()))
            }
            Err(error) => {
                let delay = state.backoff.on_failure();
                tracing::warn!(
                    error = %error,
                    consecutive_failures = state.backoff.consecutive_failures(),
                    retry_in_secs = delay.as_secs(),
                    "Reveal watcher tick failed"
                );
                (error.kind(), ControlFlow::Continue(delay))
            }
        };

        reveal_observability::record_reveal_consecutive_failures(
            state.backoff.consecutive_failures(),
        );
        reveal_observability::record_task_run(TASK_NAME, status, started.elapsed());
        flow
    }

    async fn tick(
        &self,
        state: &mut WatcherState,
        shutdown: &CancellationToken,
    ) -> Result<TickOutcome, TickError> {
        if state.triggered {
            return Ok(TickOutcome::AlreadyTriggered);
        }

        let persisted = self
            .reveal_state_store
            .load()
            .await
            .map_err(TickError::StateLoad)?;
        if persisted.triggered {
            tracing::info!(
                block_number = ?persisted.block_number,
                triggered_at = ?persisted.triggered_at,
                "Reveal already triggered"
            );
            self.mark_triggered(state);
            return Ok(TickOutcome::AlreadyTriggered);
        }

        if let Some(completion) = self
            .metadata_store
            .completion()
            .await
            .map_err(TickError::CompletionMarker)?
        {
            self.reveal_state_store
                .save(RevealState::triggered_at_block(None, completion.completed_at))
                .await
                .map_err(TickError::Reconcile)?;
            tracing::warn!(
                completed_at = %completion.completed_at,
                published = completion.published,
                "Found a completed reveal without persisted state; recorded it without re-running"
            );
            self.mark_triggered(state);
            return Ok(TickOutcome::Reconciled);
        }

        let snapshot = self.poll(&mut state.cursor).await?;

        if !self.condition.is_met(&snapshot, self.max_supply) {
            tracing::debug!(
                block_number = snapshot.block_number,
                total_supply = snapshot.total_supply,
                max_supply = self.max_supply,
                paused = snapshot.paused,
                revealed = ?snapshot.revealed,
                "Reveal condition not met"
            );
            return Ok(TickOutcome::ConditionNotMet);
        }

        if shutdown.is_cancelled() {
            tracing::info!("Reveal condition met during shutdown; leaving it for the next start");
            return Ok(TickOutcome::Skipped);
        }

        if snapshot.paused {
            tracing::info!("Contract is paused; revealing anyway since the condition holds");
        }
        tracing::info!(
            block_number = snapshot.block_number,
            total_supply = snapshot.total_supply,
            "Reveal condition met; running reveal"
        );

        self.reveal_executor.execute().await?;

        self.reveal_state_store
            .save(RevealState::triggered_at_block(
                Some(snapshot.block_number),
                Utc::now(),
            ))
            .await
            .map_err(TickError::StateSaveAfterReveal)?;

        tracing::info!(block_number = snapshot.block_number, "Reveal state persisted");
        self.mark_triggered(state);
        Ok(TickOutcome::Revealed)
    }

    fn mark_triggered(&self, state: &mut WatcherState) {
        state.triggered = true;
        reveal_observability::record_reveal_triggered(true);
    }

    async fn poll(&self, cursor: &mut PollCursor) -> Result<ChainSnapshot, TickError> {
        let network = self.chain_reader.target().network.as_str();
        let started = Instant::now();

        let result = self.query_snapshot(cursor).await;
        let status = match &result {
            Ok((_, true)) => "cached",
            Ok((_, false)) => "ok",
            Err(_) => "error",
        };
        reveal_observability::record_reveal_poll(network, status, started.elapsed());

        let (snapshot, cached) = result?;
        if !cached {
            reveal_observability::record_reveal_snapshot(
                network,
                snapshot.block_number,
                snapshot.total_supply,
                self.max_supply,
            );
            cursor.advance(snapshot.clone());
        }
        Ok(snapshot)
    }

    /// Returns the snapshot and whether it came from the cursor.
    async fn query_snapshot(&self, cursor: &PollCursor) -> Result<(ChainSnapshot, bool), TickError> {
        let block_number = self.chain_reader.block_number().await?;
        if let Some(snapshot) = cursor.cached_at(block_number) {
            return Ok((snapshot.clone(), true));
        }

        let raw_supply = self.chain_reader.total_supply().await?;
        let total_supply = u64::try_from(raw_supply).map_err(|_| {
            TickError::InconsistentChainValue(format!("total supply {raw_supply} exceeds u64"))
        })?;
        if total_supply > self.max_supply {
            return Err(TickError::InconsistentChainValue(format!(
                "total supply {total_supply} exceeds collection size {}",
                self.max_supply
            )));
        }
        if let Some(previous) = cursor.last()
            && total_supply < previous.total_supply
        {
            tracing::warn!(
                previous = previous.total_supply,
                current = total_supply,
                "Total supply decreased since the last poll"
            );
        }

        let paused = self.chain_reader.paused().await?;
        let revealed = if self.condition.needs_revealed_flag() {
            Some(self.chain_reader.revealed().await?)
        } else {
            None
        };

        Ok((
            ChainSnapshot {
                block_number,
                total_supply,
                paused,
                revealed,
            },
            false,
        ))
    }
}

#[cfg(test)]
impl RevealWatcherTask {
    pub(super) async fn tick_for_test(
        &self,
        shutdown: &CancellationToken,
    ) -> Result<TickOutcome, TickError> {
        let mut state = self.state.lock().await;
        self.tick(&mut state, shutdown).await
    }
}
