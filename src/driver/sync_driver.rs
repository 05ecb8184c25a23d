//! The long-running control loop that arbitrates between downloading new
//! blocks, verifying chain segments through the execution engine, handling
//! invalid chains via unwind, and emitting outbound announcements.

use std::sync::Arc;

use tokio::sync::watch;

use crate::common::BlockHash;
use crate::config::Config;
use crate::engine::{ChainVerdict, ExecutionEngineAdapter};
use crate::error::SyncError;
use crate::exchange::{BlockExchangeAdapter, ExchangeMessage, RecvOutcome, TargetTracking};
use crate::fork_choice::ForkChoiceView;
use crate::telemetry::metrics;

use super::announce::AnnouncementEmitter;
use super::state::SyncState;

/// The height and hash the forward-and-insert phase settled on, handed to
/// the verify cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NewHeight {
    number: u64,
    hash: BlockHash,
}

/// The rewind target the unwind hook receives after an invalid-chain
/// verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct UnwindPoint {
    height: u64,
    hash: BlockHash,
}

/// Drives a local execution engine's canonical chain to track the best
/// chain observed on the network, generic over both adapters the way a
/// typical engine-facing driver is generic over its engine trait.
pub struct SyncDriver<X: BlockExchangeAdapter, E: ExecutionEngineAdapter> {
    exchange: Arc<X>,
    engine: Arc<E>,
    view: ForkChoiceView,
    emitter: AnnouncementEmitter<X>,
    config: Config,
    state: SyncState,
    /// `true` until the first complete verify cycle finishes; informs
    /// outbound announcements so the exchange suppresses broad gossip
    /// during initial catch-up.
    is_first_sync: bool,
    shutdown_recv: watch::Receiver<bool>,
}

impl<X: BlockExchangeAdapter, E: ExecutionEngineAdapter> SyncDriver<X, E> {
    /// Creates a driver over the given adapters. `shutdown_recv` is the
    /// cooperative stop signal; the caller owns the matching sender and
    /// flips it to request shutdown.
    pub fn new(exchange: Arc<X>, engine: Arc<E>, config: Config, shutdown_recv: watch::Receiver<bool>) -> Self {
        Self {
            emitter: AnnouncementEmitter::new(exchange.clone()),
            exchange,
            engine,
            view: ForkChoiceView::new(),
            config,
            state: SyncState::Idle,
            is_first_sync: true,
            shutdown_recv,
        }
    }

    /// The driver's current lifecycle state, for observability.
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Runs the driver until a cooperative stop is observed or a fatal
    /// error occurs: resume once, then forward → verify → (announce |
    /// unwind), repeating until told to stop.
    pub async fn run(&mut self) -> Result<(), SyncError> {
        self.resume().await?;

        loop {
            if self.is_stopping() {
                self.state = SyncState::Stopping;
                return Ok(());
            }

            let new_height = self.forward().await?;

            if self.is_stopping() {
                self.state = SyncState::Stopping;
                return Ok(());
            }

            self.verify(new_height).await?;
        }
    }

    fn is_stopping(&self) -> bool {
        *self.shutdown_recv.borrow()
    }

    /// Entered once at startup: reconciles the fork-choice view with the
    /// engine's persisted state.
    async fn resume(&mut self) -> Result<(), SyncError> {
        self.state = SyncState::Resuming;

        let head = self.engine.last_fork_choice().await.map_err(transport_error)?;
        let progress = self.engine.block_progress().await.map_err(transport_error)?;

        if head.number() > progress {
            return Err(SyncError::InvariantViolation(format!(
                "persisted head {} is ahead of insertion progress {progress}",
                head.number(),
            )));
        }

        self.view.reset_head(head);

        if progress == head.number() {
            return Ok(());
        }

        let bootstrap_headers = self
            .engine
            .get_last_headers(self.config.initial_state_window)
            .await
            .map_err(transport_error)?;
        self.exchange.initial_state(&bootstrap_headers);

        let headers = self
            .engine
            .get_last_headers(self.config.resume_lookback)
            .await
            .map_err(transport_error)?;
        self.view.add_all(headers);

        Ok(())
    }

    /// Downloads and inserts blocks above the current progress until the
    /// exchange reports it has caught up, or a stop is requested.
    async fn forward(&mut self) -> Result<NewHeight, SyncError> {
        self.state = SyncState::Forwarding;

        let mut progress = self.engine.block_progress().await.map_err(transport_error)?;
        self.exchange.download_blocks(progress, TargetTracking::ByAnnouncements);

        while !self.is_stopping() && !(self.exchange.in_sync() && progress == self.exchange.current_height()) {
            let mut batch = match self.exchange.result_queue().recv_timeout(self.config.queue_poll_interval).await {
                RecvOutcome::Batch(batch) => batch,
                RecvOutcome::TimedOut => continue,
                RecvOutcome::Closed if self.is_stopping() => break,
                RecvOutcome::Closed => {
                    return Err(SyncError::Transport("result queue closed: exchange producer is gone".into()));
                }
            };

            let mut to_announce = Vec::new();
            for block in &mut batch {
                block.total_difficulty = self.view.add(block.header.clone());
                progress = progress.max(block.header.number);
                if block.to_announce {
                    to_announce.push(block.clone());
                }
            }

            self.engine.insert_blocks(batch).await.map_err(transport_error)?;
            metrics::BLOCK_PROGRESS.set(progress as i64);
            self.emitter.announce_new_block(to_announce, self.is_first_sync).await;
        }

        self.exchange.stop_downloading();

        Ok(NewHeight { number: self.view.head_height(), hash: self.view.head_hash() })
    }

    /// Validates the forwarded segment and dispatches on the resulting
    /// verdict.
    async fn verify(&mut self, new_height: NewHeight) -> Result<(), SyncError> {
        self.state = SyncState::Verifying;

        if new_height.number == 0 {
            return Ok(());
        }

        let verdict = self.engine.validate_chain(new_height.hash).await.map_err(transport_error)?;

        match verdict {
            ChainVerdict::ValidChain { current_head } => {
                if current_head != new_height.hash {
                    return Err(SyncError::InvariantViolation(format!(
                        "engine's validated head {current_head} does not match requested {}",
                        new_height.hash,
                    )));
                }

                self.engine.update_fork_choice(new_height.hash).await.map_err(transport_error)?;
                self.view.prune(new_height.number.saturating_sub(self.config.fork_choice_window));

                self.state = SyncState::Announcing;
                self.emitter.announce_new_block_hashes(self.is_first_sync).await;
            }
            ChainVerdict::InvalidChain { latest_valid_head, bad_block, bad_headers } => {
                self.state = SyncState::Unwinding;

                let latest_valid_height = self
                    .engine
                    .get_block_num(latest_valid_head)
                    .await
                    .map_err(transport_error)?
                    .ok_or_else(|| {
                        SyncError::InvariantViolation(format!(
                            "engine reported {latest_valid_head} as latest valid but does not know its height"
                        ))
                    })?;

                self.unwind(UnwindPoint { height: latest_valid_height, hash: latest_valid_head }, bad_block);

                if !bad_headers.is_empty() {
                    metrics::BAD_HEADERS_TOTAL.add(bad_headers.len() as i64);
                    let _ = self.exchange.accept(ExchangeMessage::BadHeaders(bad_headers)).await;
                }

                self.engine.update_fork_choice(latest_valid_head).await.map_err(transport_error)?;
                self.view.prune(latest_valid_height.saturating_sub(self.config.fork_choice_window));
            }
            ChainVerdict::ValidationError { latest_valid_head, missing_block } => {
                return Err(SyncError::ValidationError { latest_valid_head, missing_block });
            }
        }

        self.is_first_sync = false;
        metrics::HEAD_HEIGHT.set(self.view.head_height() as i64);
        metrics::IS_FIRST_SYNC.set(self.is_first_sync as i64);
        Ok(())
    }

    /// Reserved hook for future rule-set drivers to attach additional
    /// invalidation behavior (e.g. mempool eviction) on top of an
    /// invalid-chain verdict. The Proof-of-Work driver does nothing here:
    /// the engine performs its own rewind in response to the following
    /// `update_fork_choice` call to the older valid head.
    fn unwind(&self, _point: UnwindPoint, _bad_block: Option<BlockHash>) {}
}

fn transport_error(err: eyre::Report) -> SyncError {
    SyncError::Transport(err.to_string())
}
