use async_trait::async_trait;
use eyre::Result;

use crate::common::{Block, BlockHash, BlockHeader, ChainHead};

use super::ChainVerdict;

/// A set of methods that allow the sync driver to interact with an
/// execution engine. Modeled on the Ethereum Engine API, narrowed to the
/// operations a Proof-of-Work sync driver needs.
///
/// Implementations may be in-process, channel-backed, or RPC-backed; all
/// that matters is the return contract documented per method and the
/// blocking/suspension behavior described in the crate's concurrency model.
#[async_trait]
pub trait ExecutionEngineAdapter: Send + Sync + 'static {
    /// Returns the engine's persisted canonical head.
    async fn last_fork_choice(&self) -> Result<ChainHead>;

    /// Returns the highest block number the engine has inserted, canonical
    /// or not.
    async fn block_progress(&self) -> Result<u64>;

    /// Returns the last `n` canonical headers, **oldest-first** (see
    /// `Config`'s resume documentation for why this crate fixes that
    /// ordering).
    async fn get_last_headers(&self, n: u64) -> Result<Vec<BlockHeader>>;

    /// Inserts `blocks` into the engine. Idempotent in hash: re-inserting a
    /// known block is a no-op.
    async fn insert_blocks(&self, blocks: Vec<Block>) -> Result<()>;

    /// Runs state-transition verification along the ancestry to `target`
    /// and returns the resulting verdict. May block for a long time; this
    /// is the one call the driver expects to be slow.
    async fn validate_chain(&self, target: BlockHash) -> Result<ChainVerdict>;

    /// Installs `head` as the engine's canonical pointer. The engine must
    /// already have the block.
    async fn update_fork_choice(&self, head: BlockHash) -> Result<()>;

    /// Translates a hash to its block number, if the engine has it. Used to
    /// resolve `ChainVerdict::InvalidChain::latest_valid_head` to a height.
    async fn get_block_num(&self, hash: BlockHash) -> Result<Option<u64>>;
}
