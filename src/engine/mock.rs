//! A canned-response test double for [`ExecutionEngineAdapter`], used by the
//! driver's unit and integration tests. Mirrors the shape of a typical
//! engine mock: callers configure the responses up front and then inspect
//! what the driver called afterwards.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use eyre::Result;

use crate::common::{Block, BlockHash, BlockHeader, BlockId, ChainHead};

use super::{ChainVerdict, ExecutionEngineAdapter};

#[derive(Debug, Default)]
struct State {
    last_fork_choice: ChainHead,
    block_progress: u64,
    last_headers: Vec<BlockHeader>,
    block_numbers: HashMap<BlockHash, u64>,
    inserted: Vec<BlockId>,
    validate_calls: Vec<BlockHash>,
    fork_choice_updates: Vec<BlockHash>,
    queued_verdicts: VecDeque<ChainVerdict>,
}

/// Mock execution engine returning preset responses and recording every
/// call the driver makes against it.
#[derive(Debug, Default)]
pub struct MockExecutionEngine {
    state: Mutex<State>,
}

impl MockExecutionEngine {
    /// Creates a mock seeded with the given persisted head and insertion
    /// progress.
    pub fn new(head: ChainHead, block_progress: u64) -> Self {
        let mut state = State { last_fork_choice: head, block_progress, ..Default::default() };
        state.block_numbers.insert(head.hash(), head.number());
        Self { state: Mutex::new(state) }
    }

    /// Sets the headers `get_last_headers` will return, oldest-first.
    pub fn with_headers(self, headers: Vec<BlockHeader>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            for header in &headers {
                state.block_numbers.insert(header.hash, header.number);
            }
            state.last_headers = headers;
        }
        self
    }

    /// Queues a verdict to be returned by the next `validate_chain` call.
    /// Verdicts are consumed in the order pushed.
    pub fn push_verdict(&self, verdict: ChainVerdict) {
        self.state.lock().unwrap().queued_verdicts.push_back(verdict);
    }

    /// Registers the block number for a hash the mock did not otherwise
    /// learn about (e.g. via `with_headers` or `insert_blocks`).
    pub fn set_block_num(&self, hash: BlockHash, number: u64) {
        self.state.lock().unwrap().block_numbers.insert(hash, number);
    }

    /// Every block id passed to `insert_blocks`, in call order.
    pub fn inserted_blocks(&self) -> Vec<BlockId> {
        self.state.lock().unwrap().inserted.clone()
    }

    /// Every hash passed to `validate_chain`, in call order.
    pub fn validate_calls(&self) -> Vec<BlockHash> {
        self.state.lock().unwrap().validate_calls.clone()
    }

    /// Every hash passed to `update_fork_choice`, in call order.
    pub fn fork_choice_updates(&self) -> Vec<BlockHash> {
        self.state.lock().unwrap().fork_choice_updates.clone()
    }

    /// Current `block_progress` as the mock sees it.
    pub fn current_progress(&self) -> u64 {
        self.state.lock().unwrap().block_progress
    }
}

#[async_trait]
impl ExecutionEngineAdapter for MockExecutionEngine {
    async fn last_fork_choice(&self) -> Result<ChainHead> {
        Ok(self.state.lock().unwrap().last_fork_choice)
    }

    async fn block_progress(&self) -> Result<u64> {
        Ok(self.state.lock().unwrap().block_progress)
    }

    async fn get_last_headers(&self, n: u64) -> Result<Vec<BlockHeader>> {
        let state = self.state.lock().unwrap();
        let headers = &state.last_headers;
        let take = headers.len().min(n as usize);
        Ok(headers[headers.len() - take..].to_vec())
    }

    async fn insert_blocks(&self, blocks: Vec<Block>) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        for block in blocks {
            let id = block.id();
            state.block_numbers.insert(id.hash, id.number);
            if !state.inserted.contains(&id) {
                state.inserted.push(id);
            }
            state.block_progress = state.block_progress.max(id.number);
        }
        Ok(())
    }

    async fn validate_chain(&self, target: BlockHash) -> Result<ChainVerdict> {
        let mut state = self.state.lock().unwrap();
        state.validate_calls.push(target);
        state
            .queued_verdicts
            .pop_front()
            .ok_or_else(|| eyre::eyre!("mock execution engine has no queued verdict"))
    }

    async fn update_fork_choice(&self, head: BlockHash) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.fork_choice_updates.push(head);
        let number = *state
            .block_numbers
            .get(&head)
            .ok_or_else(|| eyre::eyre!("update_fork_choice for unknown block {head}"))?;
        state.last_fork_choice = ChainHead::new(BlockId::new(number, head), state.last_fork_choice.total_difficulty);
        Ok(())
    }

    async fn get_block_num(&self, hash: BlockHash) -> Result<Option<u64>> {
        Ok(self.state.lock().unwrap().block_numbers.get(&hash).copied())
    }
}
