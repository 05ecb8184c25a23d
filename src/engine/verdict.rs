use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::common::BlockHash;

/// The result of [`ExecutionEngineAdapter::validate_chain`](super::ExecutionEngineAdapter::validate_chain).
///
/// Exhaustive matching on this type at the call site is a correctness
/// requirement: the driver treats any case it cannot recognize as a fatal,
/// unknown-verdict error (see `error::SyncError`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainVerdict {
    /// The target and its ancestry validated successfully.
    ValidChain {
        /// The engine's resulting current head; must equal the hash most
        /// recently passed to `validate_chain`.
        current_head: BlockHash,
    },
    /// Some block along the ancestry to the target is invalid. A correct,
    /// recoverable verdict: the driver unwinds to `latest_valid_head`.
    InvalidChain {
        /// The most recent ancestor of the target known to be valid.
        latest_valid_head: BlockHash,
        /// The first block found to be invalid, if the engine can identify
        /// it precisely.
        bad_block: Option<BlockHash>,
        /// Every header the engine determined must never be re-served to
        /// or re-accepted from peers.
        bad_headers: HashSet<BlockHash>,
    },
    /// The engine cannot decide — typically a missing ancestor. Fatal to
    /// the driver; it is not the engine asserting the chain is bad.
    ValidationError {
        /// The most recent ancestor the engine could confirm as valid.
        latest_valid_head: BlockHash,
        /// The block the engine was missing in order to decide.
        missing_block: BlockHash,
    },
}
