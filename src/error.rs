use thiserror::Error;

use crate::common::BlockHash;

/// Fatal errors the sync driver can surface from its control loop.
///
/// `InvalidChain` verdicts are deliberately absent here: they are a
/// recoverable outcome handled entirely inside the verify cycle via the
/// unwind path, not a driver failure.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A correctness invariant the driver depends on did not hold, e.g. the
    /// persisted head being ahead of insertion progress on resume.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// The execution engine could not decide on a chain's validity because
    /// it is missing an ancestor.
    #[error("engine could not validate chain: missing block {missing_block} before reaching valid head {latest_valid_head}")]
    ValidationError {
        /// The most recent ancestor the engine could confirm as valid.
        latest_valid_head: BlockHash,
        /// The block the engine was missing in order to decide.
        missing_block: BlockHash,
    },

    /// An adapter call failed below the driver, and the driver was not in
    /// the process of stopping.
    #[error("transport failure: {0}")]
    Transport(String),

    /// `validate_chain` returned a verdict this crate does not know how to
    /// handle. Always a fatal, unrecoverable condition — exhaustive
    /// matching on `ChainVerdict` is a correctness requirement.
    #[error("execution engine returned an unrecognized chain verdict")]
    UnknownVerdict,
}
