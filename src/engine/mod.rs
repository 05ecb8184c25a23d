//! ## Execution Engine Adapter
//!
//! A narrow capability surface through which the [`crate::driver::SyncDriver`]
//! drives the execution engine: reading its persisted fork choice and
//! insertion progress, handing it downloaded blocks, and asking it to
//! validate a chain segment and move its canonical pointer. Every operation
//! is a blocking request/response from the driver's point of view (§5 of
//! the design); an implementation is free to satisfy that contract with an
//! in-process call, a channel to another thread, or an RPC round trip.

mod traits;
mod verdict;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use traits::ExecutionEngineAdapter;
pub use verdict::ChainVerdict;
