use std::collections::HashSet;

use crate::common::{Block, BlockHash};

/// How the exchange should decide what to fetch next while downloading
/// above a given height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetTracking {
    /// Track peers' advertised chain tips as they announce new blocks.
    ByAnnouncements,
    /// Track the best height seen across newly connected peers.
    ByNewPeers,
}

/// An outbound announcement the driver hands to the exchange for gossip,
/// per eth/67 semantics. The exchange, not the emitter, decides which peers
/// receive it and whether `is_first_sync` suppresses broad gossip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    /// Sent after a batch has been inserted, before verification.
    NewBlock {
        /// The blocks flagged `to_announce` from the inserted batch.
        blocks: Vec<Block>,
        /// `true` until the first complete verify cycle finishes.
        is_first_sync: bool,
    },
    /// Sent after a head successfully verifies and its fork choice is
    /// updated.
    NewBlockHashes {
        /// `true` until the first complete verify cycle finishes.
        is_first_sync: bool,
    },
}

/// Everything the driver can hand to [`super::BlockExchangeAdapter::accept`]:
/// an outbound gossip announcement, or an internal instruction to reject a
/// set of headers as invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeMessage {
    /// An outbound announcement to gossip to peers.
    Announce(OutboundMessage),
    /// Headers the execution engine determined are invalid; the exchange
    /// must never re-serve or re-accept them.
    BadHeaders(HashSet<BlockHash>),
}
