use std::sync::Arc;

use crate::common::Block;
use crate::exchange::{BlockExchangeAdapter, ExchangeMessage, OutboundMessage};

/// Packages block/hash payloads with the `is_first_sync` flag and submits
/// them to the exchange. Thin by design: the exchange, not the emitter,
/// decides which peers receive an announcement and applies eth/67
/// suppression rules.
pub struct AnnouncementEmitter<X: BlockExchangeAdapter> {
    exchange: Arc<X>,
}

impl<X: BlockExchangeAdapter> AnnouncementEmitter<X> {
    /// Wraps a handle to the exchange the emitter submits announcements to.
    pub fn new(exchange: Arc<X>) -> Self {
        Self { exchange }
    }

    /// Announces a freshly inserted batch's `to_announce` blocks, before
    /// verification. A no-op if the subset is empty.
    pub async fn announce_new_block(&self, blocks: Vec<Block>, is_first_sync: bool) {
        if blocks.is_empty() {
            return;
        }
        let message = ExchangeMessage::Announce(OutboundMessage::NewBlock { blocks, is_first_sync });
        let _ = self.exchange.accept(message).await;
    }

    /// Announces a head that has just finished successful verification and
    /// had its fork choice updated.
    pub async fn announce_new_block_hashes(&self, is_first_sync: bool) {
        let message = ExchangeMessage::Announce(OutboundMessage::NewBlockHashes { is_first_sync });
        let _ = self.exchange.accept(message).await;
    }
}
