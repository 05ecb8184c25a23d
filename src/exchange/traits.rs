use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::common::BlockHeader;

use super::{ExchangeMessage, ResultQueue, TargetTracking};

/// The driver's narrow view onto the block-download subsystem: a FIFO of
/// downloaded batches in, outbound announcements and bad-header rejections
/// out, plus a handful of control signals. The exchange itself owns all
/// peer management, request pacing, and gossip suppression; none of that is
/// visible here.
#[async_trait]
pub trait BlockExchangeAdapter: Send + Sync + 'static {
    /// Hands the downloader a bootstrap window of recent headers so it can
    /// locate peers' positions relative to the local chain.
    fn initial_state(&self, last_headers: &[BlockHeader]);

    /// Starts or resumes downloading above `from`, using `tracking` to
    /// decide what to fetch next.
    fn download_blocks(&self, from: u64, tracking: TargetTracking);

    /// The FIFO of downloaded block batches.
    fn result_queue(&self) -> &ResultQueue;

    /// `true` once the exchange believes it has caught up to the best
    /// height it has observed among peers.
    fn in_sync(&self) -> bool;

    /// The exchange's own view of how far it has progressed.
    fn current_height(&self) -> u64;

    /// Cooperative stop; in-flight batches must still be drainable from the
    /// result queue afterwards.
    fn stop_downloading(&self);

    /// Delivers an outbound announcement or an internal bad-headers
    /// rejection. The exchange owns dispatch; the returned receiver
    /// resolves once the submission has been applied. Callers may await it
    /// or drop it without consequence.
    async fn accept(&self, message: ExchangeMessage) -> oneshot::Receiver<()>;
}
