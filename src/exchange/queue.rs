use std::time::Duration;

use tokio::sync::{mpsc, Mutex};

use crate::common::Block;

/// What [`ResultQueue::recv_timeout`] observed on a given poll.
#[derive(Debug)]
pub enum RecvOutcome {
    /// A batch was available.
    Batch(Vec<Block>),
    /// Nothing arrived within the timeout; not an error, try again.
    TimedOut,
    /// The channel is closed: every sender (the exchange's download
    /// worker(s)) has been dropped. No further batches will ever arrive.
    Closed,
}

/// The FIFO channel of downloaded block batches the driver polls.
///
/// A thin wrapper over an async mpsc receiver: pushes come from the
/// exchange's download worker(s), pops come from the driver's single timed
/// wait. The receiver is held behind a mutex purely so `recv_timeout` can
/// take `&self` rather than `&mut self`, matching the read-only shape of
/// [`super::BlockExchangeAdapter::result_queue`]; there is still only ever
/// one logical consumer, the driver.
pub struct ResultQueue(Mutex<mpsc::Receiver<Vec<Block>>>);

impl ResultQueue {
    /// Wraps a receiver half as a [`ResultQueue`].
    pub fn new(receiver: mpsc::Receiver<Vec<Block>>) -> Self {
        Self(Mutex::new(receiver))
    }

    /// Waits up to `timeout` for the next batch, distinguishing an ordinary
    /// timeout (nothing to do this tick) from a closed channel (the
    /// exchange's producer side is gone, a transport failure the driver must
    /// not silently spin on).
    pub async fn recv_timeout(&self, timeout: Duration) -> RecvOutcome {
        let mut receiver = self.0.lock().await;
        match tokio::time::timeout(timeout, receiver.recv()).await {
            Ok(Some(batch)) => RecvOutcome::Batch(batch),
            Ok(None) => RecvOutcome::Closed,
            Err(_elapsed) => RecvOutcome::TimedOut,
        }
    }
}
