//! A controllable test double for [`BlockExchangeAdapter`]: tests push
//! batches directly onto its queue and inspect what the driver submitted
//! back through `accept`, mirroring the teacher's `engine/mock_engine.rs`
//! canned-response-struct pattern.

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::common::{Block, BlockHeader};

use super::{BlockExchangeAdapter, ExchangeMessage, ResultQueue, TargetTracking};

#[derive(Debug, Default)]
struct State {
    in_sync: bool,
    current_height: u64,
    stopped: bool,
    initial_state_calls: Vec<Vec<BlockHeader>>,
    download_calls: Vec<(u64, TargetTracking)>,
    accepted: Vec<ExchangeMessage>,
}

/// Mock block exchange. Tests drive it by pushing batches with
/// [`push_batch`](Self::push_batch) and configuring `in_sync`/
/// `current_height` with the matching setters, then assert on the recorded
/// calls after running the driver.
pub struct MockBlockExchange {
    queue: ResultQueue,
    sender: Mutex<Option<mpsc::Sender<Vec<Block>>>>,
    state: Mutex<State>,
}

impl MockBlockExchange {
    /// Creates a mock with an empty queue and the given starting
    /// `current_height`.
    pub fn new(current_height: u64) -> Self {
        let (sender, receiver) = mpsc::channel(64);
        Self {
            queue: ResultQueue::new(receiver),
            sender: Mutex::new(Some(sender)),
            state: Mutex::new(State { current_height, ..Default::default() }),
        }
    }

    /// Pushes a batch onto the result queue for the driver to consume.
    pub async fn push_batch(&self, batch: Vec<Block>) {
        let sender = self.sender.lock().unwrap().clone();
        sender
            .expect("mock result queue already closed")
            .send(batch)
            .await
            .expect("mock result queue receiver dropped");
    }

    /// Drops the sender half of the result queue, simulating the exchange's
    /// download worker(s) dying: the driver's next poll observes a closed
    /// channel instead of an ordinary timeout.
    pub fn close_queue(&self) {
        self.sender.lock().unwrap().take();
    }

    /// Sets whether `in_sync()` reports caught up.
    pub fn set_in_sync(&self, in_sync: bool) {
        self.state.lock().unwrap().in_sync = in_sync;
    }

    /// Sets the height `current_height()` reports.
    pub fn set_current_height(&self, height: u64) {
        self.state.lock().unwrap().current_height = height;
    }

    /// `true` once `stop_downloading` has been called.
    pub fn stopped(&self) -> bool {
        self.state.lock().unwrap().stopped
    }

    /// Every message passed to `accept`, in call order.
    pub fn accepted_messages(&self) -> Vec<ExchangeMessage> {
        self.state.lock().unwrap().accepted.clone()
    }

    /// Every `(from, tracking)` pair passed to `download_blocks`, in call
    /// order.
    pub fn download_calls(&self) -> Vec<(u64, TargetTracking)> {
        self.state.lock().unwrap().download_calls.clone()
    }

    /// Every header slice passed to `initial_state`, in call order.
    pub fn initial_state_calls(&self) -> Vec<Vec<BlockHeader>> {
        self.state.lock().unwrap().initial_state_calls.clone()
    }
}

#[async_trait]
impl BlockExchangeAdapter for MockBlockExchange {
    fn initial_state(&self, last_headers: &[BlockHeader]) {
        self.state.lock().unwrap().initial_state_calls.push(last_headers.to_vec());
    }

    fn download_blocks(&self, from: u64, tracking: TargetTracking) {
        self.state.lock().unwrap().download_calls.push((from, tracking));
    }

    fn result_queue(&self) -> &ResultQueue {
        &self.queue
    }

    fn in_sync(&self) -> bool {
        self.state.lock().unwrap().in_sync
    }

    fn current_height(&self) -> u64 {
        self.state.lock().unwrap().current_height
    }

    fn stop_downloading(&self) {
        self.state.lock().unwrap().stopped = true;
    }

    async fn accept(&self, message: ExchangeMessage) -> oneshot::Receiver<()> {
        self.state.lock().unwrap().accepted.push(message);
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(());
        rx
    }
}
