//! Integration tests driving [`SyncDriver`] end to end over the in-crate
//! mock adapters, covering the literal scenarios from the design spec: clean
//! resume, resume with non-canonical tips, forward + valid verify, forward +
//! invalid verify, a fatal validation error, and a stop requested mid-forward.

use std::sync::Arc;
use std::time::Duration;

use powsync::common::{Block, BlockBody, BlockHash, BlockHeader, BlockId, ChainHead};
use powsync::config::Config;
use powsync::driver::SyncDriver;
use powsync::engine::mock::MockExecutionEngine;
use powsync::engine::ChainVerdict;
use powsync::exchange::mock::MockBlockExchange;
use tokio::sync::watch;

fn hash(byte: u8) -> BlockHash {
    BlockHash::with_last_byte(byte)
}

fn header(number: u64, hash_byte: u8, parent_byte: u8, difficulty: u128) -> BlockHeader {
    BlockHeader {
        parent_hash: hash(parent_byte),
        number,
        hash: hash(hash_byte),
        difficulty,
        extra: Vec::new(),
    }
}

fn block(number: u64, hash_byte: u8, parent_byte: u8, difficulty: u128, to_announce: bool) -> Block {
    let mut b = Block::new(header(number, hash_byte, parent_byte, difficulty), BlockBody::default());
    b.to_announce = to_announce;
    b
}

fn fast_config() -> Config {
    Config { queue_poll_interval: Duration::from_millis(20), ..Config::default() }
}

/// Drives `driver.run()` in a background task and stops it once `until`
/// becomes true, giving tests a bounded way to exercise a few loop
/// iterations of an otherwise infinite `run`.
async fn run_until(
    mut driver: SyncDriver<MockBlockExchange, MockExecutionEngine>,
    shutdown: watch::Sender<bool>,
    until: impl Fn() -> bool,
) {
    let handle = tokio::spawn(async move { driver.run().await });

    for _ in 0..200 {
        if until() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let _ = shutdown.send(true);

    handle.await.expect("driver task panicked").expect("driver returned a fatal error");
}

#[tokio::test]
async fn clean_resume_returns_head_unchanged_without_rewinding() {
    // progress == head.number(), so resume must return the persisted head
    // unchanged rather than rewinding to some other tip found in headers.
    let head = ChainHead::new(BlockId::new(100, hash(0xA)), 1_000);
    let engine = Arc::new(MockExecutionEngine::new(head, 100));
    let exchange = Arc::new(MockBlockExchange::new(100));
    exchange.set_in_sync(true);
    engine.push_verdict(ChainVerdict::ValidChain { current_head: hash(0xA) });

    let (shutdown_send, shutdown_recv) = watch::channel(false);
    let driver = SyncDriver::new(exchange.clone(), engine.clone(), fast_config(), shutdown_recv);

    run_until(driver, shutdown_send, || !engine.fork_choice_updates().is_empty()).await;

    // No batches ever arrive and the exchange reports already in sync, so
    // the driver requests stop_downloading without blocking and verifies
    // exactly the untouched persisted head.
    assert!(exchange.stopped());
    assert_eq!(engine.validate_calls(), vec![hash(0xA)]);
    assert_eq!(engine.fork_choice_updates(), vec![hash(0xA)]);

    // progress == height(head): resume must not call get_last_headers at
    // all, including the bootstrap-window fetch handed to the exchange.
    assert!(exchange.initial_state_calls().is_empty());
}

#[tokio::test]
async fn resume_with_non_canonical_tips_prefers_the_heavier_branch() {
    // head=(100,A), progress=103; headers 101..103 build on a sibling of A
    // with higher cumulative difficulty than the canonical chain would have.
    let head = ChainHead::new(BlockId::new(100, hash(0xA)), 1_000);
    let engine = Arc::new(
        MockExecutionEngine::new(head, 103).with_headers(vec![
            header(101, 0xB1, 0xA, 500),
            header(102, 0xB2, 0xB1, 500),
            header(103, 0xB3, 0xB2, 500),
        ]),
    );
    let exchange = Arc::new(MockBlockExchange::new(103));
    exchange.set_in_sync(true);
    engine.push_verdict(ChainVerdict::ValidChain { current_head: hash(0xB3) });

    let (shutdown_send, shutdown_recv) = watch::channel(false);
    let driver = SyncDriver::new(exchange.clone(), engine.clone(), fast_config(), shutdown_recv);

    run_until(driver, shutdown_send, || !engine.validate_calls().is_empty()).await;

    // The heavier branch (103, cumulative 2500) must win over the
    // canonical-but-lighter head (100, cumulative 1000), confirmed by the
    // subsequent validate_chain call targeting its tip.
    assert_eq!(engine.validate_calls(), vec![hash(0xB3)]);

    // progress != height(head) here, so resume must hand the exchange a
    // bootstrap window as well as rewinding the fork-choice view.
    assert_eq!(exchange.initial_state_calls().len(), 1);
}

#[tokio::test]
async fn forward_and_valid_verify_updates_fork_choice_and_announces() {
    let head = ChainHead::new(BlockId::new(100, hash(100)), 1_000);
    let engine = Arc::new(MockExecutionEngine::new(head, 100));
    let exchange = Arc::new(MockBlockExchange::new(0));

    let batch: Vec<Block> = (101..=110)
        .map(|n| block(n, n as u8, (n - 1) as u8, 10, true))
        .collect();
    exchange.push_batch(batch).await;

    engine.push_verdict(ChainVerdict::ValidChain { current_head: hash(110) });

    let (shutdown_send, shutdown_recv) = watch::channel(false);
    let driver = SyncDriver::new(exchange.clone(), engine.clone(), fast_config(), shutdown_recv);

    // Not yet in sync until the batch is consumed and progress catches up.
    exchange.set_current_height(110);
    exchange.set_in_sync(true);

    run_until(driver, shutdown_send, || !engine.fork_choice_updates().is_empty()).await;

    assert_eq!(engine.validate_calls(), vec![hash(110)]);
    assert_eq!(engine.fork_choice_updates(), vec![hash(110)]);
    assert_eq!(engine.inserted_blocks().len(), 10);

    let announced = exchange.accepted_messages();
    assert!(announced.iter().any(|m| matches!(
        m,
        powsync::exchange::ExchangeMessage::Announce(powsync::exchange::OutboundMessage::NewBlock { blocks, .. })
            if blocks.len() == 10
    )));
    assert!(announced.iter().any(|m| matches!(
        m,
        powsync::exchange::ExchangeMessage::Announce(powsync::exchange::OutboundMessage::NewBlockHashes { .. })
    )));
}

#[tokio::test]
async fn forward_and_invalid_verify_unwinds_without_announcing_hashes() {
    let head = ChainHead::new(BlockId::new(100, hash(100)), 1_000);
    let engine = Arc::new(MockExecutionEngine::new(head, 100));
    engine.set_block_num(hash(104), 104);
    let exchange = Arc::new(MockBlockExchange::new(0));

    let batch: Vec<Block> = (101..=110)
        .map(|n| block(n, n as u8, (n - 1) as u8, 10, true))
        .collect();
    exchange.push_batch(batch).await;

    let bad_headers: std::collections::HashSet<BlockHash> = (105..=110).map(|n| hash(n as u8)).collect();
    engine.push_verdict(ChainVerdict::InvalidChain {
        latest_valid_head: hash(104),
        bad_block: Some(hash(105)),
        bad_headers: bad_headers.clone(),
    });

    exchange.set_current_height(110);
    exchange.set_in_sync(true);

    let (shutdown_send, shutdown_recv) = watch::channel(false);
    let driver = SyncDriver::new(exchange.clone(), engine.clone(), fast_config(), shutdown_recv);

    run_until(driver, shutdown_send, || !engine.fork_choice_updates().is_empty()).await;

    assert_eq!(engine.fork_choice_updates(), vec![hash(104)]);

    let announced = exchange.accepted_messages();
    assert!(!announced.iter().any(|m| matches!(
        m,
        powsync::exchange::ExchangeMessage::Announce(powsync::exchange::OutboundMessage::NewBlockHashes { .. })
    )));
    assert!(announced
        .iter()
        .any(|m| matches!(m, powsync::exchange::ExchangeMessage::BadHeaders(h) if *h == bad_headers)));
}

#[tokio::test]
async fn validation_error_is_fatal() {
    let head = ChainHead::new(BlockId::new(100, hash(100)), 1_000);
    let engine = Arc::new(MockExecutionEngine::new(head, 100));
    let exchange = Arc::new(MockBlockExchange::new(0));

    exchange.push_batch(vec![block(101, 0x65, 100, 10, false)]).await;
    engine.push_verdict(ChainVerdict::ValidationError {
        latest_valid_head: hash(104),
        missing_block: hash(103),
    });

    exchange.set_current_height(101);
    exchange.set_in_sync(true);

    let (_shutdown_send, shutdown_recv) = watch::channel(false);
    let mut driver = SyncDriver::new(exchange, engine, fast_config(), shutdown_recv);

    let err = tokio::time::timeout(Duration::from_secs(5), driver.run())
        .await
        .expect("driver should fail fast, not hang")
        .expect_err("a ValidationError verdict must be fatal");

    match err {
        powsync::error::SyncError::ValidationError { latest_valid_head, missing_block } => {
            assert_eq!(latest_valid_head, hash(104));
            assert_eq!(missing_block, hash(103));
        }
        other => panic!("expected ValidationError, got {other:?}"),
    }
}

#[tokio::test]
async fn stop_during_forward_exits_without_validating() {
    let head = ChainHead::new(BlockId::new(100, hash(100)), 1_000);
    let engine = Arc::new(MockExecutionEngine::new(head, 100));
    let exchange = Arc::new(MockBlockExchange::new(0));
    // No batches ever arrive and in_sync never flips, so the only way out
    // of the forward loop is the stop flag being observed on a poll tick.

    let (shutdown_send, shutdown_recv) = watch::channel(false);
    let mut driver = SyncDriver::new(exchange.clone(), engine.clone(), fast_config(), shutdown_recv);

    let handle = tokio::spawn(async move { driver.run().await });
    tokio::time::sleep(Duration::from_millis(30)).await;
    shutdown_send.send(true).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("driver task should exit promptly after stop")
        .expect("driver task panicked");

    assert!(result.is_ok());
    assert!(exchange.stopped());
    assert!(engine.validate_calls().is_empty());
}

#[tokio::test]
async fn closed_result_queue_is_a_fatal_transport_error() {
    // The exchange's download worker(s) dying (sender dropped) is a
    // transport failure, not an empty-queue tick: the driver must not spin
    // on it forever, and must not treat it as a clean shutdown when no stop
    // was requested.
    let head = ChainHead::new(BlockId::new(100, hash(100)), 1_000);
    let engine = Arc::new(MockExecutionEngine::new(head, 100));
    let exchange = Arc::new(MockBlockExchange::new(0));
    exchange.close_queue();

    let (_shutdown_send, shutdown_recv) = watch::channel(false);
    let mut driver = SyncDriver::new(exchange, engine, fast_config(), shutdown_recv);

    let err = tokio::time::timeout(Duration::from_secs(5), driver.run())
        .await
        .expect("driver should fail fast on a closed queue, not hang")
        .expect_err("a closed result queue must be fatal when not stopping");

    match err {
        powsync::error::SyncError::Transport(_) => {}
        other => panic!("expected Transport error, got {other:?}"),
    }
}
