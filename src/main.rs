use std::sync::Arc;

use eyre::Result;
use tokio::sync::watch;

use powsync::common::{BlockHash, BlockId, ChainHead};
use powsync::config::Config;
use powsync::driver::SyncDriver;
use powsync::engine::mock::MockExecutionEngine;
use powsync::exchange::mock::MockBlockExchange;
use powsync::telemetry;
use powsync::version::Version;

/// Demo wiring: runs the sync driver over in-memory mock adapters. A real
/// deployment substitutes its own `BlockExchangeAdapter` and
/// `ExecutionEngineAdapter` implementations, backed by its P2P stack and
/// execution engine RPC respectively.
#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init(false)?;
    telemetry::metrics::init().map_err(|err| eyre::eyre!(err))?;

    tracing::info!("{}", Version::build().to_string());

    let (shutdown_send, shutdown_recv) = watch::channel(false);
    telemetry::register_shutdown(shutdown_send);

    let genesis = ChainHead::new(BlockId::new(0, BlockHash::ZERO), 0);
    let exchange = Arc::new(MockBlockExchange::new(0));
    let engine = Arc::new(MockExecutionEngine::new(genesis, 0));

    let mut driver = SyncDriver::new(exchange, engine, Config::default(), shutdown_recv);
    driver.run().await?;

    Ok(())
}
