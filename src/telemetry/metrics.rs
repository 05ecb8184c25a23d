//! Prometheus metrics module.

use anyhow::Result;
use lazy_static::lazy_static;
use prometheus_exporter::{
    prometheus::{register_int_gauge, IntGauge},
    start,
};

lazy_static! {
    /// Tracks the height of the fork-choice view's current best head.
    pub static ref HEAD_HEIGHT: IntGauge =
        register_int_gauge!("head_height", "current fork-choice head height").unwrap();
    /// Tracks the highest block number the execution engine has inserted.
    pub static ref BLOCK_PROGRESS: IntGauge =
        register_int_gauge!("block_progress", "highest inserted block number").unwrap();
    /// `1` while the driver is still in its initial catch-up phase, `0`
    /// once the first verify cycle has completed.
    pub static ref IS_FIRST_SYNC: IntGauge =
        register_int_gauge!("is_first_sync", "1 while still in initial catch-up, 0 thereafter").unwrap();
    /// Cumulative count of headers the execution engine has rejected as
    /// invalid.
    pub static ref BAD_HEADERS_TOTAL: IntGauge = register_int_gauge!(
        "bad_headers_total",
        "cumulative count of headers rejected by the execution engine"
    )
    .unwrap();
}

/// Starts the metrics server on port 9200.
pub fn init() -> Result<()> {
    match start("0.0.0.0:9200".parse()) {
        Ok(_) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
