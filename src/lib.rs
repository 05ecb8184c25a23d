//! # powsync
//!
//! `powsync` is the Proof-of-Work chain synchronization core of an Ethereum
//! execution node: it keeps a local execution engine's canonical chain
//! aligned with the best chain observed on the peer-to-peer network by
//! driving a download pipeline, applying a fork-choice view over incoming
//! headers, inserting blocks, validating the resulting chain against
//! execution semantics, and propagating announcements back to peers.
//!
//! ## Modules
//!
//! - [`common`]: Core data types shared across the crate.
//! - [`fork_choice`]: In-memory fork-choice view over recently seen headers.
//! - [`exchange`]: The block-download coordination surface.
//! - [`engine`]: The execution engine adapter surface.
//! - [`driver`]: The long-running sync control loop.
//! - [`config`]: Tunable parameters for the driver and fork-choice view.
//! - [`error`]: The crate's fatal error taxonomy.
//! - [`telemetry`]: Logging, metrics, and shutdown handling.
//!
#![doc = include_str!("../README.md")]
#![warn(
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    rustdoc::all
)]
#![deny(unused_must_use, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod common;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod exchange;
pub mod fork_choice;
pub mod telemetry;
pub mod version;
