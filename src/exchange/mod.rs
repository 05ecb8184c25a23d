//! ## Block Exchange Adapter
//!
//! The coordination surface between the [`crate::driver::SyncDriver`] and
//! the external download pipeline: a result queue of downloaded block
//! batches flowing in, and outbound gossip announcements plus bad-header
//! rejections flowing out. The exchange owns peer selection, request
//! pacing, and eth/67 suppression rules; the driver only ever sees the
//! narrow surface in [`BlockExchangeAdapter`].

mod messages;
mod queue;
mod traits;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use messages::{ExchangeMessage, OutboundMessage, TargetTracking};
pub use queue::{RecvOutcome, ResultQueue};
pub use traits::BlockExchangeAdapter;
