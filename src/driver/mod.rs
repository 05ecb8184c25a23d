//! The sync driver: the long-running loop that arbitrates between
//! downloading new blocks, verifying them through the execution engine,
//! handling invalid chains via unwind, and emitting outbound announcements.

mod announce;
mod state;
mod sync_driver;

pub use announce::AnnouncementEmitter;
pub use state::SyncState;
pub use sync_driver::SyncDriver;
