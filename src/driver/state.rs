/// The driver's coarse lifecycle state. Tracked for observability and
/// metrics only — the driver's own control flow never branches on a caller
/// reading this back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Not yet started.
    Idle,
    /// Running the one-time resume sequence.
    Resuming,
    /// Downloading and inserting blocks above the last known progress.
    Forwarding,
    /// Running state-transition verification on the forwarded segment.
    Verifying,
    /// Emitting an outbound announcement after a successful verify.
    Announcing,
    /// Rewinding to the last valid head after an invalid-chain verdict.
    Unwinding,
    /// Cooperative shutdown requested; finishing the in-flight cycle.
    Stopping,
}
