use tokio::sync::watch::Sender;

/// Registers a ctrl-c handler that flips the cooperative shutdown signal
/// the driver polls at each loop head, rather than exiting the process
/// directly: the driver finishes its in-flight cycle before returning.
pub fn register_shutdown(shutdown_send: Sender<bool>) {
    ctrlc::set_handler(move || {
        println!();
        tracing::info!("shutdown requested, finishing in-flight cycle...");
        let _ = shutdown_send.send(true);
    })
    .expect("failed to register shutdown handler");
}
