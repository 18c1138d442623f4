use anyhow::Context;
use loadrelay_core::prelude::ShutdownHandle;
use tokio::signal;

/// Listen for SIGTERM and Ctrl-C and turn the first one into a shutdown of the run.
///
/// Must be called from within a Tokio runtime.
pub fn start_shutdown_listener() -> anyhow::Result<ShutdownHandle> {
    let handle = ShutdownHandle::default();

    #[cfg(unix)]
    let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())
        .context("Failed to listen for SIGTERM")?;

    let listener_handle = handle.clone();
    tokio::spawn(async move {
        #[cfg(unix)]
        let received = tokio::select! {
            result = signal::ctrl_c() => result,
            _ = terminate.recv() => Ok(()),
        };
        #[cfg(not(unix))]
        let received = signal::ctrl_c().await;

        match received {
            Ok(()) => {
                log::warn!("Received termination signal, aborting test");
                listener_handle.shutdown();
            }
            Err(e) => log::error!("Failed to listen for termination signal: {e}"),
        }
    });

    Ok(handle)
}
