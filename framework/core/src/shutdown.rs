use tokio::sync::watch;

/// Owner side of the run-wide termination signal.
///
/// Backed by a watch channel rather than a broadcast channel so that a listener created after the
/// signal fired still observes it. A run can only be terminated once, repeated calls are ignored.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    sender: watch::Sender<bool>,
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self {
            sender: watch::channel(false).0,
        }
    }

    pub fn shutdown(&self) {
        let changed = self.sender.send_if_modified(|terminated| {
            let changed = !*terminated;
            *terminated = true;
            changed
        });

        if !changed {
            log::debug!("Shutdown already requested, ignoring repeated signal");
        }
    }

    pub fn new_listener(&self) -> ShutdownListener {
        ShutdownListener {
            receiver: self.sender.subscribe(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShutdownListener {
    receiver: watch::Receiver<bool>,
}

impl ShutdownListener {
    /// Point in time check whether the termination signal has been received.
    pub fn should_shutdown(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Wait for the termination signal.
    ///
    /// Returns immediately if the signal was already received. It is safe to race this with another
    /// future so that the signal can be used to abandon work in progress. If every
    /// [ShutdownHandle] is dropped without signalling then this never resolves.
    pub async fn wait_for_shutdown(&mut self) {
        if self.receiver.wait_for(|terminated| *terminated).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[derive(derive_more::Error, derive_more::Display, Debug)]
pub struct ShutdownSignalError {
    msg: String,
}

impl Default for ShutdownSignalError {
    fn default() -> Self {
        Self {
            msg: "Run aborted by termination signal".to_string(),
        }
    }
}
