//! Connectivity seam.

use std::sync::Arc;

use tokio::sync::watch;

/// Answers "are we online right now?" at the moment a write is made.
pub trait Connectivity {
    fn is_online(&self) -> bool;
}

/// Shared, settable connectivity state.
///
/// Clones observe the same value. Subscribers get a [`watch::Receiver`]
/// that changes whenever the state is set, which is what the synchronizer
/// listens to for reconnects.
#[derive(Clone, Debug)]
pub struct ConnectivityFlag {
    tx: Arc<watch::Sender<bool>>,
}

impl ConnectivityFlag {
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = watch::channel(online);
        Self { tx: Arc::new(tx) }
    }

    /// Record a connectivity change; returns the previous state.
    pub fn set_online(&self, online: bool) -> bool {
        self.tx.send_replace(online)
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for ConnectivityFlag {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Connectivity for ConnectivityFlag {
    fn is_online(&self) -> bool {
        *self.tx.borrow()
    }
}
