use tokio::sync::watch;

/// The client's cached copy of the credit balance.
///
/// Registration, chat replies and purchases all write here. Every write
/// replaces the whole value with a server-reported number; there is no
/// local arithmetic, and the last write wins. `None` means the balance is
/// not known yet (signed out, or the ledger did not answer).
#[derive(Debug)]
pub struct CreditsStore {
    tx: watch::Sender<Option<u64>>,
}

impl CreditsStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    pub fn get(&self) -> Option<u64> {
        *self.tx.borrow()
    }

    /// Replace the balance, returning the previous value. Subscribers are
    /// notified even when the value did not change.
    pub fn replace(&self, value: Option<u64>) -> Option<u64> {
        self.tx.send_replace(value)
    }

    /// Observe balance changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<u64>> {
        self.tx.subscribe()
    }
}

impl Default for CreditsStore {
    fn default() -> Self {
        Self::new()
    }
}
