//! Live query subscription handle.
//!
//! # Responsibility
//! - Deliver an initial query result and a fresh one after every committed
//!   write, as full replacement snapshots.
//!
//! # Invariants
//! - The initial snapshot is queued before the handle is handed out, so the
//!   first receive never blocks on a write happening.
//! - Dropping the handle cancels the subscription; the store prunes the dead
//!   sender on its next emission pass.

use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

/// Receiving end of a live query.
///
/// Each received value is a complete snapshot, not a delta. Snapshots arrive
/// in commit order; the latest one always reflects the most recently
/// committed write at the time it was produced.
#[derive(Debug)]
pub struct LiveQuery<T> {
    rx: Receiver<T>,
}

impl<T> LiveQuery<T> {
    /// Wraps the receiving end of a snapshot channel.
    ///
    /// Used by the store internally; also the hook for repository fakes in
    /// tests, which feed snapshots through their own sender.
    pub fn new(rx: Receiver<T>) -> Self {
        Self { rx }
    }

    /// Blocks until the next snapshot arrives.
    ///
    /// Returns `None` when the store side has gone away.
    pub fn recv(&self) -> Option<T> {
        self.rx.recv().ok()
    }

    /// Returns the next snapshot if one is already queued.
    pub fn try_recv(&self) -> Option<T> {
        match self.rx.try_recv() {
            Ok(value) => Some(value),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Blocks up to `timeout` for the next snapshot.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(value) => Some(value),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Drains queued snapshots and returns the most recent one, if any.
    ///
    /// Presentation code that only renders the latest state uses this to
    /// skip intermediate snapshots after a burst of writes.
    pub fn latest(&self) -> Option<T> {
        let mut newest = None;
        while let Some(value) = self.try_recv() {
            newest = Some(value);
        }
        newest
    }
}

#[cfg(test)]
mod tests {
    use super::LiveQuery;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn latest_drains_to_most_recent_snapshot() {
        let (tx, rx) = mpsc::channel();
        let live: LiveQuery<i32> = LiveQuery::new(rx);
        tx.send(1).unwrap();
        tx.send(2).unwrap();
        tx.send(3).unwrap();
        assert_eq!(live.latest(), Some(3));
        assert_eq!(live.latest(), None);
    }

    #[test]
    fn recv_returns_none_after_sender_drops() {
        let (tx, rx) = mpsc::channel::<i32>();
        let live = LiveQuery::new(rx);
        drop(tx);
        assert!(live.recv().is_none());
        assert!(live.recv_timeout(Duration::from_millis(10)).is_none());
    }
}
