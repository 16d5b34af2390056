// Connection accounting module
// Lock-free admission control and connection id allocation

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Identity of an admitted connection, unique for the process lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn {}", self.0)
    }
}

/// Counts admitted connections against a fixed limit.
///
/// Every admitted connection holds a [`ConnectionGuard`]; the slot is
/// released when the guard is dropped, so `active()` doubles as a
/// descriptor count for leak checks.
#[derive(Debug)]
pub struct ConnectionTracker {
    active: AtomicUsize,
    next_id: AtomicU64,
    limit: usize,
}

impl ConnectionTracker {
    pub const fn new(limit: usize) -> Self {
        Self {
            active: AtomicUsize::new(0),
            next_id: AtomicU64::new(1),
            limit,
        }
    }

    /// Try to take a connection slot.
    ///
    /// Returns the number of active connections when the limit is reached.
    pub fn try_admit(self: &Arc<Self>) -> Result<ConnectionGuard, usize> {
        // Increment counter first, then check limit
        let prev_count = self.active.fetch_add(1, Ordering::SeqCst);
        if prev_count >= self.limit {
            self.active.fetch_sub(1, Ordering::SeqCst);
            return Err(prev_count);
        }

        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        Ok(ConnectionGuard {
            id,
            tracker: Arc::clone(self),
        })
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub const fn limit(&self) -> usize {
        self.limit
    }
}

/// Admission slot held for the lifetime of one connection
#[derive(Debug)]
pub struct ConnectionGuard {
    id: ConnectionId,
    tracker: Arc<ConnectionTracker>,
}

impl ConnectionGuard {
    pub const fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.tracker.active.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admit_until_limit() {
        let tracker = Arc::new(ConnectionTracker::new(2));
        let first = tracker.try_admit().unwrap();
        let second = tracker.try_admit().unwrap();
        assert_eq!(tracker.active(), 2);

        assert_eq!(tracker.try_admit().unwrap_err(), 2);
        // A refused attempt must not leak a slot
        assert_eq!(tracker.active(), 2);

        drop(first);
        assert_eq!(tracker.active(), 1);
        let third = tracker.try_admit().unwrap();
        assert_eq!(tracker.active(), 2);

        drop(second);
        drop(third);
        assert_eq!(tracker.active(), 0);
    }

    #[test]
    fn test_ids_are_monotonic() {
        let tracker = Arc::new(ConnectionTracker::new(4));
        let a = tracker.try_admit().unwrap().id();
        let b = tracker.try_admit().unwrap().id();
        let c = tracker.try_admit().unwrap().id();
        assert_eq!(a.to_string(), "conn 1");
        assert!(a < b && b < c);
        assert_eq!(b.to_string(), "conn 2");
    }
}
