//! Active-request table.
//!
//! Maps `request_id` to the cancellation token of the task currently serving
//! it. Entries are owned by an [`ActiveGuard`]; dropping the guard removes
//! the entry on every exit path of the dispatcher, including early returns
//! and unwinding.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;

struct ActiveEntry {
    serial: u64,
    token: CancellationToken,
}

#[derive(Default)]
pub(crate) struct ActiveRequests {
    entries: Mutex<HashMap<String, ActiveEntry>>,
    next_serial: AtomicU64,
}

impl ActiveRequests {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, ActiveEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Track `token` under `request_id` until the returned guard is dropped.
    ///
    /// A request reusing an id that is still in flight replaces the older
    /// entry; the older guard then leaves the newer entry alone.
    pub(crate) fn register(&self, request_id: &str, token: CancellationToken) -> ActiveGuard<'_> {
        let serial = self.next_serial.fetch_add(1, Ordering::Relaxed);
        self.lock()
            .insert(request_id.to_owned(), ActiveEntry { serial, token });
        ActiveGuard {
            table: self,
            request_id: request_id.to_owned(),
            serial,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    pub(crate) fn contains(&self, request_id: &str) -> bool {
        self.lock().contains_key(request_id)
    }

    /// Cancel and forget every tracked request. Returns how many there were.
    pub(crate) fn cancel_all(&self) -> usize {
        let drained: Vec<ActiveEntry> = self.lock().drain().map(|(_, entry)| entry).collect();
        for entry in &drained {
            entry.token.cancel();
        }
        drained.len()
    }
}

/// Removes its request from the table when dropped.
pub(crate) struct ActiveGuard<'a> {
    table: &'a ActiveRequests,
    request_id: String,
    serial: u64,
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        let mut entries = self.table.lock();
        if entries
            .get(&self.request_id)
            .is_some_and(|entry| entry.serial == self.serial)
        {
            entries.remove(&self.request_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_removes_entry_on_drop() {
        let table = ActiveRequests::new();
        {
            let _guard = table.register("r1", CancellationToken::new());
            assert!(table.contains("r1"));
            assert_eq!(table.len(), 1);
        }
        assert!(!table.contains("r1"));
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn stale_guard_keeps_newer_entry() {
        let table = ActiveRequests::new();
        let first = table.register("r1", CancellationToken::new());
        let second = table.register("r1", CancellationToken::new());

        drop(first);
        assert!(table.contains("r1"));

        drop(second);
        assert!(!table.contains("r1"));
    }

    #[test]
    fn cancel_all_cancels_and_clears() {
        let table = ActiveRequests::new();
        let a = CancellationToken::new();
        let b = CancellationToken::new();
        let _ga = table.register("a", a.clone());
        let _gb = table.register("b", b.clone());

        assert_eq!(table.cancel_all(), 2);
        assert!(a.is_cancelled());
        assert!(b.is_cancelled());
        assert_eq!(table.len(), 0);
    }
}
