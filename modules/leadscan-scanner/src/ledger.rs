//! Per-owner deduplication ledger.

use std::collections::HashSet;

use tokio::sync::Mutex;

/// Record of property ids already surfaced for one owner. Grow-only: ids
/// are claimed before the detail fetch and never removed, within or across
/// runs.
pub struct Ledger {
    seen: Mutex<HashSet<String>>,
}

impl Ledger {
    pub fn new(initial: HashSet<String>) -> Self {
        Self {
            seen: Mutex::new(initial),
        }
    }

    /// Atomic check-and-insert. True means the caller owns this id for the
    /// run and may fetch and score it; concurrent units processing the same
    /// owner get false.
    pub async fn claim(&self, property_id: &str) -> bool {
        self.seen.lock().await.insert(property_id.to_string())
    }

    pub async fn is_seen(&self, property_id: &str) -> bool {
        self.seen.lock().await.contains(property_id)
    }

    /// Current contents, for flushing to the store.
    pub async fn snapshot(&self) -> HashSet<String> {
        self.seen.lock().await.clone()
    }
}
