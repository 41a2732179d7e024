use super::FavoritesStore;
use crate::{Error, Result};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Slot {
    value: Option<String>,
    fail_reads: bool,
    fail_writes: bool,
    writes: usize,
}

/// In-process favorites slot.
///
/// Clones share the same slot, so a test can keep a handle while the
/// manager owns another one. Reads and writes can be made to fail to
/// exercise the manager's recovery paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Slot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `raw` already in the slot
    pub fn with_contents(raw: impl Into<String>) -> Self {
        let store = Self::new();
        store.lock().value = Some(raw.into());
        store
    }

    /// Current raw contents, bypassing failure switches
    pub fn contents(&self) -> Option<String> {
        self.lock().value.clone()
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FavoritesStore for MemoryStore {
    fn read_raw(&self) -> Result<Option<String>> {
        let slot = self.lock();
        if slot.fail_reads {
            return Err(Error::StoreUnavailable("reads disabled".to_string()));
        }
        Ok(slot.value.clone())
    }

    fn write_raw(&self, raw: &str) -> Result<()> {
        let mut slot = self.lock();
        if slot.fail_writes {
            return Err(Error::StoreUnavailable("quota exceeded".to_string()));
        }
        slot.value = Some(raw.to_string());
        slot.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_slot() {
        let store = MemoryStore::new();
        let handle = store.clone();

        store.write_raw("[]").unwrap();

        assert_eq!(handle.contents().as_deref(), Some("[]"));
        assert_eq!(handle.write_count(), 1);
    }

    #[test]
    fn test_failure_switches() {
        let store = MemoryStore::with_contents("[]");

        store.set_fail_reads(true);
        assert!(store.read_raw().is_err());

        store.set_fail_writes(true);
        assert!(store.write_raw("[1]").is_err());
        assert_eq!(store.contents().as_deref(), Some("[]"));
        assert_eq!(store.write_count(), 0);
    }
}
