use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{LedgerStore, StoreError};
use crate::models::Table;

/// Process-local store. Also used by tests to simulate an unreachable
/// backend and to count round trips.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Table>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with `Unavailable` until reset.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Direct peek at the stored table, bypassing the counters.
    pub fn snapshot(&self, name: &str) -> Option<Table> {
        self.tables
            .lock()
            .ok()
            .and_then(|t| t.get(name).cloned())
    }

    pub fn insert(&self, name: &str, table: Table) {
        if let Ok(mut tables) = self.tables.lock() {
            tables.insert(name.to_string(), table);
        }
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("memory store lock poisoned".into())
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn read_table(&self, name: &str) -> Result<Table, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("read of {name} refused")));
        }
        let tables = self.tables.lock().map_err(|_| poisoned())?;
        tables
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    async fn write_table(&self, name: &str, table: &Table) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("write of {name} refused")));
        }
        let mut tables = self.tables.lock().map_err(|_| poisoned())?;
        tables.insert(name.to_string(), table.clone());
        Ok(())
    }
}
