//! [`StorageManager`]: the process-wide table registry.
//!
//! A process-wide singleton is process-wide mutable state; its mutators are
//! not specified as thread-safe beyond what `parking_lot::RwLock` itself
//! gives for free (exclusive writes, shared reads), and callers are expected
//! to serialize conflicting registry operations externally, same as the
//! design this is modeled on. `reset()` is test-only by convention, not by
//! enforcement.

use std::fmt::Write as _;
use std::sync::Arc;

use ahash::HashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::error::{Error, StorageResult};
use crate::table::Table;

/// Maps table name to table. Construct your own instance for tests that need
/// isolation from [`storage_manager`]'s process-wide singleton; production
/// code goes through the singleton.
#[derive(Default)]
pub struct StorageManager {
    tables: RwLock<HashMap<String, Arc<Table>>>,
}

impl StorageManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(&self, name: &str, table: Arc<Table>) -> StorageResult<()> {
        let mut tables = self.tables.write();
        if tables.contains_key(name) {
            return Err(Error::TableAlreadyExists(name.to_string()));
        }
        tables.insert(name.to_string(), table);
        log::debug!("storage_manager: added table '{name}'");
        Ok(())
    }

    pub fn drop_table(&self, name: &str) -> StorageResult<()> {
        let mut tables = self.tables.write();
        if tables.remove(name).is_none() {
            return Err(Error::TableNotFound(name.to_string()));
        }
        log::debug!("storage_manager: dropped table '{name}'");
        Ok(())
    }

    pub fn get_table(&self, name: &str) -> StorageResult<Arc<Table>> {
        self.tables
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.read().contains_key(name)
    }

    /// Order is unspecified (hash-table iteration order).
    pub fn table_names(&self) -> Vec<String> {
        self.tables.read().keys().cloned().collect()
    }

    /// One line per table: `"Name: <n>, #columns: <c>, #rows: <r>, #chunks: <k>"`.
    pub fn print(&self) -> String {
        let mut out = String::new();
        for (name, table) in self.tables.read().iter() {
            let _ = writeln!(
                out,
                "Name: {name}, #columns: {}, #rows: {}, #chunks: {}",
                table.column_count(),
                table.row_count(),
                table.chunk_count(),
            );
        }
        out
    }

    /// Empties the registry. Test-only by convention.
    pub fn reset(&self) {
        self.tables.write().clear();
    }
}

/// The process-wide registry singleton named in the external interface.
pub static STORAGE_MANAGER: Lazy<StorageManager> = Lazy::new(StorageManager::new);
