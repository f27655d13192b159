//! Memoized loads, keyed by source path.
//!
//! Entries live until explicitly invalidated; the source file is never
//! re-checked for changes.

use crate::error::Result;
use crate::loader::{self, SalesTable};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Default)]
pub struct LoadCache {
    tables: HashMap<PathBuf, SalesTable>,
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `path`, loading it on first use.
    pub fn get_or_load(&mut self, path: &Path) -> Result<&SalesTable> {
        if self.tables.contains_key(path) {
            debug!("Load cache hit: {}", path.display());
        } else {
            debug!("Load cache miss: {}", path.display());
            let table = loader::load(path)?;
            self.tables.insert(path.to_path_buf(), table);
        }

        Ok(&self.tables[path])
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.tables.contains_key(path)
    }

    /// Drop the entry for `path`; returns whether one existed.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.tables.remove(path).is_some()
    }

    pub fn clear(&mut self) {
        self.tables.clear();
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
