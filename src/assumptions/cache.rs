//! Whole-table cache for flat-file loads
//!
//! Tables are cached per file path together with the file's modification
//! time. A lookup re-reads the file when the timestamp moved, and writers
//! call [`TableCache::invalidate`] after replacing a file so that a rewrite
//! landing inside the filesystem's timestamp granularity is still seen.

use log::debug;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::Result;

#[derive(Debug, Clone)]
struct CachedTable<T> {
    /// Modification time observed when the table was read
    modified: Option<SystemTime>,
    table: T,
}

/// Cache of parsed tables keyed by file path + modification time
#[derive(Debug, Clone)]
pub struct TableCache<T> {
    entries: HashMap<PathBuf, CachedTable<T>>,
}

impl<T> TableCache<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Return the cached table for `path`, loading it with `load` when the
    /// entry is missing or the file changed on disk since it was read.
    pub fn get_or_load<F>(&mut self, path: &Path, load: F) -> Result<&T>
    where
        F: FnOnce(&Path) -> Result<T>,
    {
        let modified = fs::metadata(path)?.modified().ok();

        // Without a usable mtime we cannot tell whether the file moved on
        let fresh = match self.entries.get(path) {
            Some(entry) => modified.is_some() && entry.modified == modified,
            None => false,
        };

        if fresh {
            debug!("table cache hit: {}", path.display());
        } else {
            debug!("table cache miss: {}", path.display());
            let table = load(path)?;
            self.entries
                .insert(path.to_path_buf(), CachedTable { modified, table });
        }

        Ok(&self.entries[path].table)
    }

    /// Drop the entry for `path` so the next lookup re-reads the file
    pub fn invalidate(&mut self, path: &Path) {
        if self.entries.remove(path).is_some() {
            debug!("table cache invalidated: {}", path.display());
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for TableCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::{tempdir, TempDir};

    fn temp_file(contents: &str) -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.csv");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_second_read_is_cached() {
        let (_dir, path) = temp_file("a,b\n1,2\n");
        let loads = Cell::new(0);
        let mut cache: TableCache<String> = TableCache::new();

        let load = |p: &Path| -> Result<String> {
            loads.set(loads.get() + 1);
            Ok(fs::read_to_string(p)?)
        };

        assert_eq!(cache.get_or_load(&path, load).unwrap(), "a,b\n1,2\n");
        let load_again = |p: &Path| -> Result<String> {
            loads.set(loads.get() + 1);
            Ok(fs::read_to_string(p)?)
        };
        cache.get_or_load(&path, load_again).unwrap();

        assert_eq!(loads.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let (_dir, path) = temp_file("v1");
        let mut cache: TableCache<String> = TableCache::new();

        cache
            .get_or_load(&path, |p| Ok(fs::read_to_string(p)?))
            .unwrap();
        fs::write(&path, "v2").unwrap();
        cache.invalidate(&path);

        let value = cache
            .get_or_load(&path, |p| Ok(fs::read_to_string(p)?))
            .unwrap();
        assert_eq!(value, "v2");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let mut cache: TableCache<String> = TableCache::new();
        let dir = tempdir().unwrap();
        let path = dir.path().join("does_not_exist.csv");
        assert!(cache
            .get_or_load(&path, |p| Ok(fs::read_to_string(p)?))
            .is_err());
        assert!(cache.is_empty());
    }
}
