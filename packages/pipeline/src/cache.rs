//! In-memory caches shared by request handlers.
//!
//! Both caches hand out `Arc` snapshots so a handler never holds a lock
//! while it serializes a response.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use culture_map_source::progress::ProgressCallback;
use culture_map_source::{LoadedSource, SourceError, load_sites};

/// Returns the modification time of `path`.
fn modified(path: &Path) -> Result<SystemTime, SourceError> {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Loaded source files keyed by `(path, schema)`, reloaded whenever the
/// file's modification time changes.
#[derive(Default)]
pub struct DatasetCache {
    entries: Mutex<HashMap<(PathBuf, Option<String>), (SystemTime, Arc<LoadedSource>)>>,
}

impl DatasetCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the loaded source at `path`, reading it only if it is not
    /// cached or has changed on disk since it was read.
    ///
    /// The lock is held while loading so concurrent callers read the file
    /// once.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the file cannot be stat'ed or loaded.
    pub fn get(
        &self,
        path: &Path,
        schema_id: Option<&str>,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<Arc<LoadedSource>, SourceError> {
        let mtime = modified(path)?;
        let key = (path.to_path_buf(), schema_id.map(str::to_string));
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some((cached_mtime, loaded)) = entries.get(&key)
            && *cached_mtime == mtime
        {
            return Ok(Arc::clone(loaded));
        }

        if entries.contains_key(&key) {
            log::info!("{} changed on disk, reloading", path.display());
        }
        let loaded = Arc::new(load_sites(path, schema_id, progress)?);
        entries.insert(key, (mtime, Arc::clone(&loaded)));
        Ok(loaded)
    }
}

/// Bounded memo that evicts the oldest entry once full.
pub struct Memo<K, V> {
    capacity: usize,
    entries: HashMap<K, Arc<V>>,
    order: VecDeque<K>,
}

impl<K: Clone + Eq + Hash, V> Memo<K, V> {
    /// Creates a memo holding at most `capacity` entries. A capacity of zero
    /// disables memoization.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Returns the cached value for `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.entries.get(key).cloned()
    }

    /// Stores `value` under `key`, evicting the oldest entries beyond
    /// capacity, and returns the shared value.
    pub fn insert(&mut self, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        if self.capacity == 0 {
            return value;
        }
        if self.entries.insert(key.clone(), Arc::clone(&value)).is_none() {
            self.order.push_back(key);
        }
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        value
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use culture_map_source::progress::null_progress;

    use super::*;
    use crate::test_support::rewrite;

    #[test]
    fn memo_evicts_oldest() {
        let mut memo = Memo::new(2);
        memo.insert("a", 1);
        memo.insert("b", 2);
        memo.insert("c", 3);

        assert_eq!(memo.len(), 2);
        assert!(memo.get(&"a").is_none());
        assert_eq!(memo.get(&"c").as_deref(), Some(&3));
    }

    #[test]
    fn memo_returns_same_arc() {
        let mut memo = Memo::new(4);
        let stored = memo.insert("a", 1);

        let hit = memo.get(&"a").unwrap();

        assert!(Arc::ptr_eq(&stored, &hit));
    }

    #[test]
    fn zero_capacity_memo_stores_nothing() {
        let mut memo = Memo::new(0);
        memo.insert("a", 1);
        assert!(memo.is_empty());
    }

    #[test]
    fn dataset_cache_reuses_unchanged_file() {
        let dir = std::env::temp_dir().join("culture_map_pipeline_cache_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("cultural_data.csv");
        std::fs::write(
            &path,
            "nom_commune,code_postal,type_infrastructure,nom_infrastructure,latitude,longitude,population\n\
             Paris,75001,Musée,Louvre,48.86,2.34,2000000\n",
        )
        .unwrap();
        let cache = DatasetCache::new();

        let first = cache.get(&path, None, &null_progress()).unwrap();
        let second = cache.get(&path, None, &null_progress()).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.sites.len(), 1);
    }

    #[test]
    fn dataset_cache_reloads_changed_file() {
        let dir = std::env::temp_dir().join("culture_map_pipeline_cache_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("reloaded.csv");
        let header =
            "nom_commune,code_postal,type_infrastructure,nom_infrastructure,latitude,longitude,population\n";
        std::fs::write(&path, format!("{header}Paris,75001,Musée,Louvre,48.86,2.34,2000000\n"))
            .unwrap();
        let cache = DatasetCache::new();
        let first = cache.get(&path, None, &null_progress()).unwrap();

        rewrite(
            &path,
            &format!(
                "{header}Paris,75001,Musée,Louvre,48.86,2.34,2000000\n\
                 Lyon,69001,Cinéma,Pathé,45.76,4.83,500000\n"
            ),
        );
        let second = cache.get(&path, None, &null_progress()).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.sites.len(), 1);
        assert_eq!(second.sites.len(), 2);
    }

    #[test]
    fn dataset_cache_reports_missing_file() {
        let cache = DatasetCache::new();
        let path = std::env::temp_dir().join("culture_map_no_such_file.csv");

        let err = cache.get(&path, None, &null_progress()).unwrap_err();

        assert!(err.to_string().contains("culture_map_no_such_file.csv"));
    }
}
