use crate::error::Result;
use crate::workbook::Workbook;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// Read-only cache of parsed workbooks, keyed by file path
///
/// A path is parsed the first time it is requested and never again for the
/// lifetime of the cache. Changes to the file on disk are not noticed; a
/// restart (or [`WorkbookCache::reset`]) is needed to pick them up.
///
/// Each path has its own lock, so a slow parse only holds up callers asking
/// for that same path.
#[derive(Debug, Default)]
pub struct WorkbookCache {
    entries: RwLock<HashMap<PathBuf, Slot>>,
    loads: AtomicUsize,
}

/// One path's entry; its lock is held while that path is being parsed
type Slot = Arc<Mutex<Option<Arc<Workbook>>>>;

lazy_static! {
    static ref GLOBAL_CACHE: WorkbookCache = WorkbookCache::new();
}

impl WorkbookCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache shared by every caller
    pub fn global() -> &'static WorkbookCache {
        &GLOBAL_CACHE
    }

    /// Returns the workbook at `path`, parsing it only on first use
    ///
    /// Two calls with the same path hand back the same `Arc`. A failed load
    /// is not cached, so the next call tries the file again.
    ///
    /// # Examples
    /// ```no_run
    /// use fsa_dashboard::cache::WorkbookCache;
    ///
    /// let cache = WorkbookCache::new();
    /// let first = cache.load("FSAFAWAIExcel_Final.xlsx").unwrap();
    /// let second = cache.load("FSAFAWAIExcel_Final.xlsx").unwrap();
    /// assert!(std::sync::Arc::ptr_eq(&first, &second));
    /// assert_eq!(cache.load_count(), 1);
    /// ```
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Arc<Workbook>> {
        let path = path.as_ref();
        let slot = self.slot(path);

        // Only callers of this path wait here; other paths stay available
        let mut entry = slot.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(workbook) = entry.as_ref() {
            log::debug!("workbook cache hit for {}", path.display());
            return Ok(Arc::clone(workbook));
        }

        let workbook = Arc::new(Workbook::open(path)?);
        self.loads.fetch_add(1, Ordering::SeqCst);
        *entry = Some(Arc::clone(&workbook));
        Ok(workbook)
    }

    fn slot(&self, path: &Path) -> Slot {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        if let Some(slot) = entries.get(path) {
            return Arc::clone(slot);
        }
        drop(entries);

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        Arc::clone(entries.entry(path.to_path_buf()).or_default())
    }

    /// Workbook already cached for `path`, if any
    pub fn cached(&self, path: impl AsRef<Path>) -> Option<Arc<Workbook>> {
        let slot = {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            entries.get(path.as_ref()).cloned()
        }?;
        let entry = slot.lock().unwrap_or_else(|e| e.into_inner());
        entry.as_ref().map(Arc::clone)
    }

    /// Number of times a file was actually parsed
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Drops every cached workbook and zeroes the load counter
    pub fn reset(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.clear();
        self.loads.store(0, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;

    #[test]
    fn failed_loads_are_not_cached() {
        let cache = WorkbookCache::new();
        let err = cache.load("missing/workbook.xlsx").unwrap_err();
        assert!(matches!(err, DashboardError::MissingFile { .. }));
        assert!(cache.cached("missing/workbook.xlsx").is_none());
        assert_eq!(cache.load_count(), 0);
    }

    #[test]
    fn parsing_one_path_leaves_others_available() {
        let cache = WorkbookCache::new();
        let busy = cache.slot(Path::new("busy.xlsx"));
        // a held slot lock stands in for a parse in progress
        let _parsing = busy.lock().unwrap();

        std::thread::scope(|scope| {
            let other = scope.spawn(|| {
                let failed = cache.load("missing/other.xlsx").is_err();
                (failed, cache.cached("missing/other.xlsx").is_none())
            });
            assert_eq!(other.join().unwrap(), (true, true));
        });
        assert_eq!(cache.load_count(), 0);
    }

    #[test]
    fn global_cache_is_a_single_instance() {
        assert!(std::ptr::eq(WorkbookCache::global(), WorkbookCache::global()));
    }
}
