//! Directory → verdict cache shared by every query of one [`BoundarySearch`].
//!
//! Entries are only ever added, never replaced or evicted: a directory is
//! cached once its verdict is conclusive, and the first writer wins. The cache
//! is pure acceleration; dropping it changes no verdict.
//!
//! [`BoundarySearch`]: crate::search::BoundarySearch

use crate::Verdict;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub struct VerdictCache {
    entries: Mutex<HashMap<PathBuf, Verdict>>,
}

impl VerdictCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, Verdict>> {
        // Entries are inserted whole, so a panic elsewhere cannot leave the map half-written.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, dir: &Path) -> Option<Verdict> {
        self.lock().get(dir).copied()
    }

    /// Record `verdict` for `dir` unless an entry already exists.
    /// Returns the verdict that is now cached.
    pub fn record(&self, dir: &Path, verdict: Verdict) -> Verdict {
        *self.lock().entry(dir.to_path_buf()).or_insert(verdict)
    }

    /// Nearest cached ancestor of `start` (inclusive), not looking at or
    /// beyond the first directory named `stop_at`.
    ///
    /// The whole walk runs under one lock acquisition.
    pub fn lookup_ancestors(&self, start: &Path, stop_at: &str) -> Option<(PathBuf, Verdict)> {
        let entries = self.lock();
        if entries.is_empty() {
            return None;
        }
        for dir in start.ancestors() {
            if dir.file_name().is_some_and(|name| name == stop_at) {
                break;
            }
            if let Some(verdict) = entries.get(dir) {
                return Some((dir.to_path_buf(), *verdict));
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of all entries, sorted by path.
    pub fn snapshot(&self) -> Vec<(PathBuf, Verdict)> {
        let mut entries: Vec<_> = self
            .lock()
            .iter()
            .map(|(dir, verdict)| (dir.clone(), *verdict))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_writer_wins() {
        let cache = VerdictCache::new();
        let dir = Path::new("/repo/node_modules/left-pad");
        assert_eq!(cache.record(dir, Verdict::NotGoverned), Verdict::NotGoverned);
        assert_eq!(cache.record(dir, Verdict::Governed), Verdict::NotGoverned);
        assert_eq!(cache.get(dir), Some(Verdict::NotGoverned));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_lookup_returns_nearest_ancestor() {
        let cache = VerdictCache::new();
        cache.record(Path::new("/repo"), Verdict::Governed);
        cache.record(Path::new("/repo/packages/ui"), Verdict::Governed);

        let hit = cache.lookup_ancestors(Path::new("/repo/packages/ui/src/components"), "node_modules");
        assert_eq!(hit, Some((PathBuf::from("/repo/packages/ui"), Verdict::Governed)));

        let hit = cache.lookup_ancestors(Path::new("/repo/scripts"), "node_modules");
        assert_eq!(hit, Some((PathBuf::from("/repo"), Verdict::Governed)));
    }

    #[test]
    fn test_lookup_stops_at_dependency_root() {
        let cache = VerdictCache::new();
        cache.record(Path::new("/repo"), Verdict::Governed);

        let hit = cache.lookup_ancestors(Path::new("/repo/node_modules/react/lib"), "node_modules");
        assert_eq!(hit, None);
    }

    #[test]
    fn test_lookup_sees_entries_inside_dependency_root() {
        let cache = VerdictCache::new();
        cache.record(Path::new("/repo/node_modules/react"), Verdict::NotGoverned);

        let hit = cache.lookup_ancestors(Path::new("/repo/node_modules/react/cjs"), "node_modules");
        assert_eq!(
            hit,
            Some((PathBuf::from("/repo/node_modules/react"), Verdict::NotGoverned))
        );
    }

    #[test]
    fn test_snapshot_is_sorted() {
        let cache = VerdictCache::new();
        cache.record(Path::new("/b"), Verdict::Governed);
        cache.record(Path::new("/a"), Verdict::NotGoverned);
        let snap = cache.snapshot();
        assert_eq!(snap[0].0, PathBuf::from("/a"));
        assert_eq!(snap[1].0, PathBuf::from("/b"));
    }
}
