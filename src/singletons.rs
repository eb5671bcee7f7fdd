//! Memoized singleton holders keyed by implementation type.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::OnceCell;

use crate::error::Cause;
use crate::key::Key;
use crate::registration::AnyArc;

/// Cache of lazily constructed singleton instances.
///
/// Each implementation key owns a `OnceCell` holder, installed on the first
/// resolution that reaches the key. The factory behind a holder runs to a
/// successful construction at most once for the cache's lifetime; a failed
/// construction leaves the holder empty. No lock is held while a factory
/// runs, so factories may resolve other keys freely.
pub(crate) struct SingletonCache {
    cells: RwLock<HashMap<Key, Arc<OnceCell<AnyArc>>>>,
}

impl SingletonCache {
    pub(crate) fn new() -> Self {
        Self {
            cells: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the cached instance without constructing anything.
    pub(crate) fn get(&self, key: &Key) -> Option<AnyArc> {
        self.cells.read().unwrap().get(key)?.get().cloned()
    }

    /// Gets or constructs the singleton for `key`.
    ///
    /// Concurrent callers for the same key serialize on the key's holder;
    /// exactly one of them runs `factory` and the rest observe its result.
    pub(crate) fn get_or_try_init<F>(&self, key: Key, factory: F) -> Result<AnyArc, Cause>
    where
        F: FnOnce() -> Result<AnyArc, Cause>,
    {
        // Fast path: holder already installed.
        let cell = self.cells.read().unwrap().get(&key).cloned();
        let cell = match cell {
            Some(cell) => cell,
            None => {
                // Install the holder under the write lock, force it outside.
                let mut cells = self.cells.write().unwrap();
                cells
                    .entry(key)
                    .or_insert_with(|| Arc::new(OnceCell::new()))
                    .clone()
            }
        };
        cell.get_or_try_init(factory).map(|value| value.clone())
    }

    /// Number of keys with a fully constructed instance.
    pub(crate) fn constructed_len(&self) -> usize {
        self.cells
            .read()
            .unwrap()
            .values()
            .filter(|cell| cell.get().is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn factory_runs_once_per_key() {
        let cache = SingletonCache::new();
        let runs = AtomicU32::new(0);
        let key = Key::of::<u64>();

        for _ in 0..3 {
            let value = cache
                .get_or_try_init(key, || {
                    runs.fetch_add(1, Ordering::SeqCst);
                    Ok(Arc::new(7u64) as AnyArc)
                })
                .unwrap();
            assert_eq!(*value.downcast::<u64>().ok().unwrap(), 7);
        }

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(cache.constructed_len(), 1);
    }

    #[test]
    fn failed_construction_is_not_cached() {
        let cache = SingletonCache::new();
        let key = Key::of::<String>();

        let failed = cache.get_or_try_init(key, || {
            Err(Arc::new(std::io::Error::new(std::io::ErrorKind::Other, "boom")) as Cause)
        });
        assert!(failed.is_err());
        assert!(cache.get(&key).is_none());
        assert_eq!(cache.constructed_len(), 0);

        // A later attempt may still construct.
        let ok = cache
            .get_or_try_init(key, || Ok(Arc::new("ready".to_string()) as AnyArc))
            .unwrap();
        assert_eq!(*ok.downcast::<String>().ok().unwrap(), "ready");
    }

    #[test]
    fn get_does_not_construct() {
        let cache = SingletonCache::new();
        assert!(cache.get(&Key::of::<u8>()).is_none());
        assert_eq!(cache.constructed_len(), 0);
    }
}
