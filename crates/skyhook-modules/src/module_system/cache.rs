// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module cache enforcing at-most-once evaluation

use crate::error::{ModuleError, Result};
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::thread::{self, ThreadId};
use tracing::trace;

/// State of one cache entry.
///
/// An entry is created on first request and settles exactly once, from
/// pending to either resolved or failed. Settled entries persist for the
/// rest of the process so module identity stays stable across requests.
enum Entry<V> {
    /// Load in progress. `owner` distinguishes a require cycle on the
    /// loading thread from contention with another thread; `exports` is the
    /// live container the module body is populating.
    Pending { owner: ThreadId, exports: V },
    /// Evaluation completed
    Resolved(V),
    /// Load or evaluation failed; the error is re-raised on every later
    /// request without re-running the load
    Failed(ModuleError),
}

/// Module cache keyed by canonical identifier.
///
/// `V` is the module value handed back to scripts. It must have handle
/// semantics (clones observe the same underlying container) for cyclic
/// requires to see the partially populated exports object.
pub struct ModuleCache<V> {
    /// Entry state table
    entries: Mutex<HashMap<String, Entry<V>>>,
    /// Signaled whenever a pending entry settles
    settled: Condvar,
}

impl<V: Clone> ModuleCache<V> {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            settled: Condvar::new(),
        }
    }

    /// Return the cached value for `key`, or run `load` to produce it.
    ///
    /// `fresh` creates the exports container before the module body runs;
    /// `load` performs the actual load and evaluation against it and runs
    /// with no lock held. The absent-to-pending transition happens under the
    /// table lock, so of any number of concurrent requesters exactly one
    /// invokes `load`; the rest block until the entry settles and then
    /// observe the same value or the same error. A re-entrant request from
    /// the loading thread itself (a require cycle) short-circuits to a
    /// clone of the pending exports container.
    pub fn get_or_load<G, F>(&self, key: &str, fresh: G, load: F) -> Result<V>
    where
        G: FnOnce() -> V,
        F: FnOnce(&V) -> Result<V>,
    {
        let exports = {
            let mut entries = self.entries.lock();
            loop {
                match entries.get(key) {
                    None => break,
                    Some(Entry::Resolved(value)) => {
                        trace!(module = key, "module cache hit");
                        return Ok(value.clone());
                    }
                    Some(Entry::Failed(err)) => {
                        trace!(module = key, "module cache hit (cached failure)");
                        return Err(err.clone());
                    }
                    Some(Entry::Pending { owner, exports }) => {
                        if *owner == thread::current().id() {
                            // Require cycle: hand back the live, partially
                            // populated exports container.
                            trace!(module = key, "require cycle, returning partial exports");
                            return Ok(exports.clone());
                        }
                        self.settled.wait(&mut entries);
                    }
                }
            }

            let exports = fresh();
            entries.insert(
                key.to_string(),
                Entry::Pending {
                    owner: thread::current().id(),
                    exports: exports.clone(),
                },
            );
            exports
        };

        // If `load` unwinds, the guard settles the entry as failed so
        // cross-thread waiters are not stranded on a forever-pending entry.
        let guard = SettleGuard { cache: self, key };
        let result = load(&exports);
        guard.settle(match &result {
            Ok(value) => Entry::Resolved(value.clone()),
            Err(err) => Entry::Failed(err.clone()),
        });

        result
    }

    /// Check whether `key` has an entry in any state
    pub fn has(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    /// Get the resolved value for `key`, if it has settled successfully
    pub fn get(&self, key: &str) -> Option<V> {
        match self.entries.lock().get(key) {
            Some(Entry::Resolved(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Canonical identifiers of all entries
    pub fn keys(&self) -> Vec<String> {
        self.entries.lock().keys().cloned().collect()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl<V: Clone> Default for ModuleCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

struct SettleGuard<'a, V> {
    cache: &'a ModuleCache<V>,
    key: &'a str,
}

impl<V> SettleGuard<'_, V> {
    fn settle(self, entry: Entry<V>) {
        self.cache.entries.lock().insert(self.key.to_string(), entry);
        self.cache.settled.notify_all();
        std::mem::forget(self);
    }
}

impl<V> Drop for SettleGuard<'_, V> {
    fn drop(&mut self) {
        self.cache.entries.lock().insert(
            self.key.to_string(),
            Entry::Failed(ModuleError::Incomplete(self.key.to_string())),
        );
        self.cache.settled.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::time::Duration;

    #[test]
    fn test_single_evaluation() {
        let cache: ModuleCache<Arc<String>> = ModuleCache::new();
        let loads = AtomicUsize::new(0);

        let load = |_: &Arc<String>| {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new("value".to_string()))
        };

        let first = cache
            .get_or_load("m", || Arc::new(String::new()), load)
            .unwrap();
        let second = cache
            .get_or_load("m", || Arc::new(String::new()), |_| unreachable!())
            .unwrap();

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        // Same value by reference, not just by content
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_failures_are_cached() {
        let cache: ModuleCache<()> = ModuleCache::new();
        let loads = AtomicUsize::new(0);

        let err = cache
            .get_or_load(
                "bad",
                || (),
                |_| {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Err(ModuleError::UnsupportedProtocol("ftp".to_string()))
                },
            )
            .unwrap_err();
        assert!(matches!(err, ModuleError::UnsupportedProtocol(_)));

        let again = cache
            .get_or_load("bad", || (), |_| unreachable!())
            .unwrap_err();
        assert!(matches!(again, ModuleError::UnsupportedProtocol(_)));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reentrant_request_sees_partial_exports() {
        let cache: Arc<ModuleCache<Arc<Mutex<Vec<i32>>>>> = Arc::new(ModuleCache::new());

        let outer = cache.get_or_load(
            "a",
            || Arc::new(Mutex::new(Vec::new())),
            |exports| {
                exports.lock().push(1);

                // Same key, same thread: must not deadlock or recurse, and
                // must observe the single element pushed so far.
                let partial = cache
                    .get_or_load("a", || unreachable!(), |_| unreachable!())
                    .unwrap();
                assert_eq!(partial.lock().len(), 1);

                exports.lock().push(2);
                Ok(exports.clone())
            },
        );

        assert_eq!(outer.unwrap().lock().len(), 2);
    }

    #[test]
    fn test_concurrent_requests_load_once() {
        let cache: Arc<ModuleCache<Arc<String>>> = Arc::new(ModuleCache::new());
        let loads = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(2));

        let mut handles = Vec::new();
        for _ in 0..2 {
            let cache = Arc::clone(&cache);
            let loads = Arc::clone(&loads);
            let barrier = Arc::clone(&barrier);
            handles.push(std::thread::spawn(move || {
                barrier.wait();
                cache
                    .get_or_load(
                        "m",
                        || Arc::new(String::new()),
                        |_| {
                            loads.fetch_add(1, Ordering::SeqCst);
                            std::thread::sleep(Duration::from_millis(50));
                            Ok(Arc::new("value".to_string()))
                        },
                    )
                    .unwrap()
            }));
        }

        let values: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&values[0], &values[1]));
    }

    #[test]
    fn test_abandoned_load_settles_as_failure() {
        let cache: Arc<ModuleCache<()>> = Arc::new(ModuleCache::new());

        let worker = {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || {
                let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    let _ = cache.get_or_load("doomed", || (), |_| panic!("module body panicked"));
                }));
            })
        };
        worker.join().unwrap();

        let err = cache
            .get_or_load("doomed", || (), |_| unreachable!())
            .unwrap_err();
        assert!(matches!(err, ModuleError::Incomplete(_)));
    }
}
