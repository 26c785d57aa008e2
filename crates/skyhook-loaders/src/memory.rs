// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! In-memory loader

use parking_lot::RwLock;
use skyhook_modules::{BoxError, Loader};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

/// Error returned when an identifier has no entry in the store
#[derive(Debug, Error)]
#[error("no module '{0}' in memory store")]
pub struct NotFound(String);

/// Loader serving module source from an in-memory map.
///
/// The store is shared: modules can be inserted after the loader has been
/// registered. Every `load` bumps an atomic counter, so tests and embedders
/// can assert how often the cache actually reached the loader.
pub struct MemoryLoader {
    /// Identifier to source text
    modules: RwLock<HashMap<String, String>>,
    /// Number of `load` invocations
    loads: AtomicUsize,
}

impl MemoryLoader {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            modules: RwLock::new(HashMap::new()),
            loads: AtomicUsize::new(0),
        }
    }

    /// Insert or replace a module's source
    pub fn insert(&self, id: impl Into<String>, source: impl Into<String>) {
        self.modules.write().insert(id.into(), source.into());
    }

    /// Number of times `load` has been invoked
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl Loader for MemoryLoader {
    fn load(&self, id: &str) -> Result<String, BoxError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.modules
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| NotFound(id.to_string()).into())
    }
}

impl Default for MemoryLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, S> FromIterator<(I, S)> for MemoryLoader
where
    I: Into<String>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (I, S)>>(iter: T) -> Self {
        let loader = Self::new();
        for (id, source) in iter {
            loader.insert(id, source);
        }
        loader
    }
}
