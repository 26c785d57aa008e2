// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Protocol loader registry

use crate::error::{BoxError, ModuleError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Capability that turns a module identifier into source text.
///
/// A loader is associated with exactly one protocol name and lives in the
/// registry for the lifetime of the runtime. The `id` it receives is the
/// normalized identifier within its protocol's namespace (`/greet.js` for
/// `file:///greet.js`).
pub trait Loader: Send + Sync {
    /// Produce the raw source text for `id`, or fail
    fn load(&self, id: &str) -> std::result::Result<String, BoxError>;
}

/// Mapping from protocol name to loader capability.
///
/// Registration is append/overwrite only; there are no removal semantics.
/// Lookups vastly outnumber registrations, so both tables sit behind
/// read-preferring locks.
pub struct LoaderRegistry {
    /// Loaders keyed by protocol name
    loaders: RwLock<HashMap<String, Arc<dyn Loader>>>,
    /// Loader applied to bare identifiers, if any
    fallback: RwLock<Option<Arc<dyn Loader>>>,
}

impl LoaderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            loaders: RwLock::new(HashMap::new()),
            fallback: RwLock::new(None),
        }
    }

    /// Register a loader for a protocol, replacing any previous one
    pub fn register(&self, protocol: impl Into<String>, loader: Arc<dyn Loader>) {
        let protocol = protocol.into();
        debug!(protocol = %protocol, "registered module loader");
        self.loaders.write().insert(protocol, loader);
    }

    /// Register the loader applied to bare identifiers, replacing any
    /// previous one
    pub fn register_fallback(&self, loader: Arc<dyn Loader>) {
        debug!("registered fallback module loader");
        *self.fallback.write() = Some(loader);
    }

    /// Look up the loader for a protocol.
    ///
    /// `None` selects the fallback loader for bare identifiers.
    pub fn resolve(&self, protocol: Option<&str>) -> Result<Arc<dyn Loader>> {
        match protocol {
            Some(name) => self
                .loaders
                .read()
                .get(name)
                .cloned()
                .ok_or_else(|| ModuleError::UnsupportedProtocol(name.to_string())),
            None => self.fallback.read().clone().ok_or(ModuleError::NoBareLoader),
        }
    }

    /// Names of all registered protocols
    pub fn protocols(&self) -> Vec<String> {
        self.loaders.read().keys().cloned().collect()
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedLoader(&'static str);

    impl Loader for FixedLoader {
        fn load(&self, _id: &str) -> std::result::Result<String, BoxError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_register_and_resolve() {
        let registry = LoaderRegistry::new();
        registry.register("file", Arc::new(FixedLoader("source")));

        let loader = registry.resolve(Some("file")).unwrap();
        assert_eq!(loader.load("/x").unwrap(), "source");
        assert_eq!(registry.protocols(), vec!["file".to_string()]);
    }

    #[test]
    fn test_register_overwrites() {
        let registry = LoaderRegistry::new();
        registry.register("file", Arc::new(FixedLoader("first")));
        registry.register("file", Arc::new(FixedLoader("second")));

        let loader = registry.resolve(Some("file")).unwrap();
        assert_eq!(loader.load("/x").unwrap(), "second");
    }

    #[test]
    fn test_unknown_protocol() {
        let registry = LoaderRegistry::new();
        let err = registry.resolve(Some("ftp")).err().unwrap();
        assert!(matches!(err, ModuleError::UnsupportedProtocol(name) if name == "ftp"));
    }

    #[test]
    fn test_bare_identifiers_use_fallback() {
        let registry = LoaderRegistry::new();
        assert!(matches!(
            registry.resolve(None).err().unwrap(),
            ModuleError::NoBareLoader
        ));

        registry.register_fallback(Arc::new(FixedLoader("pkg")));
        assert_eq!(registry.resolve(None).unwrap().load("lodash").unwrap(), "pkg");
    }
}
