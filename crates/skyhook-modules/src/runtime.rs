// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Runtime context owning the module system state

use crate::engine::Engine;
use crate::error::{ModuleError, Result};
use crate::module_system::{classify, Loader, LoaderRegistry, ModuleCache, Require};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Execution-context object owning the loader registry, the module cache,
/// and the builtin-module table.
///
/// All require state is per-runtime: two runtimes never share cache entries,
/// and a runtime's state is discarded with it. Loaders for every protocol
/// scripts will use (at minimum `file`) should be registered before the
/// first script runs, either through [`RuntimeBuilder`] or the `register_*`
/// methods.
pub struct Runtime<E: Engine> {
    /// The host engine's evaluation facility
    engine: E,
    /// Protocol loader registry
    registry: LoaderRegistry,
    /// Module cache keyed by canonical identifier
    cache: ModuleCache<E::Exports>,
    /// Prebuilt modules served by name, ahead of classification
    builtins: RwLock<HashMap<String, E::Exports>>,
    /// Canonical identifier of the main module, once one has run
    main: RwLock<Option<String>>,
}

impl<E: Engine> Runtime<E> {
    /// Create a runtime with an empty registry and cache
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            registry: LoaderRegistry::new(),
            cache: ModuleCache::new(),
            builtins: RwLock::new(HashMap::new()),
            main: RwLock::new(None),
        }
    }

    /// Start building a runtime with loaders and builtin modules
    pub fn builder(engine: E) -> RuntimeBuilder<E> {
        RuntimeBuilder {
            engine,
            loaders: Vec::new(),
            fallback: None,
            builtins: Vec::new(),
        }
    }

    /// Register a loader for a protocol, replacing any previous one
    pub fn register_loader(&self, protocol: impl Into<String>, loader: Arc<dyn Loader>) {
        self.registry.register(protocol, loader);
    }

    /// Register the loader applied to bare identifiers
    pub fn register_fallback_loader(&self, loader: Arc<dyn Loader>) {
        self.registry.register_fallback(loader);
    }

    /// Register a prebuilt module served under a bare name.
    ///
    /// Builtin names are consulted before identifier classification, so a
    /// builtin shadows any loader-resolved module of the same name.
    pub fn register_module(&self, name: impl Into<String>, exports: E::Exports) {
        self.builtins.write().insert(name.into(), exports);
    }

    /// Evaluate `source` as the main module.
    ///
    /// The source is cached under the canonical form of `identifier` like
    /// any required module, so scripts it pulls in can require the main
    /// module back (and observe its partial exports mid-evaluation).
    pub fn run_main(&self, identifier: &str, source: &str) -> Result<E::Exports> {
        let canonical = classify(identifier).normalize().canonical();
        *self.main.write() = Some(canonical.clone());
        debug!(module = %canonical, "evaluating main module");

        self.cache.get_or_load(
            &canonical,
            || self.engine.fresh_exports(),
            |exports| {
                self.engine
                    .evaluate(source, &canonical, exports, self)
                    .map_err(|e| ModuleError::evaluation(&canonical, e))
            },
        )
    }

    /// Canonical identifier of the main module, if one has run
    pub fn main_module(&self) -> Option<String> {
        self.main.read().clone()
    }

    /// Resolve, load, and evaluate `identifier`, or return its cached value.
    ///
    /// Builtin names are checked first; everything else is classified,
    /// normalized, and dispatched through the cache to the loader registered
    /// for its protocol and the engine. Loader and evaluation failures are
    /// cached: a later request for the same identifier re-raises the same
    /// error without touching the loader again.
    pub fn require(&self, identifier: &str) -> Result<E::Exports> {
        if let Some(prebuilt) = self.builtins.read().get(identifier).cloned() {
            let seeded = prebuilt.clone();
            return self
                .cache
                .get_or_load(identifier, move || seeded, |exports| Ok(exports.clone()));
        }

        let descriptor = classify(identifier).normalize();
        let canonical = descriptor.canonical();
        debug!(module = %canonical, "requiring module");

        self.cache.get_or_load(
            &canonical,
            || self.engine.fresh_exports(),
            |exports| {
                let loader = self.registry.resolve(descriptor.protocol())?;
                let source = loader
                    .load(descriptor.id())
                    .map_err(|e| ModuleError::loader(&canonical, e))?;
                self.engine
                    .evaluate(&source, &canonical, exports, self)
                    .map_err(|e| ModuleError::evaluation(&canonical, e))
            },
        )
    }

    /// The protocol loader registry
    pub fn registry(&self) -> &LoaderRegistry {
        &self.registry
    }

    /// The module cache
    pub fn cache(&self) -> &ModuleCache<E::Exports> {
        &self.cache
    }
}

impl<E: Engine> Require<E::Exports> for Runtime<E> {
    fn require(&self, identifier: &str) -> Result<E::Exports> {
        Runtime::require(self, identifier)
    }
}

/// Builder wiring loaders and builtin modules into a [`Runtime`] before any
/// script runs
pub struct RuntimeBuilder<E: Engine> {
    engine: E,
    loaders: Vec<(String, Arc<dyn Loader>)>,
    fallback: Option<Arc<dyn Loader>>,
    builtins: Vec<(String, E::Exports)>,
}

impl<E: Engine> RuntimeBuilder<E> {
    /// Add a loader for a protocol
    pub fn loader(mut self, protocol: impl Into<String>, loader: Arc<dyn Loader>) -> Self {
        self.loaders.push((protocol.into(), loader));
        self
    }

    /// Set the loader applied to bare identifiers
    pub fn fallback_loader(mut self, loader: Arc<dyn Loader>) -> Self {
        self.fallback = Some(loader);
        self
    }

    /// Add a prebuilt module served under a bare name. The first
    /// registration of a name wins.
    pub fn module(mut self, name: impl Into<String>, exports: E::Exports) -> Self {
        let name = name.into();
        if self.builtins.iter().any(|(existing, _)| *existing == name) {
            return self;
        }
        self.builtins.push((name, exports));
        self
    }

    /// Build the runtime
    pub fn build(self) -> Runtime<E> {
        let runtime = Runtime::new(self.engine);
        for (protocol, loader) in self.loaders {
            runtime.register_loader(protocol, loader);
        }
        if let Some(fallback) = self.fallback {
            runtime.register_fallback_loader(fallback);
        }
        for (name, exports) in self.builtins {
            runtime.register_module(name, exports);
        }
        runtime
    }
}
