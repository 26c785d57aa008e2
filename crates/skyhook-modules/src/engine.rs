// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Interface to the host engine's evaluation facility

use crate::error::BoxError;
use crate::module_system::Require;

/// The host engine's evaluation facility.
///
/// The module system never compiles or executes source itself; it hands the
/// loaded text to an implementation of this trait and caches whatever comes
/// back.
pub trait Engine {
    /// The module value handed back to scripts.
    ///
    /// Must have handle semantics: clones observe the same underlying
    /// container. The runtime creates the container with
    /// [`fresh_exports`](Self::fresh_exports) before the module body runs
    /// and keeps a clone in the pending cache entry, which is what a cyclic
    /// require observes while the body is still executing.
    type Exports: Clone;

    /// Create an empty exports container for a module about to be evaluated
    fn fresh_exports(&self) -> Self::Exports;

    /// Execute `source` in a fresh module scope.
    ///
    /// `canonical_id` identifies the module for diagnostics and stack
    /// traces. `exports` is the container created by `fresh_exports`;
    /// `require` is the script-facing entry point to wire into the module's
    /// scope. Returns the container's final value, or the wholesale
    /// replacement if the module reassigned its export object.
    fn evaluate(
        &self,
        source: &str,
        canonical_id: &str,
        exports: &Self::Exports,
        require: &dyn Require<Self::Exports>,
    ) -> std::result::Result<Self::Exports, BoxError>;
}
