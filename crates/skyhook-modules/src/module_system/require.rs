// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The script-facing require() capability

use crate::error::Result;

/// The `require(identifier)` capability exposed to running scripts.
///
/// The runtime hands a `&dyn Require` to the engine for every module
/// evaluation, and the engine wires it into the module's scope; a module
/// body that requires one of its own (transitive) requirers re-enters the
/// cache and receives that module's partially populated exports instead of
/// deadlocking.
pub trait Require<V> {
    /// Resolve, load, and evaluate `identifier`, or return its cached value
    fn require(&self, identifier: &str) -> Result<V>;
}
