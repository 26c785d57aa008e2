// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # skyhook-loaders
//!
//! Stock protocol loaders for the Skyhook module system:
//!
//! - [`FileLoader`] reads module source from the file system, optionally
//!   rooted beneath a base directory
//! - [`MemoryLoader`] serves a shared in-memory map with load-count
//!   instrumentation, for tests and embedders that bundle their modules
//! - [`HttpLoader`] fetches source over HTTP(S), one instance per scheme
//!   (Cargo feature `http`, enabled by default)
//!
//! None of these is registered implicitly; the integrator picks the loader
//! set and wires it into a `Runtime` before scripts run.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod file;
#[cfg(feature = "http")]
mod http;
mod memory;

pub use file::FileLoader;
#[cfg(feature = "http")]
pub use http::HttpLoader;
pub use memory::MemoryLoader;
