// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # skyhook-modules
//!
//! Protocol-extensible module loading for embedded scripting runtimes.
//!
//! Gives any embedded engine a `require(identifier)` facility: identifiers
//! are classified into a canonical `(protocol, id)` pair, handed to a
//! pluggable loader keyed by protocol, evaluated by the host engine, and
//! cached so every identifier is evaluated at most once per runtime. That
//! holds under re-entrant and cyclic requires too, which observe the
//! partially populated exports of the module still being evaluated.
//!
//! Identifier shapes:
//!
//! - `scheme://segments` selects the loader registered for `scheme`
//! - `/abs`, `./rel`, `../rel` are rewritten as `file://` identifiers
//! - anything else is a bare identifier, served by the fallback loader
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use skyhook_modules::Runtime;
//! use std::sync::Arc;
//!
//! let runtime = Runtime::builder(MyEngine::new())
//!     .loader("file", Arc::new(my_file_loader))
//!     .build();
//!
//! let exports = runtime.require("./lib/greet.js")?;
//! ```
//!
//! The engine seam is the [`Engine`] trait; stock loaders for the `file`,
//! memory, and `http`/`https` protocols ship in the `skyhook-loaders`
//! crate.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod error;
pub mod module_system;
pub mod runtime;

// Re-exports
pub use engine::Engine;
pub use error::{BoxError, ErrorCause, ModuleError, Result};
pub use module_system::{classify, Loader, LoaderRegistry, ModuleCache, ModuleId, Require};
pub use runtime::{Runtime, RuntimeBuilder};

/// Version of the skyhook module system
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
