// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! File-system loader

use skyhook_modules::{BoxError, Loader};
use std::path::PathBuf;
use tracing::trace;

/// Loader for the `file` protocol.
///
/// Identifiers arrive normalized and absolute (`/lib/greet.js`). By default
/// they are read as-is from the file system; [`with_root`](Self::with_root)
/// instead joins them beneath a base directory, which is the usual shape
/// for embedders whose scripts live in one tree.
pub struct FileLoader {
    /// Base directory identifiers are joined onto, if any
    root: Option<PathBuf>,
}

impl FileLoader {
    /// Create a loader reading identifiers as absolute paths
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Create a loader reading identifiers beneath `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn path_for(&self, id: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(id.trim_start_matches('/')),
            None => PathBuf::from(id),
        }
    }
}

impl Loader for FileLoader {
    fn load(&self, id: &str) -> Result<String, BoxError> {
        let path = self.path_for(id);
        trace!(path = %path.display(), "reading module source");
        Ok(std::fs::read_to_string(path)?)
    }
}

impl Default for FileLoader {
    fn default() -> Self {
        Self::new()
    }
}
