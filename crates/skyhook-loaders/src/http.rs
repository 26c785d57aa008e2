// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! HTTP(S) loader

use skyhook_modules::{BoxError, Loader};
use tracing::debug;

/// Loader fetching module source over HTTP(S).
///
/// One instance serves one scheme: register `HttpLoader::http()` for the
/// `http` protocol and `HttpLoader::https()` for `https`. The identifier is
/// the authority-plus-path portion (`example.com/lib/greet.js`); the
/// request blocks until the body has been read, matching the synchronous
/// `require` contract. A non-success status is a loader failure.
pub struct HttpLoader {
    scheme: String,
    client: reqwest::blocking::Client,
}

impl HttpLoader {
    /// Create a loader for an arbitrary scheme name
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Loader for the `http` protocol
    pub fn http() -> Self {
        Self::new("http")
    }

    /// Loader for the `https` protocol
    pub fn https() -> Self {
        Self::new("https")
    }

    fn url_for(&self, id: &str) -> String {
        format!("{}://{}", self.scheme, id)
    }
}

impl Loader for HttpLoader {
    fn load(&self, id: &str) -> Result<String, BoxError> {
        let url = self.url_for(id);
        debug!(url = %url, "fetching module source");

        let body = self
            .client
            .get(&url)
            .send()?
            .error_for_status()?
            .text()?;
        Ok(body)
    }
}
