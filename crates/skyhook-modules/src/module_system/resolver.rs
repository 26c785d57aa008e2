// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module identifier classification and normalization

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Explicit scheme form: `scheme://segments`, scheme is alphanumeric,
/// segments are `/`-separated runs of alphanumerics, `.` and `-`, with an
/// optional leading slash.
static SCHEME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z0-9]+)://(/?[a-zA-Z0-9.\-]+(?:/[a-zA-Z0-9.\-]+)*)$").unwrap()
});

/// Local-path form: a string beginning with `/`, `./`, or `../`, followed by
/// `/`-separated segments of anything but NUL.
static PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:/|\.\.?/)(?:[^/\x00]+/?)*$").unwrap());

/// Result of classifying a raw module identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModuleId {
    /// Identifier with an explicit or inferred protocol (`http://x/y`,
    /// `file:///a/b`)
    Qualified {
        /// Protocol name selecting the loader
        protocol: String,
        /// Everything after `scheme://`, including a leading slash if present
        id: String,
    },
    /// Identifier that matched neither shape, passed through verbatim
    /// (bare package-style names)
    Bare(String),
}

impl ModuleId {
    /// Protocol name, or `None` for bare identifiers
    pub fn protocol(&self) -> Option<&str> {
        match self {
            Self::Qualified { protocol, .. } => Some(protocol),
            Self::Bare(_) => None,
        }
    }

    /// Identifier within the protocol's namespace (the raw string for bare
    /// identifiers)
    pub fn id(&self) -> &str {
        match self {
            Self::Qualified { id, .. } => id,
            Self::Bare(id) => id,
        }
    }

    /// Collapse dot segments in a qualified identifier.
    ///
    /// `.` segments drop, `..` pops (saturating at the root), empty segments
    /// collapse. Identifiers beginning with `/`, `./`, or `../` normalize to
    /// an absolute, `/`-prefixed form; everything else stays relative. Bare
    /// identifiers are returned untouched.
    pub fn normalize(self) -> Self {
        match self {
            Self::Qualified { protocol, id } => Self::Qualified {
                protocol,
                id: normalize_segments(&id),
            },
            bare => bare,
        }
    }

    /// Render the canonical identifier used for cache keys and diagnostics
    pub fn canonical(&self) -> String {
        match self {
            Self::Qualified { protocol, id } => format!("{protocol}://{id}"),
            Self::Bare(id) => id.clone(),
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Classify a raw module identifier.
///
/// Rules are tried in order, and the order is part of the contract:
///
/// 1. Explicit scheme form (`scheme://segments`).
/// 2. Local-path form (leading `/`, `./`, or `../`): the string is rewritten
///    as `file://{raw}` and re-run through the scheme pattern, so the result
///    carries `protocol = "file"` and the path verbatim.
///
/// Anything matching neither rule comes back as [`ModuleId::Bare`],
/// including a path-form string whose rewrite fails the scheme grammar,
/// such as `./weird://thing`. Classification is total: it never fails, and
/// any resolution failure is deferred to the registry lookup.
pub fn classify(raw: &str) -> ModuleId {
    if let Some(caps) = SCHEME_RE.captures(raw) {
        return ModuleId::Qualified {
            protocol: caps[1].to_string(),
            id: caps[2].to_string(),
        };
    }

    if PATH_RE.is_match(raw) {
        let prefixed = format!("file://{raw}");
        if let Some(caps) = SCHEME_RE.captures(&prefixed) {
            return ModuleId::Qualified {
                protocol: caps[1].to_string(),
                id: caps[2].to_string(),
            };
        }
    }

    ModuleId::Bare(raw.to_string())
}

fn normalize_segments(id: &str) -> String {
    let absolute = id.starts_with('/') || id.starts_with("./") || id.starts_with("../");

    let mut kept: Vec<&str> = Vec::new();
    for segment in id.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                kept.pop();
            }
            segment => kept.push(segment),
        }
    }

    if absolute {
        format!("/{}", kept.join("/"))
    } else {
        kept.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_form_round_trip() {
        assert_eq!(
            classify("http://example.com/lib.js"),
            ModuleId::Qualified {
                protocol: "http".to_string(),
                id: "example.com/lib.js".to_string(),
            }
        );

        // A leading slash in the path portion is preserved exactly
        assert_eq!(
            classify("wss:///socket"),
            ModuleId::Qualified {
                protocol: "wss".to_string(),
                id: "/socket".to_string(),
            }
        );
    }

    #[test]
    fn test_path_forms_get_file_protocol() {
        for (raw, id) in [
            ("./a/b", "./a/b"),
            ("../a/b", "../a/b"),
            ("/a/b", "/a/b"),
        ] {
            assert_eq!(
                classify(raw),
                ModuleId::Qualified {
                    protocol: "file".to_string(),
                    id: id.to_string(),
                },
                "classify({raw:?})"
            );
        }
    }

    #[test]
    fn test_path_form_equals_prefixed_reparse() {
        // The contract: a path form classifies exactly as its file://
        // rewrite does.
        assert_eq!(classify("./a/b"), classify("file://./a/b"));
        assert_eq!(classify("/a/b"), classify("file:///a/b"));
    }

    #[test]
    fn test_bare_passthrough() {
        assert_eq!(classify("lodash"), ModuleId::Bare("lodash".to_string()));
        assert_eq!(
            classify("@scope/pkg"),
            ModuleId::Bare("@scope/pkg".to_string())
        );
    }

    #[test]
    fn test_embedded_scheme_in_path_defers_to_registry() {
        // Matches the path rule, but the rewritten form fails the scheme
        // grammar, so it falls through to the opaque case instead of raising.
        assert_eq!(
            classify("./weird://thing"),
            ModuleId::Bare("./weird://thing".to_string())
        );
    }

    #[test]
    fn test_classification_is_total() {
        for raw in ["", "/", "a b", "exa_mple://x", "\u{0}", "C:\\temp", "../"] {
            // No panic, and every unrecognized shape is bare
            match classify(raw) {
                ModuleId::Bare(id) => assert_eq!(id, raw),
                other => panic!("expected bare for {raw:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_normalize_collapses_dot_segments() {
        for (raw, normalized) in [
            ("./a/b", "/a/b"),
            ("../x", "/x"),
            ("/a/../b", "/b"),
            ("/a/./b", "/a/b"),
            ("/..", "/"),
        ] {
            assert_eq!(
                classify(raw).normalize().id(),
                normalized,
                "normalize({raw:?})"
            );
        }

        // Relative scheme-form ids stay relative
        assert_eq!(
            classify("http://example.com/./lib.js").normalize().id(),
            "example.com/lib.js"
        );
    }

    #[test]
    fn test_canonical_rendering() {
        assert_eq!(
            classify("./greet.js").normalize().canonical(),
            "file:///greet.js"
        );
        assert_eq!(
            classify("/greet.js").normalize().canonical(),
            "file:///greet.js"
        );
        assert_eq!(classify("lodash").canonical(), "lodash");
    }
}
