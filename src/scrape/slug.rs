// src/scrape/slug.rs
// =============================================================================
// Repository slugs: the "owner/name" pair that identifies a repository.
//
// On the trending page every entry links to "/<owner>/<name>". Anything else
// (absolute URLs, deeper paths, a missing segment) is not a slug.
// =============================================================================

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static RE_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/([^/]+)/([^/]+)$").expect("valid slug regex"));

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositorySlug {
    pub owner: String,
    pub name: String,
}

impl RepositorySlug {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse a relative link of the form `/owner/name`.
    ///
    /// Surrounding whitespace is ignored; everything else must match exactly.
    ///
    /// Example:
    ///   "/rust-lang/rust" -> Some(owner: "rust-lang", name: "rust")
    ///   "/rust-lang/rust/issues" -> None
    pub fn from_href(href: &str) -> Option<Self> {
        let caps = RE_HREF.captures(href.trim())?;
        Some(Self::new(&caps[1], &caps[2]))
    }

    /// The site-relative path this slug was parsed from
    pub fn path(&self) -> String {
        format!("/{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepositorySlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
