//! Content locators: the `(namespace, id)` pair naming a content directory.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

/// Error building a [`ContentLocator`].
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum LocatorError {
    /// Identifier is empty or would escape its namespace directory.
    #[error("Invalid content id: {0:?}")]
    InvalidId(String),
    /// Namespace is not one of the known content buckets.
    #[error("Unknown content namespace: {0:?}")]
    UnknownNamespace(String),
}

/// Logical content bucket under the public content root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "&'static str")]
pub enum Namespace {
    /// `static-content-nodes`
    Nodes,
    /// `static-content-blocks`
    Blocks,
    /// `static-content-paragraphs`
    Paragraphs,
    /// `static-content-sdc` (single directory components)
    Sdc,
    /// `static-content-twig`
    Twig,
    /// `static-content-pages`
    Pages,
}

impl Namespace {
    /// All namespaces, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Nodes,
        Self::Blocks,
        Self::Paragraphs,
        Self::Sdc,
        Self::Twig,
        Self::Pages,
    ];

    /// Directory name under the content root.
    #[must_use]
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Nodes => "static-content-nodes",
            Self::Blocks => "static-content-blocks",
            Self::Paragraphs => "static-content-paragraphs",
            Self::Sdc => "static-content-sdc",
            Self::Twig => "static-content-twig",
            Self::Pages => "static-content-pages",
        }
    }

    /// Short name without the `static-content-` prefix.
    #[must_use]
    pub fn short_name(self) -> &'static str {
        &self.dir_name()["static-content-".len()..]
    }
}

impl From<Namespace> for &'static str {
    fn from(ns: Namespace) -> Self {
        ns.dir_name()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for Namespace {
    type Err = LocatorError;

    /// Accepts either the directory name (`static-content-blocks`) or the
    /// short name (`blocks`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|ns| ns.dir_name() == s || ns.short_name() == s)
            .ok_or_else(|| LocatorError::UnknownNamespace(s.to_owned()))
    }
}

/// Opaque content identifier.
///
/// Any non-empty string that is usable as a single path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    /// Validate and wrap an identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, LocatorError> {
        let id = id.into();
        let valid = !id.is_empty()
            && id != "."
            && id != ".."
            && !id.contains(['/', '\\', '\0'])
            && id.trim() == id;
        if valid {
            Ok(Self(id))
        } else {
            Err(LocatorError::InvalidId(id))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for ContentId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where to look for a piece of static content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ContentLocator {
    pub namespace: Namespace,
    pub id: ContentId,
}

impl ContentLocator {
    /// Build a locator, validating the identifier.
    pub fn new(namespace: Namespace, id: impl Into<String>) -> Result<Self, LocatorError> {
        Ok(Self {
            namespace,
            id: ContentId::new(id)?,
        })
    }

    /// Build a locator from its string parts (CLI arguments, URL segments).
    pub fn parse(namespace: &str, id: &str) -> Result<Self, LocatorError> {
        Self::new(namespace.parse()?, id)
    }

    /// Content directory relative to the root, as a URL path (`ns/id`).
    #[must_use]
    pub fn relative_dir(&self) -> String {
        format!("{}/{}", self.namespace.dir_name(), self.id)
    }

    /// Content directory under `root`.
    #[must_use]
    pub fn dir_under(&self, root: &Path) -> PathBuf {
        root.join(self.namespace.dir_name()).join(self.id.as_str())
    }
}

impl fmt::Display for ContentLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.id)
    }
}
