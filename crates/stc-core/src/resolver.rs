//! Entry point resolution with subdirectory precedence.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::locator::ContentLocator;
use crate::tag::SubdirectoryTag;

/// File name of the entry-point document.
pub const ENTRY_POINT: &str = "index.html";

/// Entry point located by [`PathResolver`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedFile {
    /// Absolute filesystem path of the entry point.
    pub absolute_path: PathBuf,
    /// Subdirectory the entry point was found in.
    pub tag: SubdirectoryTag,
    /// URL path relative to the content root (`ns/id[/tag]/index.html`).
    pub relative_path: String,
}

impl ResolvedFile {
    /// URL path of the directory holding the entry point, with trailing slash.
    #[must_use]
    pub fn relative_dir(&self) -> &str {
        self.relative_path
            .strip_suffix(ENTRY_POINT)
            .unwrap_or(&self.relative_path)
    }

    /// Public URL of the entry point.
    #[must_use]
    pub fn public_url(&self, base_url: &str) -> String {
        join_url(base_url, &self.relative_path)
    }

    /// Public URL of the entry point's directory, with trailing slash.
    ///
    /// Relative references inside the document resolve against this URL.
    #[must_use]
    pub fn public_dir_url(&self, base_url: &str) -> String {
        join_url(base_url, self.relative_dir())
    }
}

/// Join a base URL and a relative URL path with exactly one slash.
#[must_use]
pub fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Finds the entry point for a locator under a content root.
///
/// Only existence of `index.html` is checked; directories are never listed
/// and nothing is written.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return the first entry point in precedence order, or `None`.
    #[must_use]
    pub fn resolve(&self, locator: &ContentLocator) -> Option<ResolvedFile> {
        let base = locator.dir_under(&self.root);
        tracing::debug!(path = %base.display(), "Searching for static content");

        for tag in SubdirectoryTag::PRECEDENCE {
            let dir = match tag.segment() {
                "" => base.clone(),
                segment => base.join(segment),
            };
            let candidate = dir.join(ENTRY_POINT);
            tracing::trace!(file = %candidate.display(), "Checking entry point");

            if candidate.is_file() {
                let relative_path = match tag.segment() {
                    "" => format!("{}/{ENTRY_POINT}", locator.relative_dir()),
                    segment => format!("{}/{segment}/{ENTRY_POINT}", locator.relative_dir()),
                };
                tracing::debug!(%locator, subdirectory = %tag, "Found entry point");
                return Some(ResolvedFile {
                    absolute_path: candidate,
                    tag,
                    relative_path,
                });
            }
        }

        tracing::debug!(%locator, "No entry point in any precedence directory");
        None
    }
}
