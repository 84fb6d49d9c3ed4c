//! Render errors.

use std::path::PathBuf;

use stc_core::ContentLocator;

/// Error returned when content cannot be rendered.
///
/// Adapters turn both variants into a visible placeholder; neither is fatal
/// to the host page.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// No entry point exists at any precedence level.
    #[error("Static content not found: {0}")]
    NotFound(ContentLocator),
    /// The entry point was resolved but could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RenderError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
