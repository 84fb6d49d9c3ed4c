//! Isolated-frame references.
//!
//! The iframe strategy never opens the document. It only turns the resolved
//! entry point into a public URL that the host page loads in an `<iframe>`.

use serde::Serialize;
use stc_core::ResolvedFile;

use crate::markup::escape_html;

/// Frame height used when the item does not configure one.
pub const DEFAULT_IFRAME_HEIGHT: &str = "600px";

/// Public URL of a document to be embedded in an isolating frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IframeReference {
    pub url: String,
}

impl IframeReference {
    /// Build the reference for a resolved entry point.
    #[must_use]
    pub fn for_resolved(file: &ResolvedFile, base_url: &str) -> Self {
        Self {
            url: file.public_url(base_url),
        }
    }

    /// `<iframe>` element loading the document at full width.
    #[must_use]
    pub fn element(&self, height: Option<&str>) -> String {
        let height = height
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .unwrap_or(DEFAULT_IFRAME_HEIGHT);
        format!(
            r#"<iframe src="{}" width="100%" height="{}" frameborder="0"></iframe>"#,
            escape_html(&self.url),
            escape_html(height)
        )
    }
}
