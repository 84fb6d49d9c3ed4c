//! Per-item override documents (`stc.options.yml`).
//!
//! An override document lives next to the content subdirectories:
//!
//! ```yaml
//! render_method: iframe      # php | twig | iframe (or canonical names)
//! processing_type: raw       # raw | proxied | hardened
//! custom_settings:
//!   iframe_height: 800px
//! ```
//!
//! Loading never fails: a missing file means "inherit everything", and a
//! malformed file is logged and treated the same way.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::locator::ContentLocator;
use crate::mode::{ParseEnumError, ProcessingMode, RenderMethod};

/// Default override document file name.
pub const DEFAULT_OVERRIDE_FILENAME: &str = "stc.options.yml";

/// Per-item overrides. `None` fields inherit from global settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DirectoryOverride {
    pub render_method: Option<RenderMethod>,
    pub processing_type: Option<ProcessingMode>,
    /// Opaque settings for downstream consumers.
    pub custom_settings: HashMap<String, serde_json::Value>,
}

impl DirectoryOverride {
    /// True if nothing is overridden.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.render_method.is_none()
            && self.processing_type.is_none()
            && self.custom_settings.is_empty()
    }

    /// String value of a custom setting, if present and a string or number.
    #[must_use]
    pub fn custom_str(&self, key: &str) -> Option<String> {
        match self.custom_settings.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Override document as written on disk.
#[derive(Deserialize, Default)]
#[serde(default)]
struct OverrideDocument {
    render_method: Option<String>,
    processing_type: Option<String>,
    custom_settings: Option<HashMap<String, serde_json::Value>>,
}

/// Reads override documents from a content root.
#[derive(Debug, Clone)]
pub struct OverrideLoader {
    root: PathBuf,
    filename: String,
}

impl OverrideLoader {
    /// Create a loader using [`DEFAULT_OVERRIDE_FILENAME`].
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_filename(root, DEFAULT_OVERRIDE_FILENAME)
    }

    /// Create a loader with a custom override file name.
    pub fn with_filename(root: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            filename: filename.into(),
        }
    }

    /// Path of the override document for a locator.
    #[must_use]
    pub fn path_for(&self, locator: &ContentLocator) -> PathBuf {
        locator.dir_under(&self.root).join(&self.filename)
    }

    /// Load overrides for a locator.
    ///
    /// Returns an empty override when the document is missing, unreadable,
    /// or malformed. Errors are logged, never returned.
    #[must_use]
    pub fn load(&self, locator: &ContentLocator) -> DirectoryOverride {
        let path = self.path_for(locator);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return DirectoryOverride::default();
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to read override document");
                return DirectoryOverride::default();
            }
        };

        match parse_override(&content, &path) {
            Ok(overrides) => {
                tracing::debug!(%locator, ?overrides, "Loaded override document");
                overrides
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Error parsing override document");
                DirectoryOverride::default()
            }
        }
    }
}

/// Parse an override document.
///
/// Empty documents yield an empty override. Unsupported enum values are
/// logged and ignored so the field inherits.
fn parse_override(content: &str, path: &Path) -> Result<DirectoryOverride, serde_yaml::Error> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Ok(DirectoryOverride::default());
    }

    let doc: OverrideDocument = serde_yaml::from_str(trimmed)?;
    Ok(DirectoryOverride {
        render_method: parse_field("render_method", doc.render_method.as_deref(), path),
        processing_type: parse_field("processing_type", doc.processing_type.as_deref(), path),
        custom_settings: doc.custom_settings.unwrap_or_default(),
    })
}

fn parse_field<T>(field: &str, value: Option<&str>, path: &Path) -> Option<T>
where
    T: std::str::FromStr<Err = ParseEnumError>,
{
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(path = %path.display(), field, value, "{e}, inheriting");
            None
        }
    }
}
