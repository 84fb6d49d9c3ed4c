//! Processing modes, render methods, and processing mode selection.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::overrides::DirectoryOverride;
use crate::tag::SubdirectoryTag;

/// Error parsing an enum value from configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported {kind}: {value:?}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// How located content is transformed before embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMode {
    /// Bytes are passed through untouched and trusted as markup.
    Raw,
    /// Relative references are rewritten to absolute public URLs.
    Proxied,
    /// Proxied, then script-executing constructs are removed.
    #[default]
    Hardened,
}

impl ProcessingMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Proxied => "proxied",
            Self::Hardened => "hardened",
        }
    }
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessingMode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(Self::Raw),
            "proxied" => Ok(Self::Proxied),
            "hardened" => Ok(Self::Hardened),
            _ => Err(ParseEnumError::new("processing type", s)),
        }
    }
}

/// Output shape produced for the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderMethod {
    /// Transformed markup, ready for direct embedding.
    #[default]
    DocumentArray,
    /// Resolution metadata for an external template renderer.
    TemplateInjected,
    /// Public URL of the entry point, for an isolating frame.
    Iframe,
}

impl RenderMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DocumentArray => "document-array",
            Self::TemplateInjected => "template-injected",
            Self::Iframe => "iframe",
        }
    }
}

impl fmt::Display for RenderMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderMethod {
    type Err = ParseEnumError;

    /// Accepts the canonical names plus the legacy `php` and `twig` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "document-array" | "document_array" | "php" => Ok(Self::DocumentArray),
            "template-injected" | "template_injected" | "twig" => Ok(Self::TemplateInjected),
            "iframe" => Ok(Self::Iframe),
            _ => Err(ParseEnumError::new("render method", s)),
        }
    }
}

/// Parse an optional configuration value, falling back to `default`.
///
/// Unrecognized values are logged with the field name and replaced by the
/// default; they never fail the caller.
pub fn parse_or_default<T>(field: &str, value: Option<&str>, default: T) -> T
where
    T: FromStr<Err = ParseEnumError> + fmt::Display + Copy,
{
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|e: ParseEnumError| {
            tracing::warn!(field, value = raw, fallback = %default, "{e}, using default");
            default
        }),
    }
}

/// Pick the processing mode for resolved content.
///
/// An override document always wins, then a mode requested by the caller
/// (e.g. an embedding template asking for `raw`). Otherwise the subdirectory
/// decides: `raw` is trusted, `proxied` and `src` only need path fixing,
/// bundled `dist`/`build` output follows `bundled_default`, and everything
/// else is hardened.
#[must_use]
pub fn select_processing_mode(
    tag: SubdirectoryTag,
    overrides: &DirectoryOverride,
    requested: Option<ProcessingMode>,
    bundled_default: ProcessingMode,
) -> ProcessingMode {
    if let Some(mode) = overrides.processing_type.or(requested) {
        return mode;
    }
    match tag {
        SubdirectoryTag::Raw => ProcessingMode::Raw,
        SubdirectoryTag::Proxied | SubdirectoryTag::Src => ProcessingMode::Proxied,
        SubdirectoryTag::Dist | SubdirectoryTag::Build => bundled_default,
        SubdirectoryTag::Hardened | SubdirectoryTag::Root => ProcessingMode::Hardened,
    }
}
