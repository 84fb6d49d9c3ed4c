//! Subdirectory tags and their precedence.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::mode::ParseEnumError;

/// Subdirectory an entry point was found in.
///
/// `Root` stands for the content directory itself (no subdirectory).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubdirectoryTag {
    Dist,
    Build,
    Raw,
    Proxied,
    Hardened,
    Src,
    Root,
}

impl SubdirectoryTag {
    /// Search order for entry points. The first match wins.
    pub const PRECEDENCE: [Self; 7] = [
        Self::Dist,
        Self::Build,
        Self::Raw,
        Self::Proxied,
        Self::Hardened,
        Self::Src,
        Self::Root,
    ];

    /// Path segment for this tag (empty for `Root`).
    #[must_use]
    pub fn segment(self) -> &'static str {
        match self {
            Self::Dist => "dist",
            Self::Build => "build",
            Self::Raw => "raw",
            Self::Proxied => "proxied",
            Self::Hardened => "hardened",
            Self::Src => "src",
            Self::Root => "",
        }
    }

    /// Display name (`root` for the content directory itself).
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Root => "root",
            other => other.segment(),
        }
    }
}

impl fmt::Display for SubdirectoryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SubdirectoryTag {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::Root);
        }
        Self::PRECEDENCE
            .into_iter()
            .find(|tag| tag.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseEnumError::new("subdirectory", s))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_precedence_order() {
        let names: Vec<_> = SubdirectoryTag::PRECEDENCE
            .iter()
            .map(|t| t.segment())
            .collect();
        assert_eq!(
            names,
            ["dist", "build", "raw", "proxied", "hardened", "src", ""]
        );
    }

    #[test]
    fn test_root_display() {
        assert_eq!(SubdirectoryTag::Root.to_string(), "root");
        assert_eq!(SubdirectoryTag::Root.segment(), "");
    }

    #[test]
    fn test_parse() {
        assert_eq!("build".parse(), Ok(SubdirectoryTag::Build));
        assert_eq!("ROOT".parse(), Ok(SubdirectoryTag::Root));
        assert_eq!("".parse(), Ok(SubdirectoryTag::Root));
        assert!("public".parse::<SubdirectoryTag>().is_err());
    }
}
