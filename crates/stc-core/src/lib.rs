//! Static content resolution for STC.
//!
//! Pre-built static content lives in a public content root, one directory per
//! identifier inside a namespace bucket:
//!
//! ```text
//! <root>/<namespace>/<id>/[<subdirectory>/]index.html
//! <root>/<namespace>/<id>/stc.options.yml
//! ```
//!
//! This crate answers three questions for a [`ContentLocator`]:
//!
//! - Which entry point wins? [`PathResolver`] walks the fixed
//!   [`SubdirectoryTag::PRECEDENCE`] list and returns the first `index.html`.
//! - Does the item override anything? [`OverrideLoader`] reads the optional
//!   override document, degrading to an empty [`DirectoryOverride`] on errors.
//! - How should it be processed? [`select_processing_mode`] maps the winning
//!   subdirectory (or the override, or a mode the caller asked for) to a
//!   [`ProcessingMode`].
//!
//! Site-wide defaults are carried by an immutable [`GlobalSettings`] snapshot.
//!
//! # Example
//!
//! ```ignore
//! use stc_core::{ContentLocator, Namespace, PathResolver, OverrideLoader};
//! use stc_core::{GlobalSettings, select_processing_mode};
//!
//! let locator = ContentLocator::new(Namespace::Nodes, "42")?;
//! let resolver = PathResolver::new("public");
//! if let Some(file) = resolver.resolve(&locator) {
//!     let overrides = OverrideLoader::new("public").load(&locator);
//!     let settings = GlobalSettings::default();
//!     let mode = select_processing_mode(file.tag, &overrides, None, settings.default_processing);
//! }
//! ```

mod locator;
mod mode;
mod overrides;
mod resolver;
mod settings;
mod tag;

pub use locator::{ContentId, ContentLocator, LocatorError, Namespace};
pub use mode::{ParseEnumError, ProcessingMode, RenderMethod, parse_or_default, select_processing_mode};
pub use overrides::{DEFAULT_OVERRIDE_FILENAME, DirectoryOverride, OverrideLoader};
pub use resolver::{ENTRY_POINT, PathResolver, ResolvedFile, join_url};
pub use settings::GlobalSettings;
pub use tag::SubdirectoryTag;
