//! Render dispatch for STC.
//!
//! This crate ties resolution ([`stc_core`]) and transformation
//! ([`stc_transform`]) together:
//!
//! - [`RenderDispatcher`]: picks the render method for a locator and produces
//!   a [`RenderResult`] or a [`RenderError`]
//! - [`EmbedAdapter`]: turns results into host-page markup, with visible
//!   placeholders for failures
//! - [`SettingsStore`] / [`StaticSettings`]: per-request settings snapshots
//! - [`ContentCatalog`] / [`FsCatalog`]: listing the items of a namespace
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use stc_core::{ContentLocator, GlobalSettings, Namespace};
//! use stc_render::{EmbedAdapter, RenderDispatcher, RendererAdapter, StaticSettings};
//!
//! let dispatcher = Arc::new(RenderDispatcher::new("public", "https://example.com/files"));
//! let adapter = EmbedAdapter::new(dispatcher, Arc::new(StaticSettings::new(GlobalSettings::default())));
//!
//! let locator = ContentLocator::new(Namespace::Blocks, "hero")?;
//! let html = adapter.render(&locator).into_html();
//! ```

mod adapter;
mod catalog;
mod dispatcher;
mod error;
mod settings;

pub use adapter::{
    EmbedAdapter, Embeddable, RendererAdapter, error_placeholder, not_found_placeholder,
    wrap_content,
};
pub use catalog::{CatalogEntry, ContentCatalog, FsCatalog};
pub use dispatcher::{
    IframeContent, RenderDispatcher, RenderPlan, RenderResult, RenderedContent, TemplateContext,
};
pub use error::RenderError;
pub use settings::{SettingsStore, StaticSettings};
