//! Site-wide render settings.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::locator::Namespace;
use crate::mode::{ProcessingMode, RenderMethod};

/// Immutable snapshot of site-wide defaults.
///
/// Loaded from an external configuration store and passed explicitly to each
/// render call. Changes are only observed by requests that start after a new
/// snapshot was taken.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GlobalSettings {
    /// Render method when neither an override nor a namespace default applies.
    pub render_method: RenderMethod,
    /// Processing mode for bundled (`dist`/`build`) content.
    pub default_processing: ProcessingMode,
    /// Render method defaults per namespace.
    pub namespace_render_methods: BTreeMap<Namespace, RenderMethod>,
}

impl GlobalSettings {
    /// Render method for a namespace before per-item overrides are applied.
    #[must_use]
    pub fn render_method_for(&self, namespace: Namespace) -> RenderMethod {
        self.namespace_render_methods
            .get(&namespace)
            .copied()
            .unwrap_or(self.render_method)
    }
}
