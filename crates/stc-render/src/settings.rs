//! Access to the site-wide settings snapshot.

use std::sync::Arc;

use stc_core::GlobalSettings;

/// Source of [`GlobalSettings`] snapshots.
///
/// Callers take one snapshot per request and pass it down; a store that
/// changes its settings only affects requests started afterwards.
pub trait SettingsStore: Send + Sync {
    /// Current settings.
    fn snapshot(&self) -> Arc<GlobalSettings>;
}

/// Store serving one fixed snapshot, e.g. loaded from a config file at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticSettings {
    settings: Arc<GlobalSettings>,
}

impl StaticSettings {
    #[must_use]
    pub fn new(settings: GlobalSettings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }
}

impl SettingsStore for StaticSettings {
    fn snapshot(&self) -> Arc<GlobalSettings> {
        Arc::clone(&self.settings)
    }
}

#[cfg(test)]
mod tests {
    use stc_core::RenderMethod;

    use super::*;

    #[test]
    fn test_static_settings_snapshot_is_shared() {
        let store = StaticSettings::new(GlobalSettings {
            render_method: RenderMethod::Iframe,
            ..GlobalSettings::default()
        });

        let a = store.snapshot();
        let b = store.snapshot();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.render_method, RenderMethod::Iframe);
    }
}
