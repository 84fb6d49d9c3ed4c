//! Listing available content items.

use std::path::PathBuf;

use serde::Serialize;
use stc_core::{ContentId, ContentLocator, Namespace, OverrideLoader, PathResolver};

/// Custom setting used as an item's label.
const LABEL_SETTING: &str = "label";

/// One selectable content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub id: ContentId,
    pub label: String,
}

/// Lists the content items that exist in a namespace.
pub trait ContentCatalog: Send + Sync {
    /// Items in `namespace`, in display order.
    fn list_by_type(&self, namespace: Namespace) -> Vec<CatalogEntry>;
}

/// Catalog backed by the content root itself.
///
/// Every directory under `<root>/<namespace>/` that has a resolvable entry
/// point is an item. Labels come from the `label` custom setting, falling back
/// to `Static Content <id>`.
#[derive(Debug, Clone)]
pub struct FsCatalog {
    resolver: PathResolver,
    overrides: OverrideLoader,
}

impl FsCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            resolver: PathResolver::new(root.clone()),
            overrides: OverrideLoader::new(root),
        }
    }

    /// Use the same override loader as the dispatcher.
    #[must_use]
    pub fn with_override_loader(mut self, overrides: OverrideLoader) -> Self {
        self.overrides = overrides;
        self
    }

    fn entry(&self, locator: ContentLocator) -> Option<CatalogEntry> {
        self.resolver.resolve(&locator)?;
        let label = self
            .overrides
            .load(&locator)
            .custom_str(LABEL_SETTING)
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| format!("Static Content {}", locator.id));
        Some(CatalogEntry {
            id: locator.id,
            label,
        })
    }
}

impl ContentCatalog for FsCatalog {
    fn list_by_type(&self, namespace: Namespace) -> Vec<CatalogEntry> {
        let dir = self.resolver.root().join(namespace.dir_name());
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "Failed to list namespace directory");
                return Vec::new();
            }
        };

        let mut items: Vec<CatalogEntry> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter_map(|name| ContentLocator::new(namespace, name).ok())
            .filter_map(|locator| self.entry(locator))
            .collect();

        items.sort_by(|a, b| id_order(&a.id).cmp(&id_order(&b.id)));
        items
    }
}

/// Numeric ids first in numeric order, then the rest alphabetically.
fn id_order(id: &ContentId) -> (bool, u64, &str) {
    match id.as_str().parse::<u64>() {
        Ok(n) => (false, n, id.as_str()),
        Err(_) => (true, 0, id.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn ids(entries: &[CatalogEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_list_sorted_and_filtered() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "static-content-blocks/10/index.html", "");
        write(temp.path(), "static-content-blocks/9/dist/index.html", "");
        write(temp.path(), "static-content-blocks/hero/src/index.html", "");
        // No entry point: not listed.
        fs::create_dir_all(temp.path().join("static-content-blocks/empty/assets")).unwrap();
        // Plain file at the namespace level: not listed.
        write(temp.path(), "static-content-blocks/README.md", "");

        let entries = FsCatalog::new(temp.path()).list_by_type(Namespace::Blocks);

        assert_eq!(ids(&entries), vec!["9", "10", "hero"]);
    }

    #[test]
    fn test_labels() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "static-content-pages/1/index.html", "");
        write(
            temp.path(),
            "static-content-pages/1/stc.options.yml",
            "custom_settings:\n  label: Landing page\n",
        );
        write(temp.path(), "static-content-pages/2/index.html", "");

        let entries = FsCatalog::new(temp.path()).list_by_type(Namespace::Pages);

        assert_eq!(entries[0].label, "Landing page");
        assert_eq!(entries[1].label, "Static Content 2");
    }

    #[test]
    fn test_missing_namespace_directory() {
        let temp = tempfile::tempdir().unwrap();
        assert!(
            FsCatalog::new(temp.path())
                .list_by_type(Namespace::Sdc)
                .is_empty()
        );
    }
}
