//! Catalog API endpoint.
//!
//! Lists the content items available in a namespace.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;
use stc_core::Namespace;
use stc_render::{CatalogEntry, ContentCatalog};

use crate::error::ServerError;
use crate::state::AppState;

/// Response for GET /api/catalog/{namespace}.
#[derive(Serialize)]
pub(crate) struct CatalogResponse {
    namespace: Namespace,
    items: Vec<CatalogEntry>,
}

/// Handle GET /api/catalog/{namespace}.
pub(crate) async fn get_catalog(
    Path(namespace): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<CatalogResponse>, ServerError> {
    let namespace: Namespace = namespace.parse()?;
    let items = state.catalog.list_by_type(namespace);
    Ok(Json(CatalogResponse { namespace, items }))
}

#[cfg(test)]
mod tests {
    use stc_core::ContentId;

    use super::*;

    #[test]
    fn test_catalog_response_serialization() {
        let response = CatalogResponse {
            namespace: Namespace::Blocks,
            items: vec![CatalogEntry {
                id: ContentId::new("7").unwrap(),
                label: "Hero".to_owned(),
            }],
        };

        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["namespace"], "static-content-blocks");
        assert_eq!(json["items"][0]["id"], "7");
        assert_eq!(json["items"][0]["label"], "Hero");
    }
}
