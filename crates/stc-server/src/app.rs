//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use stc_config::FILES_ROUTE;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;

/// Create the application router.
///
/// # Arguments
///
/// * `state` - Shared application state
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route(
            "/api/content/{namespace}/{id}",
            get(handlers::content::get_content),
        )
        .route(
            "/api/catalog/{namespace}",
            get(handlers::catalog::get_catalog),
        );

    // Public content root, read-only
    let files = ServeDir::new(state.dispatcher.root());

    Router::new()
        .merge(api_routes)
        .route(
            "/content/{namespace}/{id}",
            get(handlers::content::get_content_page),
        )
        .nest_service(FILES_ROUTE, files)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security::csp_layer())
                .layer(security::content_type_options_layer())
                .layer(security::frame_options_layer()),
        )
        .with_state(state)
}
