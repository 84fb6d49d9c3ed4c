//! Content endpoints.
//!
//! `/content/{namespace}/{id}` serves a full HTML page embedding the render
//! result. `/api/content/{namespace}/{id}` describes the same result as JSON.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use md5::{Digest, Md5};
use serde::Serialize;
use stc_core::{
    ContentId, ContentLocator, Namespace, ProcessingMode, RenderMethod, SubdirectoryTag,
};
use stc_render::{RenderResult, error_placeholder};
use stc_transform::escape_html;

use crate::error::ServerError;
use crate::state::AppState;

/// Custom setting used as the page title.
const LABEL_SETTING: &str = "label";

/// Response for GET /api/content/{namespace}/{id}.
#[derive(Serialize)]
struct ContentResponse {
    namespace: Namespace,
    id: ContentId,
    render_method: RenderMethod,
    /// Subdirectory the entry point was found in.
    subdirectory: SubdirectoryTag,
    /// Absent for iframe results.
    #[serde(skip_serializing_if = "Option::is_none")]
    processing_mode: Option<ProcessingMode>,
    /// Public URL of the entry point.
    public_url: String,
    /// Transformed markup, only for document results.
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    /// Sorted so the body, and with it the `ETag`, is stable.
    custom_settings: BTreeMap<String, serde_json::Value>,
}

/// Handle GET /content/{namespace}/{id}.
pub(crate) async fn get_content_page(
    Path((namespace, id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ServerError> {
    let locator = ContentLocator::parse(&namespace, &id)?;
    let settings = state.settings.snapshot();

    let rendered = state
        .dispatcher
        .render(&locator, &settings)
        .and_then(|result| Ok((page_title(&result), state.adapter.embed(&result)?)));

    let (status, title, body) = match rendered {
        Ok((title, html)) => (StatusCode::OK, title, html),
        Err(e) => {
            let status = if e.is_not_found() {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, default_title(&locator), error_placeholder(&locator, &e))
        }
    };

    Ok((status, Html(page(&title, &body))).into_response())
}

/// Handle GET /api/content/{namespace}/{id}.
pub(crate) async fn get_content(
    Path((namespace, id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let locator = ContentLocator::parse(&namespace, &id)?;
    let settings = state.settings.snapshot();

    let plan = state.dispatcher.plan(&locator, &settings)?;
    let public_url = plan.resolved.public_url(state.dispatcher.base_url());
    let result = state.dispatcher.execute(plan)?;

    let response = content_response(result, public_url);
    let body = serde_json::to_string(&response)?;

    let etag = compute_etag(&state.version, &body);
    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == etag.as_bytes()
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_owned()),
            (header::ETAG, etag),
            (header::CACHE_CONTROL, "private, max-age=60".to_owned()),
        ],
        body,
    )
        .into_response())
}

fn content_response(result: RenderResult, public_url: String) -> ContentResponse {
    let render_method = result.render_method();
    let subdirectory = result.subdirectory();
    let processing_mode = result.processing_mode();
    let (locator, content, custom_settings) = match result {
        RenderResult::DocumentArray(c) => (c.locator, Some(c.markup), c.custom_settings),
        RenderResult::TemplateInjected(c) => (c.locator, None, c.custom_settings),
        RenderResult::Iframe(c) => (c.locator, None, c.custom_settings),
    };

    ContentResponse {
        namespace: locator.namespace,
        id: locator.id,
        render_method,
        subdirectory,
        processing_mode,
        public_url,
        content,
        custom_settings: custom_settings.into_iter().collect(),
    }
}

fn page_title(result: &RenderResult) -> String {
    let custom_settings = match result {
        RenderResult::DocumentArray(c) => &c.custom_settings,
        RenderResult::TemplateInjected(c) => &c.custom_settings,
        RenderResult::Iframe(c) => &c.custom_settings,
    };
    custom_settings
        .get(LABEL_SETTING)
        .and_then(serde_json::Value::as_str)
        .filter(|label| !label.trim().is_empty())
        .map_or_else(|| default_title(result.locator()), str::to_owned)
}

fn default_title(locator: &ContentLocator) -> String {
    format!("Static Content {}", locator.id)
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        escape_html(title)
    )
}

/// Compute `ETag` from version and content.
///
/// Uses MD5 hash truncated to 64 bits (16 hex chars).
fn compute_etag(version: &str, content: &str) -> String {
    let hash = Md5::digest(format!("{version}:{content}").as_bytes());
    format!("\"{}\"", &hex::encode(hash)[..16])
}
