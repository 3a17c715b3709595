//! Router fallback: registered redirects, blocked pages, legacy URLs and
//! page lookup
//!
//! Order: an explicitly registered redirect answers before the navigation
//! tree is consulted. A page declared with `block_url`, or a URL that
//! belongs to a handler whose config gate is closed, answers 404 with the
//! configured not-found page. Redirects declared on handlers come next, and
//! any other known page URL returns the page as JSON.

use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use pageinfo_common::model::normalize_lookup_url;
use pageinfo_common::redirect::redirect_target;
use pageinfo_common::CacheEntry;
use serde_json::json;
use tracing::debug;

use super::error::ApiError;
use super::locale::RequestLocale;
use super::pages::page_response;
use crate::AppState;

/// Fallback for every path without an explicit route
pub async fn resolve_url(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    uri: Uri,
) -> Result<Response, ApiError> {
    let path = uri.path();

    if let Some(target) = state.redirects.map_redirect(path) {
        debug!("Registered redirect {} -> {}", path, target);
        return Ok(moved_permanently(target));
    }

    let entry = state.cache.get_or_empty(&locale);
    let page = entry
        .find_by_url(path)
        .or_else(|| entry.find_by_alternate_url(path));

    if let Some(node) = page.filter(|n| n.record().block_url) {
        debug!("Blocked direct request for {} ({})", path, node.key());
        return Ok(not_found_page(&state, &entry, path, locale));
    }
    if page.is_none() && entry.is_gated(path) {
        debug!("Config gate closed for {}", path);
        return Ok(not_found_page(&state, &entry, path, locale));
    }

    if let Some(target) = declared_redirect(&entry, path) {
        debug!("Permanent redirect {} -> {}", path, target);
        return Ok(moved_permanently(target));
    }

    match page {
        Some(node) => Ok(Json(page_response(&entry, node, locale)).into_response()),
        None => Err(ApiError::PageNotFound(path.to_string())),
    }
}

/// Redirect declared on a handler of the tree
fn declared_redirect(entry: &CacheEntry, path: &str) -> Option<String> {
    let source = normalize_lookup_url(path)?;
    let target = entry.permanent_redirects().get(&source)?;
    redirect_target(&source, target)
}

/// 301 with `Location: target`
fn moved_permanently(target: String) -> Response {
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, target)]).into_response()
}

/// 404 carrying the configured not-found page, when there is one
fn not_found_page(state: &AppState, entry: &CacheEntry, path: &str, locale: String) -> Response {
    let not_found = state
        .config
        .not_found_route
        .as_ref()
        .and_then(|route| entry.find_by_handler(&route.action, &route.controller));

    let body = match not_found {
        Some(node) => json!({
            "error": format!("Page not found: {}", path),
            "page": page_response(entry, node, locale),
        }),
        None => json!({
            "error": format!("Page not found: {}", path),
        }),
    };

    (StatusCode::NOT_FOUND, Json(body)).into_response()
}
