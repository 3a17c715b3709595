//! Single-page endpoints: metadata, related pages and URL lookup

use axum::{
    extract::{Query, State},
    Json,
};
use pageinfo_common::query::{context_info, MetaData};
use pageinfo_common::RelatedLink;
use serde::{Deserialize, Serialize};

use super::error::{required, ApiError};
use super::locale::RequestLocale;
use super::navigation::HandlerQuery;
use super::views::{pages, PageView};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MetaResponse {
    #[serde(flatten)]
    pub meta: MetaData,
    /// Value for `<meta name="robots">`
    pub robots: String,
}

#[derive(Debug, Deserialize)]
pub struct KeyQuery {
    pub key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UrlQuery {
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RelatedResponse {
    pub key: String,
    pub related: Vec<RelatedLink>,
}

/// A page with its metadata and breadcrumb trail
#[derive(Debug, Serialize)]
pub struct PageResponse {
    pub locale: String,
    pub page: PageView,
    pub meta: MetaResponse,
    pub breadcrumbs: Vec<PageView>,
}

fn meta_response(meta: MetaData) -> MetaResponse {
    MetaResponse {
        robots: meta.robots(),
        meta,
    }
}

/// GET /api/meta?action=Index&controller=Home
///
/// Unknown handlers yield empty metadata, not an error.
pub async fn get_meta(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Query(query): Query<HandlerQuery>,
) -> Result<Json<MetaResponse>, ApiError> {
    let action = required(&query.action, "action")?;
    let controller = required(&query.controller, "controller")?;
    let entry = state.cache.get_or_empty(&locale);

    Ok(Json(meta_response(entry.meta_data(action, controller))))
}

/// GET /api/related?key=products
pub async fn get_related(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Query(query): Query<KeyQuery>,
) -> Result<Json<RelatedResponse>, ApiError> {
    let key = required(&query.key, "key")?;
    let entry = state.cache.get_or_empty(&locale);
    let node = entry
        .find_by_key(key)
        .ok_or_else(|| ApiError::PageNotFound(format!("key '{}'", key)))?;

    Ok(Json(RelatedResponse {
        key: node.key().to_string(),
        related: entry.related_pages(node.id(), &[]),
    }))
}

/// GET /api/page?url=/products/
///
/// Looks the URL up as a page URL first, then as an alternate URL.
pub async fn get_page(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Query(query): Query<UrlQuery>,
) -> Result<Json<PageResponse>, ApiError> {
    let url = required(&query.url, "url")?;
    let entry = state.cache.get_or_empty(&locale);
    let node = entry
        .find_by_url(url)
        .or_else(|| entry.find_by_alternate_url(url))
        .ok_or_else(|| ApiError::PageNotFound(url.to_string()))?;

    Ok(Json(page_response(&entry, node, locale)))
}

/// Page, metadata and breadcrumbs of `node`
pub fn page_response(
    entry: &pageinfo_common::CacheEntry,
    node: &pageinfo_common::Node,
    locale: String,
) -> PageResponse {
    let handler = &node.record().handler;
    let context = context_info(entry.tree(), &handler.action, &handler.controller);

    PageResponse {
        locale,
        page: PageView::from(node),
        meta: meta_response(context.meta),
        breadcrumbs: pages(entry.breadcrumbs(&handler.action, &handler.controller)),
    }
}
