//! Route table, sitemap and cache maintenance endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use pageinfo_common::routes::RouteEntry;
use pageinfo_common::sitemap::SiteMapItem;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::locale::RequestLocale;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct RoutesResponse {
    pub locale: String,
    pub routes: Vec<RouteEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SitemapQuery {
    /// Overrides the configured sitemap debug mode
    pub debug: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct SitemapResponse {
    pub locale: String,
    pub debug: bool,
    pub items: Vec<SiteMapItem>,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub status: String,
    /// Locales dropped from the cache
    pub cleared: Vec<String>,
}

/// GET /api/routes
///
/// Parents precede their children; hosts register them in this order.
pub async fn get_routes(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
) -> Json<RoutesResponse> {
    let entry = state.cache.get_or_empty(&locale);

    Json(RoutesResponse {
        routes: entry.routes().to_vec(),
        locale,
    })
}

/// GET /api/sitemap?debug=true
pub async fn get_sitemap(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Query(query): Query<SitemapQuery>,
) -> Json<SitemapResponse> {
    let debug = query.debug.unwrap_or(state.config.sitemap.debug);
    let entry = state.cache.get_or_empty(&locale);

    Json(SitemapResponse {
        items: entry.site_map_items(debug).to_vec(),
        debug,
        locale,
    })
}

/// POST /api/cache/reset
pub async fn reset_cache(State(state): State<AppState>) -> Json<ResetResponse> {
    let cleared = state.cache.locales();
    state.cache.reset();
    info!("Navigation cache reset via API");

    Json(ResetResponse {
        status: "ok".to_string(),
        cleared,
    })
}
