//! pageinfo-web library - navigation service
//!
//! Hosts the navigation engine behind a JSON API and resolves legacy and
//! blocked URLs in the router fallback.

use std::sync::Arc;

use axum::Router;
use pageinfo_common::config::EngineConfig;
use pageinfo_common::redirect::RedirectRegistry;
use pageinfo_common::PageInfoCache;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Per-locale navigation trees
    pub cache: Arc<PageInfoCache>,
    /// Redirects registered on top of the handler-declared ones
    pub redirects: Arc<RedirectRegistry>,
    pub config: Arc<EngineConfig>,
}

impl AppState {
    /// Create new application state
    pub fn new(cache: PageInfoCache, redirects: RedirectRegistry, config: EngineConfig) -> Self {
        Self {
            cache: Arc::new(cache),
            redirects: Arc::new(redirects),
            config: Arc::new(config),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let api = Router::new()
        .route("/api/tree", get(api::get_tree))
        .route("/api/menu", get(api::get_menu))
        .route("/api/breadcrumbs", get(api::get_breadcrumbs))
        .route("/api/meta", get(api::get_meta))
        .route("/api/related", get(api::get_related))
        .route("/api/home", get(api::get_home_page))
        .route("/api/page", get(api::get_page))
        .route("/api/routes", get(api::get_routes))
        .route("/api/sitemap", get(api::get_sitemap))
        .route("/api/cache/reset", post(api::reset_cache));

    Router::new()
        .merge(api)
        .merge(api::health_routes())
        .fallback(api::resolve_url)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
