//! Tree, menu, breadcrumb and home page endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::error::{required, ApiError};
use super::locale::RequestLocale;
use super::views::{pages, PageView, TreeView};
use crate::AppState;

/// Navigation tree of one locale
#[derive(Debug, Serialize)]
pub struct TreeResponse {
    pub locale: String,
    pub pages: Vec<TreeView>,
}

/// Flat list of pages for one locale
#[derive(Debug, Serialize)]
pub struct PageListResponse {
    pub locale: String,
    pub pages: Vec<PageView>,
}

#[derive(Debug, Deserialize)]
pub struct MenuQuery {
    /// Comma separated roles held by the caller
    pub roles: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HandlerQuery {
    pub action: Option<String>,
    pub controller: Option<String>,
}

/// GET /api/tree
pub async fn get_tree(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
) -> Json<TreeResponse> {
    let entry = state.cache.get_or_empty(&locale);
    let tree = entry.tree();

    Json(TreeResponse {
        pages: entry
            .top_level()
            .into_iter()
            .map(|node| TreeView::build(tree, node))
            .collect(),
        locale,
    })
}

/// GET /api/menu?roles=editor,admin
///
/// Without `roles` only menu items open to everyone are listed.
pub async fn get_menu(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Query(query): Query<MenuQuery>,
) -> Json<PageListResponse> {
    let entry = state.cache.get_or_empty(&locale);

    let roles: Option<Vec<String>> = query.roles.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect()
    });
    let held = roles.as_deref().unwrap_or_default();
    let is_in_role = |role: &str| held.iter().any(|r| r.eq_ignore_ascii_case(role));
    let filter: Option<&dyn Fn(&str) -> bool> = if roles.is_some() { Some(&is_in_role) } else { None };

    Json(PageListResponse {
        pages: pages(entry.menu(filter)),
        locale,
    })
}

/// GET /api/breadcrumbs?action=List&controller=Products
pub async fn get_breadcrumbs(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Query(query): Query<HandlerQuery>,
) -> Result<Json<PageListResponse>, ApiError> {
    let action = required(&query.action, "action")?;
    let controller = required(&query.controller, "controller")?;
    let entry = state.cache.get_or_empty(&locale);

    Ok(Json(PageListResponse {
        pages: pages(entry.breadcrumbs(action, controller)),
        locale,
    }))
}

/// GET /api/home
pub async fn get_home_page(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
) -> Json<PageListResponse> {
    let entry = state.cache.get_or_empty(&locale);

    Json(PageListResponse {
        pages: pages(entry.home_page()),
        locale,
    })
}
