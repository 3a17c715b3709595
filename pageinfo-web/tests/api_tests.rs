//! Integration tests for pageinfo-web API endpoints
//!
//! Tests cover:
//! - Health endpoint
//! - Tree, menu, breadcrumbs, home page, related pages and metadata
//! - Locale selection (query, Accept-Language, default)
//! - Route table and sitemap items
//! - Fallback: blocked pages, legacy redirects, page lookup
//! - Cache reset

use std::io::Write;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use pageinfo_common::cache::CacheOptions;
use pageinfo_common::config::{EngineConfig, NotFoundRoute, SettingsGate};
use pageinfo_common::manifest::{Manifest, ManifestSource};
use pageinfo_common::redirect::RedirectRegistry;
use pageinfo_common::PageInfoCache;
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot` method
use pageinfo_web::{build_router, AppState};

const MANIFEST: &str = r#"
    [[handler]]
    action = "Index"
    controller = "Home"
    authorization = { global_allow = true }
    page = { title = "Home", title_resource = "home_title", is_home_page_item = true }
    meta = { description = "Welcome" }
    menu = { order = 1 }
    route = { key = "home", url = "/" }

    [[handler]]
    action = "List"
    controller = "Products"
    tags = "shop"
    authorization = { global_allow = true }
    page = { title = "Products" }
    route = { key = "products", parent_key = "home", url = "/products", redirect_urls = ["/catalog"] }

    [[handler.related]]
    title = "Brochure"
    url = "/brochure.pdf"

    [[handler]]
    action = "Detail"
    controller = "Products"
    tags = "Shop"
    authorization = { global_allow = true }
    page = { title = "Product Detail" }
    route = { key = "product", parent_key = "products", url = "/item/{id}" }

    [[handler]]
    action = "Index"
    controller = "Admin"
    authorization = { global_allow = true }
    page = { title = "Admin" }
    meta = { no_index = true }
    menu = { order = 3, roles = ["admin"] }
    route = { key = "admin", url = "/admin" }

    [[handler]]
    action = "Secret"
    controller = "Home"
    visible = false
    page = { title = "Secret" }
    route = { key = "secret", url = "/secret", block_url = true }

    [[handler]]
    action = "NotFound"
    controller = "Error"
    page = { title = "Not Found" }
    route = { key = "notfound", url = "/not-found" }

    [[handler]]
    action = "Beta"
    controller = "Labs"
    authorization = { global_allow = true }
    page = { title = "Beta" }
    route = { key = "beta", url = "/labs/beta" }
    allow_if_config = [{ key = "pageinfo_web_test_beta", value = "on" }]

    [resources.nl]
    home_title = "Start"
"#;

/// Test helper: Create app serving the test manifest
fn setup_app() -> axum::Router {
    let manifest = Manifest::from_toml_str(MANIFEST).expect("Should parse manifest");
    let source = ManifestSource::from_manifest(manifest, Arc::new(SettingsGate::default()));
    setup_app_with_source(source)
}

fn setup_app_with_source(source: ManifestSource) -> axum::Router {
    let config = EngineConfig {
        not_found_route: Some(NotFoundRoute {
            controller: "Error".to_string(),
            action: "NotFound".to_string(),
        }),
        ..Default::default()
    };
    let options = CacheOptions {
        reject_duplicate_keys: true,
        sitemap_base_url: "https://example.org".to_string(),
    };
    let cache = PageInfoCache::new(Arc::new(source), options);

    let redirects = RedirectRegistry::new();
    redirects.add_redirect("old-home", "home/").unwrap();

    build_router(AppState::new(cache, redirects, config))
}

/// Test helper: Create request
fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn titles(pages: &Value) -> Vec<String> {
    pages
        .as_array()
        .expect("Should be an array")
        .iter()
        .map(|p| p["title"].as_str().unwrap_or_default().to_string())
        .collect()
}

// =============================================================================
// Health Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app();

    let response = app.oneshot(test_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "pageinfo-web");
    assert!(body["version"].is_string());
    assert_eq!(body["locales"], Value::Array(vec![]));
}

// =============================================================================
// Navigation Tests
// =============================================================================

#[tokio::test]
async fn test_tree_nests_children_under_parents() {
    let app = setup_app();

    let response = app.oneshot(test_request("GET", "/api/tree")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["locale"], "en-US");
    assert_eq!(titles(&body["pages"]), vec!["Home", "Admin", "Secret", "Not Found"]);

    let home = &body["pages"][0];
    assert_eq!(home["url"], "/home/");
    assert_eq!(titles(&home["children"]), vec!["Products"]);
    assert_eq!(titles(&home["children"][0]["children"]), vec!["Product Detail"]);
}

#[tokio::test]
async fn test_menu_without_roles_hides_filtered_items() {
    let app = setup_app();

    let response = app.oneshot(test_request("GET", "/api/menu")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(titles(&body["pages"]), vec!["Home"]);
}

#[tokio::test]
async fn test_menu_with_matching_role() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/menu?roles=editor,Admin"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(titles(&body["pages"]), vec!["Home", "Admin"]);
}

#[tokio::test]
async fn test_breadcrumbs_root_to_leaf() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/breadcrumbs?action=detail&controller=products"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(titles(&body["pages"]), vec!["Home", "Products", "Product Detail"]);
}

#[tokio::test]
async fn test_breadcrumbs_unknown_handler_is_empty() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/breadcrumbs?action=Nope&controller=Products"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert!(body["pages"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_breadcrumbs_missing_parameter() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/breadcrumbs?controller=Products"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("action"));
}

#[tokio::test]
async fn test_home_page_items() {
    let app = setup_app();

    let response = app.oneshot(test_request("GET", "/api/home")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(titles(&body["pages"]), vec!["Home"]);
}

#[tokio::test]
async fn test_related_pages_by_tag() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/related?key=PRODUCTS"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["key"], "products");
    let related: Vec<&str> = body["related"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["title"].as_str().unwrap())
        .collect();
    assert_eq!(related, vec!["Brochure", "Product Detail"]);
    assert_eq!(body["related"][0]["url"], "/brochure.pdf");
    assert_eq!(body["related"][1]["controller"], "Products");
}

#[tokio::test]
async fn test_related_unknown_key() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/related?key=missing"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Metadata and Locale Tests
// =============================================================================

#[tokio::test]
async fn test_meta_data_and_robots() {
    let app = setup_app();

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/meta?action=Index&controller=Home"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["title"], "Home");
    assert_eq!(body["description"], "Welcome");
    assert_eq!(body["robots"], "");

    let response = app
        .oneshot(test_request("GET", "/api/meta?action=Index&controller=Admin"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["no_index"], true);
    assert_eq!(body["robots"], "noindex");
}

#[tokio::test]
async fn test_meta_for_unknown_handler_is_empty() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/meta?action=Missing&controller=Home"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["title"], "");
    assert_eq!(body["robots"], "");
}

#[tokio::test]
async fn test_locale_from_accept_language() {
    let app = setup_app();

    let request = Request::builder()
        .uri("/api/home")
        .header(header::ACCEPT_LANGUAGE, "nl-NL,nl;q=0.9,en;q=0.8")
        .body(Body::empty())
        .unwrap();
    let body = extract_json(app.oneshot(request).await.unwrap().into_body()).await;
    assert_eq!(body["locale"], "nl-NL");
    assert_eq!(titles(&body["pages"]), vec!["Start"]);
}

#[tokio::test]
async fn test_locale_query_overrides_header() {
    let app = setup_app();

    let request = Request::builder()
        .uri("/api/home?locale=en-GB")
        .header(header::ACCEPT_LANGUAGE, "nl-NL")
        .body(Body::empty())
        .unwrap();
    let body = extract_json(app.clone().oneshot(request).await.unwrap().into_body()).await;
    assert_eq!(body["locale"], "en-GB");
    assert_eq!(titles(&body["pages"]), vec!["Home"]);

    // Only the locale actually served has a cache entry
    let body = extract_json(
        app.oneshot(test_request("GET", "/health")).await.unwrap().into_body(),
    )
    .await;
    assert_eq!(body["locales"], serde_json::json!(["en-GB"]));
}

// =============================================================================
// Route Table and Sitemap Tests
// =============================================================================

#[tokio::test]
async fn test_routes_parent_before_child() {
    let app = setup_app();

    let response = app.oneshot(test_request("GET", "/api/routes")).await.unwrap();
    let body = extract_json(response.into_body()).await;

    let patterns: Vec<(String, String)> = body["routes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| {
            (
                r["name"].as_str().unwrap().to_string(),
                r["pattern"].as_str().unwrap().to_string(),
            )
        })
        .collect();

    assert_eq!(patterns[0], ("home".to_string(), "home/".to_string()));
    assert_eq!(patterns[1], ("products".to_string(), "home/products/".to_string()));
    assert_eq!(patterns[2], ("product".to_string(), "home/products/item/{id}/".to_string()));
    assert_eq!(patterns.len(), 6);
}

#[tokio::test]
async fn test_sitemap_production_and_debug() {
    let app = setup_app();

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/sitemap"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["debug"], false);
    let urls: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["url"].as_str().unwrap())
        .collect();
    assert_eq!(
        urls,
        vec![
            "https://example.org/home/",
            "https://example.org/products/",
            "https://example.org/item/{id}/",
        ]
    );
    assert_eq!(body["items"][0]["change_frequency"], "always");
    assert_eq!(body["items"][0]["priority"], 1.0);

    let response = app
        .oneshot(test_request("GET", "/api/sitemap?debug=true"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 6);
}

// =============================================================================
// Page Lookup and Fallback Tests
// =============================================================================

#[tokio::test]
async fn test_page_lookup_by_url() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/page?url=/Products/"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["page"]["key"], "products");
    assert_eq!(body["meta"]["title"], "Products");
    assert_eq!(titles(&body["breadcrumbs"]), vec!["Home", "Products"]);
}

#[tokio::test]
async fn test_fallback_serves_known_page() {
    let app = setup_app();

    let response = app.oneshot(test_request("GET", "/products")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["page"]["title"], "Products");
}

#[tokio::test]
async fn test_fallback_declared_legacy_url_redirects() {
    let app = setup_app();

    let response = app.oneshot(test_request("GET", "/Catalog")).await.unwrap();
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(response.headers()[header::LOCATION], "/products/");
}

#[tokio::test]
async fn test_fallback_registered_redirect() {
    let app = setup_app();

    let response = app.oneshot(test_request("GET", "/old-home/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(response.headers()[header::LOCATION], "/home/");
}

#[tokio::test]
async fn test_fallback_blocked_page_is_not_found() {
    let app = setup_app();

    let response = app.oneshot(test_request("GET", "/secret")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"].is_string());
    assert_eq!(body["page"]["page"]["title"], "Not Found");
}

#[tokio::test]
async fn test_fallback_config_gated_page_serves_not_found_page() {
    let app = setup_app();

    let response = app.oneshot(test_request("GET", "/labs/beta")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "Page not found: /labs/beta");
    assert_eq!(body["page"]["page"]["title"], "Not Found");
}

#[tokio::test]
async fn test_fallback_config_gated_page_when_gate_open() {
    let manifest = Manifest::from_toml_str(MANIFEST).expect("Should parse manifest");
    let gate = |key: &str| (key == "pageinfo_web_test_beta").then(|| "ON".to_string());
    let app = setup_app_with_source(ManifestSource::from_manifest(manifest, Arc::new(gate)));

    let response = app.oneshot(test_request("GET", "/labs/beta")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["page"]["title"], "Beta");
}

#[tokio::test]
async fn test_fallback_unknown_url() {
    let app = setup_app();

    let response = app.oneshot(test_request("GET", "/nowhere")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "Page not found: /nowhere");
}

// =============================================================================
// Cache Maintenance Tests
// =============================================================================

#[tokio::test]
async fn test_cache_reset_clears_locales() {
    let app = setup_app();

    app.clone().oneshot(test_request("GET", "/api/tree")).await.unwrap();

    let response = app
        .clone()
        .oneshot(test_request("POST", "/api/cache/reset"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["cleared"], serde_json::json!(["en-US"]));

    let body = extract_json(
        app.oneshot(test_request("GET", "/health")).await.unwrap().into_body(),
    )
    .await;
    assert_eq!(body["locales"], Value::Array(vec![]));
}

#[tokio::test]
async fn test_unbuildable_locale_serves_empty_navigation() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[[handler]]\naction = 42").unwrap();

    let source = ManifestSource::from_path(file.path(), Arc::new(SettingsGate::default()));
    let app = setup_app_with_source(source);

    for uri in ["/api/tree", "/api/menu", "/api/home", "/api/routes", "/api/sitemap"] {
        let response = app.clone().oneshot(test_request("GET", uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
    }

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/menu"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert!(body["pages"].as_array().unwrap().is_empty());

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/meta?action=Index&controller=Home"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["title"], "");

    // Registered redirects do not depend on the tree
    let response = app
        .clone()
        .oneshot(test_request("GET", "/old-home"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(response.headers()[header::LOCATION], "/home/");

    // Nothing was cached, so the next request retries the build
    let body = extract_json(
        app.oneshot(test_request("GET", "/health")).await.unwrap().into_body(),
    )
    .await;
    assert_eq!(body["locales"], Value::Array(vec![]));
}

#[tokio::test]
async fn test_manifest_file_source() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(MANIFEST.as_bytes()).unwrap();

    let source = ManifestSource::from_path(file.path(), Arc::new(SettingsGate::default()));
    let app = setup_app_with_source(source);

    let response = app.oneshot(test_request("GET", "/api/home")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(titles(&body["pages"]), vec!["Home"]);
}
