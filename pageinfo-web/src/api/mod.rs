//! HTTP API handlers for pageinfo-web

pub mod error;
pub mod fallback;
pub mod health;
pub mod locale;
pub mod maintenance;
pub mod navigation;
pub mod pages;
pub mod views;

pub use error::ApiError;
pub use fallback::resolve_url;
pub use health::health_routes;
pub use locale::RequestLocale;
pub use maintenance::{get_routes, get_sitemap, reset_cache};
pub use navigation::{get_breadcrumbs, get_home_page, get_menu, get_tree};
pub use pages::{get_meta, get_page, get_related};
