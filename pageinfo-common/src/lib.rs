//! # Page Info Common Library
//!
//! Navigation metadata engine for annotated request handlers:
//! - Handler discovery and record normalization
//! - Navigation tree build (order independent)
//! - Per-locale cache of built trees and derived views
//! - Queries: lookups, breadcrumbs, menus, related pages, metadata
//! - Route pattern emission, sitemap items and permanent redirects

pub mod cache;
pub mod config;
pub mod discovery;
pub mod error;
pub mod manifest;
pub mod model;
pub mod query;
pub mod redirect;
pub mod routes;
pub mod sitemap;
pub mod tree;
pub mod visibility;

pub use cache::{CacheEntry, CacheOptions, PageInfoCache};
pub use discovery::{Discovered, MetadataSource};
pub use error::{Error, Result};
pub use model::{AnnotationRecord, HandlerId, RelatedLink};
pub use tree::{Node, NodeId, Tree};
