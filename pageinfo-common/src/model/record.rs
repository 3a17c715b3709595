//! Normalized navigation metadata for one discovered handler
//!
//! An `AnnotationRecord` is produced once by discovery and never mutated
//! afterwards. Text that came from a resource lookup has already been
//! resolved for the locale the record was built for.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identity of the request handler a record was declared on
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandlerId {
    /// Action (method) name, e.g. `Index`
    pub action: String,
    /// Owning controller name without the `Controller` suffix
    pub controller: String,
    /// Area name, empty when the controller is not part of an area
    #[serde(default)]
    pub area: String,
}

impl HandlerId {
    pub fn new(
        action: impl Into<String>,
        controller: impl Into<String>,
        area: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            controller: controller.into(),
            area: area.into(),
        }
    }

    /// Case-insensitive match on action and controller
    pub fn matches(&self, action: &str, controller: &str) -> bool {
        self.action.eq_ignore_ascii_case(action) && self.controller.eq_ignore_ascii_case(controller)
    }
}

impl std::fmt::Display for HandlerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.area.is_empty() {
            write!(f, "{}.{}", self.controller, self.action)
        } else {
            write!(f, "{}/{}.{}", self.area, self.controller, self.action)
        }
    }
}

/// A link shown in a "related pages" block
///
/// Declared links carry a `url`; links derived from shared tags carry the
/// target handler's identity instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelatedLink {
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub controller: String,
    #[serde(default)]
    pub area: String,
}

impl RelatedLink {
    pub fn to_url(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn to_handler(title: impl Into<String>, handler: &HandlerId) -> Self {
        Self {
            title: title.into(),
            url: String::new(),
            action: handler.action.clone(),
            controller: handler.controller.clone(),
            area: handler.area.clone(),
        }
    }
}

/// Normalized metadata of one handler
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnnotationRecord {
    pub handler: HandlerId,

    // Navigation
    pub key: String,
    pub parent_key: String,
    pub menu_order: i32,
    pub is_menu_item: bool,
    /// `None` means the menu item is visible to everyone
    pub menu_role_filter: Option<Vec<String>>,

    // Presentation
    pub title: String,
    pub sub_title: String,
    pub summary: String,
    pub image: String,
    pub is_home_page_item: bool,

    // SEO
    pub meta_title: String,
    pub meta_description: String,
    pub no_index: bool,
    pub no_follow: bool,

    // Routing
    /// Explicit URL override, already normalized; empty when not set
    pub url: String,
    pub redirect_urls: Vec<String>,
    pub block_url: bool,

    // Classification
    pub tags: Vec<String>,
    pub related_links: Vec<RelatedLink>,
    pub custom_properties: BTreeMap<String, String>,

    // Access
    pub visible: bool,
    pub authorization_roles: String,
}

impl AnnotationRecord {
    /// A record is valid when action, controller, key and title are all set.
    ///
    /// Invalid records stay in the tree but never show up in breadcrumbs,
    /// sitemaps or emitted routes.
    pub fn is_valid(&self) -> bool {
        !self.handler.action.is_empty()
            && !self.handler.controller.is_empty()
            && !self.key.is_empty()
            && !self.title.is_empty()
    }

    /// Lower-cased action (or controller for `Index` actions) with a trailing slash
    pub fn alternate_url(&self) -> String {
        let name = if self.handler.action == "Index" {
            &self.handler.controller
        } else {
            &self.handler.action
        };
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return String::new();
        }
        format!("{}/", name)
    }

    /// Explicit URL override when set, otherwise the alternate URL
    pub fn page_url(&self) -> String {
        if self.url.is_empty() {
            self.alternate_url()
        } else {
            self.url.clone()
        }
    }

    /// Meta title, falling back to the page title
    pub fn effective_meta_title(&self) -> &str {
        if self.meta_title.is_empty() {
            &self.title
        } else {
            &self.meta_title
        }
    }

    /// Meta description, falling back to the page title
    pub fn effective_meta_description(&self) -> &str {
        if self.meta_description.is_empty() {
            &self.title
        } else {
            &self.meta_description
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Normalize a declared URL: trimmed, lower-cased, no leading slash and
/// terminated by exactly one slash.
///
/// Returns an empty string when nothing remains, meaning "no override".
pub fn normalize_url(raw: &str) -> String {
    let url = raw.trim().to_lowercase();
    let url = url.trim_start_matches('/');
    if url.is_empty() {
        return String::new();
    }
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

/// Normalize an incoming URL for lookups: surrounding slashes stripped,
/// lower-cased and terminated by a single slash.
///
/// Returns `None` for empty input.
pub fn normalize_lookup_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!("{}/", trimmed.to_lowercase()))
}

/// Parse a comma separated tag list into trimmed, lower-cased, unique tags
pub fn parse_tags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.split(',') {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() || tags.contains(&tag) {
            continue;
        }
        tags.push(tag);
    }
    tags
}
