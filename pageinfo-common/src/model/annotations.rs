//! Raw annotation groups as yielded by handler discovery
//!
//! These mirror what a handler declares, before defaults are applied and
//! resource names are resolved. All groups except `page` are optional; a
//! handler without a `page` group is skipped.

use serde::Deserialize;

/// One discovered request handler and its declared annotation groups
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HandlerDescriptor {
    pub action: String,
    pub controller: String,
    pub area: String,
    /// Accepted HTTP method; POST-only handlers never become pages
    pub http_method: HttpMethod,
    /// Excluded from discovery entirely
    pub ignore: bool,
    pub page: Option<PageAnnotation>,
    pub meta: Option<MetaAnnotation>,
    pub menu: Option<MenuAnnotation>,
    pub route: Option<RouteAnnotation>,
    /// Comma separated tag list
    pub tags: Option<String>,
    /// Explicit visibility; overrides the authorization-derived default
    pub visible: Option<bool>,
    pub related: Vec<RelatedAnnotation>,
    pub properties: Vec<PropertyAnnotation>,
    pub allow_if_config: Vec<ConfigCondition>,
    pub authorization: AuthorizationHints,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

/// Page title and presentation. `*_resource` names are looked up per locale.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PageAnnotation {
    pub title: String,
    pub title_resource: Option<String>,
    pub sub_title: String,
    pub sub_title_resource: Option<String>,
    pub summary: String,
    pub summary_resource: Option<String>,
    pub image: String,
    pub is_home_page_item: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetaAnnotation {
    pub title: String,
    pub title_resource: Option<String>,
    pub description: String,
    pub description_resource: Option<String>,
    pub no_index: bool,
    pub no_follow: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MenuAnnotation {
    pub order: i32,
    /// Only show the menu item to these roles
    pub roles: Option<Vec<String>>,
}

impl Default for MenuAnnotation {
    fn default() -> Self {
        Self { order: 1, roles: None }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RouteAnnotation {
    pub key: String,
    pub parent_key: String,
    pub url: String,
    pub redirect_urls: Vec<String>,
    pub block_url: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RelatedAnnotation {
    pub title: String,
    pub title_resource: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyAnnotation {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

/// "Only include this handler if setting `key` equals `value`"
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigCondition {
    pub key: String,
    pub value: String,
}

/// Authorization annotations found on the handler at each scope.
///
/// `*_deny` is a "requires authorization" marker, `*_allow` an
/// "allow anonymous" marker. `roles` is the raw role list of the
/// method-level authorization annotation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthorizationHints {
    pub global_deny: bool,
    pub global_allow: bool,
    pub type_deny: bool,
    pub type_allow: bool,
    pub method_deny: bool,
    pub method_allow: bool,
    pub roles: String,
}
