//! Handler discovery and record normalization
//!
//! The engine never inspects handlers itself. A [`MetadataSource`] yields
//! normalized [`AnnotationRecord`]s for a locale; [`normalize`] turns raw
//! [`HandlerDescriptor`]s into records, applying defaults, the config gate,
//! eager resource resolution and visibility resolution.

use crate::config::{self, ConfigGate};
use crate::model::{
    normalize_url, parse_tags, AnnotationRecord, HandlerDescriptor, HandlerId, HttpMethod,
    RelatedLink,
};
use crate::visibility::resolve_visibility;
use crate::{Error, Result};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Capability that enumerates handler annotation records for a locale
pub trait MetadataSource: Send + Sync {
    fn handlers(&self, locale: &str) -> Result<Vec<AnnotationRecord>>;

    /// Records plus the page URLs of handlers turned away by the config gate.
    ///
    /// Sources that never gate handlers keep the default.
    fn discover(&self, locale: &str) -> Result<Discovered> {
        Ok(Discovered {
            records: self.handlers(locale)?,
            gated_urls: Vec::new(),
        })
    }
}

/// Outcome of one discovery pass
#[derive(Debug, Clone, Default)]
pub struct Discovered {
    pub records: Vec<AnnotationRecord>,
    /// Normalized page and alternate URLs of config-gated handlers
    pub gated_urls: Vec<String>,
}

/// Resolves a named text resource for a locale
pub trait ResourceResolver: Send + Sync {
    fn resolve(&self, locale: &str, name: &str) -> Option<String>;
}

/// Resolver without any resources; every name falls back to its literal text
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResources;

impl ResourceResolver for NoResources {
    fn resolve(&self, _locale: &str, _name: &str) -> Option<String> {
        None
    }
}

/// Source serving a fixed list of records for every locale
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    records: Vec<AnnotationRecord>,
}

impl StaticSource {
    pub fn new(records: Vec<AnnotationRecord>) -> Self {
        Self { records }
    }
}

impl MetadataSource for StaticSource {
    fn handlers(&self, _locale: &str) -> Result<Vec<AnnotationRecord>> {
        Ok(self.records.clone())
    }
}

/// Why a descriptor did not become a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Ignored,
    PostOnly,
    ConfigGateClosed,
    NoPageInfo,
    MissingIdentity,
}

/// Normalize raw descriptors into records for `locale`.
///
/// Descriptors that are ignored, POST-only, gated off, lack a page group or
/// lack an identity are skipped. Duplicate custom property keys abort the
/// whole pass.
pub fn normalize(
    descriptors: &[HandlerDescriptor],
    locale: &str,
    gate: &dyn ConfigGate,
    resources: &dyn ResourceResolver,
) -> Result<Vec<AnnotationRecord>> {
    discover(descriptors, locale, gate, resources).map(|discovered| discovered.records)
}

/// Like [`normalize`], also collecting the URLs of gated-off handlers
pub fn discover(
    descriptors: &[HandlerDescriptor],
    locale: &str,
    gate: &dyn ConfigGate,
    resources: &dyn ResourceResolver,
) -> Result<Discovered> {
    let mut discovered = Discovered {
        records: Vec::with_capacity(descriptors.len()),
        gated_urls: Vec::new(),
    };

    for descriptor in descriptors {
        match normalize_one(descriptor, locale, gate, resources)? {
            Ok(record) => discovered.records.push(record),
            Err(reason) => {
                debug!(
                    "Skipping handler {}.{}: {:?}",
                    descriptor.controller, descriptor.action, reason
                );
                if reason == SkipReason::ConfigGateClosed {
                    for url in gated_urls(descriptor) {
                        if !discovered.gated_urls.contains(&url) {
                            discovered.gated_urls.push(url);
                        }
                    }
                }
            }
        }
    }

    Ok(discovered)
}

/// URLs a gated-off handler would have answered on
fn gated_urls(descriptor: &HandlerDescriptor) -> Vec<String> {
    let url = descriptor
        .route
        .as_ref()
        .map(|route| normalize_url(&route.url))
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| normalize_url(&format!("{}/", descriptor.action)));
    let shape = AnnotationRecord {
        handler: HandlerId::new(
            descriptor.action.clone(),
            descriptor.controller.clone(),
            descriptor.area.clone(),
        ),
        url,
        ..Default::default()
    };

    let mut urls = vec![shape.page_url()];
    let alternate = shape.alternate_url();
    if !alternate.is_empty() && !urls.contains(&alternate) {
        urls.push(alternate);
    }
    urls.retain(|u| !u.is_empty());
    urls
}

fn normalize_one(
    descriptor: &HandlerDescriptor,
    locale: &str,
    gate: &dyn ConfigGate,
    resources: &dyn ResourceResolver,
) -> Result<std::result::Result<AnnotationRecord, SkipReason>> {
    if descriptor.action.is_empty() || descriptor.controller.is_empty() {
        warn!("Skipping handler descriptor without action/controller");
        return Ok(Err(SkipReason::MissingIdentity));
    }
    if descriptor.ignore {
        return Ok(Err(SkipReason::Ignored));
    }
    if descriptor.http_method == HttpMethod::Post {
        return Ok(Err(SkipReason::PostOnly));
    }
    if !config::is_allowed(&descriptor.allow_if_config, gate) {
        return Ok(Err(SkipReason::ConfigGateClosed));
    }
    let Some(page) = descriptor.page.as_ref() else {
        return Ok(Err(SkipReason::NoPageInfo));
    };

    let handler = HandlerId::new(
        descriptor.action.clone(),
        descriptor.controller.clone(),
        descriptor.area.clone(),
    );
    let text = |literal: &str, resource: &Option<String>| -> String {
        resource
            .as_deref()
            .and_then(|name| resources.resolve(locale, name))
            .unwrap_or_else(|| literal.to_string())
    };

    let title = text(&page.title, &page.title_resource);

    let route = descriptor.route.clone().unwrap_or_default();
    let key = if route.key.is_empty() {
        format!("{}{}{}", handler.area, handler.controller, handler.action)
    } else {
        route.key
    };
    let url = if route.url.is_empty() {
        normalize_url(&format!("{}/", handler.action))
    } else {
        normalize_url(&route.url)
    };
    let redirect_urls = route
        .redirect_urls
        .iter()
        .map(|u| normalize_url(u))
        .filter(|u| !u.is_empty())
        .collect();

    let (meta_title, meta_description, no_index, no_follow) = match descriptor.meta.as_ref() {
        Some(meta) => (
            text(&meta.title, &meta.title_resource),
            text(&meta.description, &meta.description_resource),
            meta.no_index,
            meta.no_follow,
        ),
        None => (String::new(), String::new(), false, false),
    };

    let mut custom_properties = BTreeMap::new();
    for property in &descriptor.properties {
        if custom_properties
            .insert(property.key.clone(), property.value.clone())
            .is_some()
        {
            return Err(Error::Discovery(format!(
                "handler {} declares custom property '{}' twice",
                handler, property.key
            )));
        }
    }

    let related_links = descriptor
        .related
        .iter()
        .map(|r| RelatedLink::to_url(text(&r.title, &r.title_resource), r.url.clone()))
        .collect();

    let record = AnnotationRecord {
        key,
        parent_key: route.parent_key,
        menu_order: descriptor.menu.as_ref().map(|m| m.order).unwrap_or(0),
        is_menu_item: descriptor.menu.is_some(),
        menu_role_filter: descriptor.menu.as_ref().and_then(|m| m.roles.clone()),
        sub_title: text(&page.sub_title, &page.sub_title_resource),
        summary: text(&page.summary, &page.summary_resource),
        image: page.image.clone(),
        is_home_page_item: page.is_home_page_item,
        meta_title: if meta_title.is_empty() { title.clone() } else { meta_title },
        meta_description: if meta_description.is_empty() {
            title.clone()
        } else {
            meta_description
        },
        no_index,
        no_follow,
        url,
        redirect_urls,
        block_url: route.block_url,
        tags: descriptor.tags.as_deref().map(parse_tags).unwrap_or_default(),
        related_links,
        custom_properties,
        visible: resolve_visibility(descriptor.visible, &descriptor.authorization),
        authorization_roles: descriptor.authorization.roles.clone(),
        title,
        handler,
    };

    Ok(Ok(record))
}

/// Check that no two records share a non-empty key.
///
/// With `reject` set the first duplicate fails discovery; otherwise every
/// duplicate is logged and lookups keep returning the first match.
pub fn check_duplicate_keys(records: &[AnnotationRecord], reject: bool) -> Result<()> {
    let mut seen: HashMap<String, &HandlerId> = HashMap::new();

    for record in records {
        if record.key.is_empty() {
            continue;
        }
        let folded = record.key.to_lowercase();
        if let Some(first) = seen.get(&folded) {
            if reject {
                return Err(Error::DuplicateKey {
                    key: record.key.clone(),
                    first: first.to_string(),
                    second: record.handler.to_string(),
                });
            }
            warn!(
                "Duplicate route key '{}' on {} (first declared by {})",
                record.key, record.handler, first
            );
            continue;
        }
        seen.insert(folded, &record.handler);
    }

    Ok(())
}
