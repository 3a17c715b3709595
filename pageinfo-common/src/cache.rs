//! Locale-scoped navigation cache
//!
//! One [`CacheEntry`] per locale holds the built tree plus lazily memoized
//! views. Entries are built on first access and kept until [`PageInfoCache::reset`].
//!
//! Discovery runs outside the map lock, so two callers racing on a cold
//! locale may both build. Only the first published entry is kept and every
//! caller gets that one; a failed build publishes nothing and the next
//! access retries.

use crate::discovery::{check_duplicate_keys, MetadataSource};
use crate::model::{normalize_lookup_url, RelatedLink};
use crate::query::{self, MetaData};
use crate::routes::{emit_routes, RouteEntry};
use crate::sitemap::{site_map_items, SiteMapItem};
use crate::tree::{Node, NodeId, Tree};
use crate::{Error, Result};
use once_cell::sync::OnceCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;
use tracing::{error, info, warn};

/// Build options shared by every locale
#[derive(Debug, Clone)]
pub struct CacheOptions {
    pub reject_duplicate_keys: bool,
    pub sitemap_base_url: String,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            reject_duplicate_keys: true,
            sitemap_base_url: String::new(),
        }
    }
}

/// Built tree for one locale and its memoized views
#[derive(Debug)]
pub struct CacheEntry {
    locale: String,
    tree: Tree,
    sitemap_base_url: String,
    menu: OnceCell<Vec<NodeId>>,
    home_page: OnceCell<Vec<NodeId>>,
    site_map: OnceCell<Vec<SiteMapItem>>,
    site_map_debug: OnceCell<Vec<SiteMapItem>>,
    redirects: OnceCell<BTreeMap<String, String>>,
    routes: OnceCell<Vec<RouteEntry>>,
    gated_urls: BTreeSet<String>,
}

impl CacheEntry {
    pub fn new(locale: impl Into<String>, tree: Tree, sitemap_base_url: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            tree,
            sitemap_base_url: sitemap_base_url.into(),
            menu: OnceCell::new(),
            home_page: OnceCell::new(),
            site_map: OnceCell::new(),
            site_map_debug: OnceCell::new(),
            redirects: OnceCell::new(),
            routes: OnceCell::new(),
            gated_urls: BTreeSet::new(),
        }
    }

    /// Attach the URLs of handlers the config gate turned away
    pub fn with_gated_urls(mut self, urls: impl IntoIterator<Item = String>) -> Self {
        self.gated_urls.extend(urls);
        self
    }

    /// Entry with an empty tree, handed out when a locale cannot be built
    pub fn empty(locale: impl Into<String>) -> Self {
        Self::new(locale, Tree::empty(), String::new())
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Top-level nodes of the tree
    pub fn top_level(&self) -> Vec<&Node> {
        self.tree.top_level().iter().map(|&id| self.tree.node(id)).collect()
    }

    /// Whether `url` belongs to a handler excluded by its config gate
    pub fn is_gated(&self, url: &str) -> bool {
        normalize_lookup_url(url).is_some_and(|url| self.gated_urls.contains(&url))
    }

    pub fn find_by_key(&self, key: &str) -> Option<&Node> {
        query::find_by_key(&self.tree, key)
    }

    pub fn find_by_url(&self, url: &str) -> Option<&Node> {
        query::find_by_url(&self.tree, url)
    }

    pub fn find_by_alternate_url(&self, url: &str) -> Option<&Node> {
        query::find_by_alternate_url(&self.tree, url)
    }

    pub fn find_by_handler(&self, action: &str, controller: &str) -> Option<&Node> {
        query::find_by_handler(&self.tree, action, controller)
    }

    pub fn breadcrumbs(&self, action: &str, controller: &str) -> Vec<&Node> {
        query::breadcrumbs_for_handler(&self.tree, action, controller)
    }

    pub fn meta_data(&self, action: &str, controller: &str) -> MetaData {
        query::meta_data(&self.tree, action, controller)
    }

    pub fn menu(&self, is_in_role: Option<&dyn Fn(&str) -> bool>) -> Vec<&Node> {
        let candidates = self.menu.get_or_init(|| query::menu_candidates(&self.tree));
        query::menu(&self.tree, candidates, is_in_role)
    }

    pub fn home_page(&self) -> Vec<&Node> {
        self.home_page
            .get_or_init(|| query::home_page_candidates(&self.tree))
            .iter()
            .map(|&id| self.tree.node(id))
            .collect()
    }

    pub fn related_pages(&self, node: NodeId, extra: &[RelatedLink]) -> Vec<RelatedLink> {
        query::related_pages(&self.tree, node, extra)
    }

    pub fn permanent_redirects(&self) -> &BTreeMap<String, String> {
        self.redirects.get_or_init(|| query::permanent_redirects(&self.tree))
    }

    pub fn routes(&self) -> &[RouteEntry] {
        self.routes.get_or_init(|| emit_routes(&self.tree))
    }

    pub fn site_map_items(&self, debug: bool) -> &[SiteMapItem] {
        let cell = if debug { &self.site_map_debug } else { &self.site_map };
        cell.get_or_init(|| site_map_items(&self.tree, &self.sitemap_base_url, debug))
    }
}

/// Process-wide map of locale → built navigation entry
pub struct PageInfoCache {
    source: Arc<dyn MetadataSource>,
    options: CacheOptions,
    entries: RwLock<HashMap<String, Arc<CacheEntry>>>,
}

impl PageInfoCache {
    pub fn new(source: Arc<dyn MetadataSource>, options: CacheOptions) -> Self {
        Self {
            source,
            options,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Cached entry for `locale`, building it on first access
    pub fn get_or_build(&self, locale: &str) -> Result<Arc<CacheEntry>> {
        if let Some(entry) = self.get(locale) {
            return Ok(entry);
        }

        let built = Arc::new(self.build(locale)?);

        // Entries are immutable once published; a poisoned map is still consistent
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.entry(locale.to_string()).or_insert(built);
        Ok(Arc::clone(entry))
    }

    /// Like [`get_or_build`](Self::get_or_build), but a failed build yields an
    /// uncached empty entry instead of an error
    pub fn get_or_empty(&self, locale: &str) -> Arc<CacheEntry> {
        match self.get_or_build(locale) {
            Ok(entry) => entry,
            Err(e) => {
                error!("Navigation for locale '{}' unavailable: {}", locale, e);
                Arc::new(CacheEntry::empty(locale))
            }
        }
    }

    /// Already-built entry, without triggering a build
    pub fn get(&self, locale: &str) -> Option<Arc<CacheEntry>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(locale)
            .cloned()
    }

    /// Drop every entry; the next access rebuilds
    pub fn reset(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        info!("Resetting navigation cache ({} locales)", entries.len());
        entries.clear();
    }

    /// Locales with a built entry
    pub fn locales(&self) -> Vec<String> {
        let mut locales: Vec<String> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        locales.sort();
        locales
    }

    fn build(&self, locale: &str) -> Result<CacheEntry> {
        let started = Instant::now();

        let discovered = self.source.discover(locale).map_err(|e| match e {
            Error::Discovery(_) | Error::DuplicateKey { .. } => e,
            other => Error::Discovery(other.to_string()),
        })?;
        check_duplicate_keys(&discovered.records, self.options.reject_duplicate_keys)?;

        let tree = Tree::build(discovered.records);
        if tree.is_empty() {
            warn!("No navigation handlers discovered for locale '{}'", locale);
        }
        info!(
            "Built navigation for locale '{}': {} nodes in {:?}",
            locale,
            tree.len(),
            started.elapsed()
        );

        Ok(CacheEntry::new(locale, tree, self.options.sitemap_base_url.clone())
            .with_gated_urls(discovered.gated_urls))
    }
}
