//! Read-only queries over a built navigation tree
//!
//! Nothing here mutates the tree, and "not found" is always `None`, never
//! an error. The synthetic root is never returned.

use crate::model::{normalize_lookup_url, RelatedLink};
use crate::tree::{Node, NodeId, Tree};
use serde::Serialize;

/// Find the first node with `key`, depth-first over the whole tree
pub fn find_by_key<'a>(tree: &'a Tree, key: &str) -> Option<&'a Node> {
    if key.is_empty() {
        return None;
    }
    tree.walk().find(|node| node.key().eq_ignore_ascii_case(key))
}

/// Find the first node whose page URL equals the normalized `url`
pub fn find_by_url<'a>(tree: &'a Tree, url: &str) -> Option<&'a Node> {
    let url = normalize_lookup_url(url)?;
    tree.walk()
        .find(|node| !node.page_url().is_empty() && node.page_url().eq_ignore_ascii_case(&url))
}

/// Find the first node whose alternate URL equals the normalized `url`
pub fn find_by_alternate_url<'a>(tree: &'a Tree, url: &str) -> Option<&'a Node> {
    let url = normalize_lookup_url(url)?;
    tree.walk()
        .find(|node| !node.alternate_url().is_empty() && node.alternate_url().eq_ignore_ascii_case(&url))
}

/// Find the node declared on `controller.action`, ignoring case
pub fn find_by_handler<'a>(tree: &'a Tree, action: &str, controller: &str) -> Option<&'a Node> {
    tree.walk().find(|node| node.record().handler.matches(action, controller))
}

/// Valid nodes from the top of the tree down to `node`, inclusive
pub fn breadcrumbs(tree: &Tree, node: NodeId) -> Vec<&Node> {
    let mut trail = Vec::new();
    let mut current = Some(node);

    while let Some(id) = current {
        let item = tree.node(id);
        if item.is_valid() {
            trail.push(item);
        }
        current = item.parent();
    }

    trail.reverse();
    trail
}

/// Breadcrumbs for a handler; empty when the handler is unknown
pub fn breadcrumbs_for_handler<'a>(tree: &'a Tree, action: &str, controller: &str) -> Vec<&'a Node> {
    find_by_handler(tree, action, controller)
        .map(|node| breadcrumbs(tree, node.id()))
        .unwrap_or_default()
}

/// Top-level menu-eligible nodes, in tree order
pub fn menu_candidates(tree: &Tree) -> Vec<NodeId> {
    tree.top_level()
        .iter()
        .copied()
        .filter(|&id| tree.node(id).record().is_menu_item)
        .collect()
}

/// Menu items visible to the caller, sorted by menu order (stable).
///
/// Without `is_in_role` only unfiltered items are returned. With it,
/// unfiltered items are always included and a role-filtered item is
/// included once for every one of its roles the caller holds, so an item
/// can appear more than once.
pub fn menu<'a>(
    tree: &'a Tree,
    candidates: &[NodeId],
    is_in_role: Option<&dyn Fn(&str) -> bool>,
) -> Vec<&'a Node> {
    let mut items: Vec<&Node> = Vec::new();

    for &id in candidates {
        let node = tree.node(id);
        match (&node.record().menu_role_filter, is_in_role) {
            (None, _) => items.push(node),
            (Some(_), None) => {}
            (Some(roles), Some(is_in_role)) => {
                // TODO: decide whether an item matching several roles should collapse to one entry
                for role in roles {
                    if is_in_role(role) {
                        items.push(node);
                    }
                }
            }
        }
    }

    items.sort_by_key(|node| node.record().menu_order);
    items
}

/// Visible home page items, in discovery order
pub fn home_page_candidates(tree: &Tree) -> Vec<NodeId> {
    tree.flat()
        .filter(|node| node.record().visible && node.record().is_home_page_item)
        .map(Node::id)
        .collect()
}

/// Pages related to `node` through shared tags.
///
/// The node's own declared links come first, followed by every other valid
/// node sharing a tag and then `extra`. The result is deduplicated by title
/// (first wins) and sorted by title.
pub fn related_pages(tree: &Tree, node: NodeId, extra: &[RelatedLink]) -> Vec<RelatedLink> {
    let page = tree.node(node);
    let mut related: Vec<RelatedLink> = page.record().related_links.clone();

    for tag in &page.record().tags {
        for other in tree.flat().filter(|n| n.is_valid() && n.id() != node) {
            if other.record().has_tag(tag) {
                related.push(RelatedLink::to_handler(other.title(), &other.record().handler));
            }
        }
    }

    related.extend(extra.iter().cloned());

    let mut seen = std::collections::HashSet::new();
    related.retain(|link| seen.insert(link.title.clone()));
    related.sort_by(|a, b| {
        a.title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then_with(|| a.title.cmp(&b.title))
    });
    related
}

/// Legacy URL to page URL map over valid nodes, first registration wins
pub fn permanent_redirects(tree: &Tree) -> std::collections::BTreeMap<String, String> {
    let mut redirects = std::collections::BTreeMap::new();

    for node in tree.flat().filter(|n| n.is_valid()) {
        for url in &node.record().redirect_urls {
            redirects
                .entry(url.clone())
                .or_insert_with(|| node.page_url().to_string());
        }
    }

    redirects
}

/// Page metadata for rendering `<title>` and meta tags
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetaData {
    pub title: String,
    pub description: String,
    pub no_index: bool,
    pub no_follow: bool,
}

impl MetaData {
    /// Value for a robots meta tag: "", "noindex", "nofollow" or "noindex,nofollow"
    pub fn robots(&self) -> String {
        match (self.no_index, self.no_follow) {
            (true, true) => "noindex,nofollow".to_string(),
            (true, false) => "noindex".to_string(),
            (false, true) => "nofollow".to_string(),
            (false, false) => String::new(),
        }
    }
}

/// Metadata for a handler; empty defaults when the handler is unknown
pub fn meta_data(tree: &Tree, action: &str, controller: &str) -> MetaData {
    match find_by_handler(tree, action, controller) {
        Some(node) => {
            let record = node.record();
            MetaData {
                title: record.effective_meta_title().to_string(),
                description: record.effective_meta_description().to_string(),
                no_index: record.no_index,
                no_follow: record.no_follow,
            }
        }
        None => MetaData::default(),
    }
}

/// Everything a page template needs about the handler being rendered
#[derive(Debug, Clone)]
pub struct ContextInfo<'a> {
    pub action: String,
    pub controller: String,
    pub meta: MetaData,
    pub page: Option<&'a Node>,
}

pub fn context_info<'a>(tree: &'a Tree, action: &str, controller: &str) -> ContextInfo<'a> {
    ContextInfo {
        action: action.to_string(),
        controller: controller.to_string(),
        meta: meta_data(tree, action, controller),
        page: find_by_handler(tree, action, controller),
    }
}
