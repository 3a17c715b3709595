//! Route pattern emission for the hosting router
//!
//! Every valid node yields one pattern built from the page URLs of its
//! valid ancestors and itself. Placeholder segments (`{id}/`) are stripped
//! from ancestor segments so a child supplies its own values. Parents are
//! emitted before their children, which first-match-wins routers rely on.

use crate::tree::{NodeId, Tree};
use serde::Serialize;

/// One entry for the external route table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    /// Route name; the node's key
    pub name: String,
    /// URL pattern, slash terminated, without a leading slash
    pub pattern: String,
    pub controller: String,
    pub action: String,
    pub area: String,
}

/// Emit route entries depth-first in parent-before-child order
pub fn emit_routes(tree: &Tree) -> Vec<RouteEntry> {
    let mut routes = Vec::new();
    for &id in tree.top_level() {
        if tree.node(id).key().is_empty() {
            continue;
        }
        emit(tree, id, &mut routes);
    }
    routes
}

fn emit(tree: &Tree, id: NodeId, routes: &mut Vec<RouteEntry>) {
    let node = tree.node(id);

    if node.is_valid() {
        let record = node.record();
        routes.push(RouteEntry {
            name: record.key.clone(),
            pattern: route_pattern(tree, id),
            controller: record.handler.controller.clone(),
            action: record.handler.action.clone(),
            area: record.handler.area.clone(),
        });
    }

    for &child in node.children() {
        emit(tree, child, routes);
    }
}

/// Concatenated page URLs from the top of the tree down to `id`
pub fn route_pattern(tree: &Tree, id: NodeId) -> String {
    let mut segments: Vec<String> = Vec::new();
    let mut current = Some(id);

    while let Some(node_id) = current {
        let node = tree.node(node_id);
        if node.is_valid() {
            if segments.is_empty() {
                segments.push(node.page_url().to_string());
            } else {
                segments.push(strip_placeholders(node.page_url()));
            }
        }
        current = node.parent();
    }

    segments.reverse();
    let mut pattern = segments.concat();
    if !pattern.ends_with('/') {
        pattern.push('/');
    }
    pattern
}

/// Remove every `{...}/` placeholder segment
pub fn strip_placeholders(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    let mut rest = url;

    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find("}/") else {
            break;
        };
        out.push_str(&rest[..open]);
        rest = &rest[open + close + 2..];
    }

    out.push_str(rest);
    out
}
