//! JSON views of tree nodes

use std::collections::BTreeMap;

use pageinfo_common::{Node, Tree};
use serde::Serialize;

/// One page, without its subtree
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub key: String,
    pub parent_key: String,
    pub title: String,
    pub sub_title: String,
    pub summary: String,
    pub image: String,
    /// Site-relative URL with a leading slash
    pub url: String,
    pub alternate_url: String,
    pub controller: String,
    pub action: String,
    pub area: String,
    pub visible: bool,
    pub menu_order: i32,
    pub tags: Vec<String>,
    pub properties: BTreeMap<String, String>,
}

impl From<&Node> for PageView {
    fn from(node: &Node) -> Self {
        let record = node.record();
        Self {
            key: record.key.clone(),
            parent_key: record.parent_key.clone(),
            title: record.title.clone(),
            sub_title: record.sub_title.clone(),
            summary: record.summary.clone(),
            image: record.image.clone(),
            url: format!("/{}", node.page_url()),
            alternate_url: format!("/{}", node.alternate_url()),
            controller: record.handler.controller.clone(),
            action: record.handler.action.clone(),
            area: record.handler.area.clone(),
            visible: record.visible,
            menu_order: record.menu_order,
            tags: record.tags.clone(),
            properties: record.custom_properties.clone(),
        }
    }
}

/// A page together with its descendants
#[derive(Debug, Clone, Serialize)]
pub struct TreeView {
    #[serde(flatten)]
    pub page: PageView,
    pub children: Vec<TreeView>,
}

impl TreeView {
    pub fn build(tree: &Tree, node: &Node) -> Self {
        Self {
            page: PageView::from(node),
            children: node
                .children()
                .iter()
                .map(|&child| TreeView::build(tree, tree.node(child)))
                .collect(),
        }
    }
}

pub fn pages<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Vec<PageView> {
    nodes.into_iter().map(PageView::from).collect()
}
