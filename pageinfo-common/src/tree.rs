//! Navigation tree
//!
//! Nodes live in an arena owned by the [`Tree`]; parent and child links are
//! [`NodeId`] indices. Slot 0 is the synthetic root, which carries an empty
//! record and is never handed out by the query layer. Slots `1..` hold the
//! discovered records in discovery order, which doubles as the flat list.
//!
//! # Build
//!
//! Records are inserted in a single pass. Each record goes under the node
//! currently matching its parent key, or under the root if none matches yet.
//! After every insertion the root's direct children are re-scanned for nodes
//! waiting on the key just inserted, and those are moved under it. This
//! self-healing pass makes the result independent of declaration order
//! (absent key cycles) at O(n·k) cost, k being the root's child count.

use crate::model::AnnotationRecord;
use serde::Serialize;
use tracing::{debug, warn};

/// Index of a node inside its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Tree element wrapping one record
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    record: AnnotationRecord,
    page_url: String,
    alternate_url: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(id: NodeId, record: AnnotationRecord) -> Self {
        let page_url = record.page_url();
        let alternate_url = record.alternate_url();
        Self {
            id,
            record,
            page_url,
            alternate_url,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn record(&self) -> &AnnotationRecord {
        &self.record
    }

    pub fn key(&self) -> &str {
        &self.record.key
    }

    pub fn parent_key(&self) -> &str {
        &self.record.parent_key
    }

    pub fn title(&self) -> &str {
        &self.record.title
    }

    /// Explicit URL override if set, else the alternate URL
    pub fn page_url(&self) -> &str {
        &self.page_url
    }

    pub fn alternate_url(&self) -> &str {
        &self.alternate_url
    }

    pub fn is_valid(&self) -> bool {
        self.record.is_valid()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Forest of navigation nodes below a synthetic root
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::empty()
    }
}

impl Tree {
    /// Id of the synthetic root
    pub const ROOT: NodeId = NodeId(0);

    /// Tree containing only the synthetic root
    pub fn empty() -> Self {
        Self {
            nodes: vec![Node::new(Self::ROOT, AnnotationRecord::default())],
        }
    }

    /// Build the tree from records in discovery order
    pub fn build(records: Vec<AnnotationRecord>) -> Self {
        let mut tree = Self::empty();
        tree.nodes.reserve(records.len());

        for record in records {
            let id = NodeId(tree.nodes.len());
            tree.nodes.push(Node::new(id, record));

            let parent = tree
                .find_by_key_from(Self::ROOT, tree.nodes[id.0].parent_key())
                .unwrap_or(Self::ROOT);
            tree.attach(parent, id);
            tree.adopt_waiting_children(id);
        }

        debug!("Built navigation tree: {} nodes, {} top level", tree.len(), tree.top_level().len());
        tree
    }

    /// Move root children whose parent key names `id` under `id`
    fn adopt_waiting_children(&mut self, id: NodeId) {
        let key = self.nodes[id.0].key().to_string();
        if key.is_empty() {
            return;
        }

        let waiting: Vec<NodeId> = self.nodes[Self::ROOT.0]
            .children
            .iter()
            .copied()
            .filter(|&child| child != id)
            .filter(|&child| {
                let parent_key = self.nodes[child.0].parent_key();
                !parent_key.is_empty() && parent_key.eq_ignore_ascii_case(&key)
            })
            .collect();

        for child in waiting {
            if self.is_ancestor(child, id) {
                warn!(
                    "Parent key cycle between '{}' and '{}', leaving '{}' at top level",
                    self.nodes[child.0].key(),
                    key,
                    self.nodes[child.0].key()
                );
                continue;
            }
            self.detach(Self::ROOT, child);
            self.attach(id, child);
        }
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn detach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = None;
        self.nodes[parent.0].children.retain(|&c| c != child);
    }

    /// Whether `candidate` is `node` or one of its ancestors
    fn is_ancestor(&self, candidate: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.nodes[id.0].parent;
        }
        false
    }

    pub fn root(&self) -> &Node {
        &self.nodes[Self::ROOT.0]
    }

    /// Children of the synthetic root
    pub fn top_level(&self) -> &[NodeId] {
        self.root().children()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Number of discovered nodes, excluding the synthetic root
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discovered nodes in discovery order
    pub fn flat(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().skip(1)
    }

    /// Pre-order walk over `start` and everything below it
    pub fn depth_first(&self, start: NodeId) -> DepthFirst<'_> {
        DepthFirst {
            tree: self,
            stack: vec![start],
        }
    }

    /// Pre-order walk over every discovered node, top level first
    pub fn walk(&self) -> impl Iterator<Item = &Node> {
        self.depth_first(Self::ROOT).skip(1)
    }

    /// Depth-first search for `key` below and including `start`.
    ///
    /// An empty key matches `start` itself. Keys compare case-insensitively.
    pub fn find_by_key_from(&self, start: NodeId, key: &str) -> Option<NodeId> {
        if key.is_empty() {
            return Some(start);
        }
        self.depth_first(start)
            .find(|node| node.key().eq_ignore_ascii_case(key))
            .map(Node::id)
    }
}

/// Pre-order iterator produced by [`Tree::depth_first`]
pub struct DepthFirst<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.node(id);
        self.stack.extend(node.children.iter().rev().copied());
        Some(node)
    }
}
