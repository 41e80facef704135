//! Retained overlay node tree
//!
//! The annotator does not talk to a real DOM; it mutates this retained tree
//! and the host mirrors it into whatever render surface it owns. Nodes carry
//! a style block and a class set, live under a single root, and are removed
//! as whole subtrees. Node ids are never reused, so a stale id held by a
//! deferred task simply fails the liveness check instead of aliasing a new
//! node.

use std::collections::{BTreeSet, HashMap};

/// Unique identifier of an overlay node
///
/// Stable for the node's lifetime and never reassigned after removal.
pub type NodeId = u64;

/// CSS-style positioning scheme of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionScheme {
    /// Laid out by the host in flow order.
    #[default]
    Static,
    /// Positioned by `left`/`top` relative to the overlay root.
    Absolute,
}

/// Unit of a node's width value.
///
/// Percent widths resolve against the parent, so a cell sized in percent
/// follows its fragment through resizes without being rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeUnit {
    #[default]
    Px,
    Percent,
}

/// Visual style of one overlay node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeStyle {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub width_unit: SizeUnit,
    pub height: f32,
    pub opacity: f32,
    pub position: PositionScheme,
    /// Fill color token forwarded to the host, if any.
    pub background: Option<String>,
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: 0.0,
            width_unit: SizeUnit::Px,
            height: 0.0,
            opacity: 1.0,
            position: PositionScheme::Static,
            background: None,
        }
    }
}

/// One node in the overlay tree.
#[derive(Debug)]
struct OverlayNode {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    style: NodeStyle,
    classes: BTreeSet<String>,
}

impl OverlayNode {
    fn detached() -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            style: NodeStyle::default(),
            classes: BTreeSet::new(),
        }
    }
}

/// Arena of overlay nodes with a fixed root
///
/// # Example
///
/// ```
/// use overmark_core::tree::OverlayTree;
///
/// let mut tree = OverlayTree::new();
/// let node = tree.create_node();
/// tree.append_child(tree.root(), node);
///
/// assert!(tree.contains(node));
/// tree.remove(node);
/// assert!(!tree.contains(node));
/// ```
#[derive(Debug)]
pub struct OverlayTree {
    nodes: HashMap<NodeId, OverlayNode>,
    root: NodeId,
    next_id: NodeId,
}

impl OverlayTree {
    /// Create a tree holding only the root node.
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(0, OverlayNode::detached());
        Self {
            nodes,
            root: 0,
            next_id: 1,
        }
    }

    /// The root node every fragment wrapper is appended under.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create a new detached node with default style.
    pub fn create_node(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.insert(id, OverlayNode::detached());
        id
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// Detaches `child` from its previous parent first. No-op when either id
    /// is dead or when `child` is the root.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if child == self.root || !self.nodes.contains_key(&parent) || !self.nodes.contains_key(&child)
        {
            return;
        }
        self.detach(child);
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
    }

    /// Remove a node and its whole subtree from the tree.
    ///
    /// The root cannot be removed. Removed ids become dead: liveness checks
    /// fail and style lookups return `None`.
    pub fn remove(&mut self, id: NodeId) {
        if id == self.root {
            return;
        }
        self.detach(id);
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            if let Some(node) = self.nodes.remove(&id) {
                pending.extend(node.children);
            }
        }
    }

    /// Whether the id refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Style of a live node.
    pub fn style(&self, id: NodeId) -> Option<&NodeStyle> {
        self.nodes.get(&id).map(|node| &node.style)
    }

    /// Mutable style of a live node.
    pub fn style_mut(&mut self, id: NodeId) -> Option<&mut NodeStyle> {
        self.nodes.get_mut(&id).map(|node| &mut node.style)
    }

    /// Children of a node, in insertion order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Parent of a node, if attached.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    /// Add a class to a node.
    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.classes.insert(class.to_string());
        }
    }

    /// Remove a class from a node.
    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.classes.remove(class);
        }
    }

    /// Whether a node carries a class.
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.nodes
            .get(&id)
            .map(|node| node.classes.contains(class))
            .unwrap_or(false)
    }

    /// All live nodes carrying a class, in id order.
    pub fn nodes_with_class(&self, class: &str) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.classes.contains(class))
            .map(|(&id, _)| id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Number of live nodes, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether only the root remains.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.nodes.get(&id).and_then(|node| node.parent) else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.retain(|&child| child != id);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = None;
        }
    }
}

impl Default for OverlayTree {
    fn default() -> Self {
        Self::new()
    }
}
