//! The node arena.
//!
//! A [`Tree`] owns every node it contains. Rewrites never free slots; nodes
//! that fall out of the child lists are simply unreachable until
//! [`Tree::compacted`] copies the live part into a fresh arena.

use tessera_grout::FxHashMap;

use crate::ast::{
    ElementNode, ExpressionNode, FragmentNode, Node, NodeId, NodeKind, Position, TextNode,
};
use crate::scope::Scope;

#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub const ROOT: NodeId = NodeId(0);

    pub fn new() -> Self {
        Self::with_scope(Scope::new())
    }

    /// A tree whose root fragment carries `scope`.
    pub fn with_scope(scope: Scope) -> Self {
        Self {
            nodes: vec![Node::detached(NodeKind::Fragment(FragmentNode::isolated(
                scope,
            )))],
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    /// Number of arena slots, reachable or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.children(Self::ROOT).is_empty()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    #[inline]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes[id.index()].children()
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementNode> {
        match self.kind(id) {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementNode> {
        match &mut self.node_mut(id).kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn root_scope(&self) -> &Scope {
        match self.kind(Self::ROOT) {
            NodeKind::Fragment(fragment) => &fragment.scope,
            _ => unreachable!("tree root is always a fragment"),
        }
    }

    pub fn root_scope_mut(&mut self) -> &mut Scope {
        match &mut self.node_mut(Self::ROOT).kind {
            NodeKind::Fragment(fragment) => &mut fragment.scope,
            _ => unreachable!("tree root is always a fragment"),
        }
    }

    // --- construction ---

    /// Allocate a detached node.
    pub fn add(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node::detached(kind));
        id
    }

    pub fn add_element(&mut self, element: ElementNode) -> NodeId {
        self.add(NodeKind::Element(element))
    }

    pub fn add_text(&mut self, content: impl Into<String>) -> NodeId {
        self.add(NodeKind::Text(TextNode::new(content)))
    }

    pub fn add_expression(&mut self, content: &str, position: Position) -> NodeId {
        self.add(NodeKind::Expression(ExpressionNode {
            content: content.into(),
            position,
        }))
    }

    pub fn add_fragment(&mut self, fragment: FragmentNode) -> NodeId {
        self.add(NodeKind::Fragment(fragment))
    }

    // --- structure ---

    /// Append `child` to `parent`'s child list.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        if let Some(children) = self.nodes[parent.index()].children_mut() {
            children.push(child);
            self.nodes[child.index()].parent = Some(parent);
        }
    }

    /// Empty `parent`'s child list, returning the former children.
    ///
    /// The returned nodes still point at `parent` until they are attached
    /// elsewhere or passed back through [`Tree::set_children`].
    pub fn take_children(&mut self, parent: NodeId) -> Vec<NodeId> {
        self.nodes[parent.index()]
            .children_mut()
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Replace `parent`'s child list, re-parenting every child.
    pub fn set_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        for &child in &children {
            self.nodes[child.index()].parent = Some(parent);
        }
        if let Some(slot) = self.nodes[parent.index()].children_mut() {
            *slot = children;
        }
    }

    /// Unlink a node from its parent.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.index()].parent.take() {
            if let Some(children) = self.nodes[parent.index()].children_mut() {
                children.retain(|&child| child != id);
            }
        }
    }

    /// Put `replacement` where `target` is in its parent's child list.
    pub fn replace(&mut self, target: NodeId, replacement: NodeId) {
        let Some(parent) = self.nodes[target.index()].parent.take() else {
            return;
        };
        if let Some(children) = self.nodes[parent.index()].children_mut() {
            for child in children.iter_mut() {
                if *child == target {
                    *child = replacement;
                }
            }
        }
        self.nodes[replacement.index()].parent = Some(parent);
    }

    /// Deep-copy a subtree within this tree. The copy is detached.
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let copied = copy_subtree(&self.nodes, id, self.nodes.len());
        let new_id = NodeId::new(self.nodes.len());
        self.nodes.extend(copied);
        new_id
    }

    /// Deep-copy a subtree of `source` into this tree. The copy is detached.
    pub fn graft(&mut self, source: &Tree, id: NodeId) -> NodeId {
        let new_id = NodeId::new(self.nodes.len());
        let copied = copy_subtree(&source.nodes, id, self.nodes.len());
        self.nodes.extend(copied);
        new_id
    }

    /// Move the children of `parent` into a tree of their own.
    ///
    /// The new root carries the scope visible at `parent`, so expressions in
    /// the extracted content keep resolving the names they saw in place.
    pub fn extract(&mut self, parent: NodeId) -> Tree {
        let mut extracted = Tree::with_scope(self.scope_at(parent));
        for child in self.take_children(parent) {
            let copy = extracted.graft(self, child);
            extracted.append(Self::ROOT, copy);
            self.nodes[child.index()].parent = None;
        }
        extracted
    }

    // --- queries ---

    /// The scope visible at `id`.
    ///
    /// Scopes are merged from `id` upwards until (and including) the nearest
    /// isolated container; nearer bindings win.
    pub fn scope_at(&self, id: NodeId) -> Scope {
        let mut layers: Vec<&Scope> = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &self.nodes[node_id.index()];
            if let Some((scope, isolated)) = node.scope() {
                layers.push(scope);
                if isolated {
                    break;
                }
            }
            current = node.parent;
        }

        let mut scope = Scope::new();
        for layer in layers.into_iter().rev() {
            crate::scope::overlay(&mut scope, layer);
        }
        scope
    }

    /// All nodes below `id` in document order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { tree: self, stack }
    }

    /// Concatenated text of every text node below `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node_id in self.descendants(id) {
            if let NodeKind::Text(text) = self.kind(node_id) {
                out.push_str(&text.content);
            }
        }
        out
    }

    /// Copy the nodes reachable from the root into a fresh arena.
    pub fn compacted(&self) -> Tree {
        Tree {
            nodes: copy_subtree(&self.nodes, Self::ROOT, 0),
        }
    }

    /// Check the structural invariants: every reachable child points back
    /// at its parent, appears in exactly one child list, void elements are
    /// empty, and a doctype only appears as the first child of the root.
    pub fn is_consistent(&self) -> bool {
        let mut seen = vec![false; self.nodes.len()];
        seen[Self::ROOT.index()] = true;
        if self.nodes[Self::ROOT.index()].parent.is_some() {
            return false;
        }

        let mut stack = vec![Self::ROOT];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.index()];
            if let NodeKind::Element(element) = &node.kind {
                if element.is_void && !element.children.is_empty() {
                    return false;
                }
            }
            for (index, &child) in node.children().iter().enumerate() {
                if child.index() >= self.nodes.len() || seen[child.index()] {
                    return false;
                }
                seen[child.index()] = true;
                let child_node = &self.nodes[child.index()];
                if child_node.parent != Some(id) {
                    return false;
                }
                if matches!(child_node.kind, NodeKind::Doctype) && (id != Self::ROOT || index != 0)
                {
                    return false;
                }
                stack.push(child);
            }
        }
        true
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

/// Copy the subtree at `id` into a new run of nodes whose ids start at
/// `base`. The copied subtree root is detached.
fn copy_subtree(source: &[Node], id: NodeId, base: usize) -> Vec<Node> {
    let mut order = Vec::new();
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        order.push(current);
        stack.extend(source[current.index()].children().iter().rev().copied());
    }

    let remap: FxHashMap<NodeId, NodeId> = order
        .iter()
        .enumerate()
        .map(|(offset, &old)| (old, NodeId::new(base + offset)))
        .collect();

    order
        .iter()
        .map(|&old| {
            let mut node = source[old.index()].clone();
            node.parent = if old == id {
                None
            } else {
                node.parent.and_then(|parent| remap.get(&parent).copied())
            };
            if let Some(children) = node.children_mut() {
                for child in children.iter_mut() {
                    if let Some(&mapped) = remap.get(child) {
                        *child = mapped;
                    }
                }
            }
            node
        })
        .collect()
}
