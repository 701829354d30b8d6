//! The tree transform engine.
//!
//! [`transform`] walks a tree one level at a time. The visitor is called once
//! for every existing child of a container and decides what takes that
//! child's place. Only after the whole level is resolved does the engine
//! descend, and it descends into the *resulting* children, so whatever a
//! visitor puts in place of a node is itself walked.
//!
//! The engine re-parents every node it attaches; visitors never need to fix
//! parent links themselves.

use tessera_tile::{NodeId, Tree};

/// What takes a visited node's place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visit {
    /// Leave the node where it is.
    Keep,
    /// Put another (detached) node in its place.
    Replace(NodeId),
    /// Put several (detached) nodes in its place, in order.
    Splice(Vec<NodeId>),
    /// Drop the node.
    Remove,
}

/// Rewrite every node below the root.
pub fn transform<F>(tree: &mut Tree, visit: F)
where
    F: FnMut(&mut Tree, NodeId) -> Visit,
{
    transform_from(tree, Tree::ROOT, visit);
}

/// Rewrite every node below `container`.
///
/// While the visitor runs, the node being visited still points at its
/// parent, so [`Tree::scope_at`] sees the scope chain it was authored in.
pub fn transform_from<F>(tree: &mut Tree, container: NodeId, mut visit: F)
where
    F: FnMut(&mut Tree, NodeId) -> Visit,
{
    let mut pending = vec![container];
    while let Some(parent) = pending.pop() {
        let children = tree.take_children(parent);
        let mut resolved = Vec::with_capacity(children.len());
        for child in children {
            match visit(tree, child) {
                Visit::Keep => resolved.push(child),
                Visit::Replace(node) => resolved.push(node),
                Visit::Splice(nodes) => resolved.extend(nodes),
                Visit::Remove => {}
            }
        }

        pending.extend(
            resolved
                .iter()
                .rev()
                .copied()
                .filter(|&child| tree.node(child).is_container()),
        );
        tree.set_children(parent, resolved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_chisel::parse_source;
    use tessera_tile::{ElementNode, NodeKind, Position};

    fn tags(tree: &Tree) -> Vec<String> {
        tree.descendants(Tree::ROOT)
            .filter_map(|id| tree.element(id).map(|e| e.tag.to_string()))
            .collect()
    }

    #[test]
    fn test_keep_visits_every_node_in_order() {
        let mut tree = parse_source("<a><b></b><c><d></d></c></a><e></e>").unwrap();
        let mut seen = Vec::new();
        transform(&mut tree, |tree, id| {
            if let Some(element) = tree.element(id) {
                seen.push(element.tag.to_string());
            }
            Visit::Keep
        });
        assert_eq!(seen, ["a", "e", "b", "c", "d"]);
        assert!(tree.is_consistent());
    }

    #[test]
    fn test_remove_and_splice() {
        let mut tree = parse_source("<ul><li>a</li><x-drop></x-drop><li>b</li></ul>").unwrap();
        transform(&mut tree, |tree, id| match tree.element(id) {
            Some(element) if element.tag == "x-drop" => Visit::Remove,
            Some(element) if element.tag == "li" => {
                let copy = tree.clone_subtree(id);
                Visit::Splice(vec![id, copy])
            }
            _ => Visit::Keep,
        });
        assert_eq!(tags(&tree), ["ul", "li", "li", "li", "li"]);
        assert_eq!(tree.text_content(Tree::ROOT), "aabb");
        assert!(tree.is_consistent());
    }

    #[test]
    fn test_replacements_are_walked() {
        let mut tree = parse_source("<outer-tag></outer-tag>").unwrap();
        transform(&mut tree, |tree, id| {
            let Some(element) = tree.element(id) else {
                return Visit::Keep;
            };
            if element.tag != "outer-tag" {
                return Visit::Keep;
            }
            let section = tree.add_element(ElementNode::new("section", Position::STUB));
            let inner = tree.add_element(ElementNode::new("outer-tag-inner", Position::STUB));
            tree.append(section, inner);
            Visit::Replace(section)
        });
        assert_eq!(tags(&tree), ["section", "outer-tag-inner"]);
        assert!(tree.is_consistent());
    }

    #[test]
    fn test_visitor_sees_parent_chain() {
        let mut tree = parse_source("<p>{a}</p>").unwrap();
        let p = tree.children(Tree::ROOT)[0];
        let mut parents = Vec::new();
        transform(&mut tree, |tree, id| {
            if matches!(tree.kind(id), NodeKind::Expression(_)) {
                parents.push(tree.parent(id));
            }
            Visit::Keep
        });
        assert_eq!(parents, [Some(p)]);
    }
}
