//! Fragment flattening.
//!
//! Composition leaves a nested fragment wherever a child template or slot
//! content was spliced in. Once composition is over those wrappers only
//! carry scope, so they are folded into their parent: each element child
//! takes over the fragment's scope and becomes isolated in its place.
//! An element that is already isolated keeps its scope unchanged.

use tessera_tile::scope::overlay;
use tessera_tile::{NodeId, NodeKind, Tree};

/// Unwrap the nested fragments of `tree` and return it compacted.
///
/// A fragment that carries scope stays in place while one of its direct
/// children is an expression placeholder, since a placeholder has no scope
/// of its own to receive it.
pub fn flatten(tree: &Tree) -> Tree {
    let mut tree = tree.clone();
    let containers: Vec<NodeId> = std::iter::once(Tree::ROOT)
        .chain(tree.descendants(Tree::ROOT))
        .filter(|&id| tree.node(id).is_container())
        .collect();

    // Children first, so that a fragment nested in a fragment is already
    // folded when its parent is visited.
    for &container in containers.iter().rev() {
        let children = tree.take_children(container);
        let mut flattened = Vec::with_capacity(children.len());
        for child in children {
            if unwraps(&tree, child) {
                flattened.extend(unwrap_fragment(&mut tree, child));
            } else {
                flattened.push(child);
            }
        }
        tree.set_children(container, flattened);
    }

    tree.compacted()
}

fn unwraps(tree: &Tree, id: NodeId) -> bool {
    let NodeKind::Fragment(fragment) = tree.kind(id) else {
        return false;
    };
    if !fragment.isolated && fragment.scope.is_empty() {
        return true;
    }
    !fragment
        .children
        .iter()
        .any(|&child| matches!(tree.kind(child), NodeKind::Expression(_)))
}

/// Push the fragment's scope down onto its element children and return the
/// children.
fn unwrap_fragment(tree: &mut Tree, id: NodeId) -> Vec<NodeId> {
    let (scope, isolated) = match tree.kind(id) {
        NodeKind::Fragment(fragment) => (fragment.scope.clone(), fragment.isolated),
        _ => return vec![id],
    };
    let children = tree.take_children(id);
    if isolated || !scope.is_empty() {
        for &child in &children {
            if let Some(element) = tree.element_mut(child) {
                // Already folded out of an isolated fragment nested inside
                // this one; its scope is complete.
                if element.isolated {
                    continue;
                }
                let mut merged = scope.clone();
                overlay(&mut merged, &element.scope);
                element.scope = merged;
                element.isolated |= isolated;
            }
        }
    }
    children
}
