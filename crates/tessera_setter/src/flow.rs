//! The flow pass: list expansion with `mx-each` / `mx-as`.
//!
//! ```html
//! <li mx-each={items} mx-as="item">{item.name}</li>
//! ```
//!
//! expands into one `<li>` per entry of `items`. Each copy binds `item` in
//! its own element scope, so every expression in its subtree sees that entry
//! and no other.

use tessera_tile::{NodeId, Tree, Value};

use crate::evaluator::Evaluator;
use crate::expressor::express_attribute;
use crate::transform::{transform, Visit};

/// Attribute holding the list to iterate
pub const EACH_ATTRIBUTE: &str = "mx-each";

/// Attribute naming the binding for the current entry
pub const AS_ATTRIBUTE: &str = "mx-as";

/// Expand every element carrying `mx-each`.
///
/// Misuse never fails the pass: a missing `mx-as`, a value that is not a
/// list, or a stray `mx-as` is logged and the attributes are dropped without
/// expansion.
pub fn apply_each(tree: &mut Tree, evaluator: &dyn Evaluator) {
    transform(tree, |tree, id| {
        let Some(element) = tree.element(id) else {
            return Visit::Keep;
        };
        let has_each = element.has_attribute(EACH_ATTRIBUTE);
        let has_as = element.has_attribute(AS_ATTRIBUTE);
        if !has_each {
            if has_as {
                tracing::warn!(tag = %element.tag, "Unused '{AS_ATTRIBUTE}' attribute without '{EACH_ATTRIBUTE}'");
                strip(tree, id);
            }
            return Visit::Keep;
        }

        let bind = element
            .attribute(AS_ATTRIBUTE)
            .and_then(|attr| attr.literal())
            .filter(|name| !name.trim().is_empty());
        let Some(bind) = bind else {
            tracing::warn!(tag = %element.tag, "Missing '{AS_ATTRIBUTE}' attribute in '{EACH_ATTRIBUTE}' iterator");
            strip(tree, id);
            return Visit::Keep;
        };

        let scope = tree.scope_at(id);
        let items = match express_attribute(evaluator, &scope, element, EACH_ATTRIBUTE) {
            Some(Value::Array(items)) => items,
            _ => {
                tracing::warn!(tag = %element.tag, "Invalid '{EACH_ATTRIBUTE}' attribute, not an Array");
                strip(tree, id);
                return Visit::Keep;
            }
        };

        strip(tree, id);
        let bind = bind.trim().to_string();
        let copies = items
            .into_iter()
            .map(|item| {
                let copy = tree.clone_subtree(id);
                if let Some(element) = tree.element_mut(copy) {
                    element.scope.insert(bind.clone(), item);
                }
                copy
            })
            .collect();
        Visit::Splice(copies)
    });
}

fn strip(tree: &mut Tree, id: NodeId) {
    if let Some(element) = tree.element_mut(id) {
        element
            .attributes
            .retain(|attr| attr.name != EACH_ATTRIBUTE && attr.name != AS_ATTRIBUTE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::StandardEvaluator;
    use crate::expressor::apply_expressions;
    use serde_json::json;
    use tessera_chisel::parse_source;
    use tessera_tile::ElementNode;

    fn expand(source: &str) -> Tree {
        let mut tree = parse_source(source).unwrap();
        apply_each(&mut tree, &StandardEvaluator::new());
        assert!(tree.is_consistent());
        tree
    }

    fn elements(tree: &Tree) -> Vec<&ElementNode> {
        tree.descendants(Tree::ROOT)
            .filter_map(|id| tree.element(id))
            .collect()
    }

    #[test]
    fn test_expands_in_order() {
        let tree = expand(r#"<a mx-each={[1, 2, 3]} mx-as="i">{i}</a>"#);
        let anchors = elements(&tree);
        assert_eq!(anchors.len(), 3);
        for (index, anchor) in anchors.iter().enumerate() {
            assert!(anchor.attributes.is_empty());
            assert_eq!(anchor.scope.get("i"), Some(&json!(index + 1)));
        }
    }

    #[test]
    fn test_empty_list_removes_element() {
        let tree = expand(r#"<ul><li mx-each={[]} mx-as="i"></li></ul>"#);
        assert_eq!(elements(&tree).len(), 1);
    }

    #[test]
    fn test_missing_as_is_not_expanded() {
        let tree = expand(r#"<hr mx-each={[1, 2]}>"#);
        let hrs = elements(&tree);
        assert_eq!(hrs.len(), 1);
        assert!(hrs[0].attributes.is_empty());
    }

    #[test]
    fn test_not_a_list_is_not_expanded() {
        let tree = expand(r#"<p mx-each={5} mx-as="n" id="x"></p><b mx-as="y"></b>"#);
        let found = elements(&tree);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].attributes.len(), 1);
        assert_eq!(found[0].attributes[0].name, "id");
        assert!(found[1].attributes.is_empty());
    }

    #[test]
    fn test_copies_are_independent() {
        let mut tree = expand(r#"<a mx-each={[1, 2]} mx-as="i"><b>{i}</b></a>"#);
        let first_b = tree
            .descendants(Tree::ROOT)
            .find(|&id| tree.element(id).is_some_and(|e| e.tag == "b"))
            .unwrap();
        tree.element_mut(first_b).unwrap().scope.insert("i".into(), json!(9));

        apply_expressions(&mut tree, &StandardEvaluator::new());
        assert_eq!(tree.text_content(Tree::ROOT), "92");
    }

    #[test]
    fn test_nested_lists_see_outer_binding() {
        let mut tree = expand(
            r#"<ul mx-each={[[1, 2], [3]]} mx-as="row"><li mx-each={row} mx-as="cell">{cell}</li></ul>"#,
        );
        apply_expressions(&mut tree, &StandardEvaluator::new());
        let uls: Vec<_> = tree.children(Tree::ROOT).to_vec();
        assert_eq!(uls.len(), 2);
        assert_eq!(tree.text_content(uls[0]), "12");
        assert_eq!(tree.text_content(uls[1]), "3");
    }

    #[test]
    fn test_list_from_scope() {
        let mut tree = parse_source(r#"<i mx-each={items} mx-as="item">{item.name}</i>"#).unwrap();
        tree.root_scope_mut()
            .insert("items".into(), json!([{"name": "Love"}, {"name": "Joy"}]));
        let evaluator = StandardEvaluator::new();
        apply_each(&mut tree, &evaluator);
        apply_expressions(&mut tree, &evaluator);
        assert_eq!(tree.text_content(Tree::ROOT), "LoveJoy");
    }
}
