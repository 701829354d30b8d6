//! The expression pass.
//!
//! Runs last, after the flow pass and composition have put every scope
//! binding in place. Each `{...}` placeholder becomes a text node and each
//! expression fragment of an attribute becomes a text fragment, so a second
//! run finds nothing left to evaluate.

use tessera_grout::is_boolean_attribute;
use tessera_tile::{
    Attribute, AttributeValue, ElementNode, ExpressOptions, NodeId, NodeKind, Scope, Tree, Value,
};

use crate::evaluator::Evaluator;
use crate::transform::{transform, Visit};
use crate::value::stringify;

/// Evaluate `text`, turning any failure into `Null`.
///
/// This is the boundary where evaluation errors stop: the failure is logged
/// with the expression and the scope it ran against, and rendering goes on.
pub fn express(evaluator: &dyn Evaluator, scope: &Scope, text: &str) -> Value {
    match evaluator.evaluate(scope, text) {
        Ok(value) => value,
        Err(error) => {
            tracing::error!(
                expression = text,
                scope = %tessera_tile::Value::Object(scope.clone()),
                "{error}"
            );
            Value::Null
        }
    }
}

/// The structured value of attribute `name`.
///
/// `None` unless the attribute exists and its value is exactly one
/// expression fragment.
pub fn express_attribute(
    evaluator: &dyn Evaluator,
    scope: &Scope,
    element: &ElementNode,
    name: &str,
) -> Option<Value> {
    let source = element.attribute(name)?.single_expression()?;
    Some(express(evaluator, scope, source))
}

/// Replace every expression in the tree with its evaluated text.
pub fn apply_expressions(tree: &mut Tree, evaluator: &dyn Evaluator) {
    apply_expressions_with_options(tree, evaluator, ExpressOptions::default());
}

pub fn apply_expressions_with_options(
    tree: &mut Tree,
    evaluator: &dyn Evaluator,
    options: ExpressOptions,
) {
    transform(tree, |tree, id| match tree.kind(id) {
        NodeKind::Element(element) if element.attributes.iter().any(Attribute::has_expressions) => {
            let scope = tree.scope_at(id);
            if let Some(element) = tree.element_mut(id) {
                express_attributes(evaluator, &scope, element, options);
            }
            Visit::Keep
        }
        NodeKind::Expression(expression) => {
            let source = expression.content.clone();
            let value = express(evaluator, &tree.scope_at(id), &source);
            Visit::Replace(add_text(tree, &stringify(&value), options))
        }
        _ => Visit::Keep,
    });
}

fn add_text(tree: &mut Tree, text: &str, options: ExpressOptions) -> NodeId {
    if options.escape {
        tree.add_text(htmlize::escape_text(text).into_owned())
    } else {
        tree.add_text(text)
    }
}

fn express_attributes(
    evaluator: &dyn Evaluator,
    scope: &Scope,
    element: &mut ElementNode,
    options: ExpressOptions,
) {
    let mut attributes = Vec::with_capacity(element.attributes.len());
    for mut attribute in std::mem::take(&mut element.attributes) {
        if !attribute.has_expressions() {
            attributes.push(attribute);
            continue;
        }

        if is_boolean_attribute(&attribute.name) {
            if let Some(source) = attribute.single_expression() {
                match express(evaluator, scope, source) {
                    Value::Bool(true) => {
                        attributes.push(Attribute::bare(attribute.name));
                        continue;
                    }
                    Value::Bool(false) => continue,
                    other => {
                        attributes.push(Attribute::text(
                            attribute.name,
                            escape_attribute(&stringify(&other), options),
                        ));
                        continue;
                    }
                }
            }
        }

        let mut value = String::new();
        for fragment in &attribute.value {
            match fragment {
                AttributeValue::Text(text) => value.push_str(text),
                AttributeValue::Expression(source) => {
                    let evaluated = stringify(&express(evaluator, scope, source));
                    value.push_str(&escape_attribute(&evaluated, options));
                }
            }
        }
        attribute.value.clear();
        attribute.value.push(AttributeValue::Text(value.into()));
        attributes.push(attribute);
    }
    element.attributes = attributes;
}

fn escape_attribute(text: &str, options: ExpressOptions) -> String {
    if options.escape {
        htmlize::escape_attribute(text).into_owned()
    } else {
        text.to_string()
    }
}
