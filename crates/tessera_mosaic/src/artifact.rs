//! Compiled template artifacts and declared attribute types.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tessera_grout::CompactString;
use tessera_setter::value::{number, parse_number, stringify, truthy};
use tessera_setter::{concat_attribute_value, express, Evaluator};
use tessera_tile::{AttributeValue, ElementNode, Scope, Value};

use crate::action::{Action, EmptyAction};
use crate::errors::SourceError;

/// Attribute values passed to a presentation, by name.
pub type Attributes = Scope;

/// What a template was compiled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// `.part`: markup with an optional script
    Partial,
    /// `.md`: Markdown rendered to HTML
    Markdown,
}

impl ArtifactKind {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Partial => "part",
            Self::Markdown => "md",
        }
    }
}

/// Primitive type of a declared attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Number,
    Boolean,
}

impl FromStr for AttributeType {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "boolean" => Ok(Self::Boolean),
            _ => Err(SourceError::UnknownAttributeType {
                name: CompactString::default(),
                ty: s.into(),
            }),
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        })
    }
}

impl AttributeType {
    /// Convert a passed value to this type.
    ///
    /// `null` stays `null`, and lists and objects pass through untouched.
    pub fn coerce(self, name: &str, value: Value) -> Value {
        match (self, value) {
            (_, Value::Null) => Value::Null,
            (_, value @ (Value::Array(_) | Value::Object(_))) => value,
            (Self::String, value) => Value::String(stringify(&value)),
            (Self::Number, Value::Bool(b)) => Value::from(i64::from(b)),
            (Self::Number, Value::String(text)) => match parse_number(&text) {
                Some(n) => number(n),
                None => {
                    tracing::warn!(attribute = name, value = %text, "Attribute is not a number");
                    Value::Null
                }
            },
            (Self::Number, value) => value,
            (Self::Boolean, Value::String(text)) => {
                Value::Bool(!matches!(text.as_str(), "" | "false" | "0"))
            }
            (Self::Boolean, value) => Value::Bool(truthy(&value)),
        }
    }
}

/// Declared attributes, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeTypes {
    entries: Vec<(CompactString, AttributeType)>,
}

impl AttributeTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name`, replacing an earlier declaration of the same name.
    pub fn insert(&mut self, name: impl Into<CompactString>, ty: AttributeType) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = ty,
            None => self.entries.push((name, ty)),
        }
    }

    pub fn get(&self, name: &str) -> Option<AttributeType> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|&(_, ty)| ty)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, AttributeType)> + '_ {
        self.entries.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Coerce the declared entries of `attributes`; undeclared entries are
    /// kept as they are.
    pub fn coerce(&self, mut attributes: Attributes) -> Attributes {
        for (name, ty) in self.iter() {
            if let Some(value) = attributes.get_mut(name) {
                *value = ty.coerce(name, std::mem::take(value));
            }
        }
        attributes
    }

    /// The declared attributes of a calling element, evaluated against the
    /// scope at the call and coerced.
    ///
    /// A single-expression attribute passes its structured value; any other
    /// attribute passes its concatenated text. A bare attribute is `true`
    /// for a boolean and the empty string otherwise.
    pub fn resolve(
        &self,
        evaluator: &dyn Evaluator,
        scope: &Scope,
        element: &ElementNode,
    ) -> Attributes {
        let mut attributes = Attributes::new();
        for attr in &element.attributes {
            let Some(ty) = self.get(&attr.name) else {
                continue;
            };
            let raw = if attr.is_bare() {
                match ty {
                    AttributeType::Boolean => Value::Bool(true),
                    _ => Value::String(String::new()),
                }
            } else if let Some(source) = attr.single_expression() {
                express(evaluator, scope, source)
            } else if attr.has_expressions() {
                let mut text = String::new();
                for fragment in &attr.value {
                    match fragment {
                        AttributeValue::Text(t) => text.push_str(t),
                        AttributeValue::Expression(source) => {
                            text.push_str(&stringify(&express(evaluator, scope, source)))
                        }
                    }
                }
                Value::String(text)
            } else {
                Value::String(concat_attribute_value(attr))
            };
            attributes.insert(attr.name.to_string(), ty.coerce(&attr.name, raw));
        }
        attributes
    }
}

impl<N: Into<CompactString>> FromIterator<(N, AttributeType)> for AttributeTypes {
    fn from_iter<I: IntoIterator<Item = (N, AttributeType)>>(iter: I) -> Self {
        let mut types = Self::new();
        for (name, ty) in iter {
            types.insert(name, ty);
        }
        types
    }
}

/// A compiled template: declared attributes, action and markup.
#[derive(Clone)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub attributes: AttributeTypes,
    pub action: Arc<dyn Action>,
    pub template: String,
}

impl Artifact {
    /// A partial with no attributes and no action.
    pub fn template(template: impl Into<String>) -> Self {
        Self {
            kind: ArtifactKind::Partial,
            attributes: AttributeTypes::new(),
            action: Arc::new(EmptyAction),
            template: template.into(),
        }
    }

    pub fn with_attributes(mut self, attributes: AttributeTypes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_action(mut self, action: impl Action + 'static) -> Self {
        self.action = Arc::new(action);
        self
    }
}

impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artifact")
            .field("kind", &self.kind)
            .field("attributes", &self.attributes)
            .field("template", &self.template)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tessera_chisel::parse_source;
    use tessera_setter::StandardEvaluator;
    use tessera_tile::Tree;

    #[test]
    fn test_coerce_number() {
        let ty = AttributeType::Number;
        assert_eq!(ty.coerce("n", json!("5")), json!(5));
        assert_eq!(ty.coerce("n", json!(" 2.5 ")), json!(2.5));
        assert_eq!(ty.coerce("n", json!(7)), json!(7));
        assert_eq!(ty.coerce("n", json!(true)), json!(1));
        assert_eq!(ty.coerce("n", json!("five")), Value::Null);
    }

    #[test]
    fn test_coerce_boolean() {
        let ty = AttributeType::Boolean;
        for falsy in ["", "false", "0"] {
            assert_eq!(ty.coerce("b", json!(falsy)), json!(false));
        }
        assert_eq!(ty.coerce("b", json!("yes")), json!(true));
        assert_eq!(ty.coerce("b", json!(false)), json!(false));
        assert_eq!(ty.coerce("b", json!(0)), json!(false));
    }

    #[test]
    fn test_coerce_string_keeps_structures() {
        let ty = AttributeType::String;
        assert_eq!(ty.coerce("s", json!(5)), json!("5"));
        assert_eq!(ty.coerce("s", json!([1])), json!([1]));
        assert_eq!(ty.coerce("s", Value::Null), Value::Null);
    }

    #[test]
    fn test_unknown_type() {
        assert!("Date".parse::<AttributeType>().is_err());
        assert_eq!("number".parse::<AttributeType>().unwrap(), AttributeType::Number);
    }

    #[test]
    fn test_insert_replaces() {
        let mut types: AttributeTypes =
            [("a", AttributeType::String), ("b", AttributeType::Number)].into_iter().collect();
        types.insert("a", AttributeType::Boolean);
        assert_eq!(
            types.iter().collect::<Vec<_>>(),
            [("a", AttributeType::Boolean), ("b", AttributeType::Number)]
        );
    }

    #[test]
    fn test_resolve_declared_only() {
        let tree = parse_source(
            r#"<todo-item id={item.id} name="No. {item.name}" done extra="x"></todo-item>"#,
        )
        .unwrap();
        let element = tree.element(tree.children(Tree::ROOT)[0]).unwrap();
        let types: AttributeTypes = [
            ("id", AttributeType::Number),
            ("name", AttributeType::String),
            ("done", AttributeType::Boolean),
        ]
        .into_iter()
        .collect();
        let scope = json!({"item": {"id": 3, "name": "Peace"}}).as_object().cloned().unwrap();

        let attributes = types.resolve(&StandardEvaluator::new(), &scope, element);
        assert_eq!(
            Value::Object(attributes),
            json!({"id": 3, "name": "No. Peace", "done": true})
        );
    }
}
