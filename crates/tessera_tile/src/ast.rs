//! Template tree node types.
//!
//! Nodes live in the arena owned by a [`Tree`](crate::Tree) and refer to one
//! another by [`NodeId`]. A node is owned through its parent's child list;
//! the `parent` link is a plain index kept for upward traversal only.

use serde::{Deserialize, Serialize};
use tessera_grout::{is_void_tag, CompactString, SmallVec};

use crate::scope::Scope;

/// Node type discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    Fragment = 0,
    Element = 1,
    Text = 2,
    Expression = 3,
    Doctype = 4,
}

/// Source position in the template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Position {
    /// Byte offset from start of file
    pub offset: u32,
    /// 1-indexed line number
    pub line: u32,
    /// 1-indexed column number
    pub column: u32,
}

impl Position {
    /// Position used for nodes that do not come from source text
    pub const STUB: Self = Self::new(0, 1, 1);

    pub const fn new(offset: u32, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

/// Index of a node inside its tree's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// An arena slot
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
}

impl Node {
    pub(crate) fn detached(kind: NodeKind) -> Self {
        Self { kind, parent: None }
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn node_type(&self) -> NodeType {
        match &self.kind {
            NodeKind::Fragment(_) => NodeType::Fragment,
            NodeKind::Element(_) => NodeType::Element,
            NodeKind::Text(_) => NodeType::Text,
            NodeKind::Expression(_) => NodeType::Expression,
            NodeKind::Doctype => NodeType::Doctype,
        }
    }

    /// Fragments and elements can hold children.
    #[inline]
    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Fragment(_) | NodeKind::Element(_))
    }

    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Fragment(fragment) => &fragment.children,
            NodeKind::Element(element) => &element.children,
            _ => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match &mut self.kind {
            NodeKind::Fragment(fragment) => Some(&mut fragment.children),
            NodeKind::Element(element) => Some(&mut element.children),
            _ => None,
        }
    }

    /// The scope carried by a container, with its isolation flag.
    pub fn scope(&self) -> Option<(&Scope, bool)> {
        match &self.kind {
            NodeKind::Fragment(fragment) => Some((&fragment.scope, fragment.isolated)),
            NodeKind::Element(element) => Some((&element.scope, element.isolated)),
            _ => None,
        }
    }

    pub fn scope_mut(&mut self) -> Option<&mut Scope> {
        match &mut self.kind {
            NodeKind::Fragment(fragment) => Some(&mut fragment.scope),
            NodeKind::Element(element) => Some(&mut element.scope),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Fragment(FragmentNode),
    Element(ElementNode),
    Text(TextNode),
    Expression(ExpressionNode),
    Doctype,
}

/// A transparent container: prints only its children.
///
/// The root of every tree is an isolated fragment. Composition splices
/// child presentations and slot content as isolated fragments so that
/// their names never leak into, or out of, the surrounding template.
#[derive(Debug, Clone, Default)]
pub struct FragmentNode {
    pub children: Vec<NodeId>,
    pub scope: Scope,
    pub isolated: bool,
}

impl FragmentNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn isolated(scope: Scope) -> Self {
        Self {
            children: Vec::new(),
            scope,
            isolated: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ElementNode {
    pub tag: CompactString,
    pub is_void: bool,
    pub attributes: Vec<Attribute>,
    pub children: Vec<NodeId>,
    /// Names bound on this element, visible to its whole subtree
    pub scope: Scope,
    /// Stops scope lookup from reaching past this element
    pub isolated: bool,
    pub position: Position,
}

impl ElementNode {
    pub fn new(tag: impl Into<CompactString>, position: Position) -> Self {
        let tag = tag.into();
        Self {
            is_void: is_void_tag(&tag),
            tag,
            attributes: Vec::new(),
            children: Vec::new(),
            scope: Scope::new(),
            isolated: false,
            position,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.attributes.iter_mut().find(|attr| attr.name == name)
    }

    #[inline]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Remove the first attribute called `name`.
    pub fn remove_attribute(&mut self, name: &str) -> Option<Attribute> {
        let index = self.attributes.iter().position(|attr| attr.name == name)?;
        Some(self.attributes.remove(index))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
    pub content: String,
}

impl TextNode {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// An unevaluated `{...}` placeholder. `content` excludes the braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionNode {
    pub content: CompactString,
    pub position: Position,
}

/// One piece of an attribute value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum AttributeValue {
    Text(CompactString),
    Expression(CompactString),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: CompactString,
    /// Empty for a bare attribute such as `<input disabled>`
    pub value: SmallVec<[AttributeValue; 1]>,
}

impl Attribute {
    pub fn bare(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            value: SmallVec::new(),
        }
    }

    pub fn text(name: impl Into<CompactString>, text: impl Into<CompactString>) -> Self {
        let mut attr = Self::bare(name);
        attr.value.push(AttributeValue::Text(text.into()));
        attr
    }

    pub fn expression(name: impl Into<CompactString>, source: impl Into<CompactString>) -> Self {
        let mut attr = Self::bare(name);
        attr.value.push(AttributeValue::Expression(source.into()));
        attr
    }

    #[inline]
    pub fn is_bare(&self) -> bool {
        self.value.is_empty()
    }

    /// The expression source when the value is exactly one expression
    /// fragment.
    pub fn single_expression(&self) -> Option<&str> {
        match self.value.as_slice() {
            [AttributeValue::Expression(source)] => Some(source),
            _ => None,
        }
    }

    pub fn has_expressions(&self) -> bool {
        self.value
            .iter()
            .any(|fragment| matches!(fragment, AttributeValue::Expression(_)))
    }

    /// The literal value, when no fragment is an expression.
    pub fn literal(&self) -> Option<String> {
        let mut out = String::new();
        for fragment in &self.value {
            match fragment {
                AttributeValue::Text(text) => out.push_str(text),
                AttributeValue::Expression(_) => return None,
            }
        }
        Some(out)
    }
}
