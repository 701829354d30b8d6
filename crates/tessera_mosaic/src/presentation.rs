//! Presentations: one render of a representation.
//!
//! A presentation moves through four stages, each consuming the tree left
//! by the one before:
//!
//! 1. **Activate** runs the action and fills the root scope. Action locals
//!    win over caller attributes of the same name.
//! 2. **Compose** expands `mx-each`, then replaces every registered custom
//!    tag with its own composed presentation. Content written between a
//!    custom tag's open and close tags fills the callee's first `<slot>`.
//! 3. **Flatten** folds the fragments left by composition into their
//!    parents.
//! 4. **Render** evaluates the remaining expressions and prints HTML.
//!
//! Sibling custom tags are composed concurrently; they are spliced back in
//! document order.

use std::sync::Arc;

use futures::future::{try_join_all, BoxFuture};
use futures::FutureExt;
use tessera_grout::{is_html_tag, is_slot_tag, CompactString};
use tessera_setter::{apply_each, apply_expressions_with_options, flatten, print, Evaluator};
use tessera_tile::scope::overlay;
use tessera_tile::{ExpressOptions, FragmentNode, NodeId, NodeKind, PrintOptions, Tree};

use crate::artifact::Attributes;
use crate::context::Context;
use crate::director::Director;
use crate::errors::CompositionError;
use crate::representation::Representation;

/// Stage a presentation has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresentationState {
    Created,
    Activated,
    Composed,
    Flattened,
    Rendered,
}

/// A representation being rendered for one request.
#[derive(Debug)]
pub struct Presentation {
    representation: Arc<Representation>,
    tree: Tree,
    context: Context,
    attributes: Attributes,
    lineage: Vec<CompactString>,
    state: PresentationState,
}

impl Presentation {
    pub(crate) fn new(
        representation: Arc<Representation>,
        context: Context,
        attributes: Attributes,
        lineage: Vec<CompactString>,
    ) -> Self {
        let tree = representation.tree().clone();
        Self {
            representation,
            tree,
            context,
            attributes,
            lineage,
            state: PresentationState::Created,
        }
    }

    #[inline]
    pub fn tag(&self) -> &str {
        self.representation.tag()
    }

    #[inline]
    pub fn state(&self) -> PresentationState {
        self.state
    }

    #[inline]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    #[inline]
    pub fn lineage(&self) -> &[CompactString] {
        &self.lineage
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }

    /// Run the action and build the root scope.
    pub async fn activate(&mut self, evaluator: &dyn Evaluator) -> Result<(), CompositionError> {
        self.ensure(PresentationState::Created)?;
        self.check_cancelled()?;

        let locals = self
            .representation
            .artifact()
            .action
            .run(&self.context, &self.attributes, evaluator)
            .await
            .map_err(|source| CompositionError::Action {
                tag: self.representation.tag().into(),
                source,
            })?;

        let scope = self.tree.root_scope_mut();
        overlay(scope, &self.attributes);
        overlay(scope, &locals);

        self.state = PresentationState::Activated;
        Ok(())
    }

    /// Expand `mx-each` and compose every registered custom tag.
    pub async fn compose(&mut self, director: &Director) -> Result<(), CompositionError> {
        self.ensure(PresentationState::Activated)?;

        apply_each(&mut self.tree, director.evaluator());
        compose_tree(director, &mut self.tree, &self.context, &self.lineage).await?;

        self.state = PresentationState::Composed;
        Ok(())
    }

    pub fn flatten(&mut self) -> Result<(), CompositionError> {
        self.ensure(PresentationState::Composed)?;
        self.tree = flatten(&self.tree);
        self.state = PresentationState::Flattened;
        Ok(())
    }

    /// Evaluate the remaining expressions and print the tree.
    pub fn render(
        &mut self,
        evaluator: &dyn Evaluator,
        express: ExpressOptions,
        options: PrintOptions,
    ) -> Result<String, CompositionError> {
        self.ensure(PresentationState::Flattened)?;
        apply_expressions_with_options(&mut self.tree, evaluator, express);
        let html = print(&self.tree, options);
        self.state = PresentationState::Rendered;
        Ok(html)
    }

    fn ensure(&self, expected: PresentationState) -> Result<(), CompositionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(CompositionError::InvalidState {
                tag: self.representation.tag().into(),
                expected,
                found: self.state,
            })
        }
    }

    fn check_cancelled(&self) -> Result<(), CompositionError> {
        if self.context.is_cancelled() {
            return Err(CompositionError::Cancelled {
                tag: self.representation.tag().into(),
            });
        }
        Ok(())
    }
}

/// A custom tag to replace, with the representation it resolved to.
struct Call {
    id: NodeId,
    representation: Arc<Representation>,
}

/// Compose every outermost custom tag in `tree`.
///
/// `lineage` is the chain of tags whose template `tree` belongs to.
fn compose_tree<'a>(
    director: &'a Director,
    tree: &'a mut Tree,
    context: &'a Context,
    lineage: &'a [CompactString],
) -> BoxFuture<'a, Result<(), CompositionError>> {
    async move {
        let calls = find_calls(director, tree, lineage)?;
        if calls.is_empty() {
            return Ok(());
        }

        let evaluator = director.evaluator();
        let mut jobs = Vec::with_capacity(calls.len());
        for call in calls {
            let attributes = match tree.element(call.id) {
                Some(element) => call.representation.artifact().attributes.resolve(
                    evaluator,
                    &tree.scope_at(call.id),
                    element,
                ),
                None => Attributes::new(),
            };
            let slot = tree.extract(call.id);
            jobs.push((call, attributes, slot));
        }

        let composed = try_join_all(jobs.into_iter().map(move |(call, attributes, mut slot)| {
            async move {
                let tag = CompactString::from(call.representation.tag());
                if context.is_cancelled() {
                    return Err(CompositionError::Cancelled { tag });
                }

                // Slot content belongs to the caller's template
                compose_tree(director, &mut slot, context, lineage).await?;

                let mut child_lineage = lineage.to_vec();
                child_lineage.push(tag);
                let mut child = call
                    .representation
                    .present(context.clone(), attributes, child_lineage);
                child.activate(evaluator).await?;
                child.compose(director).await?;
                tracing::debug!(tag = child.tag(), depth = lineage.len(), "Composed");

                Ok::<_, CompositionError>((call.id, child.into_tree(), slot))
            }
        }))
        .await?;

        for (id, child, slot) in composed {
            let fragment = splice(tree, &child, &slot);
            tree.replace(id, fragment);
        }

        if context.is_cancelled() {
            return Err(CompositionError::Cancelled {
                tag: lineage.last().cloned().unwrap_or_default(),
            });
        }
        Ok(())
    }
    .boxed()
}

/// Collect the outermost registered custom tags in document order.
///
/// Unknown custom tags stay as literal markup; their content is still
/// searched.
fn find_calls(
    director: &Director,
    tree: &Tree,
    lineage: &[CompactString],
) -> Result<Vec<Call>, CompositionError> {
    let mut calls = Vec::new();
    let mut stack: Vec<NodeId> = tree.children(Tree::ROOT).iter().rev().copied().collect();
    while let Some(id) = stack.pop() {
        if let NodeKind::Element(element) = tree.kind(id) {
            let tag = element.tag.as_str();
            if !is_html_tag(tag) && !is_slot_tag(tag) {
                if lineage.iter().any(|ancestor| ancestor == tag) {
                    let mut chain = lineage.to_vec();
                    chain.push(element.tag.clone());
                    return Err(CompositionError::Circular { chain });
                }
                if let Some(representation) = director.represent(tag) {
                    calls.push(Call { id, representation });
                    continue;
                }
                tracing::warn!(tag, "Unknown tag left as literal markup");
            }
        }
        stack.extend(tree.children(id).iter().rev().copied());
    }
    Ok(calls)
}

/// Copy a composed child into `tree` as an isolated fragment and fill its
/// first slot with the caller's content.
fn splice(tree: &mut Tree, child: &Tree, content: &Tree) -> NodeId {
    let fragment = tree.add_fragment(FragmentNode::isolated(child.root_scope().clone()));
    for &id in child.children(Tree::ROOT) {
        let copy = tree.graft(child, id);
        tree.append(fragment, copy);
    }

    let slots: Vec<NodeId> = tree
        .descendants(fragment)
        .filter(|&id| tree.element(id).is_some_and(|element| is_slot_tag(&element.tag)))
        .collect();
    let Some((&first, rest)) = slots.split_first() else {
        return fragment;
    };

    let filled = if has_content(content) {
        let filled = tree.add_fragment(FragmentNode::isolated(content.root_scope().clone()));
        for &id in content.children(Tree::ROOT) {
            let copy = tree.graft(content, id);
            tree.append(filled, copy);
        }
        filled
    } else {
        // fallback
        let filled = tree.add_fragment(FragmentNode::new());
        let children = tree.take_children(first);
        tree.set_children(filled, children);
        filled
    };
    tree.replace(first, filled);
    for &extra in rest {
        tree.detach(extra);
    }
    fragment
}

fn has_content(content: &Tree) -> bool {
    content
        .children(Tree::ROOT)
        .iter()
        .any(|&id| !matches!(content.kind(id), NodeKind::Text(text) if text.content.trim().is_empty()))
}
