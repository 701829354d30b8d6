//! Actions: the server-side logic that runs once per presentation.

use std::future::Future;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use tessera_grout::CompactString;
use tessera_setter::{express, Evaluator};
use tessera_tile::Scope;

use crate::artifact::Attributes;
use crate::context::Context;
use crate::errors::ActionError;

/// Name under which scripts see the request context
pub const CONTEXT_BINDING: &str = "$context";

/// Produces the local scope of a presentation.
///
/// Invoked exactly once per presentation, at activation. The returned names
/// take precedence over the caller's attributes.
#[async_trait]
pub trait Action: Send + Sync {
    async fn run(
        &self,
        context: &Context,
        attributes: &Attributes,
        evaluator: &dyn Evaluator,
    ) -> Result<Scope, ActionError>;
}

/// An action with no locals.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyAction;

#[async_trait]
impl Action for EmptyAction {
    async fn run(
        &self,
        _context: &Context,
        _attributes: &Attributes,
        _evaluator: &dyn Evaluator,
    ) -> Result<Scope, ActionError> {
        Ok(Scope::new())
    }
}

/// One `const NAME = EXPRESSION` statement of a template script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: CompactString,
    pub expression: String,
}

/// The action compiled from a template script.
///
/// Bindings are evaluated in order. Each one sees the caller's attributes,
/// `$context` and every binding before it; a binding that fails to evaluate
/// is `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptAction {
    bindings: Vec<Binding>,
}

impl ScriptAction {
    pub fn new(bindings: Vec<Binding>) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }
}

#[async_trait]
impl Action for ScriptAction {
    async fn run(
        &self,
        context: &Context,
        attributes: &Attributes,
        evaluator: &dyn Evaluator,
    ) -> Result<Scope, ActionError> {
        let mut scope = attributes.clone();
        scope.insert(CONTEXT_BINDING.into(), context.to_value());

        let mut locals = Scope::new();
        for binding in &self.bindings {
            let value = express(evaluator, &scope, &binding.expression);
            scope.insert(binding.name.to_string(), value.clone());
            locals.insert(binding.name.to_string(), value);
        }
        Ok(locals)
    }
}

type ActionFn =
    dyn Fn(Context, Attributes) -> BoxFuture<'static, Result<Scope, ActionError>> + Send + Sync;

/// An action written in Rust.
///
/// ```
/// use serde_json::json;
/// use tessera_mosaic::{ActionError, FnAction};
///
/// let action = FnAction::new(|context, _attributes| async move {
///     let mut scope = serde_json::Map::new();
///     scope.insert("path".into(), json!(context.path()));
///     Ok::<_, ActionError>(scope)
/// });
/// # let _ = action;
/// ```
pub struct FnAction {
    f: Box<ActionFn>,
}

impl FnAction {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Context, Attributes) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Scope, ActionError>> + Send + 'static,
    {
        Self {
            f: Box::new(move |context, attributes| f(context, attributes).boxed()),
        }
    }
}

impl std::fmt::Debug for FnAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnAction").finish_non_exhaustive()
    }
}

#[async_trait]
impl Action for FnAction {
    async fn run(
        &self,
        context: &Context,
        attributes: &Attributes,
        _evaluator: &dyn Evaluator,
    ) -> Result<Scope, ActionError> {
        (self.f)(context.clone(), attributes.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tessera_setter::StandardEvaluator;
    use tessera_tile::Value;

    fn binding(name: &str, expression: &str) -> Binding {
        Binding {
            name: name.into(),
            expression: expression.into(),
        }
    }

    #[tokio::test]
    async fn test_script_bindings_see_earlier_bindings() {
        let action = ScriptAction::new(vec![
            binding("base", "chapter * 10"),
            binding("label", "`${gift}-${base}`"),
        ]);
        let attributes = json!({"gift": "Joy", "chapter": 2}).as_object().cloned().unwrap();
        let locals = action
            .run(&Context::default(), &attributes, &StandardEvaluator::new())
            .await
            .unwrap();
        assert_eq!(Value::Object(locals), json!({"base": 20, "label": "Joy-20"}));
    }

    #[tokio::test]
    async fn test_script_sees_context() {
        let action = ScriptAction::new(vec![binding("here", "$context.path")]);
        let locals = action
            .run(&Context::new("/todos"), &Attributes::new(), &StandardEvaluator::new())
            .await
            .unwrap();
        assert_eq!(locals.get("here"), Some(&json!("/todos")));
    }

    #[tokio::test]
    async fn test_failing_binding_is_null() {
        let action = ScriptAction::new(vec![binding("x", "missing.deeper"), binding("y", "1")]);
        let locals = action
            .run(&Context::default(), &Attributes::new(), &StandardEvaluator::new())
            .await
            .unwrap();
        assert_eq!(locals.get("x"), Some(&Value::Null));
        assert_eq!(locals.get("y"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn test_fn_action() {
        let action = FnAction::new(|_, attributes| async move {
            match attributes.get("fail") {
                Some(_) => Err(ActionError::new("nope")),
                None => Ok(Scope::new()),
            }
        });
        let evaluator = StandardEvaluator::new();
        assert!(action
            .run(&Context::default(), &Attributes::new(), &evaluator)
            .await
            .is_ok());
        let failing = json!({"fail": true}).as_object().cloned().unwrap();
        assert_eq!(
            action.run(&Context::default(), &failing, &evaluator).await,
            Err(ActionError::new("nope"))
        );
    }
}
