//! Expression evaluation.
//!
//! Passes never interpret expression text themselves; they hand it to an
//! [`Evaluator`] together with the scope visible at the expression. The
//! bundled [`StandardEvaluator`] understands a side-effect-free subset of
//! JavaScript expressions:
//!
//! - literals: numbers, strings, template strings, `true`, `false`, `null`,
//!   `undefined`, arrays and objects (with shorthand properties)
//! - names from the scope, and the whole scope as `$scope`
//! - member access: `a.b`, `a?.b`, `a[i]`, `.length`
//! - operators: `! - + typeof void`, `** * / %`, `+ -`, `< <= > >=`,
//!   `== != === !==`, `&& || ??`, `?:`
//!
//! Expression text is parsed with `oxc_parser` as a TypeScript expression,
//! so `as`, `satisfies` and `!` wrappers are accepted and ignored. Calls,
//! assignments, functions and any other node outside the subset are
//! rejected before evaluation starts, including inside branches that would
//! short-circuit.

mod interpret;
mod syntax;

use oxc_allocator::Allocator;
use tessera_grout::CompactString;
use tessera_tile::{Scope, Value};
use thiserror::Error;

pub use self::interpret::SCOPE_ROOT;

/// Evaluation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("Syntax error: {message}")]
    Syntax { message: String },

    #[error("'{name}' is not defined")]
    UndefinedName { name: CompactString },

    #[error("Type error: {message}")]
    Type { message: String },
}

pub type EvalResult<T> = Result<T, EvalError>;

/// Evaluates expression text against a scope.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, scope: &Scope, expression: &str) -> EvalResult<Value>;
}

/// The built-in expression evaluator.
///
/// Each call parses into a fresh arena; nothing is shared between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEvaluator;

impl StandardEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for StandardEvaluator {
    fn evaluate(&self, scope: &Scope, expression: &str) -> EvalResult<Value> {
        let allocator = Allocator::default();
        let expr = syntax::parse(&allocator, expression)?;
        interpret::evaluate(&expr, scope)
    }
}
