//! Setter - Tree passes and printing for Tessera.
//!
//! Once a template is parsed, every change to it goes through the
//! [`transform`] engine. The passes built on it run in a fixed order:
//!
//! 1. [`flow`]: expand `mx-each` lists into sibling copies
//! 2. composition (in `tessera_mosaic`): splice in nested templates
//! 3. [`flatten`]: fold the fragments composition left behind
//! 4. [`expressor`]: evaluate every `{expression}`
//! 5. [`printer`]: serialize the tree back to HTML
//!
//! Expressions are handed to an [`Evaluator`]; [`StandardEvaluator`] is the
//! bundled implementation.
//!
//! ## Name Origin
//!
//! The **setter** is the mosaicist who presses each tile into the bed,
//! turning a pile of cut pieces into a picture. These passes do the same to
//! a parsed tree.
//!
//! ## Example
//!
//! ```
//! use tessera_chisel::parse_source;
//! use tessera_setter::{apply_each, apply_expressions, print, StandardEvaluator};
//! use tessera_tile::PrintOptions;
//!
//! let mut tree = parse_source(r#"<a mx-each={[1, 2]} mx-as="i">{i}</a>"#).unwrap();
//! let evaluator = StandardEvaluator::new();
//! apply_each(&mut tree, &evaluator);
//! apply_expressions(&mut tree, &evaluator);
//! assert_eq!(print(&tree, PrintOptions::TRIM), "<a>1</a><a>2</a>");
//! ```

pub mod evaluator;
pub mod expressor;
pub mod flatten;
pub mod flow;
pub mod printer;
pub mod transform;
pub mod value;

pub use evaluator::{EvalError, EvalResult, Evaluator, StandardEvaluator, SCOPE_ROOT};
pub use expressor::{apply_expressions, apply_expressions_with_options, express, express_attribute};
pub use flatten::flatten;
pub use flow::{apply_each, AS_ATTRIBUTE, EACH_ATTRIBUTE};
pub use printer::{concat_attribute_value, print, print_node};
pub use transform::{transform, transform_from, Visit};
pub use value::stringify;
