//! Tile - The template tree of Tessera.
//!
//! Every template is parsed into a [`Tree`]: an arena of [`Node`]s addressed
//! by [`NodeId`]. The passes in `tessera_setter` rewrite trees in place, and
//! composition in `tessera_mosaic` grafts the trees of nested templates into
//! one another.
//!
//! ## Name Origin
//!
//! A **tile** (tessera, in the old tongue) is the single piece a mosaic is
//! made of. This crate defines the pieces; the other crates cut, arrange and
//! set them.

pub mod ast;
pub mod errors;
pub mod options;
pub mod scope;
pub mod tree;

pub use ast::*;
pub use errors::{ErrorCode, ParseError};
pub use options::{ExpressOptions, PrintOptions};
pub use scope::{Scope, Value};
pub use tree::{Descendants, Tree};
