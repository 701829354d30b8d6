//! Chisel - The template parser of Tessera.
//!
//! Template text is cut in two strokes: the [`tokenizer`] scans markup and
//! `{expression}` placeholders into a flat token stream, and the [`parser`]
//! builds a [`Tree`] from it with an explicit stack of open elements.
//!
//! ## Name Origin
//!
//! Tesserae are cut from stone rods with a **chisel** and a hardie before they
//! are set. This crate does the cutting: raw text goes in, tiles come out.
//!
//! ## Example
//!
//! ```
//! use tessera_chisel::parse_source;
//!
//! let tree = parse_source("<p class=\"greeting\">Hello, {name}!</p>").unwrap();
//! let p = tree.children(tree.root())[0];
//! assert_eq!(tree.element(p).unwrap().tag, "p");
//! assert_eq!(tree.children(p).len(), 3);
//! ```

pub mod parser;
pub mod tokenizer;

pub use parser::{parse, Parser};
pub use tokenizer::{scan, LineIndex, Token, TokenKind, Tokenizer};

use tessera_tile::{ParseError, Tree};

/// Scan and parse template text into a tree.
pub fn parse_source(source: &str) -> Result<Tree, ParseError> {
    let tokens = scan(source)?;
    parse(source, &tokens)
}
