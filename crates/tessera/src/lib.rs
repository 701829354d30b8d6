//! # Tessera
//!
//! Server-side hypermedia templates written in Rust.
//!
//! This crate re-exports all Tessera sub-crates for unified documentation.
//!
//! ## Crates
//!
//! - [`grout`] - Shared tag tables, fingerprints and collection types
//! - [`tile`] - Template tree, scopes and parse errors
//! - [`chisel`] - Tokenizer and tree builder
//! - [`setter`] - Tree passes, expression evaluation and printing
//! - [`mosaic`] - Template registry and composition

/// Shared tag tables, fingerprints and collection types.
pub use tessera_grout as grout;

/// Template tree, scopes and parse errors.
pub use tessera_tile as tile;

/// Tokenizer and tree builder.
pub use tessera_chisel as chisel;

/// Tree passes, expression evaluation and printing.
pub use tessera_setter as setter;

/// Template registry and composition.
pub use tessera_mosaic as mosaic;
