//! Grout - The shared toolbox of Tessera.
//!
//! Grout is the mortar pressed between the tiles of a mosaic: not much to
//! look at on its own, but every other piece is held in place by it. This
//! crate carries the small tables and helpers that every layer of the
//! template engine leans on.
//!
//! # Modules
//!
//! - **Tags**: void elements, reserved HTML tag names and boolean attributes
//! - **Hash**: content fingerprints for detecting changed template sources
//!
//! # Example
//!
//! ```
//! use tessera_grout::{is_html_tag, is_void_tag};
//!
//! assert!(is_void_tag("br"));
//! assert!(is_html_tag("table"));
//! assert!(!is_html_tag("todo-item"));
//! ```

pub mod hash;
pub mod tags;

// Re-export compact_str::CompactString for convenience
pub use compact_str::CompactString;

// Re-export smallvec for stack-optimized collections
pub use smallvec::SmallVec;

// Re-export rustc-hash for fast hash maps
pub use rustc_hash::FxHashMap;

pub use hash::Fingerprint;
pub use tags::*;
