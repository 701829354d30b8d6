//! Scopes: the names visible to expressions at a point in the tree.

pub use serde_json::{Map, Value};

/// A name → value mapping.
pub type Scope = Map<String, Value>;

/// Copy every entry of `overlay` into `base`, replacing entries of the same
/// name.
pub fn overlay(base: &mut Scope, overlay: &Scope) {
    for (name, value) in overlay {
        base.insert(name.clone(), value.clone());
    }
}
