//! Representations: a compiled template bound to a tag.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tessera_chisel::parse_source;
use tessera_grout::{CompactString, Fingerprint};
use tessera_tile::{ParseError, Tree};

use crate::artifact::{Artifact, Attributes};
use crate::context::Context;
use crate::presentation::Presentation;

/// The file a representation was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub path: PathBuf,
    pub fingerprint: Fingerprint,
}

/// A registered template.
///
/// The template is parsed once; every presentation works on its own copy of
/// the tree.
#[derive(Debug)]
pub struct Representation {
    tag: CompactString,
    artifact: Artifact,
    tree: Tree,
    origin: Option<Origin>,
}

impl Representation {
    pub fn new(
        tag: impl Into<CompactString>,
        artifact: Artifact,
        origin: Option<Origin>,
    ) -> Result<Self, ParseError> {
        let tree = if artifact.template.trim().is_empty() {
            Tree::new()
        } else {
            parse_source(&artifact.template)?
        };
        Ok(Self {
            tag: tag.into(),
            artifact,
            tree,
            origin,
        })
    }

    #[inline]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[inline]
    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    #[inline]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    #[inline]
    pub fn origin(&self) -> Option<&Origin> {
        self.origin.as_ref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.origin.as_ref().map(|origin| origin.path.as_path())
    }

    /// Start a presentation of this template for one render.
    ///
    /// `lineage` is the chain of tags composing this one, ending with this
    /// representation's own tag.
    pub fn present(
        self: &Arc<Self>,
        context: Context,
        attributes: Attributes,
        lineage: Vec<CompactString>,
    ) -> Presentation {
        Presentation::new(Arc::clone(self), context, attributes, lineage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_template() {
        let rep = Representation::new("x-empty", Artifact::template("  \n"), None).unwrap();
        assert!(rep.tree().children(Tree::ROOT).is_empty());
    }

    #[test]
    fn test_parse_error() {
        assert!(Representation::new("x-bad", Artifact::template("<p>{oops</p>"), None).is_err());
    }

    #[test]
    fn test_present_copies_tree() {
        let rep = Arc::new(
            Representation::new("x-gift", Artifact::template("<p>{gift}</p>"), None).unwrap(),
        );
        let presentation = rep.present(Context::default(), Attributes::new(), vec!["x-gift".into()]);
        assert_eq!(presentation.tag(), "x-gift");
        assert_eq!(presentation.tree().children(Tree::ROOT).len(), 1);
        assert_eq!(rep.tree().children(Tree::ROOT).len(), 1);
    }
}
