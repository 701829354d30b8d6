//! The director: the registry of representations and the render entrypoint.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tessera_grout::{is_html_tag, is_slot_tag, CompactString, Fingerprint, FxHashMap};
use tessera_setter::{Evaluator, StandardEvaluator};
use tessera_tile::PrintOptions;

use crate::artifact::{Artifact, Attributes};
use crate::context::Context;
use crate::errors::{DirectorError, RenderError};
use crate::options::DirectorOptions;
use crate::representation::{Origin, Representation};
use crate::source::Source;

/// Resolves tags to representations and renders them.
///
/// One director is built at startup and shared by reference. Every
/// registry read and write goes through a single lock; lookups of tags
/// that are not registered yet load the backing file outside it.
pub struct Director {
    options: DirectorOptions,
    evaluator: Arc<dyn Evaluator>,
    representations: Mutex<FxHashMap<CompactString, Arc<Representation>>>,
}

impl Director {
    pub fn new(options: DirectorOptions) -> Self {
        Self::with_evaluator(options, Arc::new(StandardEvaluator::new()))
    }

    pub fn with_evaluator(options: DirectorOptions, evaluator: Arc<dyn Evaluator>) -> Self {
        Self {
            options,
            evaluator,
            representations: Mutex::new(FxHashMap::default()),
        }
    }

    #[inline]
    pub fn options(&self) -> &DirectorOptions {
        &self.options
    }

    #[inline]
    pub fn evaluator(&self) -> &dyn Evaluator {
        &*self.evaluator
    }

    /// Compile `source` and register it under `tag`.
    pub fn prepare(
        &self,
        tag: &str,
        source: &Source,
    ) -> Result<Arc<Representation>, DirectorError> {
        check_tag(tag)?;
        let artifact = source.compile().map_err(|source| DirectorError::Source {
            tag: tag.into(),
            source,
        })?;
        let origin = source.path().map(|path| Origin {
            path: path.to_path_buf(),
            fingerprint: Fingerprint::of(source.text()),
        });
        self.insert(tag, artifact, origin)
    }

    /// Register a prebuilt artifact under `tag`.
    pub fn register(
        &self,
        tag: &str,
        artifact: Artifact,
    ) -> Result<Arc<Representation>, DirectorError> {
        check_tag(tag)?;
        self.insert(tag, artifact, None)
    }

    fn insert(
        &self,
        tag: &str,
        artifact: Artifact,
        origin: Option<Origin>,
    ) -> Result<Arc<Representation>, DirectorError> {
        let representation = Representation::new(tag, artifact, origin)
            .map_err(|source| DirectorError::Parse {
                tag: tag.into(),
                source,
            })?;
        let representation = Arc::new(representation);
        self.representations
            .lock()
            .insert(tag.into(), Arc::clone(&representation));
        tracing::debug!(tag, path = ?representation.path(), "Registered");
        Ok(representation)
    }

    /// The representation for `tag`, loading it from the base directory
    /// when it is not registered.
    ///
    /// Reserved tags never resolve. A file that fails to compile or parse is
    /// logged and resolves to nothing.
    pub fn represent(&self, tag: &str) -> Option<Arc<Representation>> {
        if check_tag(tag).is_err() {
            return None;
        }
        if let Some(representation) = self.representations.lock().get(tag) {
            return Some(Arc::clone(representation));
        }

        let path = self.path_for_tag(tag)?;
        let loaded = Source::read(&path)
            .map_err(|source| DirectorError::Source {
                tag: tag.into(),
                source,
            })
            .and_then(|source| self.prepare(tag, &source));
        match loaded {
            Ok(representation) => Some(representation),
            Err(error) => {
                tracing::warn!(tag, path = %path.display(), %error, "Failed to load template");
                None
            }
        }
    }

    /// Evict `tag`. Returns whether it was registered.
    pub fn revert(&self, tag: &str) -> bool {
        let removed = self.representations.lock().remove(tag).is_some();
        if removed {
            tracing::debug!(tag, "Reverted");
        }
        removed
    }

    /// Evict every file-backed representation whose file changed or is gone.
    ///
    /// Returns the evicted tags, sorted.
    pub fn revert_stale(&self) -> Vec<CompactString> {
        let file_backed: Vec<(CompactString, Arc<Representation>)> = self
            .representations
            .lock()
            .iter()
            .filter(|(_, representation)| representation.origin().is_some())
            .map(|(tag, representation)| (tag.clone(), Arc::clone(representation)))
            .collect();

        let stale: Vec<_> = file_backed
            .into_iter()
            .filter(|(_, representation)| representation.origin().is_some_and(is_stale))
            .collect();

        let mut evicted = Vec::with_capacity(stale.len());
        let mut representations = self.representations.lock();
        for (tag, representation) in stale {
            // Skip entries re-registered since the snapshot
            let unchanged = representations
                .get(&tag)
                .is_some_and(|current| Arc::ptr_eq(current, &representation));
            if unchanged {
                representations.remove(&tag);
                tracing::debug!(tag = %tag, "Reverted stale template");
                evicted.push(tag);
            }
        }
        evicted.sort();
        evicted
    }

    /// Find the file backing `tag` under the base directory.
    ///
    /// `todo-item` is looked up as `todo/item/index.part`,
    /// `todo/item/index.md`, `todo/item.part` and `todo/item.md`, in that
    /// order.
    pub fn path_for_tag(&self, tag: &str) -> Option<PathBuf> {
        let base = self.options.base.as_deref()?;
        candidates(base, tag).into_iter().find(|path| path.is_file())
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<CompactString> {
        let mut tags: Vec<_> = self.representations.lock().keys().cloned().collect();
        tags.sort();
        tags
    }

    /// Render `tag` to HTML.
    ///
    /// Returns `Ok(None)` when no representation resolves for `tag`.
    /// Attributes are coerced to the declared types; undeclared attributes
    /// are passed through.
    pub async fn render(
        &self,
        tag: &str,
        context: &Context,
        attributes: Attributes,
        options: PrintOptions,
    ) -> Result<Option<String>, RenderError> {
        let Some(representation) = self.represent(tag) else {
            tracing::warn!(tag, "No template for tag");
            return Ok(None);
        };

        let attributes = representation.artifact().attributes.coerce(attributes);
        let lineage = vec![CompactString::from(representation.tag())];
        let mut presentation = representation.present(context.clone(), attributes, lineage);

        presentation.activate(self.evaluator()).await?;
        presentation.compose(self).await?;
        presentation.flatten()?;
        let html = presentation.render(self.evaluator(), self.options.express, options)?;
        Ok(Some(html))
    }
}

impl fmt::Debug for Director {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Director")
            .field("options", &self.options)
            .field("tags", &self.tags())
            .finish_non_exhaustive()
    }
}

fn check_tag(tag: &str) -> Result<(), DirectorError> {
    if tag.is_empty() || is_html_tag(tag) || is_slot_tag(tag) {
        return Err(DirectorError::ReservedTag { tag: tag.into() });
    }
    Ok(())
}

fn candidates(base: &Path, tag: &str) -> [PathBuf; 4] {
    let slashified = tag.replace('-', "/");
    let dir = base.join(&slashified);
    [
        dir.join("index.part"),
        dir.join("index.md"),
        base.join(format!("{slashified}.part")),
        base.join(format!("{slashified}.md")),
    ]
}

fn is_stale(origin: &Origin) -> bool {
    match std::fs::read(&origin.path) {
        Ok(bytes) => Fingerprint::of_bytes(&bytes) != origin.fingerprint,
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_tags() {
        let director = Director::new(DirectorOptions::default());
        for tag in ["div", "slot", "Table", ""] {
            assert!(matches!(
                director.register(tag, Artifact::template("<p></p>")),
                Err(DirectorError::ReservedTag { .. })
            ));
            assert!(director.represent(tag).is_none());
        }
    }

    #[test]
    fn test_register_and_revert() {
        let director = Director::new(DirectorOptions::default());
        director.register("gift-box", Artifact::template("<p></p>")).unwrap();
        assert!(director.represent("gift-box").is_some());
        assert_eq!(director.tags(), ["gift-box"]);

        assert!(director.revert("gift-box"));
        assert!(!director.revert("gift-box"));
        assert!(director.represent("gift-box").is_none());
    }

    #[test]
    fn test_parse_error_is_not_registered() {
        let director = Director::new(DirectorOptions::default());
        assert!(matches!(
            director.prepare("bad-one", &Source::partial("<p>{oops</p>")),
            Err(DirectorError::Parse { .. })
        ));
        assert!(director.tags().is_empty());
    }

    #[test]
    fn test_candidates_order() {
        let paths = candidates(Path::new("views"), "todo-item");
        assert_eq!(
            paths,
            [
                PathBuf::from("views/todo/item/index.part"),
                PathBuf::from("views/todo/item/index.md"),
                PathBuf::from("views/todo/item.part"),
                PathBuf::from("views/todo/item.md"),
            ]
        );
    }

    #[test]
    fn test_path_for_tag_prefers_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("todo/item")).unwrap();
        std::fs::write(dir.path().join("todo/item.part"), "<li></li>").unwrap();
        let director = Director::new(DirectorOptions::with_base(dir.path()));
        assert_eq!(
            director.path_for_tag("todo-item"),
            Some(dir.path().join("todo/item.part"))
        );

        std::fs::write(dir.path().join("todo/item/index.md"), "# Item").unwrap();
        assert_eq!(
            director.path_for_tag("todo-item"),
            Some(dir.path().join("todo/item/index.md"))
        );
        assert_eq!(director.path_for_tag("todo-list"), None);
    }

    #[test]
    fn test_broken_file_resolves_to_nothing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.part"), "<p>{oops</p>").unwrap();
        let director = Director::new(DirectorOptions::with_base(dir.path()));
        assert!(director.represent("broken").is_none());
    }

    #[test]
    fn test_revert_stale() {
        let dir = tempfile::tempdir().unwrap();
        let joy = dir.path().join("joy.md");
        let peace = dir.path().join("peace.md");
        std::fs::write(&joy, "# Joy").unwrap();
        std::fs::write(&peace, "# Peace").unwrap();

        let director = Director::new(DirectorOptions::with_base(dir.path()));
        director.register("love", Artifact::template("<p></p>")).unwrap();
        assert!(director.represent("joy").is_some());
        assert!(director.represent("peace").is_some());
        assert!(director.revert_stale().is_empty());

        std::fs::write(&joy, "# Joy!").unwrap();
        std::fs::remove_file(&peace).unwrap();
        assert_eq!(director.revert_stale(), ["joy", "peace"]);
        assert_eq!(director.tags(), ["love"]);
    }
}
