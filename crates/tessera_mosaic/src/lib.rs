//! Mosaic - Template registry and composition for Tessera.
//!
//! A [`Director`] maps custom tag names to [`Representation`]s: templates
//! compiled from `.part` or `.md` [`Source`]s, or registered directly as
//! [`Artifact`]s. Rendering a tag creates a [`Presentation`], which runs the
//! template's [`Action`], composes every custom tag it uses, and prints the
//! result.
//!
//! ## Name Origin
//!
//! A **mosaic** is the finished picture: many small pieces set side by side
//! until they read as one. Here each piece is a template, and the picture is
//! the page.
//!
//! ## Example
//!
//! ```
//! use tessera_mosaic::{Attributes, Context, Director, DirectorOptions, Source};
//! use tessera_tile::PrintOptions;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let director = Director::new(DirectorOptions::default());
//! director
//!     .prepare(
//!         "gift-card",
//!         &Source::partial("interface Attributes { gift: string }\n<p>{gift}</p>"),
//!     )
//!     .unwrap();
//! director
//!     .prepare("gift-page", &Source::partial(r#"<gift-card gift="Joy"></gift-card>"#))
//!     .unwrap();
//!
//! let html = director
//!     .render("gift-page", &Context::default(), Attributes::new(), PrintOptions::TRIM)
//!     .await
//!     .unwrap();
//! assert_eq!(html.as_deref(), Some("<p>Joy</p>"));
//! # }
//! ```

pub mod action;
pub mod artifact;
pub mod context;
pub mod director;
pub mod errors;
pub mod options;
pub mod presentation;
pub mod representation;
pub mod source;

pub use action::{Action, Binding, EmptyAction, FnAction, ScriptAction, CONTEXT_BINDING};
pub use artifact::{Artifact, ArtifactKind, AttributeType, AttributeTypes, Attributes};
pub use context::Context;
pub use director::Director;
pub use errors::{ActionError, CompositionError, DirectorError, RenderError, SourceError};
pub use options::DirectorOptions;
pub use presentation::{Presentation, PresentationState};
pub use representation::{Origin, Representation};
pub use source::Source;
