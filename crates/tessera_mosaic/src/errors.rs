//! Registry and composition errors.

use std::path::PathBuf;

use tessera_grout::CompactString;
use tessera_tile::ParseError;
use thiserror::Error;

use crate::presentation::PresentationState;

/// A template source that cannot be compiled.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported template source {}: expected a .part or .md file", path.display())]
    UnsupportedExtension { path: PathBuf },

    #[error("Unknown type '{ty}' for attribute '{name}': expected string, number or boolean")]
    UnknownAttributeType { name: CompactString, ty: CompactString },

    #[error("Malformed attribute declaration '{declaration}'")]
    MalformedAttribute { declaration: String },

    #[error("Invalid template script: {message}")]
    Script { message: String },

    #[error("<server> block is missing its closing </server>")]
    UnterminatedServerBlock,

    #[error("Expected 'const NAME = EXPRESSION' or 'interface Attributes', found '{statement}'")]
    MalformedStatement { statement: String },
}

/// A failing action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ActionError {
    pub message: String,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failures that abort one render.
#[derive(Debug, Error)]
pub enum CompositionError {
    #[error("Circular composition: {}", chain.join(" -> "))]
    Circular { chain: Vec<CompactString> },

    #[error("Presentation of '{tag}' is {found:?}, expected {expected:?}")]
    InvalidState {
        tag: CompactString,
        expected: PresentationState,
        found: PresentationState,
    },

    #[error("Render of '{tag}' was cancelled")]
    Cancelled { tag: CompactString },

    #[error("Action of '{tag}' failed: {source}")]
    Action {
        tag: CompactString,
        #[source]
        source: ActionError,
    },
}

/// Registration failures.
#[derive(Debug, Error)]
pub enum DirectorError {
    #[error("'{tag}' is an HTML tag name and cannot be registered")]
    ReservedTag { tag: CompactString },

    #[error("Failed to compile '{tag}': {source}")]
    Source {
        tag: CompactString,
        #[source]
        source: SourceError,
    },

    #[error("Failed to parse the template of '{tag}': {source}")]
    Parse {
        tag: CompactString,
        #[source]
        source: ParseError,
    },
}

/// Errors returned from [`Director::render`](crate::Director::render).
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Composition(#[from] CompositionError),
}
