//! Parse errors shared by the tokenizer and the tree builder.

use serde::{Deserialize, Serialize};
use tessera_grout::CompactString;
use thiserror::Error;

use crate::ast::Position;

/// Parse error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ErrorCode {
    // Tokenizer
    UnterminatedExpression = 0,
    UnterminatedString = 1,
    UnterminatedComment = 2,
    UnterminatedTag = 3,
    UnexpectedCharacter = 4,
    // Tree builder
    UnexpectedToken = 10,
    MismatchedEndTag = 11,
    UnexpectedEndTag = 12,
    MissingEndTag = 13,
    MisplacedDoctype = 14,
}

impl ErrorCode {
    pub fn message(&self) -> &'static str {
        match self {
            Self::UnterminatedExpression => "Expression is missing its closing '}'.",
            Self::UnterminatedString => "String literal is missing its closing quote.",
            Self::UnterminatedComment => "Comment is missing its closing '-->'.",
            Self::UnterminatedTag => "Tag is missing its closing '>'.",
            Self::UnexpectedCharacter => "Unexpected character.",
            Self::UnexpectedToken => "Unexpected token.",
            Self::MismatchedEndTag => "End tag does not match the open element.",
            Self::UnexpectedEndTag => "End tag has no matching open element.",
            Self::MissingEndTag => "Element is missing its end tag.",
            Self::MisplacedDoctype => "Doctype must be the first node of the template.",
        }
    }
}

/// A fatal error in template source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "{} (line {}, column {}){}",
    .code.message(),
    .position.line,
    .position.column,
    token_suffix(.token_kind, .token)
)]
pub struct ParseError {
    pub code: ErrorCode,
    pub position: Position,
    /// Kind of the offending token, when one was involved
    pub token_kind: Option<&'static str>,
    /// Source text of the offending token
    pub token: Option<CompactString>,
}

impl ParseError {
    pub fn new(code: ErrorCode, position: Position) -> Self {
        Self {
            code,
            position,
            token_kind: None,
            token: None,
        }
    }

    /// Attach the offending source text without a token kind.
    pub fn with_token_text(mut self, text: impl Into<CompactString>) -> Self {
        self.token = Some(text.into());
        self
    }

    pub fn with_token(mut self, kind: &'static str, text: impl Into<CompactString>) -> Self {
        self.token_kind = Some(kind);
        self.token = Some(text.into());
        self
    }
}

fn token_suffix(kind: &Option<&'static str>, token: &Option<CompactString>) -> String {
    match (kind, token) {
        (Some(kind), Some(text)) => format!(": {kind} {text:?}"),
        (None, Some(text)) => format!(": {text:?}"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        for code in [
            ErrorCode::UnterminatedExpression,
            ErrorCode::UnterminatedString,
            ErrorCode::UnterminatedComment,
            ErrorCode::UnterminatedTag,
            ErrorCode::UnexpectedCharacter,
            ErrorCode::UnexpectedToken,
            ErrorCode::MismatchedEndTag,
            ErrorCode::UnexpectedEndTag,
            ErrorCode::MissingEndTag,
            ErrorCode::MisplacedDoctype,
        ] {
            assert!(!code.message().is_empty());
        }
    }

    #[test]
    fn test_display_with_token() {
        let error = ParseError::new(ErrorCode::UnexpectedToken, Position::new(4, 1, 5))
            .with_token("AttributeName", "id");
        assert_eq!(
            error.to_string(),
            "Unexpected token. (line 1, column 5): AttributeName \"id\""
        );
    }

    #[test]
    fn test_display_without_token() {
        let error = ParseError::new(ErrorCode::MissingEndTag, Position::new(0, 2, 1));
        assert_eq!(error.to_string(), "Element is missing its end tag. (line 2, column 1)");

        let error = error.with_token_text("<p>");
        assert_eq!(
            error.to_string(),
            "Element is missing its end tag. (line 2, column 1): \"<p>\""
        );
        let source: &dyn std::error::Error = &error;
        assert!(source.source().is_none());
    }
}
