//! Template tokenizer.
//!
//! A byte-level state machine over the template text. Every input byte ends
//! up in exactly one token, so concatenating the token texts reproduces the
//! input. Whitespace tokens only occur inside tags; in content, whitespace
//! belongs to the surrounding text run.

use tessera_grout::is_raw_text_tag;
use tessera_tile::{ErrorCode, ParseError, Position};

/// Character codes for fast comparison
pub mod char_codes {
    pub const BACKSLASH: u8 = b'\\';
    pub const BACKTICK: u8 = b'`';
    pub const BANG: u8 = b'!';
    pub const DOUBLE_QUOTE: u8 = b'"';
    pub const EQ: u8 = b'=';
    pub const GT: u8 = b'>';
    pub const LEFT_BRACE: u8 = b'{';
    pub const LT: u8 = b'<';
    pub const NEWLINE: u8 = b'\n';
    pub const RIGHT_BRACE: u8 = b'}';
    pub const SINGLE_QUOTE: u8 = b'\'';
    pub const SLASH: u8 = b'/';
}

use char_codes::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenKind {
    Whitespace,
    OpenAngleBracket,
    TagName,
    Slash,
    CloseAngleBracket,
    AttributeName,
    Equal,
    /// A quoted attribute value (quotes included) or an unquoted one
    String,
    /// `{...}`, braces included
    Expression,
    Text,
    /// `<!-- ... -->`
    Comment,
    /// `<!DOCTYPE ...>`
    Doctype,
}

impl TokenKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Whitespace => "Whitespace",
            Self::OpenAngleBracket => "OpenAngleBracket",
            Self::TagName => "TagName",
            Self::Slash => "Slash",
            Self::CloseAngleBracket => "CloseAngleBracket",
            Self::AttributeName => "AttributeName",
            Self::Equal => "Equal",
            Self::String => "String",
            Self::Expression => "Expression",
            Self::Text => "Text",
            Self::Comment => "Comment",
            Self::Doctype => "Doctype",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Byte offset of the first character
    pub offset: usize,
}

/// Maps byte offsets to line/column positions.
#[derive(Debug, Clone)]
pub struct LineIndex {
    newlines: Vec<usize>,
}

impl LineIndex {
    pub fn new(input: &str) -> Self {
        Self {
            newlines: input
                .bytes()
                .enumerate()
                .filter(|&(_, b)| b == NEWLINE)
                .map(|(i, _)| i)
                .collect(),
        }
    }

    pub fn position(&self, offset: usize) -> Position {
        // Binary search for line number
        let line = match self.newlines.binary_search(&offset) {
            Ok(i) => i + 1,
            Err(i) => i + 1,
        };

        let column = if line == 1 {
            offset + 1
        } else {
            offset - self.newlines[line - 2]
        };

        Position {
            offset: offset as u32,
            line: line as u32,
            column: column as u32,
        }
    }
}

/// An error found while scanning a delimited construct. `offset` is where
/// the construct starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScanError {
    pub code: ErrorCode,
    pub offset: usize,
}

/// Find the end of the expression starting at `start` (which must hold `{`).
///
/// Returns the index just past the matching `}`. Nested braces are counted
/// and quoted literals are skipped, so `{ {a: "}"} }` is one expression.
pub(crate) fn scan_expression(bytes: &[u8], start: usize) -> Result<usize, ScanError> {
    debug_assert_eq!(bytes.get(start), Some(&LEFT_BRACE));
    let mut depth = 0usize;
    let mut index = start;
    while index < bytes.len() {
        match bytes[index] {
            LEFT_BRACE => depth += 1,
            RIGHT_BRACE => {
                depth -= 1;
                if depth == 0 {
                    return Ok(index + 1);
                }
            }
            quote @ (DOUBLE_QUOTE | SINGLE_QUOTE | BACKTICK) => {
                index = scan_quoted(bytes, index, quote)?;
                continue;
            }
            _ => {}
        }
        index += 1;
    }
    Err(ScanError {
        code: ErrorCode::UnterminatedExpression,
        offset: start,
    })
}

/// Skip a quoted literal with backslash escapes, returning the index just
/// past its closing quote.
fn scan_quoted(bytes: &[u8], start: usize, quote: u8) -> Result<usize, ScanError> {
    let mut index = start + 1;
    while index < bytes.len() {
        match bytes[index] {
            BACKSLASH => index += 2,
            b if b == quote => return Ok(index + 1),
            _ => index += 1,
        }
    }
    Err(ScanError {
        code: ErrorCode::UnterminatedString,
        offset: start,
    })
}

#[inline]
fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0C)
}

#[inline]
fn is_tag_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic()
}

#[inline]
fn is_tag_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.')
}

#[inline]
fn is_attribute_name_char(b: u8) -> bool {
    !is_whitespace(b)
        && !matches!(
            b,
            DOUBLE_QUOTE | SINGLE_QUOTE | EQ | LT | GT | SLASH | LEFT_BRACE | RIGHT_BRACE
        )
}

pub struct Tokenizer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    index: usize,
    tokens: Vec<Token<'a>>,
    lines: LineIndex,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            index: 0,
            tokens: Vec::new(),
            lines: LineIndex::new(input),
        }
    }

    /// Tokenize the whole input.
    pub fn tokenize(mut self) -> Result<Vec<Token<'a>>, ParseError> {
        while self.index < self.bytes.len() {
            self.scan_content()?;
        }
        Ok(self.tokens)
    }

    fn emit(&mut self, kind: TokenKind, start: usize, end: usize) {
        let input = self.input;
        self.tokens.push(Token {
            kind,
            text: &input[start..end],
            offset: start,
        });
        self.index = end;
    }

    fn error(&self, code: ErrorCode, offset: usize) -> ParseError {
        let mut end = (offset + 16).min(self.bytes.len());
        while !self.input.is_char_boundary(end) {
            end -= 1;
        }
        ParseError::new(code, self.lines.position(offset)).with_token_text(&self.input[offset..end])
    }

    fn scan_error(&self, error: ScanError) -> ParseError {
        self.error(error.code, error.offset)
    }

    #[inline]
    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.index + offset).copied()
    }

    fn starts_with_ignore_case(&self, needle: &str) -> bool {
        self.bytes[self.index..]
            .get(..needle.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(needle.as_bytes()))
    }

    /// Does the `<` at the current index begin markup?
    fn at_markup(&self) -> bool {
        match self.peek(1) {
            Some(b) if is_tag_name_start(b) => true,
            Some(SLASH) => self.peek(2).is_some_and(is_tag_name_start),
            Some(BANG) => self.starts_with_ignore_case("<!--") || self.starts_with_ignore_case("<!doctype"),
            _ => false,
        }
    }

    fn scan_content(&mut self) -> Result<(), ParseError> {
        match self.bytes[self.index] {
            LEFT_BRACE => self.scan_expression_token(),
            LT if self.at_markup() => self.scan_markup(),
            _ => {
                self.scan_text();
                Ok(())
            }
        }
    }

    fn scan_text(&mut self) {
        let start = self.index;
        let mut index = start + 1;
        while index < self.bytes.len() {
            match self.bytes[index] {
                LEFT_BRACE => break,
                LT => {
                    self.index = index;
                    if self.at_markup() {
                        break;
                    }
                }
                _ => {}
            }
            index += 1;
        }
        self.emit(TokenKind::Text, start, index);
    }

    fn scan_expression_token(&mut self) -> Result<(), ParseError> {
        let start = self.index;
        let end = scan_expression(self.bytes, start).map_err(|e| self.scan_error(e))?;
        self.emit(TokenKind::Expression, start, end);
        Ok(())
    }

    fn scan_markup(&mut self) -> Result<(), ParseError> {
        let start = self.index;
        if self.starts_with_ignore_case("<!--") {
            let end = self.input[start + 4..]
                .find("-->")
                .map(|i| start + 4 + i + 3)
                .ok_or_else(|| self.error(ErrorCode::UnterminatedComment, start))?;
            self.emit(TokenKind::Comment, start, end);
            return Ok(());
        }
        if self.peek(1) == Some(BANG) {
            let end = self.input[start..]
                .find('>')
                .map(|i| start + i + 1)
                .ok_or_else(|| self.error(ErrorCode::UnterminatedTag, start))?;
            self.emit(TokenKind::Doctype, start, end);
            return Ok(());
        }
        if self.peek(1) == Some(SLASH) {
            return self.scan_end_tag();
        }
        self.scan_start_tag()
    }

    fn scan_tag_name(&mut self) -> &'a str {
        let start = self.index;
        let mut end = start;
        while end < self.bytes.len() && is_tag_name_char(self.bytes[end]) {
            end += 1;
        }
        self.emit(TokenKind::TagName, start, end);
        let input = self.input;
        &input[start..end]
    }

    fn scan_whitespace(&mut self) {
        let start = self.index;
        let mut end = start;
        while end < self.bytes.len() && is_whitespace(self.bytes[end]) {
            end += 1;
        }
        if end > start {
            self.emit(TokenKind::Whitespace, start, end);
        }
    }

    fn scan_end_tag(&mut self) -> Result<(), ParseError> {
        let tag_start = self.index;
        self.emit(TokenKind::OpenAngleBracket, tag_start, tag_start + 1);
        self.emit(TokenKind::Slash, self.index, self.index + 1);
        self.scan_tag_name();
        self.scan_whitespace();
        match self.peek(0) {
            Some(GT) => {
                self.emit(TokenKind::CloseAngleBracket, self.index, self.index + 1);
                Ok(())
            }
            Some(_) => Err(self.error(ErrorCode::UnexpectedCharacter, self.index)),
            None => Err(self.error(ErrorCode::UnterminatedTag, tag_start)),
        }
    }

    fn scan_start_tag(&mut self) -> Result<(), ParseError> {
        let tag_start = self.index;
        self.emit(TokenKind::OpenAngleBracket, tag_start, tag_start + 1);
        let tag = self.scan_tag_name();

        loop {
            let Some(b) = self.peek(0) else {
                return Err(self.error(ErrorCode::UnterminatedTag, tag_start));
            };
            match b {
                GT => {
                    self.emit(TokenKind::CloseAngleBracket, self.index, self.index + 1);
                    if is_raw_text_tag(tag) {
                        self.scan_raw_text(tag);
                    }
                    return Ok(());
                }
                SLASH if self.peek(1) == Some(GT) => {
                    self.emit(TokenKind::Slash, self.index, self.index + 1);
                    self.emit(TokenKind::CloseAngleBracket, self.index, self.index + 1);
                    return Ok(());
                }
                EQ => {
                    self.emit(TokenKind::Equal, self.index, self.index + 1);
                    self.scan_whitespace();
                    self.scan_attribute_value(tag_start)?;
                }
                b if is_whitespace(b) => self.scan_whitespace(),
                b if is_attribute_name_char(b) => {
                    let start = self.index;
                    let mut end = start;
                    while end < self.bytes.len() && is_attribute_name_char(self.bytes[end]) {
                        end += 1;
                    }
                    self.emit(TokenKind::AttributeName, start, end);
                }
                _ => return Err(self.error(ErrorCode::UnexpectedCharacter, self.index)),
            }
        }
    }

    fn scan_attribute_value(&mut self, tag_start: usize) -> Result<(), ParseError> {
        let start = self.index;
        match self.peek(0) {
            None => Err(self.error(ErrorCode::UnterminatedTag, tag_start)),
            Some(LEFT_BRACE) => self.scan_expression_token(),
            Some(quote @ (DOUBLE_QUOTE | SINGLE_QUOTE)) => {
                let mut index = start + 1;
                loop {
                    match self.bytes.get(index) {
                        None => return Err(self.error(ErrorCode::UnterminatedString, start)),
                        Some(&b) if b == quote => break,
                        Some(&LEFT_BRACE) => {
                            index = scan_expression(self.bytes, index)
                                .map_err(|e| self.scan_error(e))?;
                        }
                        Some(_) => index += 1,
                    }
                }
                self.emit(TokenKind::String, start, index + 1);
                Ok(())
            }
            Some(GT) => Err(self.error(ErrorCode::UnexpectedCharacter, start)),
            Some(_) => {
                let mut end = start;
                while end < self.bytes.len() && !is_whitespace(self.bytes[end]) && self.bytes[end] != GT {
                    end += 1;
                }
                self.emit(TokenKind::String, start, end);
                Ok(())
            }
        }
    }

    /// Content of `<script>` and `<style>` is one text token, up to the
    /// matching end tag or the end of input.
    fn scan_raw_text(&mut self, tag: &str) {
        let start = self.index;
        let mut end = self.bytes.len();
        let mut index = start;
        while let Some(found) = self.input[index..].find("</") {
            let candidate = index + found;
            let name = &self.bytes[candidate + 2..];
            if name.len() >= tag.len()
                && name[..tag.len()].eq_ignore_ascii_case(tag.as_bytes())
                && !name.get(tag.len()).copied().is_some_and(is_tag_name_char)
            {
                end = candidate;
                break;
            }
            index = candidate + 2;
        }
        if end > start {
            self.emit(TokenKind::Text, start, end);
        }
    }
}

/// Scan template text into tokens.
pub fn scan(text: &str) -> Result<Vec<Token<'_>>, ParseError> {
    Tokenizer::new(text).tokenize()
}
