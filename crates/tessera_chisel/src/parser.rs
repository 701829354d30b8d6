//! Template tree builder.
//!
//! Consumes the token stream with an explicit stack of open elements. A
//! token that cannot be consumed where it appears is fatal: the error names
//! the token, its kind and its position, and no partial tree is returned.

use tessera_grout::{is_void_tag, SmallVec};
use tessera_tile::{
    Attribute, AttributeValue, ElementNode, ErrorCode, NodeId, NodeKind, ParseError, Tree,
};

use crate::tokenizer::{scan_expression, LineIndex, Token, TokenKind};

/// Build a tree from tokens scanned out of `source`.
pub fn parse(source: &str, tokens: &[Token<'_>]) -> Result<Tree, ParseError> {
    Parser::new(source, tokens).parse()
}

pub struct Parser<'s, 't> {
    tokens: &'t [Token<'s>],
    position: usize,
    tree: Tree,
    /// Open containers, the root fragment at the bottom
    stack: Vec<NodeId>,
    lines: LineIndex,
}

impl<'s, 't> Parser<'s, 't> {
    pub fn new(source: &'s str, tokens: &'t [Token<'s>]) -> Self {
        Self {
            tokens,
            position: 0,
            tree: Tree::new(),
            stack: vec![Tree::ROOT],
            lines: LineIndex::new(source),
        }
    }

    pub fn parse(mut self) -> Result<Tree, ParseError> {
        while let Some(token) = self.next() {
            match token.kind {
                TokenKind::Text | TokenKind::Comment => {
                    let text = self.tree.add_text(token.text);
                    self.tree.append(self.top(), text);
                }
                TokenKind::Expression => {
                    let position = self.lines.position(token.offset);
                    let expression = self.tree.add_expression(unwrap_braces(token.text), position);
                    self.tree.append(self.top(), expression);
                }
                TokenKind::Doctype => self.parse_doctype(&token)?,
                TokenKind::OpenAngleBracket => match self.peek() {
                    Some(next) if next.kind == TokenKind::Slash => {
                        self.position += 1;
                        self.parse_end_tag(&token)?;
                    }
                    Some(next) if next.kind == TokenKind::TagName => {
                        self.parse_start_tag(&token)?;
                    }
                    Some(next) => return Err(self.unexpected(&next)),
                    None => return Err(self.unexpected(&token)),
                },
                _ => return Err(self.unexpected(&token)),
            }
        }

        if self.stack.len() > 1 {
            let open = self.top();
            let (tag, position) = match self.tree.element(open) {
                Some(element) => (element.tag.clone(), element.position),
                None => (Default::default(), Default::default()),
            };
            return Err(ParseError::new(ErrorCode::MissingEndTag, position)
                .with_token(TokenKind::TagName.name(), tag));
        }

        tracing::trace!(nodes = self.tree.len(), "parsed template");
        Ok(self.tree)
    }

    #[inline]
    fn top(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(Tree::ROOT)
    }

    fn next(&mut self) -> Option<Token<'s>> {
        let token = self.tokens.get(self.position).copied();
        self.position += 1;
        token
    }

    fn peek(&self) -> Option<Token<'s>> {
        self.tokens.get(self.position).copied()
    }

    fn next_significant(&mut self) -> Option<Token<'s>> {
        loop {
            let token = self.next()?;
            if token.kind != TokenKind::Whitespace {
                return Some(token);
            }
        }
    }

    fn unexpected(&self, token: &Token<'_>) -> ParseError {
        self.error(ErrorCode::UnexpectedToken, token)
    }

    fn error(&self, code: ErrorCode, token: &Token<'_>) -> ParseError {
        ParseError::new(code, self.lines.position(token.offset))
            .with_token(token.kind.name(), token.text)
    }

    fn end_of_input(&self, start: &Token<'_>) -> ParseError {
        ParseError::new(ErrorCode::UnterminatedTag, self.lines.position(start.offset))
            .with_token(start.kind.name(), start.text)
    }

    /// A doctype may only open the template; whitespace before it is dropped.
    fn parse_doctype(&mut self, token: &Token<'s>) -> Result<(), ParseError> {
        let only_whitespace_before = self.stack.len() == 1
            && self.tree.children(Tree::ROOT).iter().all(|&child| {
                matches!(self.tree.kind(child), NodeKind::Text(text) if text.content.trim().is_empty())
            });
        if !only_whitespace_before {
            return Err(self.error(ErrorCode::MisplacedDoctype, token));
        }
        self.tree.take_children(Tree::ROOT);
        let doctype = self.tree.add(NodeKind::Doctype);
        self.tree.append(Tree::ROOT, doctype);
        Ok(())
    }

    fn parse_start_tag(&mut self, open: &Token<'s>) -> Result<(), ParseError> {
        let Some(name) = self.next() else {
            return Err(self.end_of_input(open));
        };
        let mut element = ElementNode::new(name.text, self.lines.position(open.offset));
        let mut self_closing = false;
        let mut can_assign = false;

        loop {
            let Some(token) = self.next() else {
                return Err(self.end_of_input(open));
            };
            match token.kind {
                TokenKind::Whitespace => continue,
                TokenKind::AttributeName if !self_closing => {
                    element.attributes.push(Attribute::bare(token.text));
                    can_assign = true;
                    continue;
                }
                TokenKind::Equal if can_assign => {
                    let Some(value) = self.next_significant() else {
                        return Err(self.end_of_input(open));
                    };
                    let fragments = match value.kind {
                        TokenKind::String => self.string_fragments(&value)?,
                        TokenKind::Expression => {
                            let mut fragments = SmallVec::new();
                            fragments.push(AttributeValue::Expression(
                                unwrap_braces(value.text).into(),
                            ));
                            fragments
                        }
                        _ => return Err(self.unexpected(&value)),
                    };
                    if let Some(attr) = element.attributes.last_mut() {
                        attr.value = fragments;
                    }
                }
                TokenKind::Slash if !self_closing => self_closing = true,
                TokenKind::CloseAngleBracket => break,
                _ => return Err(self.unexpected(&token)),
            }
            can_assign = false;
        }

        let is_void = element.is_void;
        let id = self.tree.add_element(element);
        self.tree.append(self.top(), id);
        if !self_closing && !is_void {
            self.stack.push(id);
        }
        Ok(())
    }

    fn parse_end_tag(&mut self, open: &Token<'s>) -> Result<(), ParseError> {
        let Some(name) = self.next() else {
            return Err(self.end_of_input(open));
        };
        if name.kind != TokenKind::TagName {
            return Err(self.unexpected(&name));
        }
        match self.next_significant() {
            Some(token) if token.kind == TokenKind::CloseAngleBracket => {}
            Some(token) => return Err(self.unexpected(&token)),
            None => return Err(self.end_of_input(open)),
        }

        let matches_top = self.stack.len() > 1
            && self
                .tree
                .element(self.top())
                .is_some_and(|element| element.tag.eq_ignore_ascii_case(name.text));
        if matches_top {
            self.stack.pop();
            return Ok(());
        }
        if is_void_tag(&name.text.to_ascii_lowercase()) {
            // `</br>` and friends close nothing
            return Ok(());
        }
        let code = if self.stack.len() > 1 {
            ErrorCode::MismatchedEndTag
        } else {
            ErrorCode::UnexpectedEndTag
        };
        Err(self.error(code, &name))
    }

    /// Split a quoted (or unquoted) attribute value into text and expression
    /// fragments. A quoted value always yields at least one fragment so that
    /// `name=""` keeps its empty value.
    fn string_fragments(
        &self,
        token: &Token<'s>,
    ) -> Result<SmallVec<[AttributeValue; 1]>, ParseError> {
        let mut fragments = SmallVec::new();
        let text = token.text;
        let quoted = text.len() >= 2
            && matches!(text.as_bytes()[0], b'"' | b'\'')
            && text.as_bytes()[text.len() - 1] == text.as_bytes()[0];
        if !quoted {
            fragments.push(AttributeValue::Text(text.into()));
            return Ok(fragments);
        }

        let inner = &text[1..text.len() - 1];
        let bytes = inner.as_bytes();
        let mut literal_start = 0;
        let mut index = 0;
        while index < bytes.len() {
            if bytes[index] != b'{' {
                index += 1;
                continue;
            }
            let end = scan_expression(bytes, index).map_err(|error| {
                ParseError::new(
                    error.code,
                    self.lines.position(token.offset + 1 + error.offset),
                )
                .with_token(token.kind.name(), token.text)
            })?;
            if index > literal_start {
                fragments.push(AttributeValue::Text(inner[literal_start..index].into()));
            }
            fragments.push(AttributeValue::Expression(
                unwrap_braces(&inner[index..end]).into(),
            ));
            index = end;
            literal_start = end;
        }
        if literal_start < inner.len() || fragments.is_empty() {
            fragments.push(AttributeValue::Text(inner[literal_start..].into()));
        }
        Ok(fragments)
    }
}

/// `{expr}` → `expr`, untrimmed.
#[inline]
fn unwrap_braces(text: &str) -> &str {
    text.strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .unwrap_or(text)
}
