//! Template sources and the compile step.
//!
//! A partial (`.part`) source is markup with an optional script. The script
//! is everything before the first line that starts with `<`, plus the body of
//! every `<server>` element:
//!
//! ```text
//! interface Attributes {
//!     name: string;
//!     count?: number;
//! }
//!
//! const label = `${name} (${count})`;
//!
//! <p>{label}</p>
//! ```
//!
//! The script is TypeScript, parsed with `oxc_parser`. It may declare
//! attributes with `interface Attributes { ... }` (string, number and boolean
//! members) and bind names with `const`, `let` or `var` declarations. Other
//! type declarations are allowed and ignored; any other statement is an
//! error. Markdown (`.md`) sources are rendered to HTML and carry no script.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    BindingPattern, Declaration, PropertyKey, Statement, TSInterfaceDeclaration, TSSignature,
    TSType, VariableDeclaration,
};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};
use tessera_grout::CompactString;

use crate::action::{Binding, EmptyAction, ScriptAction};
use crate::artifact::{Artifact, ArtifactKind, AttributeType, AttributeTypes};
use crate::errors::SourceError;

const SERVER_OPEN: &str = "<server>";
const SERVER_CLOSE: &str = "</server>";
const ATTRIBUTES_INTERFACE: &str = "Attributes";

/// The text of a template together with how to compile it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    kind: ArtifactKind,
    text: String,
    path: Option<PathBuf>,
}

impl Source {
    pub fn partial(text: impl Into<String>) -> Self {
        Self {
            kind: ArtifactKind::Partial,
            text: text.into(),
            path: None,
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            kind: ArtifactKind::Markdown,
            text: text.into(),
            path: None,
        }
    }

    /// Read a `.part` or `.md` file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let kind = match path.extension().and_then(|ext| ext.to_str()) {
            Some("part") => ArtifactKind::Partial,
            Some("md") => ArtifactKind::Markdown,
            _ => {
                return Err(SourceError::UnsupportedExtension {
                    path: path.to_path_buf(),
                })
            }
        };
        let text = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            kind,
            text,
            path: Some(path.to_path_buf()),
        })
    }

    #[inline]
    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn compile(&self) -> Result<Artifact, SourceError> {
        match self.kind {
            ArtifactKind::Partial => compile_partial(&self.text),
            ArtifactKind::Markdown => Ok(compile_markdown(&self.text)),
        }
    }
}

fn compile_markdown(text: &str) -> Artifact {
    let parser = pulldown_cmark::Parser::new_ext(text, pulldown_cmark::Options::empty());
    let mut html = String::with_capacity(text.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, parser);
    Artifact {
        kind: ArtifactKind::Markdown,
        attributes: AttributeTypes::new(),
        action: Arc::new(EmptyAction),
        template: html,
    }
}

fn compile_partial(text: &str) -> Result<Artifact, SourceError> {
    let (prologue, markup) = split_prologue(text);
    let (template, server_blocks) = extract_server_blocks(markup)?;

    let mut script = String::from(prologue);
    for block in server_blocks {
        script.push('\n');
        script.push_str(block);
    }

    let (attributes, bindings) = parse_script(&script)?;

    Ok(Artifact {
        kind: ArtifactKind::Partial,
        attributes,
        action: Arc::new(ScriptAction::new(bindings)),
        template,
    })
}

/// Split at the first line whose first non-blank character is `<`.
fn split_prologue(text: &str) -> (&str, &str) {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.trim_start().starts_with('<') {
            return (&text[..offset], &text[offset..]);
        }
        offset += line.len();
    }
    (text, "")
}

/// Remove `<server>` elements from the markup, returning their bodies.
fn extract_server_blocks(markup: &str) -> Result<(String, Vec<&str>), SourceError> {
    let mut template = String::with_capacity(markup.len());
    let mut blocks = Vec::new();
    let mut rest = markup;
    while let Some(open) = rest.find(SERVER_OPEN) {
        template.push_str(&rest[..open]);
        let body_start = open + SERVER_OPEN.len();
        let close = rest[body_start..]
            .find(SERVER_CLOSE)
            .ok_or(SourceError::UnterminatedServerBlock)?;
        blocks.push(&rest[body_start..body_start + close]);
        rest = &rest[body_start + close + SERVER_CLOSE.len()..];
    }
    template.push_str(rest);
    Ok((template, blocks))
}

/// Parse the script as TypeScript and collect the declared attributes and
/// the bindings, in source order.
fn parse_script(script: &str) -> Result<(AttributeTypes, Vec<Binding>), SourceError> {
    let allocator = Allocator::default();
    let source_type = SourceType::from_path("script.ts").unwrap_or_default();
    let ret = Parser::new(&allocator, script, source_type).parse();

    if ret.panicked || !ret.errors.is_empty() {
        return Err(SourceError::Script {
            message: ret
                .errors
                .first()
                .map_or_else(|| "Failed to parse".to_string(), ToString::to_string),
        });
    }

    let mut attributes = AttributeTypes::new();
    let mut bindings = Vec::new();
    for statement in ret.program.body.iter() {
        match statement {
            Statement::VariableDeclaration(declaration) => {
                collect_bindings(&mut bindings, declaration, script)?;
            }
            Statement::TSInterfaceDeclaration(interface) => {
                declare_attributes(&mut attributes, interface, script)?;
            }
            Statement::ExportNamedDeclaration(export) => match &export.declaration {
                Some(Declaration::VariableDeclaration(declaration)) => {
                    collect_bindings(&mut bindings, declaration, script)?;
                }
                Some(Declaration::TSInterfaceDeclaration(interface)) => {
                    declare_attributes(&mut attributes, interface, script)?;
                }
                Some(Declaration::TSTypeAliasDeclaration(_)) => {}
                _ => return Err(malformed_statement(statement.span(), script)),
            },
            // Types other than the attribute interface are allowed but unused
            Statement::TSTypeAliasDeclaration(_) | Statement::EmptyStatement(_) => {}
            _ => return Err(malformed_statement(statement.span(), script)),
        }
    }
    Ok((attributes, bindings))
}

fn collect_bindings(
    bindings: &mut Vec<Binding>,
    declaration: &VariableDeclaration<'_>,
    script: &str,
) -> Result<(), SourceError> {
    for declarator in declaration.declarations.iter() {
        let BindingPattern::BindingIdentifier(id) = &declarator.id else {
            return Err(malformed_statement(declarator.span, script));
        };
        let Some(init) = &declarator.init else {
            return Err(malformed_statement(declarator.span, script));
        };
        bindings.push(Binding {
            name: CompactString::from(id.name.as_str()),
            expression: span_text(script, init.span()).to_string(),
        });
    }
    Ok(())
}

/// Record the members of `interface Attributes`; other interfaces are
/// ignored.
fn declare_attributes(
    attributes: &mut AttributeTypes,
    interface: &TSInterfaceDeclaration<'_>,
    script: &str,
) -> Result<(), SourceError> {
    if interface.id.name.as_str() != ATTRIBUTES_INTERFACE {
        return Ok(());
    }
    for member in interface.body.body.iter() {
        let malformed = || SourceError::MalformedAttribute {
            declaration: span_text(script, member.span()).to_string(),
        };
        let TSSignature::TSPropertySignature(property) = member else {
            return Err(malformed());
        };
        let name = match &property.key {
            PropertyKey::StaticIdentifier(id) => id.name.as_str(),
            PropertyKey::StringLiteral(s) => s.value.as_str(),
            _ => return Err(malformed()),
        };
        let annotation = property.type_annotation.as_ref().ok_or_else(malformed)?;
        let ty = match &annotation.type_annotation {
            TSType::TSStringKeyword(_) => AttributeType::String,
            TSType::TSNumberKeyword(_) => AttributeType::Number,
            TSType::TSBooleanKeyword(_) => AttributeType::Boolean,
            other => {
                return Err(SourceError::UnknownAttributeType {
                    name: name.into(),
                    ty: span_text(script, other.span()).into(),
                })
            }
        };
        attributes.insert(name, ty);
    }
    Ok(())
}

fn malformed_statement(span: Span, script: &str) -> SourceError {
    SourceError::MalformedStatement {
        statement: span_text(script, span).trim().to_string(),
    }
}

fn span_text(script: &str, span: Span) -> &str {
    script
        .get(span.start as usize..span.end as usize)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prologue_split() {
        let (script, markup) = split_prologue("const gift = \"Joy\";\n\n<h1>{gift}</h1>");
        assert_eq!(script, "const gift = \"Joy\";\n\n");
        assert_eq!(markup, "<h1>{gift}</h1>");

        let (script, markup) = split_prologue("  <p>\n</p>");
        assert_eq!(script, "");
        assert_eq!(markup, "  <p>\n</p>");
    }

    #[test]
    fn test_compile_partial() {
        let artifact = Source::partial(
            "interface Attributes {\n    gift: string;\n    chapter?: number;\n}\n\n<p>{gift}</p>\n",
        )
        .compile()
        .unwrap();
        assert_eq!(artifact.kind, ArtifactKind::Partial);
        assert_eq!(artifact.template, "<p>{gift}</p>\n");
        assert_eq!(
            artifact.attributes.iter().collect::<Vec<_>>(),
            [("gift", AttributeType::String), ("chapter", AttributeType::Number)]
        );
    }

    fn bindings(script: &str) -> Vec<(String, String)> {
        let (_, bindings) = parse_script(script).unwrap();
        bindings
            .into_iter()
            .map(|b| (b.name.to_string(), b.expression))
            .collect()
    }

    #[test]
    fn test_script_statements() {
        let parsed = bindings(
            "// the list\nconst items = [\n  {id: 1, name: \"a;b\"},\n  {id: 2, name: 'http://x'}, /* two */\n];\nlet total = items.length\nvar label: string = `n=${total}`;",
        );
        assert_eq!(
            parsed,
            [
                (
                    "items".to_string(),
                    "[\n  {id: 1, name: \"a;b\"},\n  {id: 2, name: 'http://x'}, /* two */\n]".to_string()
                ),
                ("total".to_string(), "items.length".to_string()),
                ("label".to_string(), "`n=${total}`".to_string()),
            ]
        );
    }

    #[test]
    fn test_statement_continues_across_lines() {
        let parsed = bindings("const label = ok\n  ? \"a\"\n  : \"b\"\nconst total = 1 +\n  2");
        assert_eq!(
            parsed,
            [
                ("label".to_string(), "ok\n  ? \"a\"\n  : \"b\"".to_string()),
                ("total".to_string(), "1 +\n  2".to_string()),
            ]
        );
    }

    #[test]
    fn test_exports_and_type_declarations() {
        let (attributes, parsed) = parse_script(
            "export interface Attributes { 'data-id': number; open?: boolean }\ntype Gift = { name: string };\ninterface Other { x: Date }\nexport const a = 1, b = a + 1;",
        )
        .unwrap();
        assert_eq!(
            attributes.iter().collect::<Vec<_>>(),
            [("data-id", AttributeType::Number), ("open", AttributeType::Boolean)]
        );
        assert_eq!(
            parsed.iter().map(|b| b.name.as_str()).collect::<Vec<_>>(),
            ["a", "b"]
        );
    }

    #[test]
    fn test_nested_type_is_reported_whole() {
        let error = Source::partial("interface Attributes { opts: { a: string } }\n<p></p>")
            .compile()
            .unwrap_err();
        match error {
            SourceError::UnknownAttributeType { name, ty } => {
                assert_eq!(name, "opts");
                assert_eq!(ty, "{ a: string }");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_server_blocks() {
        let artifact = Source::partial("<server>\nconst a = 1;\n</server>\n<p>{a}</p>")
            .compile()
            .unwrap();
        assert_eq!(artifact.template, "\n<p>{a}</p>");
        assert!(matches!(
            Source::partial("<server>const a = 1;").compile(),
            Err(SourceError::UnterminatedServerBlock)
        ));
    }

    #[test]
    fn test_bad_scripts() {
        assert!(matches!(
            Source::partial("interface Attributes { when: Date }\n<p></p>").compile(),
            Err(SourceError::UnknownAttributeType { .. })
        ));
        assert!(matches!(
            Source::partial("interface Attributes { [key: string]: string }\n<p></p>").compile(),
            Err(SourceError::MalformedAttribute { .. })
        ));
        assert!(matches!(
            Source::partial("interface Attributes { when }\n<p></p>").compile(),
            Err(SourceError::MalformedAttribute { .. })
        ));
        assert!(matches!(
            Source::partial("interface Attributes { when: string\n<p></p>").compile(),
            Err(SourceError::Script { .. })
        ));
        assert!(matches!(
            Source::partial("const a == 1\n<p></p>").compile(),
            Err(SourceError::Script { .. })
        ));
        assert!(matches!(
            Source::partial("let pending;\n<p></p>").compile(),
            Err(SourceError::MalformedStatement { .. })
        ));
        match Source::partial("console.log(1)\n<p></p>").compile() {
            Err(SourceError::MalformedStatement { statement }) => {
                assert_eq!(statement, "console.log(1)")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_compile_markdown() {
        let artifact = Source::markdown("# Joy").compile().unwrap();
        assert_eq!(artifact.kind, ArtifactKind::Markdown);
        assert_eq!(artifact.template, "<h1>Joy</h1>\n");
        assert!(artifact.attributes.is_empty());
    }

    #[test]
    fn test_read_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let part = dir.path().join("gift.part");
        std::fs::write(&part, "<p></p>").unwrap();
        let source = Source::read(&part).unwrap();
        assert_eq!(source.kind(), ArtifactKind::Partial);
        assert_eq!(source.path(), Some(part.as_path()));

        let txt = dir.path().join("gift.txt");
        std::fs::write(&txt, "").unwrap();
        assert!(matches!(
            Source::read(&txt),
            Err(SourceError::UnsupportedExtension { .. })
        ));
        assert!(matches!(
            Source::read(dir.path().join("missing.md")),
            Err(SourceError::Io { .. })
        ));
    }
}
