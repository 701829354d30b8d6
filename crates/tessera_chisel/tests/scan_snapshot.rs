//! Token stream snapshot tests.

use tessera_chisel::scan;

fn listing(src: &str) -> String {
    scan(src)
        .unwrap_or_else(|error| panic!("Scan error: {error}"))
        .iter()
        .map(|token| format!("{} {:?}", token.kind.name(), token.text))
        .collect::<Vec<_>>()
        .join("\n")
}

// =============================================================================
// Elements
// =============================================================================

mod elements {
    use super::*;

    #[test]
    fn list_item_with_expressions() {
        insta::assert_snapshot!(listing("<li id={item.id}>{item.name}</li>"), @r###"
        OpenAngleBracket "<"
        TagName "li"
        Whitespace " "
        AttributeName "id"
        Equal "="
        Expression "{item.id}"
        CloseAngleBracket ">"
        Expression "{item.name}"
        OpenAngleBracket "<"
        Slash "/"
        TagName "li"
        CloseAngleBracket ">"
        "###);
    }

    #[test]
    fn self_closing_custom_tag() {
        insta::assert_snapshot!(listing(r#"<gift-box gift="Temperance"/>"#), @r###"
        OpenAngleBracket "<"
        TagName "gift-box"
        Whitespace " "
        AttributeName "gift"
        Equal "="
        String "\"Temperance\""
        Slash "/"
        CloseAngleBracket ">"
        "###);
    }
}

// =============================================================================
// Content
// =============================================================================

mod content {
    use super::*;

    #[test]
    fn text_between_expressions() {
        insta::assert_snapshot!(listing("Hello, {first} {last}!"), @r###"
        Text "Hello, "
        Expression "{first}"
        Text " "
        Expression "{last}"
        Text "!"
        "###);
    }

    #[test]
    fn doctype_and_comment() {
        insta::assert_snapshot!(listing("<!DOCTYPE html><!-- a -->x"), @r###"
        Doctype "<!DOCTYPE html>"
        Comment "<!-- a -->"
        Text "x"
        "###);
    }
}
