//! Pipeline snapshot tests: parse, run passes, print.

use serde_json::json;
use tessera_chisel::parse_source;
use tessera_setter::{apply_each, apply_expressions, flatten, print, StandardEvaluator};
use tessera_tile::{PrintOptions, Scope, Tree};

fn scope(value: serde_json::Value) -> Scope {
    value.as_object().cloned().unwrap_or_default()
}

fn render(src: &str, bindings: serde_json::Value) -> String {
    let mut tree = parse_source(src).unwrap_or_else(|error| panic!("Parse error: {error}"));
    tessera_tile::scope::overlay(tree.root_scope_mut(), &scope(bindings));
    let evaluator = StandardEvaluator::new();
    apply_each(&mut tree, &evaluator);
    let mut tree: Tree = flatten(&tree);
    apply_expressions(&mut tree, &evaluator);
    assert!(tree.is_consistent());
    print(&tree, PrintOptions::TRIM)
}

// =============================================================================
// Round trip
// =============================================================================

mod round_trip {
    use super::*;

    #[test]
    fn document_prints_back() {
        let src = "<!DOCTYPE html>\n<html>\n  <head><meta charset=\"utf-8\"><title>Joy</title></head>\n  <body class=\"page\">\n    <input type=\"checkbox\" disabled>\n    <p>Love, <em>joy</em> &amp; peace</p>\n  </body>\n</html>";
        let tree = parse_source(src).unwrap();
        assert_eq!(print(&tree, PrintOptions::default()), format!("{src}\n"));
    }

    #[test]
    fn untrimmed_output_ends_with_one_newline() {
        let tree = parse_source("\n\n  <p>x</p>  \n\n").unwrap();
        assert_eq!(print(&tree, PrintOptions::default()), "<p>x</p>\n");
    }
}

// =============================================================================
// Flow
// =============================================================================

mod flow {
    use super::*;

    #[test]
    fn each_with_binding() {
        insta::assert_snapshot!(
            render(r#"<a mx-each={[1,2]} mx-as="i">{i}</a>"#, json!({})),
            @"<a>1</a><a>2</a>"
        );
    }

    #[test]
    fn each_over_scope_objects() {
        let bindings = json!({
            "items": [
                {"id": 1, "name": "Love"},
                {"id": 2, "name": "Joy"},
                {"id": 3, "name": "Peace"}
            ]
        });
        insta::assert_snapshot!(
            render(
                "<ul>\n  <li mx-each={items} mx-as=\"item\" id={item.id}>{item.name}</li>\n</ul>",
                bindings
            ),
            @r#"<ul><li id="1">Love</li><li id="2">Joy</li><li id="3">Peace</li></ul>"#
        );
    }

    #[test]
    fn each_with_invalid_list_is_left_in_place() {
        insta::assert_snapshot!(
            render(r#"<p mx-each={count} mx-as="n" class="x">{n}</p>"#, json!({"count": 3})),
            @r#"<p class="x"></p>"#
        );
    }
}

// =============================================================================
// Expressions
// =============================================================================

mod expressions {
    use super::*;

    #[test]
    fn typeof_in_attribute() {
        insta::assert_snapshot!(
            render(
                "<p>\n    <a chapter=\"{typeof chapter} {chapter}\">{gift}</a>\n</p>",
                json!({"gift": "Temperance", "chapter": 5})
            ),
            @r#"<p><a chapter="number 5">Temperance</a></p>"#
        );
    }

    #[test]
    fn undefined_name_renders_empty() {
        insta::assert_snapshot!(
            render("<p>{missing}</p><p>{missing?.deeper}</p>", json!({})),
            @"<p></p><p></p>"
        );
    }

    #[test]
    fn checked_false_is_dropped() {
        insta::assert_snapshot!(
            render(
                r#"<input type="checkbox" checked={done}><input type="checkbox" checked={!done}>"#,
                json!({"done": false})
            ),
            @r#"<input type="checkbox"><input type="checkbox" checked>"#
        );
    }

    #[test]
    fn checked_string_false_is_dropped() {
        insta::assert_snapshot!(
            render(r#"<input checked="{state}">"#, json!({"state": "false"})),
            @"<input>"
        );
    }

    #[test]
    fn text_is_escaped() {
        insta::assert_snapshot!(
            render("<p title={t}>{t}</p>", json!({"t": "<i>&</i>"})),
            @r#"<p title="&lt;i&gt;&amp;&lt;/i&gt;">&lt;i&gt;&amp;&lt;/i&gt;</p>"#
        );
    }
}
