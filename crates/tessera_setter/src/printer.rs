//! HTML printer.
//!
//! Prints a tree back to markup. Expressions that have not been evaluated
//! print in their source form (`{expr}`), so a freshly parsed template
//! prints back to the text it came from.

use tessera_tile::{Attribute, AttributeValue, ElementNode, NodeId, NodeKind, PrintOptions, Tree};

/// Print the whole tree.
pub fn print(tree: &Tree, options: PrintOptions) -> String {
    let mut printer = Printer::new(tree, options);
    printer.print_children(Tree::ROOT);
    printer.finish()
}

/// Print the subtree below `id` (excluding `id` itself when it is a
/// fragment).
pub fn print_node(tree: &Tree, id: NodeId, options: PrintOptions) -> String {
    let mut printer = Printer::new(tree, options);
    printer.print_node(id);
    printer.finish()
}

/// The attribute value as written: text fragments verbatim, expressions in
/// braces.
pub fn concat_attribute_value(attr: &Attribute) -> String {
    let mut out = String::new();
    for fragment in &attr.value {
        match fragment {
            AttributeValue::Text(text) => out.push_str(text),
            AttributeValue::Expression(source) => {
                out.push('{');
                out.push_str(source);
                out.push('}');
            }
        }
    }
    out
}

struct Printer<'a> {
    tree: &'a Tree,
    options: PrintOptions,
    out: String,
}

impl<'a> Printer<'a> {
    fn new(tree: &'a Tree, options: PrintOptions) -> Self {
        Self {
            tree,
            options,
            out: String::with_capacity(256),
        }
    }

    fn finish(self) -> String {
        let mut out = self.out.trim().to_string();
        if !self.options.trim {
            out.push('\n');
        }
        out
    }

    fn print_children(&mut self, id: NodeId) {
        for &child in self.tree.children(id) {
            self.print_node(child);
        }
    }

    fn print_node(&mut self, id: NodeId) {
        match self.tree.kind(id) {
            NodeKind::Fragment(_) => self.print_children(id),
            NodeKind::Element(element) => self.print_element(id, element),
            NodeKind::Text(text) => {
                if self.options.trim {
                    self.out.push_str(text.content.trim());
                } else {
                    self.out.push_str(&text.content);
                }
            }
            NodeKind::Expression(expression) => {
                self.out.push('{');
                self.out.push_str(&expression.content);
                self.out.push('}');
            }
            NodeKind::Doctype => self.out.push_str("<!DOCTYPE html>"),
        }
    }

    fn print_element(&mut self, id: NodeId, element: &ElementNode) {
        self.out.push('<');
        self.out.push_str(&element.tag);
        for attr in &element.attributes {
            let value = concat_attribute_value(attr);
            if element.tag == "input" && attr.name == "checked" && value == "false" {
                continue;
            }
            self.out.push(' ');
            self.out.push_str(&attr.name);
            if attr.is_bare() {
                continue;
            }
            self.out.push('=');
            if attr.single_expression().is_some() {
                self.out.push_str(&value);
            } else {
                self.print_quoted(attr);
            }
        }
        self.out.push('>');

        self.print_children(id);
        if !element.is_void {
            self.out.push_str("</");
            self.out.push_str(&element.tag);
            self.out.push('>');
        }
    }

    /// A double-quoted value. Quotes in literal text become `&quot;`;
    /// unevaluated expressions keep their source.
    fn print_quoted(&mut self, attr: &Attribute) {
        self.out.push('"');
        for fragment in &attr.value {
            match fragment {
                AttributeValue::Text(text) => self.out.push_str(&text.replace('"', "&quot;")),
                AttributeValue::Expression(source) => {
                    self.out.push('{');
                    self.out.push_str(source);
                    self.out.push('}');
                }
            }
        }
        self.out.push('"');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_chisel::parse_source;

    fn reprint(source: &str, options: PrintOptions) -> String {
        print(&parse_source(source).unwrap(), options)
    }

    #[test]
    fn test_round_trip() {
        let source = "<div class=\"a b\" hidden>\n  <p>Hi <b>there</b></p>\n  <br>\n</div>";
        assert_eq!(reprint(source, PrintOptions::default()), format!("{source}\n"));
    }

    #[test]
    fn test_expressions_print_as_source() {
        assert_eq!(
            reprint(r#"<a mx-each={[1,2]} title="{a} b">{i}</a>"#, PrintOptions::TRIM),
            r#"<a mx-each={[1,2]} title="{a} b">{i}</a>"#
        );
    }

    #[test]
    fn test_single_quoted_values_stay_well_formed() {
        let printed = reprint(r#"<p title='say "hi"' alt='it'>x</p>"#, PrintOptions::TRIM);
        assert_eq!(printed, r#"<p title="say &quot;hi&quot;" alt="it">x</p>"#);
        assert_eq!(reprint(&printed, PrintOptions::TRIM), printed);
        assert_eq!(
            reprint(r#"<p title='{a + "x"} "b"'></p>"#, PrintOptions::TRIM),
            r#"<p title="{a + "x"} &quot;b&quot;"></p>"#
        );
    }

    #[test]
    fn test_trim() {
        assert_eq!(
            reprint("<ul>\n  <li> a </li>\n</ul>\n\n", PrintOptions::TRIM),
            "<ul><li>a</li></ul>"
        );
        assert_eq!(reprint("\n\n<p></p>\n\n", PrintOptions::default()), "<p></p>\n");
    }

    #[test]
    fn test_checked_false_dropped_on_input() {
        assert_eq!(
            reprint(r#"<input checked="false" type="checkbox">"#, PrintOptions::TRIM),
            r#"<input type="checkbox">"#
        );
        assert_eq!(
            reprint(r#"<option checked="false"></option>"#, PrintOptions::TRIM),
            r#"<option checked="false"></option>"#
        );
    }

    #[test]
    fn test_doctype_and_void() {
        assert_eq!(
            reprint("<!doctype html><img src=\"a.png\"/>", PrintOptions::TRIM),
            "<!DOCTYPE html><img src=\"a.png\">"
        );
    }

    #[test]
    fn test_print_node() {
        let tree = parse_source("<div><p>x</p></div>").unwrap();
        let div = tree.children(Tree::ROOT)[0];
        let p = tree.children(div)[0];
        assert_eq!(print_node(&tree, p, PrintOptions::TRIM), "<p>x</p>");
    }
}
