//! HTML tag and attribute tables.
//!
//! Composition treats every tag that is *not* listed here as a candidate
//! custom tag, so the reserved set errs on the side of including anything a
//! browser (or inline SVG) would recognise.

use phf::phf_set;

/// Elements that never have children or a closing tag.
pub static VOID_TAGS: phf::Set<&'static str> = phf_set! {
    "area", "base", "br", "col", "embed", "hr", "img", "input",
    "link", "meta", "param", "source", "track", "wbr",
};

/// Elements whose content is raw text: no tags and no expressions inside.
pub static RAW_TEXT_TAGS: phf::Set<&'static str> = phf_set! {
    "script", "style",
};

/// Tag names reserved by HTML (and common inline SVG).
pub static HTML_TAGS: phf::Set<&'static str> = phf_set! {
    "a", "abbr", "address", "area", "article", "aside", "audio",
    "b", "base", "bdi", "bdo", "blockquote", "body", "br", "button",
    "canvas", "caption", "cite", "code", "col", "colgroup",
    "data", "datalist", "dd", "del", "details", "dfn", "dialog", "div", "dl", "dt",
    "em", "embed",
    "fieldset", "figcaption", "figure", "footer", "form",
    "h1", "h2", "h3", "h4", "h5", "h6", "head", "header", "hgroup", "hr", "html",
    "i", "iframe", "img", "input", "ins",
    "kbd",
    "label", "legend", "li", "link",
    "main", "map", "mark", "math", "menu", "menuitem", "meta", "meter",
    "nav", "noscript",
    "object", "ol", "optgroup", "option", "output",
    "p", "param", "picture", "pre", "progress",
    "q",
    "rb", "rp", "rt", "rtc", "ruby",
    "s", "samp", "script", "search", "section", "select", "slot", "small",
    "source", "span", "strong", "style", "sub", "summary", "sup", "svg",
    "table", "tbody", "td", "template", "textarea", "tfoot", "th", "thead",
    "time", "title", "tr", "track",
    "u", "ul",
    "var", "video",
    "wbr",
    // inline SVG
    "circle", "clippath", "defs", "ellipse", "foreignobject", "g", "line",
    "lineargradient", "mask", "path", "pattern", "polygon", "polyline",
    "radialgradient", "rect", "stop", "symbol", "tspan", "use",
};

/// Attributes whose presence alone carries meaning.
pub static BOOLEAN_ATTRIBUTES: phf::Set<&'static str> = phf_set! {
    "allowfullscreen", "async", "autofocus", "autoplay", "checked", "controls",
    "default", "defer", "disabled", "formnovalidate", "hidden", "inert",
    "ismap", "itemscope", "loop", "multiple", "muted", "nomodule",
    "novalidate", "open", "playsinline", "readonly", "required", "reversed",
    "selected",
};

/// Check if a tag is a void element
#[inline]
pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(tag)
}

/// Check if a tag holds raw text content (`script`, `style`)
#[inline]
pub fn is_raw_text_tag(tag: &str) -> bool {
    RAW_TEXT_TAGS.contains(tag) || RAW_TEXT_TAGS.contains(tag.to_ascii_lowercase().as_str())
}

/// Check if a tag is `<slot>`, the placeholder for caller content
#[inline]
pub fn is_slot_tag(tag: &str) -> bool {
    tag == "slot"
}

/// Check if a tag name is reserved by HTML.
///
/// Matching is ASCII case-insensitive, so `<Table>` and `<clipPath>` are
/// reserved as well.
pub fn is_html_tag(tag: &str) -> bool {
    if HTML_TAGS.contains(tag) {
        return true;
    }
    if tag.bytes().any(|b| b.is_ascii_uppercase()) {
        return HTML_TAGS.contains(tag.to_ascii_lowercase().as_str());
    }
    false
}

/// Check if an attribute is an HTML boolean attribute
#[inline]
pub fn is_boolean_attribute(name: &str) -> bool {
    BOOLEAN_ATTRIBUTES.contains(name)
}
