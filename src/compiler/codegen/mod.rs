//! Code generators: HTML (with a source map), CSS and the client script.
//!
//! All three are pure functions of a validated [`Document`](super::ast::Document).
//! The HTML and CSS generators agree on one [`Anchor`] per styled element so
//! that a rule emitted into the stylesheet selects the element it came from.

mod css;
mod html;
mod js;
mod source_map;

use std::borrow::Cow;

pub use css::generate_css;
pub use html::{HtmlOutput, generate_html};
pub use js::{DEFAULT_API_BASE, JsOptions, generate_js, generate_js_with};
pub use source_map::{Mapping, MappingKind, SourceMap};

use super::ast::Element;

/// Escapes text for HTML content and double-quoted attribute values.
///
/// This is the only place user text is escaped.
pub fn escape_html(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 16);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// The CSS selector tying an element to its generated rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anchor {
    Id(String),
    /// A class synthesized from the element's source position.
    Class(String),
}

impl Anchor {
    pub fn selector(&self) -> String {
        match self {
            Anchor::Id(id) => format!("#{id}"),
            Anchor::Class(class) => format!(".{class}"),
        }
    }
}

/// Picks the anchor for an element with a style map or an animation.
///
/// The id wins when present. Otherwise a class named after the element's
/// position is synthesized for animated elements and for styled elements
/// that already carry classes. Styled elements without id or classes have
/// no anchor and keep their style inline.
pub fn anchor(element: &Element) -> Option<Anchor> {
    let styled = element.style().is_some_and(|style| !style.is_empty());
    let animated = element.animation().is_some();
    if !styled && !animated {
        return None;
    }
    if let Some(id) = &element.id {
        return Some(Anchor::Id(id.clone()));
    }
    if animated || !element.classes.is_empty() {
        let position = element.position;
        return Some(Anchor::Class(format!(
            "hx-{}-{}",
            position.line, position.column
        )));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ast::{ATTR_ANIMATE, ATTR_STYLE, AttrValue, Position, StyleMap};

    fn styled(element: Element) -> Element {
        let mut style = StyleMap::new();
        style.insert("color".into(), "red".into());
        element.with_attribute(ATTR_STYLE, AttrValue::Style(style))
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("plain"), "plain");
        assert!(matches!(escape_html("plain"), Cow::Borrowed(_)));
        assert_eq!(
            escape_html(r#"<script>alert("XSS")</script>"#),
            "&lt;script&gt;alert(&quot;XSS&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("Tom & Jerry's"), "Tom &amp; Jerry&#x27;s");
    }

    #[test]
    fn test_anchor_prefers_id() {
        let element = styled(Element::new("div", Position::new(2, 3)).with_id("hero").with_class("x"));
        assert_eq!(anchor(&element), Some(Anchor::Id("hero".into())));
        assert_eq!(anchor(&element).unwrap().selector(), "#hero");
    }

    #[test]
    fn test_anchor_synthesized_class() {
        let element = styled(Element::new("div", Position::new(2, 3)).with_class("card"));
        assert_eq!(anchor(&element), Some(Anchor::Class("hx-2-3".into())));

        let animated = Element::new("p", Position::new(7, 1))
            .with_attribute(ATTR_ANIMATE, AttrValue::Text("fade 1s".into()));
        assert_eq!(anchor(&animated).unwrap().selector(), ".hx-7-1");
    }

    #[test]
    fn test_no_anchor() {
        assert_eq!(anchor(&styled(Element::new("div", Position::default()))), None);
        assert_eq!(anchor(&Element::new("div", Position::default()).with_id("plain")), None);
    }
}
