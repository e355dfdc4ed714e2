//! CSS generation: keyframes first, then one rule per anchored element.

use indexmap::IndexSet;

use super::anchor;
use crate::compiler::ast::{Animation, Document};

/// Renders the stylesheet for `document`.
///
/// Every distinct animation name gets one `@keyframes` block in first-seen
/// order, followed by the element rules in document order.
pub fn generate_css(document: &Document) -> String {
    let mut keyframes: IndexSet<&str> = IndexSet::new();
    let mut rules = Vec::new();

    for element in document.elements() {
        let Some(anchor) = anchor(element) else {
            continue;
        };
        let animation = element.animation().and_then(|value| Animation::parse(value).ok());

        let mut rule = format!("{} {{\n", anchor.selector());
        if let Some(style) = element.style() {
            for (property, value) in style {
                rule.push_str(&format!("  {property}: {value};\n"));
            }
        }
        if let Some(animation) = &animation {
            keyframes.insert(animation.name);
            rule.push_str(&format!("  animation: {animation};\n"));
        }
        rule.push('}');
        rules.push(rule);
    }

    let blocks: Vec<String> = keyframes
        .iter()
        .map(|name| fade_keyframes(name))
        .chain(rules)
        .collect();
    if blocks.is_empty() {
        return String::new();
    }
    blocks.join("\n\n") + "\n"
}

/// The built-in keyframe template, used for every animation name.
fn fade_keyframes(name: &str) -> String {
    format!("@keyframes {name} {{\n  0% {{ opacity: 0; }}\n  100% {{ opacity: 1; }}\n}}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ast::{ATTR_ANIMATE, ATTR_STYLE, AttrValue, Element, Position, StyleMap};

    fn animated(line: usize, value: &str) -> Element {
        Element::new("div", Position::new(line, 1))
            .with_attribute(ATTR_ANIMATE, AttrValue::Text(value.into()))
    }

    #[test]
    fn test_keyframes_and_rule() {
        let document = Document::new(vec![animated(1, "fade 2s").into()]);
        assert_eq!(
            generate_css(&document),
            "@keyframes fade {\n  0% { opacity: 0; }\n  100% { opacity: 1; }\n}\n\n\
             .hx-1-1 {\n  animation: fade 2s;\n}\n"
        );
    }

    #[test]
    fn test_keyframes_deduplicated_in_first_seen_order() {
        let document = Document::new(vec![
            animated(1, "slide 1s").into(),
            animated(2, "fade 2s ease-in").into(),
            animated(3, "slide 500ms linear infinite").into(),
        ]);
        let css = generate_css(&document);
        assert_eq!(css.matches("@keyframes slide").count(), 1);
        assert_eq!(css.matches("@keyframes fade").count(), 1);
        assert!(css.find("@keyframes slide").unwrap() < css.find("@keyframes fade").unwrap());
        assert!(css.contains(".hx-3-1 {\n  animation: slide 500ms linear infinite;\n}"));
    }

    #[test]
    fn test_style_then_animation() {
        let mut style = StyleMap::new();
        style.insert("color".into(), "red".into());
        style.insert("background".into(), "#FF0000".into());
        let element = animated(1, "fade 1s")
            .with_id("hero")
            .with_attribute(ATTR_STYLE, AttrValue::Style(style));
        let css = generate_css(&Document::new(vec![element.into()]));
        assert!(css.ends_with(
            "#hero {\n  color: red;\n  background: #FF0000;\n  animation: fade 1s;\n}\n"
        ));
    }

    #[test]
    fn test_inline_styles_stay_out_of_the_stylesheet() {
        let mut style = StyleMap::new();
        style.insert("color".into(), "red".into());
        let element =
            Element::new("p", Position::default()).with_attribute(ATTR_STYLE, AttrValue::Style(style));
        assert_eq!(generate_css(&Document::new(vec![element.into()])), "");
    }
}
