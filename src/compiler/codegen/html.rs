//! HTML generation.

use std::path::Path;

use super::source_map::{Mapping, MappingKind, SourceMap};
use super::{Anchor, anchor, escape_html};
use crate::compiler::ast::{
    ATTR_ANIMATE, AttrValue, DIRECTIVE_PREFIX, Directive, Document, Element, Node, Position, Text,
};
use crate::util::title_case;

/// A generated HTML document and its source map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlOutput {
    pub html: String,
    pub source_map: SourceMap,
}

/// Renders a complete HTML5 document for `document`.
///
/// `filename` is the source file name; its stem names the title, the
/// stylesheet and the script the page links to.
pub fn generate_html(document: &Document, filename: &str) -> HtmlOutput {
    let stem = file_stem(filename);
    let title = title_case(stem);
    let mut writer = Writer::new(SourceMap::new(format!("{stem}.html"), filename));

    writer.line(0, "<!DOCTYPE html>");
    writer.line(0, "<html lang=\"en\">");
    writer.line(0, "<head>");
    writer.line(1, "<meta charset=\"UTF-8\">");
    writer.line(
        1,
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">",
    );
    writer.line(1, "<meta name=\"generator\" content=\"htmlx\">");
    writer.line(1, &format!("<title>{}</title>", escape_html(&title)));
    writer.line(
        1,
        &format!("<link rel=\"stylesheet\" href=\"{}.css\">", escape_html(stem)),
    );
    writer.line(0, "</head>");
    writer.line(0, "<body>");
    for node in &document.children {
        writer.node(node, 1);
    }
    writer.line(
        1,
        &format!("<script src=\"{}.js\" defer></script>", escape_html(stem)),
    );
    writer.line(0, "</body>");
    writer.line(0, "</html>");

    HtmlOutput {
        html: writer.out,
        source_map: writer.map,
    }
}

/// The file name without directories and extension, `index` if empty.
pub(crate) fn file_stem(filename: &str) -> &str {
    Path::new(filename)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("index")
}

/// Output buffer that tracks the generated position.
struct Writer {
    out: String,
    line: usize,
    column: usize,
    map: SourceMap,
}

impl Writer {
    fn new(map: SourceMap) -> Self {
        Self {
            out: String::new(),
            line: 1,
            column: 1,
            map,
        }
    }

    fn push(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.out.push_str(text);
    }

    fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.push("  ");
        }
    }

    fn line(&mut self, depth: usize, text: &str) {
        self.indent(depth);
        self.push(text);
        self.push("\n");
    }

    fn mark(&mut self, kind: MappingKind, original: Position, name: Option<&str>) {
        self.map.mappings.push(Mapping {
            generated: Position::new(self.line, self.column),
            original,
            kind,
            name: name.map(str::to_string),
        });
    }

    fn node(&mut self, node: &Node, depth: usize) {
        match node {
            Node::Element(element) => self.element(element, depth),
            Node::Text(text) => {
                self.indent(depth);
                self.text(text);
                self.push("\n");
            }
        }
    }

    fn text(&mut self, text: &Text) {
        self.mark(MappingKind::Text, text.position, None);
        self.push(&escape_html(&text.value));
    }

    fn element(&mut self, element: &Element, depth: usize) {
        self.indent(depth);
        self.mark(MappingKind::Element, element.position, Some(&element.tag));
        self.push("<");
        self.push(&element.tag);
        self.push(&attributes(element));
        self.push(">");

        if element.is_void() {
            self.push("\n");
            return;
        }

        match element.children.as_slice() {
            [] => {}
            [Node::Text(text)] => self.text(text),
            children => {
                self.push("\n");
                for child in children {
                    self.node(child, depth + 1);
                }
                self.indent(depth);
            }
        }
        self.push("</");
        self.push(&element.tag);
        self.push(">\n");
    }
}

/// Renders the attribute list of an element, including the leading space.
fn attributes(element: &Element) -> String {
    let anchor = anchor(element);
    let mut out = String::new();

    if let Some(id) = &element.id {
        push_attribute(&mut out, "id", id);
    }

    let mut classes: Vec<&str> = element.classes.iter().map(String::as_str).collect();
    if let Some(Anchor::Class(class)) = &anchor {
        classes.push(class);
    }
    if !classes.is_empty() {
        push_attribute(&mut out, "class", &classes.join(" "));
    }

    for (name, value) in &element.attributes {
        match value {
            AttrValue::Text(_) if name == ATTR_ANIMATE || name.starts_with(DIRECTIVE_PREFIX) => {}
            AttrValue::Text(value) => push_attribute(&mut out, name, value),
            AttrValue::Style(style) => {
                if anchor.is_none() && !style.is_empty() {
                    let inline: String = style
                        .iter()
                        .map(|(property, value)| format!("{property}:{value};"))
                        .collect();
                    push_attribute(&mut out, name, &inline);
                }
            }
            AttrValue::Directive(Directive::BackendCall { endpoint }) => {
                push_attribute(&mut out, "data-api-call", endpoint)
            }
            AttrValue::Directive(Directive::DynamicData { key }) => {
                push_attribute(&mut out, "data-dynamic", key)
            }
        }
    }
    out
}

fn push_attribute(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_html(value));
    out.push('"');
}
