//! The HTMLx syntax tree.
//!
//! A compilation produces exactly one [`Document`]. Its children, and the
//! children of every [`Element`], are [`Node`]s: a closed sum of elements and
//! text runs. Every node is owned by exactly one parent, so the tree can be
//! rebuilt by value (the indentation normalizer does) and then shared
//! read-only with the validator and the generators.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Attribute that carries a CSS declaration list.
pub const ATTR_STYLE: &str = "style";
/// Attribute that carries an animation shorthand (`fade 2s ease-in infinite`).
pub const ATTR_ANIMATE: &str = "animate";
/// Runtime directive wiring an element to a backend endpoint.
pub const ATTR_CALL: &str = "⚡-call";
/// Runtime directive binding an element's content to a data key.
pub const ATTR_DATA: &str = "⚡-data";
/// Prefix reserved for runtime directives.
pub const DIRECTIVE_PREFIX: &str = "⚡-";

/// Tags rendered without a closing tag. Their children are ignored.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// HTML element names recognised as a bare element header when they stand
/// alone on a line (`header`, `main`, ...). Decorated headers (`note.box`,
/// `x#id`, `x(...)`, `x {`) do not need to be in this list.
pub const KNOWN_ELEMENTS: &[&str] = &[
    "a", "abbr", "address", "area", "article", "aside", "audio", "b", "base", "blockquote", "body",
    "br", "button", "canvas", "caption", "cite", "code", "col", "colgroup", "data", "datalist",
    "dd", "del", "details", "dfn", "dialog", "div", "dl", "dt", "em", "embed", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "head", "header",
    "hgroup", "hr", "html", "i", "iframe", "img", "input", "ins", "kbd", "label", "legend", "li",
    "link", "main", "map", "mark", "menu", "meta", "meter", "nav", "noscript", "object", "ol",
    "optgroup", "option", "output", "p", "picture", "pre", "progress", "q", "s", "samp", "section",
    "select", "slot", "small", "source", "span", "strong", "sub", "summary", "sup", "table",
    "tbody", "td", "template", "textarea", "tfoot", "th", "thead", "time", "tr", "track", "u",
    "ul", "var", "video", "wbr",
];

/// Returns true if `tag` is rendered without a closing tag.
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str())
}

/// Returns true if `tag` names a standard HTML element. Names are matched
/// exactly, so a capitalized word like `Menu` is not an element.
pub fn is_known_element(tag: &str) -> bool {
    KNOWN_ELEMENTS.contains(&tag)
}

/// Checks the identifier grammar shared by tag names, ids and classes:
/// an ASCII letter followed by ASCII letters, digits, `-` or `_`.
pub fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        }
        _ => false,
    }
}

// =============================================================================
// Positions
// =============================================================================

/// A 1-based line/column location. Columns count Unicode scalar values.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

// =============================================================================
// Nodes
// =============================================================================

/// The root of a compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub children: Vec<Node>,
}

/// A child of a document or element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(Text),
}

/// An element with its header (tag, id, classes, attributes) and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    /// Classes in declaration order. Duplicates are kept.
    pub classes: Vec<String>,
    /// Attributes in declaration order.
    pub attributes: IndexMap<String, AttrValue>,
    pub children: Vec<Node>,
    /// Position of the tag name in the source.
    pub position: Position,
    /// Indentation width of the source line this element starts, if it
    /// starts one. Consumed and cleared by the indentation normalizer.
    pub(crate) line_indent: Option<usize>,
}

/// A run of text, stored exactly as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub value: String,
    pub position: Position,
    pub(crate) line_indent: Option<usize>,
}

/// The value of an attribute after the parser derived its structured kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// A plain quoted string.
    Text(String),
    /// The declarations of a `style` attribute.
    Style(StyleMap),
    /// A `⚡-call` or `⚡-data` attribute.
    Directive(Directive),
}

/// CSS property to value, in declaration order.
pub type StyleMap = IndexMap<String, String>;

/// A runtime directive. The generators translate these into the
/// `data-api-call`/`data-dynamic` attribute contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    BackendCall { endpoint: String },
    DynamicData { key: String },
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// Iterates over every element in document pre-order.
    pub fn elements(&self) -> Elements<'_> {
        Elements {
            stack: self.children.iter().rev().collect(),
        }
    }
}

/// Pre-order element iterator backed by an explicit stack.
pub struct Elements<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Elements<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            if let Node::Element(element) = node {
                self.stack.extend(element.children.iter().rev());
                return Some(element);
            }
        }
        None
    }
}

impl Node {
    pub fn position(&self) -> Position {
        match self {
            Node::Element(element) => element.position,
            Node::Text(text) => text.position,
        }
    }

    #[cfg(test)]
    pub(crate) fn line_indent(&self) -> Option<usize> {
        match self {
            Node::Element(element) => element.line_indent,
            Node::Text(text) => text.line_indent,
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Node::Text(text)
    }
}

impl Element {
    pub fn new(tag: impl Into<String>, position: Position) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            classes: Vec::new(),
            attributes: IndexMap::new(),
            children: Vec::new(),
            position,
            line_indent: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: AttrValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// The declarations of the `style` attribute, if it was parsed as a map.
    pub fn style(&self) -> Option<&StyleMap> {
        match self.attributes.get(ATTR_STYLE) {
            Some(AttrValue::Style(map)) => Some(map),
            _ => None,
        }
    }

    /// The raw `animate` value.
    pub fn animation(&self) -> Option<&str> {
        match self.attributes.get(ATTR_ANIMATE) {
            Some(AttrValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    /// Runtime directives declared on this element, in declaration order.
    pub fn directives(&self) -> impl Iterator<Item = &Directive> {
        self.attributes.values().filter_map(|value| match value {
            AttrValue::Directive(directive) => Some(directive),
            _ => None,
        })
    }

    pub fn is_void(&self) -> bool {
        is_void_element(&self.tag)
    }
}

impl Text {
    pub fn new(value: impl Into<String>, position: Position) -> Self {
        Self {
            value: value.into(),
            position,
            line_indent: None,
        }
    }
}

impl Directive {
    /// The endpoint or key the directive refers to.
    pub fn target(&self) -> &str {
        match self {
            Directive::BackendCall { endpoint } => endpoint,
            Directive::DynamicData { key } => key,
        }
    }

    /// The source attribute name of this directive.
    pub fn attribute_name(&self) -> &'static str {
        match self {
            Directive::BackendCall { .. } => ATTR_CALL,
            Directive::DynamicData { .. } => ATTR_DATA,
        }
    }
}

// =============================================================================
// Animation shorthand
// =============================================================================

/// A parsed `animate` value: `<name> <duration> [easing] [iterations]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation<'a> {
    pub name: &'a str,
    pub duration: &'a str,
    pub easing: Option<&'a str>,
    pub iterations: Option<&'a str>,
}

impl<'a> Animation<'a> {
    /// Parses an animation shorthand, returning a description of the problem
    /// on failure.
    pub fn parse(value: &'a str) -> Result<Self, String> {
        let parts: Vec<&str> = value.split_whitespace().collect();
        let [name, duration, rest @ ..] = parts.as_slice() else {
            return Err(format!(
                "expected `<name> <duration> [easing] [iterations]`, found {value:?}"
            ));
        };
        if rest.len() > 2 {
            return Err(format!("too many animation parameters in {value:?}"));
        }
        if !is_identifier(name) {
            return Err(format!("animation name {name:?} is not a valid identifier"));
        }
        if !is_css_time(duration) {
            return Err(format!(
                "animation duration {duration:?} is not a CSS time like `2s` or `250ms`"
            ));
        }
        let easing = rest.first().copied();
        if let Some(easing) = easing
            && !is_css_timing(easing)
        {
            return Err(format!(
                "animation easing {easing:?} is not a timing keyword like `ease-in` or `steps(4)`"
            ));
        }
        let iterations = rest.get(1).copied();
        if let Some(iterations) = iterations
            && iterations != "infinite"
            && !is_css_number(iterations)
        {
            return Err(format!(
                "animation iteration count {iterations:?} is not a number or `infinite`"
            ));
        }
        Ok(Self {
            name: *name,
            duration: *duration,
            easing,
            iterations,
        })
    }
}

impl fmt::Display for Animation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.duration)?;
        if let Some(easing) = self.easing {
            write!(f, " {easing}")?;
        }
        if let Some(iterations) = self.iterations {
            write!(f, " {iterations}")?;
        }
        Ok(())
    }
}

fn is_css_time(value: &str) -> bool {
    let number = value
        .strip_suffix("ms")
        .or_else(|| value.strip_suffix('s'))
        .unwrap_or("");
    is_css_number(number)
}

fn is_css_number(value: &str) -> bool {
    !value.is_empty()
        && value.chars().filter(|&c| c == '.').count() <= 1
        && value.chars().any(|c| c.is_ascii_digit())
        && value.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// A timing keyword (`linear`, `ease-out`) or a whitespace-free timing
/// function (`steps(4,end)`, `cubic-bezier(0.1,0.7,1,0.1)`).
fn is_css_timing(value: &str) -> bool {
    let (keyword, arguments) = match value.split_once('(') {
        Some((keyword, rest)) => match rest.strip_suffix(')') {
            Some(arguments) => (keyword, Some(arguments)),
            None => return false,
        },
        None => (value, None),
    };
    is_identifier(keyword)
        && arguments.is_none_or(|arguments| {
            arguments
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | ',' | '-'))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("main"));
        assert!(is_identifier("valid-id"));
        assert!(is_identifier("h1"));
        assert!(is_identifier("snake_case"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("-abc"));
        assert!(!is_identifier("🎨"));
        assert!(!is_identifier("has space"));
    }

    #[test]
    fn test_elements_pre_order() {
        let document = Document::new(vec![
            Element::new("div", Position::new(1, 1))
                .with_child(Element::new("p", Position::new(2, 3)))
                .with_child(Text::new("hi", Position::new(3, 3)))
                .with_child(Element::new("span", Position::new(4, 3)))
                .into(),
            Element::new("footer", Position::new(5, 1)).into(),
        ]);

        let tags: Vec<&str> = document.elements().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, vec!["div", "p", "span", "footer"]);
    }

    #[test]
    fn test_animation_parse() {
        let animation = Animation::parse("fade 2s").unwrap();
        assert_eq!(animation.name, "fade");
        assert_eq!(animation.duration, "2s");
        assert_eq!(animation.easing, None);

        let animation = Animation::parse("slide 250ms ease-in-out infinite").unwrap();
        assert_eq!(animation.easing, Some("ease-in-out"));
        assert_eq!(animation.iterations, Some("infinite"));
        assert_eq!(animation.to_string(), "slide 250ms ease-in-out infinite");

        assert!(Animation::parse("0.5s").is_err());
        assert!(Animation::parse("fade").is_err());
        assert!(Animation::parse("fade fast").is_err());
        assert!(Animation::parse("fade 1s a b c").is_err());
        assert!(Animation::parse("1fade 1s").is_err());
    }

    #[test]
    fn test_animation_timing_and_iterations() {
        let animation = Animation::parse("pulse 1s steps(4,end) 3").unwrap();
        assert_eq!(animation.easing, Some("steps(4,end)"));
        assert_eq!(animation.iterations, Some("3"));
        assert!(Animation::parse("pulse 1s cubic-bezier(0.1,0.7,1,0.1) 2.5").is_ok());

        assert!(Animation::parse("fade 1s ;}body{display:none").is_err());
        assert!(Animation::parse("fade 1s ease<script>").is_err());
        assert!(Animation::parse("fade 1s steps(4").is_err());
        assert!(Animation::parse("fade 1s steps(4;}) 1").is_err());
        assert!(Animation::parse("fade 1s linear twice").is_err());
        assert!(Animation::parse("fade 1s linear 1;}").is_err());
    }

    #[test]
    fn test_css_time() {
        assert!(is_css_time("2s"));
        assert!(is_css_time("0.5s"));
        assert!(is_css_time("250ms"));
        assert!(!is_css_time("s"));
        assert!(!is_css_time("ms"));
        assert!(!is_css_time("1.2.3s"));
        assert!(!is_css_time("2"));
    }

    #[test]
    fn test_void_elements() {
        assert!(is_void_element("img"));
        assert!(is_void_element("BR"));
        assert!(!is_void_element("div"));
    }
}
