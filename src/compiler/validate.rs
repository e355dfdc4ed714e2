//! Semantic validation.
//!
//! A read-only fold over the element tree that collects every error and
//! warning in document order. Generation only runs when no errors were found.

use std::collections::HashMap;
use std::fmt;

use super::ast::{
    ATTR_ANIMATE, AttrValue, Animation, DIRECTIVE_PREFIX, Document, Element, Position, StyleMap,
    is_identifier,
};

/// Default number of animated elements before `excess-animation` fires.
pub const DEFAULT_ANIMATION_THRESHOLD: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Stable rule name, e.g. `invalid-id`.
    pub rule: &'static str,
    pub message: String,
    pub severity: Severity,
    pub position: Position,
}

impl Diagnostic {
    fn error(rule: &'static str, position: Position, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
            severity: Severity::Error,
            position,
        }
    }

    fn warning(rule: &'static str, position: Position, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
            severity: Severity::Warning,
            position,
        }
    }

    pub fn line(&self) -> usize {
        self.position.line
    }

    pub fn column(&self) -> usize {
        self.position.column
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}[{}]: {}",
            self.position, self.severity, self.rule, self.message
        )
    }
}

/// The outcome of validating one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    pub file: String,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl Validation {
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.errors.push(diagnostic),
            Severity::Warning => self.warnings.push(diagnostic),
        }
    }
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.errors.iter().chain(&self.warnings).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}:{diagnostic}", self.file)?;
        }
        Ok(())
    }
}

/// Tunables supplied by the caller, usually from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorOptions {
    pub animation_threshold: usize,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            animation_threshold: DEFAULT_ANIMATION_THRESHOLD,
        }
    }
}

/// Validates a document with default options.
pub fn validate(document: &Document, file: &str) -> Validation {
    validate_with(document, file, &ValidatorOptions::default())
}

/// Validates a document, visiting every element.
pub fn validate_with(document: &Document, file: &str, options: &ValidatorOptions) -> Validation {
    let mut state = State {
        validation: Validation {
            file: file.to_string(),
            ..Validation::default()
        },
        ids: HashMap::new(),
        animated: 0,
        threshold: options.animation_threshold,
    };
    for element in document.elements() {
        state.visit(element);
    }
    state.validation
}

struct State<'a> {
    validation: Validation,
    /// First position of each id seen so far.
    ids: HashMap<&'a str, Position>,
    animated: usize,
    threshold: usize,
}

impl<'a> State<'a> {
    fn visit(&mut self, element: &'a Element) {
        let position = element.position;

        if !is_identifier(&element.tag) {
            self.validation.push(Diagnostic::error(
                "invalid-tag",
                position,
                format!("invalid tag name \"{}\"", element.tag),
            ));
        }

        if let Some(id) = &element.id {
            if !is_identifier(id) {
                self.validation.push(Diagnostic::error(
                    "invalid-id",
                    position,
                    format!(
                        "invalid id \"{id}\": ids must start with a letter and contain only letters, digits, `-` or `_`"
                    ),
                ));
            }
            if let Some(first) = self.ids.get(id.as_str()) {
                self.validation.push(Diagnostic::warning(
                    "duplicate-id",
                    position,
                    format!("duplicate id \"{id}\", first used at {first}"),
                ));
            } else {
                self.ids.insert(id, position);
            }
        }

        for class in &element.classes {
            if !is_identifier(class) {
                self.validation.push(Diagnostic::error(
                    "invalid-class",
                    position,
                    format!(
                        "invalid class \"{class}\": classes must start with a letter and contain only letters, digits, `-` or `_`"
                    ),
                ));
            }
        }

        for (name, value) in &element.attributes {
            match value {
                AttrValue::Directive(directive) => {
                    if directive.target().trim().is_empty() {
                        self.validation.push(Diagnostic::error(
                            "empty-directive",
                            position,
                            format!("`{name}` needs a non-empty value"),
                        ));
                    }
                }
                AttrValue::Style(style) => self.check_style(style, position),
                AttrValue::Text(value) if name == ATTR_ANIMATE => self.check_animation(value, position),
                AttrValue::Text(_) if name.starts_with(DIRECTIVE_PREFIX) => {
                    self.validation.push(Diagnostic::warning(
                        "unknown-directive",
                        position,
                        format!("unknown directive `{name}` is ignored"),
                    ));
                }
                AttrValue::Text(_) => {}
            }
        }

        if element.is_void() && !element.children.is_empty() {
            self.validation.push(Diagnostic::warning(
                "void-children",
                position,
                format!("<{}> cannot have content, its children are ignored", element.tag),
            ));
        }
    }

    fn check_style(&mut self, style: &StyleMap, position: Position) {
        for (property, value) in style {
            if !is_style_property(property) {
                self.validation.push(Diagnostic::error(
                    "invalid-style",
                    position,
                    format!("invalid style property \"{property}\""),
                ));
            }
            if value.contains(['{', '}', ';', '<']) {
                self.validation.push(Diagnostic::error(
                    "invalid-style",
                    position,
                    format!("invalid value \"{value}\" for style property \"{property}\""),
                ));
            }
        }
    }

    fn check_animation(&mut self, value: &str, position: Position) {
        if let Err(problem) = Animation::parse(value) {
            self.validation
                .push(Diagnostic::error("invalid-animation", position, problem));
        }

        self.animated += 1;
        if self.animated == 1 {
            self.validation.push(Diagnostic::warning(
                "reduced-motion",
                position,
                "animations should be disabled under `prefers-reduced-motion: reduce`",
            ));
        }
        if self.animated == self.threshold + 1 {
            self.validation.push(Diagnostic::warning(
                "excess-animation",
                position,
                format!(
                    "more than {} animated elements, consider animating fewer",
                    self.threshold
                ),
            ));
        }
    }
}

/// `-?[A-Za-z-]+`, which also admits custom properties such as `--accent`.
fn is_style_property(property: &str) -> bool {
    property.chars().any(|c| c.is_ascii_alphabetic())
        && property.chars().all(|c| c.is_ascii_alphabetic() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ast::{ATTR_CALL, ATTR_DATA, ATTR_STYLE, Directive, Text};

    fn at(line: usize) -> Position {
        Position::new(line, 1)
    }

    fn doc(elements: Vec<Element>) -> Document {
        Document::new(elements.into_iter().map(Into::into).collect())
    }

    fn rules(diagnostics: &[Diagnostic]) -> Vec<&'static str> {
        diagnostics.iter().map(|d| d.rule).collect()
    }

    #[test]
    fn test_valid_document() {
        let document = doc(vec![
            Element::new("div", at(1))
                .with_id("valid-id")
                .with_class("valid-class")
                .with_child(Text::new("Content", at(1))),
        ]);
        let validation = validate(&document, "test.htmlx");
        assert!(validation.ok());
        assert!(validation.warnings.is_empty());
    }

    #[test]
    fn test_invalid_id_quotes_value() {
        let document = doc(vec![Element::new("div", at(1)).with_id("🎨")]);
        let validation = validate(&document, "test.htmlx");
        assert!(!validation.ok());
        assert_eq!(rules(&validation.errors), vec!["invalid-id"]);
        assert!(validation.errors[0].message.contains("\"🎨\""));
    }

    #[test]
    fn test_invalid_class_and_tag() {
        let document = doc(vec![
            Element::new("1div", at(1))
                .with_class("ok")
                .with_class("9lives"),
        ]);
        let validation = validate(&document, "test.htmlx");
        assert_eq!(rules(&validation.errors), vec!["invalid-tag", "invalid-class"]);
    }

    #[test]
    fn test_visits_every_node() {
        let document = doc(vec![
            Element::new("div", at(1))
                .with_id("1a")
                .with_child(Element::new("p", at(2)).with_id("2b")),
            Element::new("span", at(3)).with_class("-c"),
        ]);
        let validation = validate(&document, "test.htmlx");
        assert_eq!(validation.errors.len(), 3);
        let lines: Vec<usize> = validation.errors.iter().map(Diagnostic::line).collect();
        assert_eq!(lines, vec![1, 2, 3]);
    }

    #[test]
    fn test_duplicate_id_is_a_warning() {
        let document = doc(vec![
            Element::new("div", at(1)).with_id("main"),
            Element::new("div", at(4)).with_id("main"),
        ]);
        let validation = validate(&document, "test.htmlx");
        assert!(validation.ok());
        assert_eq!(rules(&validation.warnings), vec!["duplicate-id"]);
        assert_eq!(validation.warnings[0].line(), 4);
        assert!(validation.warnings[0].message.contains("1:1"));
    }

    #[test]
    fn test_empty_directive() {
        let document = doc(vec![
            Element::new("button", at(1)).with_attribute(
                ATTR_CALL,
                AttrValue::Directive(Directive::BackendCall {
                    endpoint: "  ".to_string(),
                }),
            ),
            Element::new("span", at(2)).with_attribute(
                ATTR_DATA,
                AttrValue::Directive(Directive::DynamicData {
                    key: "user".to_string(),
                }),
            ),
        ]);
        let validation = validate(&document, "test.htmlx");
        assert_eq!(rules(&validation.errors), vec!["empty-directive"]);
        assert_eq!(validation.errors[0].line(), 1);
    }

    #[test]
    fn test_unknown_directive_warns() {
        let document = doc(vec![
            Element::new("div", at(1))
                .with_attribute("⚡-bind", AttrValue::Text("x".to_string()))
                .with_attribute("data-x", AttrValue::Text("y".to_string())),
        ]);
        let validation = validate(&document, "test.htmlx");
        assert!(validation.ok());
        assert_eq!(rules(&validation.warnings), vec!["unknown-directive"]);
    }

    #[test]
    fn test_animation_rules() {
        let animated = |line: usize, value: &str| {
            Element::new("div", at(line)).with_attribute(ATTR_ANIMATE, AttrValue::Text(value.into()))
        };
        let document = doc(vec![animated(1, "fade 2s"), animated(2, "fade")]);
        let validation = validate(&document, "test.htmlx");
        assert_eq!(rules(&validation.errors), vec!["invalid-animation"]);
        assert_eq!(validation.errors[0].line(), 2);
        assert_eq!(rules(&validation.warnings), vec!["reduced-motion"]);
        assert_eq!(validation.warnings[0].line(), 1);
    }

    #[test]
    fn test_animation_cannot_break_out_of_rule() {
        let document = doc(vec![Element::new("div", at(1)).with_id("x").with_attribute(
            ATTR_ANIMATE,
            AttrValue::Text("fade 1s ;}body{display:none".into()),
        )]);
        let validation = validate(&document, "test.htmlx");
        assert!(!validation.ok());
        assert_eq!(rules(&validation.errors), vec!["invalid-animation"]);
        assert!(validation.errors[0].message.contains("easing"));
    }

    #[test]
    fn test_excess_animation() {
        let elements: Vec<Element> = (1..=7)
            .map(|line| {
                Element::new("div", at(line))
                    .with_attribute(ATTR_ANIMATE, AttrValue::Text("fade 1s".into()))
            })
            .collect();
        let document = doc(elements);

        let validation = validate(&document, "test.htmlx");
        assert!(validation.ok());
        assert_eq!(rules(&validation.warnings), vec!["reduced-motion", "excess-animation"]);
        assert_eq!(validation.warnings[1].line(), 6);

        let relaxed = validate_with(
            &document,
            "test.htmlx",
            &ValidatorOptions {
                animation_threshold: 10,
            },
        );
        assert_eq!(rules(&relaxed.warnings), vec!["reduced-motion"]);
    }

    #[test]
    fn test_invalid_style() {
        let mut style = StyleMap::new();
        style.insert("color".into(), "red".into());
        style.insert("--accent".into(), "#f00".into());
        style.insert("back ground".into(), "blue".into());
        style.insert("width".into(), "10px } body { color: red".into());
        let document =
            doc(vec![Element::new("div", at(1)).with_attribute(ATTR_STYLE, AttrValue::Style(style))]);
        let validation = validate(&document, "test.htmlx");
        assert_eq!(rules(&validation.errors), vec!["invalid-style", "invalid-style"]);
        assert!(validation.errors[0].message.contains("back ground"));
        assert!(validation.errors[1].message.contains("width"));
    }

    #[test]
    fn test_void_children() {
        let document =
            doc(vec![Element::new("img", at(1)).with_child(Text::new("caption", at(1)))]);
        let validation = validate(&document, "test.htmlx");
        assert!(validation.ok());
        assert_eq!(rules(&validation.warnings), vec!["void-children"]);
    }

    #[test]
    fn test_display() {
        let document = doc(vec![Element::new("div", Position::new(3, 5)).with_id("🎨")]);
        let validation = validate(&document, "page.htmlx");
        let rendered = validation.to_string();
        assert!(rendered.starts_with("page.htmlx:3:5: error[invalid-id]: invalid id \"🎨\""));
    }
}
