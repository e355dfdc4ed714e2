//! Recursive-descent parser from tokens to the raw syntax tree.
//!
//! ```text
//! Document   := Node*
//! Node       := Element | TextRun
//! Element    := tag ('.' class | '#' id)* ('(' AttrList? ')')? Block?
//! AttrList   := Attr (',' Attr)* ','?
//! Attr       := attrName ':' string
//! Block      := '{' Node* '}'
//! ```
//!
//! The parser never escapes or unescapes text. It records, for each node that
//! begins a source line, that line's indentation width; the indentation
//! normalizer uses those markers to nest indentation blocks.

use indexmap::IndexMap;

use super::ast::{
    ATTR_CALL, ATTR_DATA, ATTR_STYLE, AttrValue, Directive, Document, Element, Node, Position,
    StyleMap, Text,
};
use super::lexer::{Token, TokenKind};

/// Maximum brace nesting depth.
pub const MAX_DEPTH: usize = 256;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("{position}: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
        position: Position,
    },

    #[error("{position}: unmatched `}}`")]
    UnmatchedBrace { position: Position },

    #[error("{position}: unclosed `{{`, expected `}}` before end of input")]
    UnclosedBrace { position: Position },

    #[error("{position}: ambiguous id `#{id}`, element already has id `#{first}`")]
    DuplicateId {
        id: String,
        first: String,
        position: Position,
    },

    #[error("{position}: duplicate attribute `{name}`")]
    DuplicateAttribute { name: String, position: Position },

    #[error("{position}: malformed style declaration {declaration:?}, expected `property: value`")]
    MalformedStyle {
        declaration: String,
        position: Position,
    },

    #[error("{position}: blocks nested deeper than {MAX_DEPTH} levels")]
    TooDeep { position: Position },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::UnexpectedToken { position, .. }
            | ParseError::UnmatchedBrace { position }
            | ParseError::UnclosedBrace { position }
            | ParseError::DuplicateId { position, .. }
            | ParseError::DuplicateAttribute { position, .. }
            | ParseError::MalformedStyle { position, .. }
            | ParseError::TooDeep { position } => *position,
        }
    }
}

/// Parses a token stream (as produced by [`super::lexer::tokenize`]).
pub fn parse_tokens(tokens: Vec<Token>) -> Result<Document, ParseError> {
    Parser::new(tokens).parse_document()
}

/// The parser state.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Indentation width of the current source line.
    line_width: usize,
    /// Whether no node has started on the current line yet.
    at_line_start: bool,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            line_width: 0,
            at_line_start: true,
            depth: 0,
        }
    }

    pub fn parse_document(mut self) -> Result<Document, ParseError> {
        let children = self.parse_nodes(None)?;
        Ok(Document::new(children))
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().map_or(TokenKind::Eof, |token| token.kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Position to blame when the stream ends without an `Eof` token.
    fn end_position(&self) -> Position {
        self.tokens
            .last()
            .map(|token| token.position)
            .unwrap_or_default()
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token, ParseError> {
        match self.peek() {
            Some(token) if token.kind == kind => {
                let token = token.clone();
                self.pos += 1;
                Ok(token)
            }
            Some(token) => Err(ParseError::UnexpectedToken {
                expected,
                found: token.describe(),
                position: token.position,
            }),
            None => Err(ParseError::UnexpectedToken {
                expected,
                found: "end of input".to_string(),
                position: self.end_position(),
            }),
        }
    }

    /// Consumes line breaks and indentation changes.
    fn skip_layout(&mut self) {
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Newline => self.at_line_start = true,
                TokenKind::Indent | TokenKind::Dedent => {
                    self.line_width = token.indent_width();
                    self.at_line_start = true;
                }
                _ => return,
            }
            self.pos += 1;
        }
    }

    /// Returns the line marker for a node starting at the current token.
    fn take_line_marker(&mut self) -> Option<usize> {
        if self.at_line_start {
            self.at_line_start = false;
            Some(self.line_width)
        } else {
            None
        }
    }

    /// Parses nodes until end of input (`open == None`) or until the `}`
    /// matching the `{` at `open`.
    fn parse_nodes(&mut self, open: Option<Position>) -> Result<Vec<Node>, ParseError> {
        let mut nodes = Vec::new();
        loop {
            self.skip_layout();
            let Some(token) = self.peek() else {
                return match open {
                    Some(position) => Err(ParseError::UnclosedBrace { position }),
                    None => Ok(nodes),
                };
            };
            match token.kind {
                TokenKind::Eof => {
                    return match open {
                        Some(position) => Err(ParseError::UnclosedBrace { position }),
                        None => Ok(nodes),
                    };
                }
                TokenKind::BraceClose => {
                    if open.is_none() {
                        return Err(ParseError::UnmatchedBrace {
                            position: token.position,
                        });
                    }
                    self.pos += 1;
                    return Ok(nodes);
                }
                TokenKind::TextRun => {
                    let line_indent = self.take_line_marker();
                    if let Some(token) = self.advance() {
                        let mut text = Text::new(token.text, token.position);
                        text.line_indent = line_indent;
                        nodes.push(Node::Text(text));
                    }
                }
                TokenKind::Identifier => nodes.push(Node::Element(self.parse_element()?)),
                TokenKind::BraceOpen => {
                    return Err(ParseError::UnexpectedToken {
                        expected: "an element header before `{` on the same line",
                        found: token.describe(),
                        position: token.position,
                    });
                }
                _ => {
                    return Err(ParseError::UnexpectedToken {
                        expected: "an element or text",
                        found: token.describe(),
                        position: token.position,
                    });
                }
            }
        }
    }

    fn parse_element(&mut self) -> Result<Element, ParseError> {
        let line_indent = self.take_line_marker();
        let tag = self.expect(TokenKind::Identifier, "an element name")?;
        let mut element = Element::new(tag.text, tag.position);
        element.line_indent = line_indent;

        loop {
            match self.peek_kind() {
                TokenKind::Dot => {
                    self.pos += 1;
                    let class = self.expect(TokenKind::Identifier, "a class name after `.`")?;
                    element.classes.push(class.text);
                }
                TokenKind::Hash => {
                    let hash = self.expect(TokenKind::Hash, "`#`")?;
                    let id = self.expect(TokenKind::Identifier, "an id after `#`")?;
                    if let Some(first) = &element.id {
                        return Err(ParseError::DuplicateId {
                            id: id.text,
                            first: first.clone(),
                            position: hash.position,
                        });
                    }
                    element.id = Some(id.text);
                }
                _ => break,
            }
        }

        if self.peek_kind() == TokenKind::ParenOpen {
            element.attributes = self.parse_attributes()?;
        }

        if self.peek_kind() == TokenKind::BraceOpen {
            let open = self.expect(TokenKind::BraceOpen, "`{`")?;
            if self.depth >= MAX_DEPTH {
                return Err(ParseError::TooDeep {
                    position: open.position,
                });
            }
            self.depth += 1;
            element.children = self.parse_nodes(Some(open.position))?;
            self.depth -= 1;
        }

        Ok(element)
    }

    fn parse_attributes(&mut self) -> Result<IndexMap<String, AttrValue>, ParseError> {
        self.expect(TokenKind::ParenOpen, "`(`")?;
        let mut attributes = IndexMap::new();
        if self.peek_kind() == TokenKind::ParenClose {
            self.pos += 1;
            return Ok(attributes);
        }

        loop {
            let name = self.expect(TokenKind::Identifier, "an attribute name")?;
            self.expect(TokenKind::Colon, "`:` after the attribute name")?;
            let value = self.expect(TokenKind::StringLiteral, "a quoted attribute value")?;
            if attributes.contains_key(&name.text) {
                return Err(ParseError::DuplicateAttribute {
                    name: name.text,
                    position: name.position,
                });
            }
            let derived = derive_attribute(&name.text, value.text, value.position)?;
            attributes.insert(name.text, derived);

            match self.peek_kind() {
                TokenKind::Comma => {
                    self.pos += 1;
                    if self.peek_kind() == TokenKind::ParenClose {
                        self.pos += 1;
                        return Ok(attributes);
                    }
                }
                TokenKind::ParenClose => {
                    self.pos += 1;
                    return Ok(attributes);
                }
                _ => {
                    // Reports the offending token.
                    self.expect(TokenKind::ParenClose, "`,` or `)`")?;
                }
            }
        }
    }
}

/// Derives the structured kind of an attribute from its name.
///
/// `style` becomes a declaration map, `⚡-call`/`⚡-data` become runtime
/// directives, and everything else stays a plain string.
pub fn derive_attribute(
    name: &str,
    value: String,
    position: Position,
) -> Result<AttrValue, ParseError> {
    Ok(match name {
        ATTR_STYLE => AttrValue::Style(parse_style(&value, position)?),
        ATTR_CALL => AttrValue::Directive(Directive::BackendCall { endpoint: value }),
        ATTR_DATA => AttrValue::Directive(Directive::DynamicData { key: value }),
        _ => AttrValue::Text(value),
    })
}

/// Parses a flat `prop: value; prop: value` declaration list.
pub fn parse_style(value: &str, position: Position) -> Result<StyleMap, ParseError> {
    let mut declarations = StyleMap::new();
    for declaration in value.split(';') {
        let declaration = declaration.trim();
        if declaration.is_empty() {
            continue;
        }
        let Some((property, value)) = declaration.split_once(':') else {
            return Err(ParseError::MalformedStyle {
                declaration: declaration.to_string(),
                position,
            });
        };
        let property = property.trim();
        if property.is_empty() {
            return Err(ParseError::MalformedStyle {
                declaration: declaration.to_string(),
                position,
            });
        }
        declarations.insert(property.to_string(), value.trim().to_string());
    }
    Ok(declarations)
}
