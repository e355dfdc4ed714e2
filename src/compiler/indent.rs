//! Indentation normalizer.
//!
//! Rewrites indentation-delimited blocks into explicit children so that
//!
//! ```text
//! div.card
//!   h1 { Title }
//!   p { Body }
//! ```
//!
//! produces the same tree as `div.card { h1 { Title } p { Body } }`.
//! Brace blocks and indentation blocks may be mixed freely.

use super::ast::{Document, Element, Node, Position};
use super::parser::MAX_DEPTH;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IndentationError {
    #[error("{position}: inconsistent dedent to width {width}, no enclosing block is indented that way")]
    InconsistentDedent { width: usize, position: Position },

    #[error("{position}: cannot nest under a text line")]
    NestedUnderText { position: Position },

    #[error("{position}: blocks nested deeper than {MAX_DEPTH} levels")]
    TooDeep { position: Position },
}

impl IndentationError {
    pub fn position(&self) -> Position {
        match self {
            IndentationError::InconsistentDedent { position, .. }
            | IndentationError::NestedUnderText { position }
            | IndentationError::TooDeep { position } => *position,
        }
    }
}

/// An open indentation block: the element that owns it and the width of
/// the lines inside it.
struct Frame {
    width: usize,
    element: Element,
}

/// Nests indentation blocks and clears every line marker.
///
/// Running it on an already normalized document returns the same document.
pub fn normalize_indentation(document: Document) -> Result<Document, IndentationError> {
    Ok(Document::new(normalize_children(document.children, 0)?))
}

/// Normalizes a list of siblings whose first level sits at `depth`.
fn normalize_children(children: Vec<Node>, depth: usize) -> Result<Vec<Node>, IndentationError> {
    let mut base: Vec<Node> = Vec::with_capacity(children.len());
    let mut base_width: Option<usize> = None;
    let mut frames: Vec<Frame> = Vec::new();

    for mut node in children {
        let marker = take_marker(&mut node);
        let Some(width) = marker else {
            let node = normalize_node(node, depth + frames.len())?;
            target(&mut frames, &mut base).push(node);
            continue;
        };

        let position = node.position();
        let base_width = *base_width.get_or_insert(width);
        if width < base_width {
            return Err(IndentationError::InconsistentDedent { width, position });
        }

        let mut popped = false;
        while frames.last().is_some_and(|frame| frame.width > width) {
            close_frame(&mut frames, &mut base);
            popped = true;
        }

        let top_width = frames.last().map_or(base_width, |frame| frame.width);
        if top_width == width {
            let node = normalize_node(node, depth + frames.len())?;
            target(&mut frames, &mut base).push(node);
            continue;
        }

        // The line is indented deeper than the current block.
        if popped {
            return Err(IndentationError::InconsistentDedent { width, position });
        }
        match target(&mut frames, &mut base).pop() {
            Some(Node::Element(mut parent)) => {
                let node = normalize_node(node, depth + frames.len() + 1)?;
                parent.children.push(node);
                frames.push(Frame {
                    width,
                    element: parent,
                });
            }
            Some(Node::Text(_)) => return Err(IndentationError::NestedUnderText { position }),
            None => return Err(IndentationError::InconsistentDedent { width, position }),
        }
    }

    while !frames.is_empty() {
        close_frame(&mut frames, &mut base);
    }
    Ok(base)
}

fn take_marker(node: &mut Node) -> Option<usize> {
    match node {
        Node::Element(element) => element.line_indent.take(),
        Node::Text(text) => text.line_indent.take(),
    }
}

/// Normalizes the children of a node placed at `depth`.
fn normalize_node(node: Node, depth: usize) -> Result<Node, IndentationError> {
    if depth > MAX_DEPTH {
        return Err(IndentationError::TooDeep {
            position: node.position(),
        });
    }
    match node {
        Node::Element(mut element) => {
            let children = std::mem::take(&mut element.children);
            element.children = normalize_children(children, depth + 1)?;
            Ok(Node::Element(element))
        }
        Node::Text(_) => Ok(node),
    }
}

fn target<'a>(frames: &'a mut [Frame], base: &'a mut Vec<Node>) -> &'a mut Vec<Node> {
    match frames.last_mut() {
        Some(frame) => &mut frame.element.children,
        None => base,
    }
}

fn close_frame(frames: &mut Vec<Frame>, base: &mut Vec<Node>) {
    if let Some(frame) = frames.pop() {
        target(frames, base).push(Node::Element(frame.element));
    }
}
