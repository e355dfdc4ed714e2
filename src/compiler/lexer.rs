//! Lexer for HTMLx source text.
//!
//! The lexer is context-sensitive: at a position where a node may begin it
//! decides between an element header (`div.card#main(title: "x") {`) and a
//! run of text. Inside an attribute list it switches to a small token set of
//! names, colons, commas and quoted strings. Line starts produce
//! `Indent`/`Dedent` tokens whenever the indentation width changes, which the
//! parser turns into per-node line markers for the indentation normalizer.

use super::ast::{Position, is_known_element};

/// Width of a tab character when measuring indentation.
pub const TAB_WIDTH: usize = 4;

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Dot,
    Hash,
    ParenOpen,
    ParenClose,
    BraceOpen,
    BraceClose,
    Colon,
    Comma,
    /// A quoted string. The token text is the unescaped value.
    StringLiteral,
    /// A run of text content, trimmed of surrounding whitespace.
    TextRun,
    Newline,
    /// Indentation grew. The token text is the line's leading whitespace.
    Indent,
    /// Indentation shrank. The token text is the line's leading whitespace.
    Dedent,
    Eof,
}

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
}

impl Token {
    /// The indentation width carried by an `Indent`/`Dedent` token.
    pub fn indent_width(&self) -> usize {
        indent_width(&self.text)
    }

    /// A short human-readable description for error messages.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Identifier => format!("identifier `{}`", self.text),
            TokenKind::StringLiteral => format!("string {:?}", self.text),
            TokenKind::TextRun => format!("text `{}`", self.text),
            TokenKind::Newline => "end of line".to_string(),
            TokenKind::Indent | TokenKind::Dedent => "indentation".to_string(),
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("`{}`", self.text),
        }
    }
}

/// Measures the width of a run of leading whitespace.
pub fn indent_width(prefix: &str) -> usize {
    prefix
        .chars()
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("{position}: unterminated string literal")]
    UnterminatedString { position: Position },

    #[error("{position}: unterminated attribute list, expected `)`")]
    UnterminatedAttributes { position: Position },

    #[error("{position}: unexpected character {found:?} in attribute list")]
    IllegalCharacter { found: char, position: Position },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::UnterminatedString { position }
            | LexError::UnterminatedAttributes { position }
            | LexError::IllegalCharacter { position, .. } => *position,
        }
    }
}

/// Tokenizes a whole source text.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}

/// The lexer state.
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    /// Indentation width of the previous non-blank line.
    line_width: usize,
    /// Whether a node token has been emitted on the current line.
    line_has_content: bool,
    tokens: Vec<Token>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            line_width: 0,
            line_has_content: false,
            tokens: Vec::new(),
        }
    }

    /// Consumes the lexer and produces the token stream, ending with `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        self.begin_line();
        while let Some(c) = self.peek() {
            match c {
                '\n' => {
                    self.push(TokenKind::Newline, "\n", self.position());
                    self.bump();
                    self.begin_line();
                }
                ' ' | '\t' | '\r' => self.bump(),
                '{' => self.single(TokenKind::BraceOpen),
                '}' => self.single(TokenKind::BraceClose),
                _ if self.header_ahead(self.pos, !self.line_has_content) => self.lex_header()?,
                _ => self.lex_text(),
            }
        }
        self.push(TokenKind::Eof, "", self.position());
        Ok(self.tokens)
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += 1;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn push(&mut self, kind: TokenKind, text: impl Into<String>, position: Position) {
        if !matches!(
            kind,
            TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent | TokenKind::Eof
        ) {
            self.line_has_content = true;
        }
        self.tokens.push(Token {
            kind,
            text: text.into(),
            position,
        });
    }

    /// Emits a one-character token for the current character.
    fn single(&mut self, kind: TokenKind) {
        let position = self.position();
        if let Some(c) = self.peek() {
            self.push(kind, c.to_string(), position);
            self.bump();
        }
    }

    /// Skips blank lines and measures the indentation of the next one.
    fn begin_line(&mut self) {
        self.line_has_content = false;
        loop {
            let mut end = self.pos;
            while matches!(self.peek_at(end), Some(' ' | '\t')) {
                end += 1;
            }
            let blank = matches!(self.peek_at(end), None | Some('\n') | Some('\r'))
                && self.rest_of_line_blank(end);
            if blank {
                // Consume the blank line including its line break.
                while let Some(c) = self.peek() {
                    self.bump();
                    if c == '\n' {
                        break;
                    }
                }
                if self.peek().is_none() {
                    return;
                }
                continue;
            }

            let prefix: String = self.chars[self.pos..end].iter().collect();
            let width = indent_width(&prefix);
            let position = self.position();
            if width > self.line_width {
                self.push(TokenKind::Indent, prefix, position);
            } else if width < self.line_width {
                self.push(TokenKind::Dedent, prefix, position);
            }
            self.line_width = width;
            while self.pos < end {
                self.bump();
            }
            return;
        }
    }

    fn rest_of_line_blank(&self, from: usize) -> bool {
        self.chars[from..]
            .iter()
            .take_while(|&&c| c != '\n')
            .all(|c| c.is_whitespace())
    }

    /// Decides whether an element header starts at `start`.
    ///
    /// A header is `ident ('.' name | '#' name)*` followed by an attribute
    /// list, by `{`, or (only when it opens the line) by the end of the line
    /// provided it is decorated or names a known HTML element.
    fn header_ahead(&self, start: usize, opens_line: bool) -> bool {
        if !self.peek_at(start).is_some_and(|c| c.is_ascii_alphabetic()) {
            return false;
        }
        let mut i = start;
        while self.peek_at(i).is_some_and(is_tag_char) {
            i += 1;
        }
        let tag: String = self.chars[start..i].iter().collect();

        let mut decorated = false;
        while matches!(self.peek_at(i), Some('.' | '#'))
            && self.peek_at(i + 1).is_some_and(is_name_char)
        {
            i += 1;
            while self.peek_at(i).is_some_and(is_name_char) {
                i += 1;
            }
            decorated = true;
        }

        if self.peek_at(i) == Some('(') {
            return self.attributes_ahead(i + 1);
        }

        while matches!(self.peek_at(i), Some(' ' | '\t' | '\r')) {
            i += 1;
        }
        match self.peek_at(i) {
            Some('{') => true,
            None | Some('\n') => opens_line && (decorated || is_known_element(&tag)),
            _ => false,
        }
    }

    /// Checks that `(` at `start - 1` opens something shaped like an
    /// attribute list: `)` or an attribute name followed by `:`.
    fn attributes_ahead(&self, start: usize) -> bool {
        let mut i = start;
        while self.peek_at(i).is_some_and(char::is_whitespace) {
            i += 1;
        }
        match self.peek_at(i) {
            Some(')') => true,
            Some(c) if is_attr_start(c) => {
                while self.peek_at(i).is_some_and(is_attr_char) {
                    i += 1;
                }
                while self.peek_at(i).is_some_and(char::is_whitespace) {
                    i += 1;
                }
                self.peek_at(i) == Some(':')
            }
            _ => false,
        }
    }

    fn lex_header(&mut self) -> Result<(), LexError> {
        let position = self.position();
        let tag = self.take_while(is_tag_char);
        self.push(TokenKind::Identifier, tag, position);

        loop {
            let kind = match self.peek() {
                Some('.') => TokenKind::Dot,
                Some('#') => TokenKind::Hash,
                _ => break,
            };
            if !self.peek_at(self.pos + 1).is_some_and(is_name_char) {
                break;
            }
            self.single(kind);
            let position = self.position();
            let name = self.take_while(is_name_char);
            self.push(TokenKind::Identifier, name, position);
        }

        if self.peek() == Some('(') {
            self.lex_attributes()?;
        }
        Ok(())
    }

    fn lex_attributes(&mut self) -> Result<(), LexError> {
        let open = self.position();
        self.single(TokenKind::ParenOpen);
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.bump();
            }
            let Some(c) = self.peek() else {
                return Err(LexError::UnterminatedAttributes { position: open });
            };
            match c {
                ')' => {
                    self.single(TokenKind::ParenClose);
                    return Ok(());
                }
                ':' => self.single(TokenKind::Colon),
                ',' => self.single(TokenKind::Comma),
                '"' | '\'' => self.lex_string()?,
                c if is_attr_start(c) => {
                    let position = self.position();
                    // U+FE0F turns `⚡` into its emoji presentation; both
                    // spellings name the same attribute.
                    let name: String = self
                        .take_while(is_attr_char)
                        .chars()
                        .filter(|&c| c != '\u{FE0F}')
                        .collect();
                    self.push(TokenKind::Identifier, name, position);
                }
                found => {
                    return Err(LexError::IllegalCharacter {
                        found,
                        position: self.position(),
                    });
                }
            }
        }
    }

    fn lex_string(&mut self) -> Result<(), LexError> {
        let position = self.position();
        let Some(quote) = self.peek() else {
            return Err(LexError::UnterminatedString { position });
        };
        self.bump();

        let mut value = String::new();
        loop {
            match self.peek() {
                None => return Err(LexError::UnterminatedString { position }),
                Some('\\') => {
                    self.bump();
                    match self.peek() {
                        None => return Err(LexError::UnterminatedString { position }),
                        Some(c @ ('"' | '\'' | '\\')) => value.push(c),
                        Some(c) => {
                            value.push('\\');
                            value.push(c);
                        }
                    }
                    self.bump();
                }
                Some(c) if c == quote => {
                    self.bump();
                    break;
                }
                Some(c) => {
                    value.push(c);
                    self.bump();
                }
            }
        }
        self.push(TokenKind::StringLiteral, value, position);
        Ok(())
    }

    /// Lexes a text run up to a brace, a line break, or the start of an
    /// element header that follows whitespace.
    fn lex_text(&mut self) {
        let position = self.position();
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if matches!(c, '{' | '}' | '\n') {
                break;
            }
            let after_space = text.ends_with(char::is_whitespace);
            if after_space && self.header_ahead(self.pos, false) {
                break;
            }
            text.push(c);
            self.bump();
        }
        self.push(TokenKind::TextRun, text.trim_end(), position);
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> String {
        let mut taken = String::new();
        while let Some(c) = self.peek().filter(|&c| predicate(c)) {
            taken.push(c);
            self.bump();
        }
        taken
    }
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Characters allowed in a class or id name at the lexical level. The
/// validator applies the stricter identifier grammar later.
fn is_name_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '.' | '#' | '(' | ')' | '{' | '}' | ':' | ',' | '"' | '\'')
}

fn is_attr_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '⚡'
}

fn is_attr_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '⚡' | '\u{FE0F}')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_block() {
        use TokenKind::*;
        assert_eq!(
            kinds("div { Hello World }"),
            vec![Identifier, BraceOpen, TextRun, BraceClose, Eof]
        );
        let tokens = tokenize("div { Hello World }").unwrap();
        assert_eq!(tokens[2].text, "Hello World");
        assert_eq!(tokens[2].position, Position::new(1, 7));
    }

    #[test]
    fn test_header_with_classes_and_id() {
        use TokenKind::*;
        let tokens = tokenize("div.btn.primary#main {}").unwrap();
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![
                Identifier, Dot, Identifier, Dot, Identifier, Hash, Identifier, BraceOpen,
                BraceClose, Eof
            ]
        );
        assert_eq!(tokens[6].text, "main");
        assert_eq!(tokens[6].position, Position::new(1, 17));
    }

    #[test]
    fn test_attributes() {
        use TokenKind::*;
        let tokens = tokenize(r#"a(href: "/about", ⚡-call: 'go') { About }"#).unwrap();
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![
                Identifier, ParenOpen, Identifier, Colon, StringLiteral, Comma, Identifier,
                Colon, StringLiteral, ParenClose, BraceOpen, TextRun, BraceClose, Eof
            ]
        );
        assert_eq!(tokens[4].text, "/about");
        assert_eq!(tokens[6].text, "⚡-call");
        assert_eq!(tokens[8].text, "go");
    }

    #[test]
    fn test_emoji_presentation_selector_is_dropped() {
        let tokens = tokenize("div(⚡\u{FE0F}-data: \"k\")").unwrap();
        assert_eq!(tokens[2].text, "⚡-data");
    }

    #[test]
    fn test_string_escapes() {
        let tokens = tokenize(r#"p(title: "say \"hi\" \n") {}"#).unwrap();
        assert_eq!(tokens[4].text, "say \"hi\" \\n");
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("p(title: \"oops) {}").unwrap_err();
        assert_eq!(err, LexError::UnterminatedString { position: Position::new(1, 10) });
    }

    #[test]
    fn test_illegal_character_in_attributes() {
        let err = tokenize("p(title: \"x\" + 1) {}").unwrap_err();
        assert!(matches!(err, LexError::IllegalCharacter { found: '+', .. }));
    }

    #[test]
    fn test_unterminated_attribute_list() {
        let err = tokenize("p(title: \"x\"").unwrap_err();
        assert_eq!(err, LexError::UnterminatedAttributes { position: Position::new(1, 2) });
    }

    #[test]
    fn test_markup_in_text_is_verbatim() {
        let tokens = tokenize(r#"div { <script>alert("XSS")</script> }"#).unwrap();
        assert_eq!(tokens[2].kind, TokenKind::TextRun);
        assert_eq!(tokens[2].text, r#"<script>alert("XSS")</script>"#);
    }

    #[test]
    fn test_ellipsis_is_text() {
        let tokens = tokenize("div { Loading... }").unwrap();
        assert_eq!(tokens[2].kind, TokenKind::TextRun);
        assert_eq!(tokens[2].text, "Loading...");
    }

    #[test]
    fn test_emoji_id_is_lexed() {
        let tokens = tokenize("div#🎨 { Test }").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Hash);
        assert_eq!(tokens[2].text, "🎨");
        assert_eq!(tokens[2].position, Position::new(1, 5));
        assert_eq!(tokens[3].kind, TokenKind::BraceOpen);
        assert_eq!(tokens[3].position, Position::new(1, 7));
    }

    #[test]
    fn test_text_stops_at_sibling_header() {
        use TokenKind::*;
        assert_eq!(
            kinds("div { Intro p { body } }"),
            vec![Identifier, BraceOpen, TextRun, Identifier, BraceOpen, TextRun, BraceClose, BraceClose, Eof]
        );
    }

    #[test]
    fn test_prose_with_parenthesis_is_text() {
        let tokens = tokenize("p { call(555) now }").unwrap();
        assert_eq!(tokens[2].kind, TokenKind::TextRun);
        assert_eq!(tokens[2].text, "call(555) now");
    }

    #[test]
    fn test_indentation_tokens() {
        use TokenKind::*;
        let source = "div\n  p\n\n    span\nfooter\n";
        assert_eq!(
            kinds(source),
            vec![
                Identifier, Newline, Indent, Identifier, Newline, Indent, Identifier, Newline,
                Dedent, Identifier, Newline, Eof
            ]
        );
        let tokens = tokenize(source).unwrap();
        assert_eq!(tokens[2].indent_width(), 2);
        assert_eq!(tokens[5].indent_width(), 4);
        assert_eq!(tokens[8].indent_width(), 0);
        assert_eq!(tokens[6].position, Position::new(4, 5));
    }

    #[test]
    fn test_bare_unknown_word_is_text() {
        let tokens = tokenize("Hello\n").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::TextRun);
        let tokens = tokenize("section\n").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_capitalized_element_name_is_text() {
        for word in ["Menu", "Details", "Summary", "Time", "Header", "Small"] {
            let tokens = tokenize(&format!("button {{\n  {word}\n}}\n")).unwrap();
            let run = tokens.iter().find(|t| t.text == word).unwrap();
            assert_eq!(run.kind, TokenKind::TextRun, "{word} should stay text");
        }
        let tokens = tokenize("menu\n").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_tab_width() {
        assert_eq!(indent_width("\t"), TAB_WIDTH);
        assert_eq!(indent_width("  \t"), 2 + TAB_WIDTH);
    }
}
