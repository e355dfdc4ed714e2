//! The HTMLx compiler core.
//!
//! ```text
//! source ─► lexer ─► parser ─► indentation normalizer ─► validator ─┬─► HTML + source map
//!                                                                   ├─► CSS
//!                                                                   └─► JS
//! ```
//!
//! Every stage is a synchronous, pure function of its input. Lexing, parsing
//! and normalization stop at the first error; validation collects all
//! diagnostics and blocks generation when any of them is an error.

pub mod ast;
pub mod codegen;
pub mod indent;
pub mod lexer;
pub mod parser;
pub mod validate;

pub use ast::{AttrValue, Directive, Document, Element, Node, Position, Text};
pub use codegen::{
    HtmlOutput, JsOptions, SourceMap, escape_html, generate_css, generate_html, generate_js,
    generate_js_with,
};
pub use indent::{IndentationError, normalize_indentation};
pub use lexer::LexError;
pub use parser::ParseError;
pub use validate::{Diagnostic, Severity, Validation, ValidatorOptions, validate, validate_with};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("{file}:{source}")]
    Lex { file: String, source: LexError },

    #[error("{file}:{source}")]
    Parse { file: String, source: ParseError },

    #[error("{file}:{source}")]
    Indentation {
        file: String,
        source: IndentationError,
    },

    #[error("{validation}")]
    Validation { validation: Validation },
}

impl CompileError {
    /// The source position of the failure. Validation failures report their
    /// first error.
    pub fn position(&self) -> Option<Position> {
        match self {
            CompileError::Lex { source, .. } => Some(source.position()),
            CompileError::Parse { source, .. } => Some(source.position()),
            CompileError::Indentation { source, .. } => Some(source.position()),
            CompileError::Validation { validation } => {
                validation.errors.first().map(|error| error.position)
            }
        }
    }
}

/// Options for a whole compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub validator: ValidatorOptions,
    pub js: JsOptions,
}

/// Every artifact generated for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub html: String,
    pub source_map: SourceMap,
    pub css: String,
    pub js: String,
    /// Validation warnings. They never change the output.
    pub warnings: Vec<Diagnostic>,
}

/// Lexes and parses a source text into a raw document.
///
/// The result still carries indentation markers; run
/// [`normalize_indentation`] before validating or generating.
pub fn parse(source: &str, filename: &str) -> Result<Document, CompileError> {
    let tokens = lexer::tokenize(source).map_err(|source| CompileError::Lex {
        file: filename.to_string(),
        source,
    })?;
    parser::parse_tokens(tokens).map_err(|source| CompileError::Parse {
        file: filename.to_string(),
        source,
    })
}

/// Parses and normalizes a source text.
pub fn parse_document(source: &str, filename: &str) -> Result<Document, CompileError> {
    let document = parse(source, filename)?;
    normalize_indentation(document).map_err(|source| CompileError::Indentation {
        file: filename.to_string(),
        source,
    })
}

/// Generates every artifact for a document that passed validation.
pub fn generate(
    document: &Document,
    filename: &str,
    options: &CompileOptions,
    warnings: Vec<Diagnostic>,
) -> Bundle {
    let HtmlOutput { html, source_map } = generate_html(document, filename);
    Bundle {
        html,
        source_map,
        css: generate_css(document),
        js: generate_js_with(document, &options.js),
        warnings,
    }
}

/// Runs the whole chain for one source text.
pub fn compile(
    source: &str,
    filename: &str,
    options: &CompileOptions,
) -> Result<Bundle, CompileError> {
    let document = parse_document(source, filename)?;
    let validation = validate_with(&document, filename, &options.validator);
    if !validation.ok() {
        return Err(CompileError::Validation { validation });
    }
    Ok(generate(&document, filename, options, validation.warnings))
}
