//! Document types for pipeline processing.

use std::path::PathBuf;

use crate::compiler::{Bundle, CompileError, Diagnostic, Document};

/// A source file being processed through the pipeline.
///
/// Evolves through the stages:
///
/// 1. Initially: `source` holds the file contents
/// 2. After parse: `document` holds the raw tree
/// 3. After normalize: `document` holds the nested tree
/// 4. After validate: `warnings` are filled in, or `error` is set
/// 5. After emit: `bundle` holds the generated artifacts
///
/// Once `error` is set, later stages leave the document alone.
#[derive(Debug)]
pub struct ProcessingDocument {
    /// Path the source was read from
    pub path: PathBuf,

    /// Path relative to the source root, which decides the output location
    pub relative: PathBuf,

    /// The HTMLx source text
    pub source: String,

    pub document: Option<Document>,

    pub warnings: Vec<Diagnostic>,

    pub bundle: Option<Bundle>,

    /// The first compile failure, if any
    pub error: Option<CompileError>,
}

impl ProcessingDocument {
    pub fn new(path: PathBuf, relative: PathBuf, source: String) -> Self {
        Self {
            path,
            relative,
            source,
            document: None,
            warnings: Vec::new(),
            bundle: None,
            error: None,
        }
    }

    /// The name used in diagnostics and the source map.
    pub fn filename(&self) -> String {
        self.relative.to_string_lossy().replace('\\', "/")
    }

    pub fn failed(&self) -> bool {
        self.error.is_some()
    }

    /// Records a failure and drops intermediate results.
    pub fn fail(&mut self, error: CompileError) {
        self.document = None;
        self.bundle = None;
        self.error = Some(error);
    }
}
