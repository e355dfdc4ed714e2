//! Build pipeline for document processing.
//!
//! The pipeline moves documents through a series of stages:
//! 1. Parse (lexing and parsing)
//! 2. Normalize (indentation blocks)
//! 3. Validate (diagnostics)
//! 4. Emit (HTML, source map, CSS, JS)
//! 5. Write (output to disk)
//!
//! Custom stages can be inserted before or after any named stage.

mod context;
mod document;
mod error;
mod stages;

pub use context::{LIVE_RELOAD_PATH, PipelineContext};
pub use document::ProcessingDocument;
pub use error::PipelineError;
pub use stages::inject_live_reload;

use stages::{EmitStage, NormalizeStage, ParseStage, ValidateStage, WriteStage};

/// A stage in the document processing pipeline.
///
/// Stages transform documents sequentially. Each stage receives all documents
/// and can modify them in place before passing to the next stage. A stage
/// skips documents that an earlier stage marked as failed.
pub trait Stage: Send + Sync {
    /// Unique name for this stage (used for insertion points).
    fn name(&self) -> &'static str;

    /// Process documents through this stage.
    fn process(
        &self,
        docs: &mut [ProcessingDocument],
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError>;
}

/// The document processing pipeline.
///
/// The default pipeline is: parse → normalize → validate → emit → write.
///
/// # Extension Points
///
/// Insert custom stages using `insert_before` or `insert_after`:
///
/// ```ignore
/// pipeline.insert_after("emit", MinifyStage);
/// ```
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Create an empty pipeline with no stages.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Create the default pipeline with standard stages.
    pub fn default_pipeline() -> Self {
        let mut pipeline = Self::check_pipeline();
        pipeline.add_stage(EmitStage);
        pipeline.add_stage(WriteStage);
        pipeline
    }

    /// The front half of the default pipeline: parse → normalize → validate.
    pub fn check_pipeline() -> Self {
        let mut pipeline = Self::new();
        pipeline.add_stage(ParseStage);
        pipeline.add_stage(NormalizeStage);
        pipeline.add_stage(ValidateStage);
        pipeline
    }

    /// Add a stage to the end of the pipeline.
    pub fn add_stage<S: Stage + 'static>(&mut self, stage: S) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Insert a stage before the named stage.
    pub fn insert_before<S: Stage + 'static>(
        &mut self,
        name: &str,
        stage: S,
    ) -> Result<&mut Self, PipelineError> {
        let pos = self.position(name)?;
        self.stages.insert(pos, Box::new(stage));
        Ok(self)
    }

    /// Insert a stage after the named stage.
    pub fn insert_after<S: Stage + 'static>(
        &mut self,
        name: &str,
        stage: S,
    ) -> Result<&mut Self, PipelineError> {
        let pos = self.position(name)?;
        self.stages.insert(pos + 1, Box::new(stage));
        Ok(self)
    }

    fn position(&self, name: &str) -> Result<usize, PipelineError> {
        self.stages
            .iter()
            .position(|s| s.name() == name)
            .ok_or_else(|| PipelineError::stage(name, "stage not found in pipeline"))
    }

    /// Run the pipeline on a set of documents.
    pub fn run(
        &self,
        docs: &mut [ProcessingDocument],
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        for stage in &self.stages {
            stage.process(docs, ctx)?;
        }
        Ok(())
    }

    /// Get the names of all stages in order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::default_pipeline()
    }
}
