//! Pipeline error types.

/// Errors that stop a pipeline run.
///
/// Compile failures are not among them: they are recorded on the
/// [`ProcessingDocument`](super::ProcessingDocument) they belong to.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode source map: {0}")]
    SourceMap(#[from] serde_json::Error),

    #[error("stage '{stage}' failed: {message}")]
    Stage { stage: String, message: String },
}

impl PipelineError {
    /// Create a stage-specific error.
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Stage {
            stage: stage.into(),
            message: message.into(),
        }
    }
}
