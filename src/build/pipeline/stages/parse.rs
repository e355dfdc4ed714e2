//! Parsing stage.

use tracing::debug;

use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};
use crate::compiler;

/// Stage that lexes and parses each source into a raw tree.
pub struct ParseStage;

impl Stage for ParseStage {
    fn name(&self) -> &'static str {
        "parse"
    }

    fn process(
        &self,
        docs: &mut [ProcessingDocument],
        _ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        for doc in docs.iter_mut().filter(|doc| !doc.failed()) {
            match compiler::parse(&doc.source, &doc.filename()) {
                Ok(document) => {
                    debug!(file = %doc.filename(), nodes = document.children.len(), "parsed");
                    doc.document = Some(document);
                }
                Err(error) => doc.fail(error),
            }
        }
        Ok(())
    }
}
