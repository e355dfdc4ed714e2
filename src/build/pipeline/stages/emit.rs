//! Code generation stage.

use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};
use crate::compiler;

/// Stage that generates HTML, the source map, CSS and JS.
pub struct EmitStage;

impl Stage for EmitStage {
    fn name(&self) -> &'static str {
        "emit"
    }

    fn process(
        &self,
        docs: &mut [ProcessingDocument],
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        for doc in docs.iter_mut().filter(|doc| !doc.failed()) {
            let filename = doc.filename();
            let Some(document) = &doc.document else {
                return Err(PipelineError::stage(
                    self.name(),
                    format!("document '{filename}' has no tree (was the parse stage run?)"),
                ));
            };
            let bundle = compiler::generate(document, &filename, &ctx.options, doc.warnings.clone());
            doc.bundle = Some(bundle);
        }
        Ok(())
    }
}
