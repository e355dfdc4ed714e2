//! Validation stage.

use tracing::debug;

use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};
use crate::compiler::{CompileError, validate_with};

/// Stage that validates each tree. Documents with errors are failed; the
/// warnings of the others are kept for reporting.
pub struct ValidateStage;

impl Stage for ValidateStage {
    fn name(&self) -> &'static str {
        "validate"
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
            let validation = validate_with(document, &filename, &ctx.options.validator);
            debug!(
                file = %filename,
                errors = validation.errors.len(),
                warnings = validation.warnings.len(),
                "validated"
            );
            if validation.ok() {
                doc.warnings = validation.warnings;
            } else {
                doc.fail(CompileError::Validation { validation });
            }
        }
        Ok(())
    }
}
