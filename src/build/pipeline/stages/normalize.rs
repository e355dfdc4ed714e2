//! Indentation normalization stage.

use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};
use crate::compiler::{CompileError, normalize_indentation};

/// Stage that nests indentation blocks into explicit children.
pub struct NormalizeStage;

impl Stage for NormalizeStage {
    fn name(&self) -> &'static str {
        "normalize"
    }

    fn process(
        &self,
        docs: &mut [ProcessingDocument],
        _ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        for doc in docs.iter_mut().filter(|doc| !doc.failed()) {
            let document = doc.document.take().ok_or_else(|| {
                PipelineError::stage(
                    self.name(),
                    format!(
                        "document '{}' has no tree (was the parse stage run?)",
                        doc.filename()
                    ),
                )
            })?;
            match normalize_indentation(document) {
                Ok(document) => doc.document = Some(document),
                Err(source) => doc.fail(CompileError::Indentation {
                    file: doc.filename(),
                    source,
                }),
            }
        }
        Ok(())
    }
}
