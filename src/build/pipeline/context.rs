//! Pipeline context for sharing state across stages.

use std::path::PathBuf;

use crate::compiler::CompileOptions;

/// Path of the server-sent events endpoint used for live reload.
pub const LIVE_RELOAD_PATH: &str = "/_htmlx/live-reload";

/// Shared context for pipeline stages.
///
/// Owned and cheap to clone so each blocking worker can carry its own copy.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    /// Directory where output files are written
    pub output_dir: PathBuf,

    /// Validator and generator options
    pub options: CompileOptions,

    /// Inject the live reload client into written HTML
    pub live_reload: bool,
}

impl PipelineContext {
    pub fn new(output_dir: PathBuf, options: CompileOptions) -> Self {
        Self {
            output_dir,
            options,
            live_reload: false,
        }
    }

    /// Live reload only applies to development builds served by `htmlx serve`.
    pub fn with_dev_mode(mut self, dev: bool, live_reload: bool) -> Self {
        self.live_reload = dev && live_reload;
        self
    }
}
