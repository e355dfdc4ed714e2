use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::compiler::{CompileError, Diagnostic};
use crate::config::HtmlxConfig;

use super::paths::{self, SourceFile, discover_sources};
use super::pipeline::{Pipeline, PipelineContext, PipelineError, ProcessingDocument};

#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("build worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// What happened to one source file.
#[derive(Debug)]
pub struct DocumentOutcome {
    pub path: PathBuf,
    pub relative: PathBuf,
    pub warnings: Vec<Diagnostic>,
    pub error: Option<CompileError>,
}

impl From<ProcessingDocument> for DocumentOutcome {
    fn from(doc: ProcessingDocument) -> Self {
        Self {
            path: doc.path,
            relative: doc.relative,
            warnings: doc.warnings,
            error: doc.error,
        }
    }
}

pub struct BuildResult {
    pub output_dir: PathBuf,
    /// Outcomes in input order.
    pub documents: Vec<DocumentOutcome>,
}

impl BuildResult {
    pub fn failures(&self) -> usize {
        self.documents.iter().filter(|doc| doc.error.is_some()).count()
    }

    pub fn warnings(&self) -> usize {
        self.documents.iter().map(|doc| doc.warnings.len()).sum()
    }

    pub fn succeeded(&self) -> bool {
        self.failures() == 0
    }
}

pub struct Builder {
    config: HtmlxConfig,
    /// Base path for resolving relative paths (typically the config file's directory)
    base_path: PathBuf,
    /// Explicit files or directories; the configured source directory if empty
    inputs: Vec<PathBuf>,
    output_dir: Option<PathBuf>,
    dev_mode: bool,
    live_reload: bool,
}

impl Builder {
    pub fn new(config: HtmlxConfig, base_path: PathBuf) -> Self {
        Self {
            config,
            base_path,
            inputs: Vec::new(),
            output_dir: None,
            dev_mode: false,
            live_reload: false,
        }
    }

    pub fn with_inputs(mut self, inputs: Vec<PathBuf>) -> Self {
        self.inputs = inputs;
        self
    }

    /// Override the configured output directory.
    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    pub fn with_live_reload(mut self, live_reload: bool) -> Self {
        self.live_reload = live_reload;
        self
    }

    /// Get the output directory path, resolved against base_path.
    pub fn output_dir(&self) -> PathBuf {
        let output = self.output_dir.as_ref().unwrap_or(&self.config.build.output);
        paths::resolve(&self.base_path, output)
    }

    /// Get the source directory path, resolved against base_path.
    pub fn source_dir(&self) -> PathBuf {
        paths::resolve(&self.base_path, &self.config.build.source)
    }

    /// Compile every source and write the results.
    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        let output_dir = self.output_dir();
        std::fs::create_dir_all(&output_dir)?;
        let result = self.run(Pipeline::default_pipeline()).await?;

        let display_output = output_dir.canonicalize().unwrap_or(output_dir);
        info!(
            documents = result.documents.len(),
            failures = result.failures(),
            output = %display_output.display(),
            "build finished"
        );
        Ok(result)
    }

    /// Parse, normalize and validate every source without writing anything.
    pub async fn check(&self) -> Result<BuildResult, BuildError> {
        let result = self.run(Pipeline::check_pipeline()).await?;
        info!(
            documents = result.documents.len(),
            failures = result.failures(),
            "check finished"
        );
        Ok(result)
    }

    /// Runs `pipeline` on each source in its own blocking task and collects
    /// the outcomes in input order.
    async fn run(&self, pipeline: Pipeline) -> Result<BuildResult, BuildError> {
        let sources = self.sources()?;
        debug!(count = sources.len(), stages = ?pipeline.stage_names(), "discovered sources");

        let pipeline = Arc::new(pipeline);
        let ctx = Arc::new(
            PipelineContext::new(self.output_dir(), self.config.compile_options())
                .with_dev_mode(self.dev_mode, self.live_reload),
        );

        let tasks: Vec<_> = sources
            .into_iter()
            .map(|source| {
                let pipeline = Arc::clone(&pipeline);
                let ctx = Arc::clone(&ctx);
                tokio::task::spawn_blocking(move || process(source, &pipeline, &ctx))
            })
            .collect();

        let mut documents = Vec::with_capacity(tasks.len());
        for task in tasks {
            documents.push(task.await??);
        }

        Ok(BuildResult {
            output_dir: self.output_dir(),
            documents,
        })
    }

    fn sources(&self) -> Result<Vec<SourceFile>, BuildError> {
        let inputs = if self.inputs.is_empty() {
            vec![self.source_dir()]
        } else {
            self.inputs.clone()
        };
        Ok(discover_sources(&inputs)?)
    }
}

fn process(
    source: SourceFile,
    pipeline: &Pipeline,
    ctx: &PipelineContext,
) -> Result<DocumentOutcome, BuildError> {
    let text = read_source(&source.path)?;
    let mut docs = [ProcessingDocument::new(source.path, source.relative, text)];
    pipeline.run(&mut docs, ctx)?;
    let [doc] = docs;
    Ok(doc.into())
}

fn read_source(path: &Path) -> Result<String, BuildError> {
    std::fs::read_to_string(path).map_err(|source| BuildError::Read {
        path: path.to_path_buf(),
        source,
    })
}
