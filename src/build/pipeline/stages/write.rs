//! File writing stage.
//!
//! Writes the generated artifacts to the filesystem.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::build::paths::OutputPaths;
use crate::build::pipeline::{
    LIVE_RELOAD_PATH, PipelineContext, PipelineError, ProcessingDocument, Stage,
};

/// Stage that writes each bundle next to its mirrored source path in the
/// output directory, creating any necessary parent directories.
pub struct WriteStage;

impl Stage for WriteStage {
    fn name(&self) -> &'static str {
        "write"
    }

    fn process(
        &self,
        docs: &mut [ProcessingDocument],
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        for doc in docs.iter_mut().filter(|doc| !doc.failed()) {
            let bundle = doc.bundle.as_ref().ok_or_else(|| {
                PipelineError::stage(
                    self.name(),
                    format!(
                        "document '{}' has no output (was the emit stage run?)",
                        doc.filename()
                    ),
                )
            })?;

            let paths = OutputPaths::for_source(&doc.relative, &ctx.output_dir);
            if let Some(parent) = paths.html.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let html = if ctx.live_reload {
                inject_live_reload(&bundle.html)
            } else {
                bundle.html.clone()
            };
            let source_map = bundle.source_map.to_json()?;
            write_all(&[
                (paths.html.as_path(), html.as_str()),
                (paths.source_map.as_path(), source_map.as_str()),
                (paths.css.as_path(), bundle.css.as_str()),
                (paths.js.as_path(), bundle.js.as_str()),
            ])?;
        }
        Ok(())
    }
}

/// Writes every artifact of one document or none of them.
///
/// Each file is first written to a `.tmp` sibling. The temporaries are only
/// renamed into place once all of them were written; on failure everything
/// written so far is removed.
fn write_all(files: &[(&Path, &str)]) -> Result<(), PipelineError> {
    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(files.len());
    for &(path, contents) in files {
        let temp = temp_path(path);
        debug!(path = %path.display(), bytes = contents.len(), "writing");
        if let Err(e) = std::fs::write(&temp, contents) {
            remove_all(staged.iter().map(|(temp, _)| temp.as_path()));
            return Err(e.into());
        }
        staged.push((temp, path));
    }

    for (index, (temp, path)) in staged.iter().enumerate() {
        if let Err(e) = std::fs::rename(temp, path) {
            remove_all(staged[..index].iter().map(|(_, path)| *path));
            remove_all(staged[index..].iter().map(|(temp, _)| temp.as_path()));
            return Err(e.into());
        }
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

fn remove_all<'a>(paths: impl Iterator<Item = &'a Path>) {
    for path in paths {
        if let Err(e) = std::fs::remove_file(path) {
            warn!(path = %path.display(), "failed to clean up: {e}");
        }
    }
}

/// Adds the live reload client right before `</body>`.
pub fn inject_live_reload(html: &str) -> String {
    let script = format!(
        "  <script>new EventSource(\"{LIVE_RELOAD_PATH}\").addEventListener(\"reload\", function () {{ location.reload(); }});</script>\n"
    );
    match html.rfind("</body>") {
        Some(index) => {
            let mut out = String::with_capacity(html.len() + script.len());
            out.push_str(&html[..index]);
            out.push_str(&script);
            out.push_str(&html[index..]);
            out
        }
        None => format!("{html}{script}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_live_reload() {
        let html = "<body>\n  <p>x</p>\n</body>\n</html>\n";
        let injected = inject_live_reload(html);
        assert!(injected.starts_with("<body>\n  <p>x</p>\n  <script>new EventSource(\"/_htmlx/live-reload\")"));
        assert!(injected.ends_with("</script>\n</body>\n</html>\n"));
    }

    #[test]
    fn test_write_all_is_all_or_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let html = dir.path().join("index.html");
        let css = dir.path().join("index.css");
        let js = dir.path().join("index.js");
        // A directory where the stylesheet's temporary file should go.
        std::fs::create_dir(temp_path(&css)).unwrap();

        let result = write_all(&[
            (html.as_path(), "<p>x</p>"),
            (css.as_path(), "p {}"),
            (js.as_path(), "init();"),
        ]);
        assert!(result.is_err());
        assert!(!html.exists());
        assert!(!temp_path(&html).exists());
        assert!(!css.exists());
        assert!(!js.exists());
        assert!(!temp_path(&js).exists());
    }

    #[test]
    fn test_write_all_replaces_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let html = dir.path().join("index.html");
        std::fs::write(&html, "old").unwrap();

        write_all(&[(html.as_path(), "new")]).unwrap();
        assert_eq!(std::fs::read_to_string(&html).unwrap(), "new");
        assert!(!temp_path(&html).exists());
    }
}
