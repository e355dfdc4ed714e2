//! Source discovery and output path mapping.
//!
//! A source `pages/about.htmlx` under the source directory produces
//! `pages/about.html`, `pages/about.html.map`, `pages/about.css` and
//! `pages/about.js` under the output directory.

use std::path::{Path, PathBuf};

/// Extension of HTMLx source files.
pub const SOURCE_EXTENSION: &str = "htmlx";

/// A discovered source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute (or caller-relative) path to read from.
    pub path: PathBuf,
    /// Path relative to the directory it was discovered in. Determines the
    /// output location.
    pub relative: PathBuf,
}

/// The four files written for one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub html: PathBuf,
    pub source_map: PathBuf,
    pub css: PathBuf,
    pub js: PathBuf,
}

impl OutputPaths {
    /// Maps a source-relative path into `output_dir`.
    pub fn for_source(relative: &Path, output_dir: &Path) -> Self {
        let base = output_dir.join(relative.with_extension(""));
        let with_suffix = |suffix: &str| {
            let mut path = base.clone().into_os_string();
            path.push(suffix);
            PathBuf::from(path)
        };
        Self {
            html: with_suffix(".html"),
            source_map: with_suffix(".html.map"),
            css: with_suffix(".css"),
            js: with_suffix(".js"),
        }
    }
}

/// Collects `.htmlx` files from files and directories, in sorted order.
///
/// Directories are walked recursively, skipping hidden entries. An explicit
/// file is taken as-is and maps to its file name in the output directory.
pub fn discover_sources(inputs: &[PathBuf]) -> std::io::Result<Vec<SourceFile>> {
    let mut sources = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found = Vec::new();
            walk(input, &mut found)?;
            found.sort();
            sources.extend(found.into_iter().filter_map(|path| {
                let relative = path.strip_prefix(input).ok()?.to_path_buf();
                Some(SourceFile { path, relative })
            }));
        } else if input.exists() {
            let relative = input
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| input.clone());
            sources.push(SourceFile {
                path: input.clone(),
                relative,
            });
        } else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("input not found: {}", input.display()),
            ));
        }
    }
    Ok(sources)
}

fn walk(dir: &Path, found: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        if entry.file_type()?.is_dir() {
            walk(&path, found)?;
        } else if is_source(&path) {
            found.push(path);
        }
    }
    Ok(())
}

/// Whether a path names an HTMLx source.
pub fn is_source(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
}

/// Resolves a configured path against the project base path.
pub fn resolve(base_path: &Path, path: &Path) -> PathBuf {
    if path.is_relative() {
        base_path.join(path)
    } else {
        path.to_path_buf()
    }
}

/// Get the base path from a config file path (its parent directory).
pub fn base_path_from_config(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
