//! File watching for automatic rebuilds.
//!
//! Uses `notify-debouncer-full` to watch the source directory and the config
//! file for changes.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use notify::event::ModifyKind;
use notify::{
    Config as NotifyConfig, EventKind, PollWatcher, RecommendedWatcher, RecursiveMode, Watcher,
};
use notify_debouncer_full::{
    DebounceEventResult, Debouncer, RecommendedCache, new_debouncer, new_debouncer_opt,
};

use super::paths::is_source;
use crate::config::WatchConfig;

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum WatchError {
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),
}

// =============================================================================
// Watch events
// =============================================================================

/// A classified change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    /// An HTMLx source was created, modified or removed.
    Document { path: PathBuf, deleted: bool },
    /// The config file changed.
    Config,
}

/// Events sent from the file watcher.
#[derive(Debug)]
pub enum WatchEvent {
    /// Files changed, rebuild needed.
    FilesChanged(Vec<ChangeKind>),
    /// Watcher error occurred.
    Error(String),
}

// =============================================================================
// Path classification
// =============================================================================

/// Paths to watch for changes.
pub struct WatchPaths {
    /// Directory holding the `.htmlx` sources.
    pub source_dir: PathBuf,
    /// Config file path.
    pub config_path: PathBuf,
}

/// Classifies file paths into change types.
#[derive(Clone)]
pub struct PathClassifier {
    source_dir: PathBuf,
    config_path: PathBuf,
}

impl PathClassifier {
    pub fn new(paths: &WatchPaths) -> Self {
        Self {
            source_dir: paths.source_dir.clone(),
            config_path: paths.config_path.clone(),
        }
    }

    /// Classify a changed path into a ChangeKind.
    pub fn classify(&self, path: &Path, deleted: bool) -> Option<ChangeKind> {
        if path == self.config_path {
            return Some(ChangeKind::Config);
        }

        let relative = path.strip_prefix(&self.source_dir).ok()?;
        // Skip hidden files and directories inside the source tree
        if relative
            .components()
            .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
        {
            return None;
        }

        is_source(path).then(|| ChangeKind::Document {
            path: path.to_path_buf(),
            deleted,
        })
    }
}

// =============================================================================
// File watcher
// =============================================================================

/// A file watcher that can use either native or polling backend.
pub enum FileWatcher {
    /// Native file system watcher (recommended for local development).
    Native {
        _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
        rx: Receiver<WatchEvent>,
    },
    /// Polling-based watcher (for network filesystems, Docker, etc.).
    Polling {
        _debouncer: Debouncer<PollWatcher, RecommendedCache>,
        rx: Receiver<WatchEvent>,
    },
}

impl FileWatcher {
    /// Create a new file watcher.
    pub fn new(config: &WatchConfig, paths: &WatchPaths) -> Result<Self, WatchError> {
        let debounce_timeout = Duration::from_millis(config.debounce_ms);

        let (tx, rx) = mpsc::channel();

        // Convert notify events to our WatchEvent type
        let classifier = PathClassifier::new(paths);
        let callback = move |result: DebounceEventResult| {
            match result {
                Ok(events) => {
                    let changes: Vec<ChangeKind> = events
                        .iter()
                        .filter_map(|event| {
                            let deleted = matches!(event.kind, EventKind::Remove(_));
                            // Only process events for actual file changes
                            if !is_relevant_event(&event.kind) {
                                return None;
                            }
                            // Classify the first path (usually there's only one)
                            event
                                .paths
                                .first()
                                .and_then(|p| classifier.classify(p, deleted))
                        })
                        .collect();

                    if !changes.is_empty() {
                        let _ = tx.send(WatchEvent::FilesChanged(changes));
                    }
                }
                Err(errors) => {
                    for e in errors {
                        let _ = tx.send(WatchEvent::Error(e.to_string()));
                    }
                }
            }
        };

        if config.poll {
            // Use polling watcher
            let poll_interval = Duration::from_millis(config.poll_interval_ms);
            let notify_config = NotifyConfig::default().with_poll_interval(poll_interval);

            let mut debouncer = new_debouncer_opt::<_, PollWatcher, RecommendedCache>(
                debounce_timeout,
                None,
                callback,
                RecommendedCache::default(),
                notify_config,
            )
            .map_err(WatchError::Notify)?;

            add_watch_paths_to_debouncer(&mut debouncer, paths)?;

            Ok(FileWatcher::Polling {
                _debouncer: debouncer,
                rx,
            })
        } else {
            // Use native watcher
            let mut debouncer =
                new_debouncer(debounce_timeout, None, callback).map_err(WatchError::Notify)?;

            add_watch_paths_to_debouncer(&mut debouncer, paths)?;

            Ok(FileWatcher::Native {
                _debouncer: debouncer,
                rx,
            })
        }
    }

    /// Receive the next watch event (blocking).
    pub fn recv(&self) -> Option<WatchEvent> {
        match self {
            FileWatcher::Native { rx, .. } => rx.recv().ok(),
            FileWatcher::Polling { rx, .. } => rx.recv().ok(),
        }
    }
}

/// Add watch paths to a debouncer.
fn add_watch_paths_to_debouncer<W: Watcher, C: notify_debouncer_full::FileIdCache>(
    debouncer: &mut Debouncer<W, C>,
    paths: &WatchPaths,
) -> Result<(), WatchError> {
    if paths.source_dir.exists() {
        debouncer.watch(&paths.source_dir, RecursiveMode::Recursive)?;
    }

    // Watch config file's parent directory (to catch config changes)
    if let Some(parent) = paths.config_path.parent()
        && parent.exists()
    {
        debouncer.watch(parent, RecursiveMode::NonRecursive)?;
    }

    Ok(())
}

/// Check if an event kind is relevant for rebuilds.
fn is_relevant_event(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Remove(_)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Name(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> PathClassifier {
        PathClassifier::new(&WatchPaths {
            source_dir: PathBuf::from("/project/src"),
            config_path: PathBuf::from("/project/htmlx.yaml"),
        })
    }

    #[test]
    fn test_classify_sources() {
        let classifier = classifier();
        assert_eq!(
            classifier.classify(Path::new("/project/src/blog/post.htmlx"), true),
            Some(ChangeKind::Document {
                path: PathBuf::from("/project/src/blog/post.htmlx"),
                deleted: true,
            })
        );
        assert_eq!(classifier.classify(Path::new("/project/src/notes.txt"), false), None);
        assert_eq!(
            classifier.classify(Path::new("/project/src/.cache/x.htmlx"), false),
            None
        );
    }

    #[test]
    fn test_classify_config_and_outside_paths() {
        let classifier = classifier();
        assert_eq!(
            classifier.classify(Path::new("/project/htmlx.yaml"), false),
            Some(ChangeKind::Config)
        );
        assert_eq!(classifier.classify(Path::new("/project/dist/index.htmlx"), false), None);
    }
}
