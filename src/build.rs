mod builder;
mod paths;
pub mod pipeline;
mod watch;

pub use builder::{BuildError, BuildResult, Builder, DocumentOutcome};
pub use paths::{OutputPaths, SourceFile, base_path_from_config, discover_sources};
pub use watch::{ChangeKind, FileWatcher, PathClassifier, WatchError, WatchEvent, WatchPaths};
