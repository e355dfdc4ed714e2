//! Configuration loading and types for htmlx.
//!
//! - Type definitions for config structures (`types`)
//! - Loading configs from files and the environment (`load`)

mod load;
mod types;

use std::path::PathBuf;

pub use load::{CONFIG_FILE, ENV_PREFIX};
pub use types::{
    BuildConfig, CompilerConfig, DevConfig, HtmlxConfig, ProjectConfig, WatchConfig,
};

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to encode config file path as a unicode string: {0}")]
    EncodePath(PathBuf),

    #[error("failed to deserialize config: {0}")]
    Deserialize(#[from] config::ConfigError),

    #[error("failed to get current working directory: {0}")]
    CwdFailure(std::io::Error),

    #[error("{0}")]
    Validation(String),
}
