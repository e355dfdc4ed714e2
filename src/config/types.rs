//! Configuration type definitions.
//!
//! Every field has a default, so an empty or missing `htmlx.yaml` is a valid
//! configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::compiler::codegen::DEFAULT_API_BASE;
use crate::compiler::validate::DEFAULT_ANIMATION_THRESHOLD;
use crate::compiler::{CompileOptions, JsOptions, ValidatorOptions};

/// The contents of `htmlx.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtmlxConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub compiler: CompilerConfig,
    /// Development-specific settings
    #[serde(default)]
    pub dev: DevConfig,
}

impl HtmlxConfig {
    /// Compiler options derived from the `compiler` section.
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            validator: ValidatorOptions {
                animation_threshold: self.compiler.animation_threshold,
            },
            js: JsOptions {
                api_base: self.compiler.api_base.clone(),
            },
        }
    }
}

// =============================================================================
// Project configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_project_name")]
    pub name: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: default_project_name(),
        }
    }
}

fn default_project_name() -> String {
    "My HTMLx Project".to_string()
}

// =============================================================================
// Build configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Directory scanned for `.htmlx` files, relative to the config file.
    #[serde(default = "default_source")]
    pub source: PathBuf,
    /// Directory generated files are written to, relative to the config file.
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            output: default_output(),
        }
    }
}

fn default_source() -> PathBuf {
    PathBuf::from("src")
}

fn default_output() -> PathBuf {
    PathBuf::from("dist")
}

// =============================================================================
// Compiler configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Animated elements allowed before an `excess-animation` warning.
    #[serde(default = "default_animation_threshold")]
    pub animation_threshold: usize,
    /// Prefix for `⚡-call` endpoints in the generated script.
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            animation_threshold: default_animation_threshold(),
            api_base: default_api_base(),
        }
    }
}

fn default_animation_threshold() -> usize {
    DEFAULT_ANIMATION_THRESHOLD
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

// =============================================================================
// Dev configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevConfig {
    /// File watching configuration
    #[serde(default)]
    pub watch: WatchConfig,
    /// Enable live reload in the browser when files change (default: true)
    #[serde(default = "default_live_reload")]
    pub live_reload: bool,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            watch: WatchConfig::default(),
            live_reload: true,
        }
    }
}

fn default_live_reload() -> bool {
    true
}

/// Configuration for file watching during development.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Use polling-based watcher instead of native file system events.
    /// Useful for network filesystems, Docker volumes, or other situations
    /// where native events are unreliable.
    #[serde(default)]
    pub poll: bool,
    /// Poll interval in milliseconds (only used if poll=true).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Changes within this window are batched together.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_debounce_ms() -> u64 {
    100
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll: false,
            poll_interval_ms: default_poll_interval_ms(),
            debounce_ms: default_debounce_ms(),
        }
    }
}
