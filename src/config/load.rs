//! Configuration loading from files.
//!
//! `htmlx.yaml` is layered under `HTMLX_`-prefixed environment variables,
//! with `__` separating nested keys (`HTMLX_BUILD__OUTPUT=public`).

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use tracing::debug;

use super::{ConfigError, HtmlxConfig};

/// Default configuration file name.
pub const CONFIG_FILE: &str = "htmlx.yaml";

/// Prefix of environment variables that override configuration values.
pub const ENV_PREFIX: &str = "HTMLX";

impl HtmlxConfig {
    /// Resolve the config path from the command line argument, defaulting to
    /// `htmlx.yaml` in the working directory, and load it.
    pub fn load_from_arg(config_file: Option<&Path>) -> Result<(Self, PathBuf), ConfigError> {
        let config_file = config_file.unwrap_or(Path::new(CONFIG_FILE));
        let config_file = if config_file.is_relative() {
            std::env::current_dir()
                .map_err(ConfigError::CwdFailure)?
                .join(config_file)
        } else {
            config_file.to_path_buf()
        };

        let config = Self::load(&config_file)?;
        Ok((config, config_file))
    }

    /// Load the config from a file path. A missing file yields the defaults
    /// (plus any environment overrides).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| ConfigError::EncodePath(path.to_path_buf()))?;

        debug!(path = %path.display(), exists = path.exists(), "loading config");
        let settings = Config::builder()
            .add_source(File::new(path_str, FileFormat::Yaml).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: HtmlxConfig = settings.try_deserialize()?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.build.source == self.build.output {
            return Err(ConfigError::Validation(format!(
                "invalid config: build.source and build.output are both '{}'",
                self.build.source.display()
            )));
        }
        if self.compiler.api_base.trim().is_empty() {
            return Err(ConfigError::Validation(
                "invalid config: compiler.api_base must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = HtmlxConfig::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.build, HtmlxConfig::default().build);
        assert_eq!(config.compiler, HtmlxConfig::default().compiler);
    }

    #[test]
    fn test_load_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            "project:\n  name: Demo\nbuild:\n  output: public\ncompiler:\n  animation_threshold: 2\n",
        )
        .unwrap();

        let config = HtmlxConfig::load(&path).unwrap();
        assert_eq!(config.project.name, "Demo");
        assert_eq!(config.build.output, PathBuf::from("public"));
        assert_eq!(config.build.source, PathBuf::from("src"));
        assert_eq!(config.compiler.animation_threshold, 2);
    }

    #[test]
    fn test_rejects_same_source_and_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "build:\n  source: site\n  output: site\n").unwrap();

        let err = HtmlxConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
