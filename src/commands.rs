pub mod build;
pub mod check;
pub mod clean;
pub mod init;
pub mod serve;

use std::path::{Path, PathBuf};

use htmlx::build::{BuildResult, base_path_from_config};
use htmlx::config::HtmlxConfig;

/// Loads the config named on the command line and returns it with the
/// project base path.
fn load_config(
    config_file: Option<&Path>,
) -> Result<(HtmlxConfig, PathBuf, PathBuf), anyhow::Error> {
    let (config, config_path) = HtmlxConfig::load_from_arg(config_file)?;
    let base_path = base_path_from_config(&config_path);
    Ok((config, config_path, base_path))
}

/// Prints every diagnostic of a build and returns an error if any document
/// failed.
fn report(result: &BuildResult) -> Result<(), anyhow::Error> {
    for doc in &result.documents {
        if let Some(error) = &doc.error {
            eprintln!("{error}");
        }
        for warning in &doc.warnings {
            eprintln!("{}:{warning}", doc.relative.display());
        }
    }

    if result.succeeded() {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "{} of {} document(s) failed",
            result.failures(),
            result.documents.len()
        ))
    }
}
