use htmlx::build::Builder;

use crate::CleanArgs;

use super::load_config;

pub async fn run(args: &CleanArgs) -> Result<(), anyhow::Error> {
    let (config, _config_path, base_path) = load_config(args.config_file.as_deref())?;

    // Delete the generated output folder
    let output_dir = Builder::new(config, base_path).output_dir();
    if !output_dir.exists() {
        println!("Nothing to clean at {}", output_dir.display());
        return Ok(());
    }

    let output_dir = output_dir.canonicalize().unwrap_or(output_dir);
    if args.dry_run {
        println!("Would delete {}", output_dir.display());
    } else {
        tokio::fs::remove_dir_all(&output_dir).await?;
        println!("Deleted {}", output_dir.display());
    }

    Ok(())
}
