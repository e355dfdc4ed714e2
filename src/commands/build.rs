use htmlx::build::Builder;

use crate::BuildArgs;

use super::{load_config, report};

pub async fn run(args: &BuildArgs) -> Result<(), anyhow::Error> {
    let (config, _config_path, base_path) = load_config(args.config_file.as_deref())?;

    let builder = Builder::new(config, base_path)
        .with_inputs(args.inputs.clone())
        .with_output_dir(args.output.clone());
    let result = builder.build().await?;

    report(&result)?;
    println!(
        "Built {} document(s) to {} ({} warning(s))",
        result.documents.len(),
        result.output_dir.display(),
        result.warnings()
    );

    Ok(())
}
