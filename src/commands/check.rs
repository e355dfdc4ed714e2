use htmlx::build::Builder;

use crate::CheckArgs;

use super::{load_config, report};

pub async fn run(args: &CheckArgs) -> Result<(), anyhow::Error> {
    let (config, _config_path, base_path) = load_config(args.config_file.as_deref())?;

    let builder = Builder::new(config, base_path).with_inputs(args.inputs.clone());
    let result = builder.check().await?;

    report(&result)?;
    println!(
        "Checked {} document(s), no errors ({} warning(s))",
        result.documents.len(),
        result.warnings()
    );

    Ok(())
}
