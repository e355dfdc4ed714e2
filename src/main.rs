use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// The command to execute
    #[command(subcommand)]
    command: HtmlxCommand,
}

#[derive(Parser)]
struct InitArgs {
    /// The path to initialize the project in
    path: PathBuf,

    /// Whether to create the directory if it doesn't exist
    #[arg(short, long, default_value = "false")]
    create: bool,
}

#[derive(Parser)]
struct BuildArgs {
    /// Files or directories to compile (default: the configured source directory)
    inputs: Vec<PathBuf>,

    /// The directory to write generated files to (default: the configured output directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// The path to the configuration file
    #[arg(short, long, default_value = "htmlx.yaml")]
    config_file: Option<PathBuf>,
}

#[derive(Parser)]
struct CheckArgs {
    /// Files or directories to check (default: the configured source directory)
    inputs: Vec<PathBuf>,

    /// The path to the configuration file
    #[arg(short, long, default_value = "htmlx.yaml")]
    config_file: Option<PathBuf>,
}

#[derive(Parser)]
struct ServeArgs {
    /// The address to bind to
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    /// The port to bind to
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Open the project in the default browser
    #[arg(short, long, default_value = "false")]
    open: bool,

    /// The path to the configuration file
    #[arg(short, long, default_value = "htmlx.yaml")]
    config_file: Option<PathBuf>,

    /// Whether to watch for changes and rebuild automatically
    #[arg(short, long, default_value = "true")]
    watch: bool,
}

#[derive(Parser)]
struct CleanArgs {
    /// The path to the configuration file
    #[arg(short, long, default_value = "htmlx.yaml")]
    config_file: Option<PathBuf>,

    /// Print what would be deleted without deleting it
    #[arg(short, long, default_value = "false")]
    dry_run: bool,
}

#[derive(Subcommand)]
enum HtmlxCommand {
    /// Initialize a new HTMLx project
    Init(InitArgs),

    /// Compile HTMLx sources to HTML, CSS and JS
    Build(BuildArgs),

    /// Parse and validate HTMLx sources without writing output
    Check(CheckArgs),

    /// Serve the project on a local port, rebuilding on change
    Serve(ServeArgs),

    /// Remove the output directory
    Clean(CleanArgs),
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn,htmlx=info",
        1 => "htmlx=debug,info",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        HtmlxCommand::Init(args) => {
            commands::init::run(&args).await?;
        }
        HtmlxCommand::Build(args) => {
            commands::build::run(&args).await?;
        }
        HtmlxCommand::Check(args) => {
            commands::check::run(&args).await?;
        }
        HtmlxCommand::Serve(args) => {
            commands::serve::run(&args).await?;
        }
        HtmlxCommand::Clean(args) => {
            commands::clean::run(&args).await?;
        }
    }

    Ok(())
}
