mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::run::RunArgs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "fsreport",
    about = "Run operator report definitions against the filesystem-metadata database",
    version,
    propagate_version = true
)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a report definition end to end
    Run(RunArgs),

    /// Load a definition and resolve its query without touching the database
    Validate {
        /// Report definition file
        definition: PathBuf,

        /// Fail when the resolved query still contains placeholders
        #[arg(long)]
        strict_vars: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Run(args) => cmd::run::run(args, cli.json),
        Commands::Validate {
            definition,
            strict_vars,
        } => cmd::validate::run(&definition, strict_vars, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
