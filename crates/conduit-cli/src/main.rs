//! Conduit CLI - command-line front end for the conduit routing framework.

mod commands;
mod wav;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "conduit")]
#[command(author, version, about = "Conduit audio routing framework CLI", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available effects and their parameters
    Effects(commands::effects::EffectsArgs),

    /// Run an effect chain over a WAV file
    Process(commands::process::ProcessArgs),

    /// Stream a WAV file through a configured routing table
    Route(commands::route::RouteArgs),

    /// Load modules and show their metadata
    Modules(commands::modules::ModulesArgs),

    /// Write a starter configuration file
    Init(commands::init::InitArgs),

    /// Check a configuration file
    Validate(commands::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Effects(args) => commands::effects::run(args),
        Commands::Process(args) => commands::process::run(args),
        Commands::Route(args) => commands::route::run(args),
        Commands::Modules(args) => commands::modules::run(args),
        Commands::Init(args) => commands::init::run(args),
        Commands::Validate(args) => commands::validate::run(args),
    }
}
