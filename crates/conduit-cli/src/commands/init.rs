//! Starter configuration command.

use clap::Args;
use conduit_config::{FrameworkConfig, default_config_file};
use std::path::PathBuf;

#[derive(Args)]
pub struct InitArgs {
    /// Where to write the file (default: user config directory)
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

pub fn run(args: InitArgs) -> anyhow::Result<()> {
    let path = args.path.unwrap_or_else(default_config_file);
    if path.exists() && !args.force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let config = FrameworkConfig::starter();
    config.save(&path)?;
    tracing::info!(path = %path.display(), "init: starter config written");

    println!("Wrote {}", path.display());
    println!(
        "  {} endpoint(s), {} route(s), {} module(s)",
        config.endpoints.len(),
        config.routes.len(),
        config.modules.len()
    );
    println!();
    println!("Try:");
    println!("  conduit validate {}", path.display());
    println!(
        "  conduit route --config {} --input in.wav --source 1 --out-dir out",
        path.display()
    );
    Ok(())
}
