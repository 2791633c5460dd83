//! Configuration validation command.

use super::common::load_config;
use clap::Args;
use conduit_config::ValidationError;
use std::path::PathBuf;

#[derive(Args)]
pub struct ValidateArgs {
    /// Configuration file to check
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

pub fn run(args: ValidateArgs) -> anyhow::Result<()> {
    let config = load_config(&args.file)?;

    match config.validate() {
        Ok(()) => {
            // validation passed; building also instantiates every chain
            let table = config.build_routing_table()?;
            println!("{}: OK", args.file.display());
            println!(
                "  {} endpoint(s), {} route(s), {} module(s)",
                table.endpoints().len(),
                table.len(),
                config.modules.len()
            );
            Ok(())
        }
        Err(ValidationError::Multiple(errors)) => {
            println!("{}: {} problem(s)", args.file.display(), errors.len());
            for error in &errors {
                println!("  - {error}");
            }
            anyhow::bail!("validation failed")
        }
        Err(error) => {
            println!("{}: 1 problem", args.file.display());
            println!("  - {error}");
            anyhow::bail!("validation failed")
        }
    }
}
