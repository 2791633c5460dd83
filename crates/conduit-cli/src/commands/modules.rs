//! Module loading and inspection command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use super::common::load_config;
use clap::{Args, Subcommand};
use conduit_config::{find_config, resolve_module_path};
use conduit_modules::{ModuleLoader, StaticLoader};
use std::path::PathBuf;

#[derive(Args)]
pub struct ModulesArgs {
    /// Configuration file whose `[[modules]]` to load (default: user config)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    action: Option<ModulesAction>,
}

#[derive(Subcommand)]
enum ModulesAction {
    /// Load one module and show its metadata
    Load {
        /// Shared library path, file name in a module directory, or builtin:<name>
        #[arg(value_name = "PATH")]
        path: String,

        /// String passed to the module's init
        #[arg(long, default_value = "")]
        init: String,

        /// Parameters to read back after init
        #[arg(long = "param", value_name = "KEY")]
        params: Vec<String>,
    },
}

fn print_loaded(loader: &ModuleLoader) {
    println!(
        "  {:12}  {:16}  {:8}  {:24}  {}",
        "Id", "Kind", "Version", "Name", "Path"
    );
    println!(
        "  {:12}  {:16}  {:8}  {:24}  {}",
        "--", "----", "-------", "----", "----"
    );
    for meta in loader.modules() {
        let path = loader
            .path(&meta.id)
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        println!(
            "  {:12}  {:16}  {:8}  {:24}  {}",
            meta.id,
            meta.kind.name(),
            meta.version,
            meta.name,
            path
        );
    }
}

pub fn run(args: ModulesArgs) -> anyhow::Result<()> {
    let mut loader = ModuleLoader::default();

    if let Some(ModulesAction::Load { path, init, params }) = args.action {
        let resolved = resolve_module_path(&path);
        let meta = loader.load(&resolved, &init)?.clone();
        println!("{} ({})", meta.name, meta.id);
        println!("  {}", meta.description);
        println!("  kind {}, version {}", meta.kind, meta.version);
        println!("  loaded from {}", resolved.display());

        if let Some(module) = loader.module(&meta.id) {
            println!("  active: {}", module.is_active());
            for key in &params {
                match module.get_parameter(key) {
                    Some(value) => println!("  {key} = {value}"),
                    None => println!("  {key} is not readable"),
                }
            }
        }
        loader.cleanup();
        return Ok(());
    }

    let Some(config_path) = find_config(args.config.as_deref()) else {
        if let Some(path) = &args.config {
            anyhow::bail!("config file not found: {}", path.display());
        }
        println!("No configuration file found. Built-in modules:");
        for name in StaticLoader::new().names() {
            println!("  builtin:{name}");
        }
        return Ok(());
    };

    let config = load_config(&config_path)?;
    println!(
        "Loading {} module(s) from {}",
        config.modules.len(),
        config_path.display()
    );
    let failures = config.load_modules(&mut loader);

    println!();
    print_loaded(&loader);
    if !failures.is_empty() {
        println!();
        println!("Failed:");
        for (path, error) in &failures {
            println!("  {path}: {error} (status {:?})", error.status());
        }
    }
    loader.cleanup();

    if failures.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("{} module(s) failed to load", failures.len())
    }
}
