//! Effect listing and information command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use clap::Args;
use conduit_registry::{EffectDescriptor, EffectKind, EffectRegistry, GAIN, ParamDescriptor};
use serde::Serialize;

#[derive(Args)]
pub struct EffectsArgs {
    /// Show details for a specific effect
    #[arg(value_name = "EFFECT")]
    effect: Option<String>,

    /// Print JSON instead of tables
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct ParamInfo {
    name: &'static str,
    unit: &'static str,
    min: f32,
    max: f32,
    default: f32,
}

impl From<&ParamDescriptor> for ParamInfo {
    fn from(p: &ParamDescriptor) -> Self {
        Self {
            name: p.name,
            unit: p.unit.suffix().trim(),
            min: p.min,
            max: p.max,
            default: p.default,
        }
    }
}

#[derive(Serialize)]
struct EffectInfo {
    id: &'static str,
    name: &'static str,
    category: &'static str,
    description: &'static str,
    params: Vec<ParamInfo>,
}

impl From<&EffectDescriptor> for EffectInfo {
    fn from(d: &EffectDescriptor) -> Self {
        Self {
            id: d.id,
            name: d.name,
            category: d.category.name(),
            description: d.description,
            params: std::iter::once(&GAIN)
                .chain(d.params)
                .map(ParamInfo::from)
                .collect(),
        }
    }
}

pub fn run(args: EffectsArgs) -> anyhow::Result<()> {
    let registry = EffectRegistry::builtin();

    if let Some(effect_name) = &args.effect {
        let kind: EffectKind = effect_name.parse()?;
        let descriptor = registry
            .get(kind)
            .ok_or_else(|| anyhow::anyhow!("Unknown effect: {}", effect_name))?;
        let info = EffectInfo::from(descriptor);

        if args.json {
            println!("{}", serde_json::to_string_pretty(&info)?);
            return Ok(());
        }

        println!("{} ({})", info.name, info.id);
        println!("{}", "=".repeat(info.name.len() + info.id.len() + 3));
        println!();
        println!("{}", info.description);
        println!("Category: {}", info.category);
        println!();
        println!("Parameters:");
        println!();
        println!("  {:12}  {:8}  {:10}  {}", "Name", "Unit", "Default", "Range");
        println!("  {:12}  {:8}  {:10}  {}", "----", "----", "-------", "-----");
        for param in &info.params {
            println!(
                "  {:12}  {:8}  {:10}  {} to {}",
                param.name, param.unit, param.default, param.min, param.max
            );
        }
        println!();
        println!("Example usage:");
        println!();
        let example: Vec<String> = info
            .params
            .iter()
            .skip(1)
            .take(2)
            .map(|p| format!("{}={}", p.name, p.default))
            .collect();
        if example.is_empty() {
            println!("  conduit process input.wav output.wav --chain \"{}\"", info.id);
        } else {
            println!(
                "  conduit process input.wav output.wav --chain \"{}:{}\"",
                info.id,
                example.join(",")
            );
        }
    } else {
        let effects: Vec<EffectInfo> = registry.all_effects().into_iter().map(EffectInfo::from).collect();

        if args.json {
            println!("{}", serde_json::to_string_pretty(&effects)?);
            return Ok(());
        }

        println!("Available Effects");
        println!("=================");
        println!();
        for effect in &effects {
            println!("  {:12} {:11} - {}", effect.id, effect.category, effect.description);
        }
        println!();
        println!("Use 'conduit effects <name>' for detailed parameter info.");
    }

    Ok(())
}
