//! Offline chain processing command.

use super::common::{level_line, load_config, parse_chain, progress_bar};
use crate::wav::{read_wav, write_wav};
use anyhow::Context;
use clap::Args;
use conduit_chain::{ChainSpec, builtin_registry};
use std::path::PathBuf;

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Effect chain (e.g., "compressor:threshold=-18,ratio=4|reverb:wet=0.3")
    #[arg(short, long, conflicts_with = "config")]
    chain: Option<String>,

    /// Configuration file holding the chain to run
    #[arg(long, requires = "route")]
    config: Option<PathBuf>,

    /// Index of the `[[routes]]` entry whose chain to run
    #[arg(long, requires = "config")]
    route: Option<usize>,

    /// Frames per processing block
    #[arg(long, default_value = "512")]
    block_size: usize,

    /// Output bit depth (16 or 32)
    #[arg(long, default_value = "32", value_parser = ["16", "32"])]
    bit_depth: String,
}

/// The chain named on the command line, in the input file's format.
fn chain_spec(args: &ProcessArgs, sample_rate: u32, channels: usize) -> anyhow::Result<ChainSpec> {
    if let Some(text) = &args.chain {
        return parse_chain(text, sample_rate, channels);
    }
    let (Some(path), Some(index)) = (&args.config, args.route) else {
        anyhow::bail!("No chain specified. Use --chain or --config with --route");
    };

    let config = load_config(path)?;
    let route = config
        .routes
        .get(index)
        .with_context(|| format!("{} has {} routes", path.display(), config.routes.len()))?;
    let mut spec = route
        .chain
        .clone()
        .with_context(|| format!("route {index} has no chain"))?;
    if spec.sample_rate != sample_rate || spec.channels != channels {
        tracing::warn!(
            configured_rate = spec.sample_rate,
            configured_channels = spec.channels,
            sample_rate,
            channels,
            "process: chain rebuilt for the input file's format"
        );
        spec.sample_rate = sample_rate;
        spec.channels = channels;
    }
    Ok(spec)
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    let bit_depth: u16 = args.bit_depth.parse()?;
    if args.block_size == 0 {
        anyhow::bail!("--block-size must be at least 1");
    }

    println!("Reading {}...", args.input.display());
    let input = read_wav(&args.input)?;
    let channels = usize::from(input.channels);
    println!(
        "  {} frames, {} channel(s), {} Hz, {:.2}s",
        input.frames(),
        input.channels,
        input.sample_rate,
        input.duration_secs()
    );

    let spec = chain_spec(&args, input.sample_rate, channels)?;
    let mut chain = spec
        .build_with(builtin_registry(), args.block_size)
        .context("failed to build chain")?;

    let names: Vec<String> = chain.nodes().map(|n| n.kind().to_string()).collect();
    println!("Processing with {} effect(s): {}", chain.len(), names.join(" -> "));
    tracing::debug!(latency = chain.latency_samples(), gain = chain.gain(), "process: chain ready");

    let mut output = input.samples.clone();
    let block = args.block_size * channels;
    let pb = progress_bar(input.frames() as u64);
    for (i, chunk) in output.chunks_mut(block).enumerate() {
        // a trailing partial frame is left untouched
        if chunk.len() >= channels {
            chain.apply_f32_in_place(chunk)?;
        }
        pb.set_position(((i + 1) * args.block_size).min(input.frames()) as u64);
    }
    pb.finish_with_message("done");

    println!("\nStats:");
    println!("{}", level_line("Input:", &input.samples));
    println!("{}", level_line("Output:", &output));

    println!("\nWriting {}...", args.output.display());
    write_wav(&args.output, &output, input.channels, input.sample_rate, bit_depth)?;
    println!("Done!");

    Ok(())
}
