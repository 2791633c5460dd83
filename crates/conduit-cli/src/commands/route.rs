//! Stream a WAV file through a configured routing table.

use super::common::{level_line, load_config, progress_bar};
use crate::wav::{read_wav, write_wav};
use anyhow::Context;
use clap::Args;
use conduit_core::{SampleVec, from_f32, to_f32};
use conduit_routing::{Direction, EndpointId, RouteType};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Args)]
pub struct RouteArgs {
    /// Configuration file describing endpoints and routes
    #[arg(long)]
    config: PathBuf,

    /// Input WAV file played by the source endpoint
    #[arg(long)]
    input: PathBuf,

    /// Source endpoint id the input plays from
    #[arg(long)]
    source: EndpointId,

    /// Directory receiving one WAV file per sink
    #[arg(long)]
    out_dir: PathBuf,

    /// Output bit depth (16 or 32)
    #[arg(long, default_value = "32", value_parser = ["16", "32"])]
    bit_depth: String,
}

/// Everything delivered to one sink.
struct SinkOutput {
    name: String,
    samples: Vec<f32>,
    routes: BTreeMap<u32, RouteType>,
}

pub fn run(args: RouteArgs) -> anyhow::Result<()> {
    let bit_depth: u16 = args.bit_depth.parse()?;
    let config = load_config(&args.config)?;
    let table = config
        .build_routing_table()
        .with_context(|| format!("invalid routing in {}", args.config.display()))?;

    let source = table
        .endpoints()
        .into_iter()
        .find(|e| e.id == args.source)
        .with_context(|| format!("endpoint {} is not declared", args.source))?;
    if source.direction != Direction::Source {
        anyhow::bail!("endpoint {} ({}) is not a source", source.id, source.name);
    }

    let input = read_wav(&args.input)?;
    let channels = usize::from(input.channels);
    let period = table.config().processing_buffer_size;
    let format = table.config().sample_format;
    println!(
        "Routing {} ({} frames, {} channel(s)) from '{}' in {}-frame {} periods",
        args.input.display(),
        input.frames(),
        input.channels,
        source.name,
        period,
        format.name()
    );

    let total = input.frames() * channels;
    let mut sinks: BTreeMap<EndpointId, SinkOutput> = BTreeMap::new();
    let mut wire = SampleVec::with_capacity(format, period * channels);
    let mut decoded = vec![0.0f32; period * channels];
    let mut dispatched = 0usize;

    let pb = progress_bar(input.frames() as u64);
    for (i, chunk) in input.samples[..total].chunks(period * channels).enumerate() {
        let frames = chunk.len() / channels;
        let offset = i * period * channels;
        from_f32(chunk, wire.prepare(format, chunk.len()));

        dispatched += table.route_buffer(args.source, wire.as_samples(), frames, |rule, buffer| {
            let samples = buffer.samples();
            let n = samples.len().min(chunk.len());
            to_f32(samples, &mut decoded[..n]);

            let sink = sinks.entry(rule.sink.id).or_insert_with(|| SinkOutput {
                name: rule.sink.name.clone(),
                samples: vec![0.0; total],
                routes: BTreeMap::new(),
            });
            sink.routes.insert(rule.id, rule.route_type);
            for (dst, &s) in sink.samples[offset..offset + n].iter_mut().zip(&decoded[..n]) {
                *dst += s;
            }
        })?;
        pb.set_position(((i + 1) * period).min(input.frames()) as u64);
    }
    pb.finish_with_message("done");

    if sinks.is_empty() {
        println!("\nNo enabled route leaves endpoint {}.", args.source);
        return Ok(());
    }

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;

    println!("\n{dispatched} buffer(s) dispatched to {} sink(s):", sinks.len());
    println!("{}", level_line("Input:", &input.samples));
    for (id, sink) in &sinks {
        let path = args.out_dir.join(format!("{id}-{}.wav", file_stem(&sink.name)));
        let routes: Vec<String> = sink
            .routes
            .iter()
            .map(|(route, kind)| format!("#{route} {kind:?}"))
            .collect();
        println!("\n  Sink {id} '{}' via {}", sink.name, routes.join(", "));
        println!("{}", level_line("Output:", &sink.samples));
        write_wav(&path, &sink.samples, input.channels, input.sample_rate, bit_depth)?;
        println!("  Wrote {}", path.display());
    }

    Ok(())
}

/// Endpoint names reduced to characters safe in a file name.
fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() { "sink".to_string() } else { stem }
}
