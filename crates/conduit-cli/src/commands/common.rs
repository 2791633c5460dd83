//! Shared CLI helpers used across multiple commands.

use anyhow::Context;
use conduit_chain::ChainSpec;
use conduit_config::FrameworkConfig;
use conduit_core::amplitude_to_db;
use conduit_registry::ProcessingParams;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Parse `effect:key=value,...|effect...` into a chain description.
pub fn parse_chain(text: &str, sample_rate: u32, channels: usize) -> anyhow::Result<ChainSpec> {
    let mut spec = ChainSpec::new(sample_rate, channels);
    for node in text.split('|').map(str::trim).filter(|n| !n.is_empty()) {
        let params: ProcessingParams = node
            .parse()
            .with_context(|| format!("invalid chain node '{node}'"))?;
        spec = spec.with_node(params);
    }
    if spec.nodes.is_empty() {
        anyhow::bail!("chain '{text}' has no effects");
    }
    Ok(spec)
}

/// Load a configuration file, naming the file on failure.
pub fn load_config(path: &Path) -> anyhow::Result<FrameworkConfig> {
    FrameworkConfig::load(path).with_context(|| format!("failed to load {}", path.display()))
}

/// Progress bar in the style every long-running command shares.
pub fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
    {
        pb.set_style(style.progress_chars("##-"));
    }
    pb
}

/// Root-mean-square level.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}

/// Largest absolute sample.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0, f32::max)
}

/// One `RMS .. dB, Peak .. dB` report line.
pub fn level_line(label: &str, samples: &[f32]) -> String {
    format!(
        "  {label:7} RMS {:.1} dB, Peak {:.1} dB",
        amplitude_to_db(rms(samples)),
        amplitude_to_db(peak(samples))
    )
}
