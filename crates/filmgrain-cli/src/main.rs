//! filmgrain - add photographic film grain to an image.
//!
//! Thin shell over `filmgrain-core`: parse arguments, resolve the grain
//! preset and cache root, run the pipeline, report the outcome.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use filmgrain_core::{composite, CacheStatus, CompositeOptions, GrainPreset, MaskCache};

mod args;
mod json;

use args::Cli;
use json::JsonSummary;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let preset = GrainPreset::try_from(cli.grain_type)?;
    let options = CompositeOptions {
        scale: cli.scale,
        src_gamma: cli.gamma,
        grain_power: cli.power.overall,
        shadows: cli.power.shadows,
        highs: cli.power.highs,
        preset,
        saturation: cli.sat,
        grayscale: cli.gray,
        sharpen_passes: cli.sharpen,
        seed: cli.seed,
    };

    let cache_root = cli
        .cache_dir
        .clone()
        .or_else(MaskCache::default_root)
        .context("no cache directory available; pass --cache-dir")?;
    let cache = MaskCache::new(cache_root);

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output(&cli.input));

    if !cli.json {
        println!("{} {}", "Graining:".cyan().bold(), cli.input.display());
        println!(
            "  {} type {} ({}), power {}, seed {}",
            "-".dimmed(),
            preset.id(),
            preset.label(),
            cli.power.overall,
            cli.seed
        );
    }

    let summary = composite(&cli.input, &output, &options, &cache)
        .with_context(|| format!("failed to grain {}", cli.input.display()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&JsonSummary::from(&summary))?);
    } else {
        match &summary.cache_status {
            CacheStatus::Hit => {
                println!("  {} reused cached grain mask", "-".dimmed());
            }
            CacheStatus::Generated => {
                println!("  {} generated grain mask", "-".dimmed());
            }
            CacheStatus::GeneratedUnsaved(reason) => {
                println!("  {} grain mask not cached: {}", "!".yellow(), reason);
            }
        }
        if (summary.working_width, summary.working_height) != (summary.width, summary.height) {
            println!(
                "  {} grained at {}x{}, restored to {}x{}",
                "-".dimmed(),
                summary.working_width,
                summary.working_height,
                summary.width,
                summary.height
            );
        }
        println!(
            "{} {} ({} ms)",
            "Saved:".green().bold(),
            output.display(),
            summary.elapsed.as_millis()
        );
    }

    Ok(())
}

/// Default output path: a sibling `<name>-grain.png`.
fn default_output(input: &Path) -> PathBuf {
    let mut name = input
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push("-grain.png");
    input.with_file_name(name)
}
