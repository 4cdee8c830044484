//! CLI argument definitions for the filmgrain command-line interface.
//!
//! All `#[derive(Parser)]` types and value parsers live here, keeping
//! `main.rs` focused on running the pipeline and reporting.

use std::path::PathBuf;

use clap::Parser;

/// Add photographic film grain to an image.
#[derive(Parser)]
#[command(name = "filmgrain")]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// Input image path
    pub input: PathBuf,

    /// Output path (default: <INPUT>-grain.png)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Gamma compensation applied to the source
    #[arg(long, default_value_t = 1.0)]
    pub gamma: f32,

    /// Grayscale mode
    #[arg(long)]
    pub gray: bool,

    /// Grain type: 1 fine, 2 fine simple, 3 coarse, 4 coarser
    #[arg(long = "type", value_name = "TYPE", default_value_t = 1)]
    pub grain_type: u8,

    /// Grain color saturation, 0.0 to 1.0
    #[arg(long, default_value_t = 0.5)]
    pub sat: f32,

    /// Grain power: overall,highlights,shadows
    #[arg(
        long,
        value_name = "O,H,S",
        value_parser = parse_power_triple,
        default_value = "0.7,0.2,0.2"
    )]
    pub power: PowerTriple,

    /// Downscale factor applied before graining; scaling back up
    /// afterwards enlarges the grain
    #[arg(long, default_value_t = 1.0)]
    pub scale: f32,

    /// Sharpen output passes
    #[arg(long, value_name = "PASSES", default_value_t = 0)]
    pub sharpen: u32,

    /// Seed for the grain random generator
    #[arg(long, default_value_t = 1)]
    pub seed: u32,

    /// Mask cache directory (default: the platform cache directory)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Output a machine-readable JSON summary instead of progress lines
    #[arg(long)]
    pub json: bool,
}

/// The `--power` triple: overall, highlights, shadows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PowerTriple {
    pub overall: f32,
    pub highs: f32,
    pub shadows: f32,
}

fn parse_power_triple(raw: &str) -> Result<PowerTriple, String> {
    let parts: Vec<&str> = raw.split(',').collect();
    if parts.len() != 3 {
        return Err(format!(
            "expected overall,highlights,shadows, got {} value(s)",
            parts.len()
        ));
    }
    let parse = |part: &str, name: &str| -> Result<f32, String> {
        part.trim()
            .parse::<f32>()
            .map_err(|_| format!("{name} is not a number: {part}"))
    };
    Ok(PowerTriple {
        overall: parse(parts[0], "overall")?,
        highs: parse(parts[1], "highlights")?,
        shadows: parse(parts[2], "shadows")?,
    })
}
