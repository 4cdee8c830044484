//! End-to-end grain compositing pipeline.
//!
//! Validate parameters, load the photograph, optionally downscale it,
//! build the tone-response table, obtain a matching mask through the
//! cache, map every pixel, scale back, sharpen, save. Any stage failure
//! aborts the whole run; only the cache write is allowed to fail softly.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{ImageError, RgbImage};
use rayon::prelude::*;
use thiserror::Error;

use crate::cache::{CacheKey, CacheStatus, MaskCache, Saturation};
use crate::error::InvalidParameterError;
use crate::mask::GrainMask;
use crate::preset::GrainPreset;
use crate::tone::ToneMap;

/// Classic 3x3 sharpen convolution, 1/16 normalized.
const SHARPEN_KERNEL: [f32; 9] = [
    -2.0 / 16.0,
    -2.0 / 16.0,
    -2.0 / 16.0,
    -2.0 / 16.0,
    32.0 / 16.0,
    -2.0 / 16.0,
    -2.0 / 16.0,
    -2.0 / 16.0,
    -2.0 / 16.0,
];

/// Encoder quality for JPEG outputs.
const JPEG_QUALITY: u8 = 97;

/// Parameters for one compositing run.
#[derive(Debug, Clone)]
pub struct CompositeOptions {
    /// Pre-grain downscale factor; grain clumps grow with it.
    pub scale: f32,
    /// Gamma compensation applied to the source before grain.
    pub src_gamma: f32,
    /// Overall grain strength.
    pub grain_power: f32,
    /// Additional grain strength near black.
    pub shadows: f32,
    /// Additional grain strength near white.
    pub highs: f32,
    /// Grain texture preset.
    pub preset: GrainPreset,
    /// Color saturation of the grain noise, 0 to 1.
    pub saturation: f32,
    /// Convert the image to grayscale while graining.
    pub grayscale: bool,
    /// Sharpen passes applied after the grain.
    pub sharpen_passes: u32,
    /// Seed for the grain random generator.
    pub seed: u32,
}

impl Default for CompositeOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            src_gamma: 1.0,
            grain_power: 0.7,
            shadows: 0.2,
            highs: 0.2,
            preset: GrainPreset::Fine,
            saturation: 0.5,
            grayscale: false,
            sharpen_passes: 0,
            seed: 1,
        }
    }
}

impl CompositeOptions {
    /// Check every numeric parameter before any I/O happens.
    pub fn validate(&self) -> Result<(), InvalidParameterError> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(InvalidParameterError::new("scale", self.scale));
        }
        if !(self.src_gamma.is_finite() && self.src_gamma > 0.0) {
            return Err(InvalidParameterError::new("src_gamma", self.src_gamma));
        }
        if !(self.grain_power.is_finite() && self.grain_power >= 0.0) {
            return Err(InvalidParameterError::new("grain_power", self.grain_power));
        }
        if !(self.shadows.is_finite() && self.shadows >= 0.0) {
            return Err(InvalidParameterError::new("shadows", self.shadows));
        }
        if !(self.highs.is_finite() && self.highs >= 0.0) {
            return Err(InvalidParameterError::new("highs", self.highs));
        }
        if !(self.saturation.is_finite() && (0.0..=1.0).contains(&self.saturation)) {
            return Err(InvalidParameterError::new("saturation", self.saturation));
        }
        Ok(())
    }

    fn saturation_key(&self) -> Saturation {
        if self.grayscale {
            Saturation::Grayscale
        } else {
            Saturation::Color(self.saturation)
        }
    }
}

/// Errors from the compositing pipeline.
#[derive(Debug, Error)]
pub enum CompositeError {
    #[error(transparent)]
    InvalidParameter(#[from] InvalidParameterError),

    #[error("failed to read {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    #[error("failed to write {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: ImageError,
    },
}

/// Everything a caller may want to report after a run.
#[derive(Debug)]
pub struct CompositeSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Final output dimensions (equal to the source dimensions).
    pub width: u32,
    pub height: u32,
    /// Dimensions the grain was generated and applied at.
    pub working_width: u32,
    pub working_height: u32,
    pub cache_status: CacheStatus,
    /// BLAKE3 hash of the written output file.
    pub output_hash: String,
    pub elapsed: Duration,
}

/// Run the whole pipeline from `input` to `output`.
pub fn composite(
    input: &Path,
    output: &Path,
    options: &CompositeOptions,
    cache: &MaskCache,
) -> Result<CompositeSummary, CompositeError> {
    let start = Instant::now();
    options.validate()?;

    let decoded = image::open(input).map_err(|source| CompositeError::Load {
        path: input.to_path_buf(),
        source,
    })?;
    let mut img: RgbImage = decoded.into_rgb8();
    let (org_width, org_height) = img.dimensions();

    if options.scale != 1.0 {
        let w = ((org_width as f32 / options.scale) as u32).max(1);
        let h = ((org_height as f32 / options.scale) as u32).max(1);
        img = imageops::resize(&img, w, h, FilterType::Lanczos3);
    }
    let (work_width, work_height) = img.dimensions();

    let map = ToneMap::calculate(
        options.src_gamma,
        options.grain_power,
        options.shadows,
        options.highs,
    )?;

    let key = CacheKey {
        width: work_width,
        height: work_height,
        saturation: options.saturation_key(),
        grain_size: options.preset.grain_size(),
        grain_gauss: options.preset.grain_gauss(),
        seed: options.seed,
    };
    let outcome = cache.fetch(&key)?;

    let mut img = apply_tone_map(&img, &outcome.mask, &map, options.grayscale);

    if options.scale != 1.0 {
        img = imageops::resize(&img, org_width, org_height, FilterType::Lanczos3);
    }

    for _ in 0..options.sharpen_passes {
        img = imageops::filter3x3(&img, &SHARPEN_KERNEL);
    }

    let output_hash = save_image(&img, output)?;

    Ok(CompositeSummary {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        width: img.width(),
        height: img.height(),
        working_width: work_width,
        working_height: work_height,
        cache_status: outcome.status,
        output_hash,
        elapsed: start.elapsed(),
    })
}

/// Map every pixel through the lookup table.
///
/// Grayscale mode converts each source pixel to luma first and
/// replicates the mapped value; color mode maps each channel against the
/// matching mask channel. Rows are independent, so they run in parallel.
pub fn apply_tone_map(
    img: &RgbImage,
    mask: &GrainMask,
    map: &ToneMap,
    grayscale: bool,
) -> RgbImage {
    let (width, height) = img.dimensions();
    debug_assert_eq!((mask.width(), mask.height()), (width, height));

    let src = img.as_raw();
    let row_len = width as usize * 3;
    let mut out = vec![0u8; src.len()];

    out.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, out_row)| {
            let src_row = &src[y * row_len..(y + 1) * row_len];
            for x in 0..width as usize {
                let r = src_row[x * 3];
                let g = src_row[x * 3 + 1];
                let b = src_row[x * 3 + 2];
                let grain = mask.grain_at(x as u32, y as u32);
                if grayscale {
                    let luma =
                        (0.21 * r as f32 + 0.72 * g as f32 + 0.07 * b as f32) as u8;
                    let v = map.lookup(luma, grain[0]);
                    out_row[x * 3..x * 3 + 3].copy_from_slice(&[v, v, v]);
                } else {
                    out_row[x * 3] = map.lookup(r, grain[0]);
                    out_row[x * 3 + 1] = map.lookup(g, grain[1]);
                    out_row[x * 3 + 2] = map.lookup(b, grain[2]);
                }
            }
        });

    RgbImage::from_raw(width, height, out).expect("buffer matches its dimensions")
}

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false)
}

/// Encode the result and return the BLAKE3 hash of the written file.
fn save_image(img: &RgbImage, path: &Path) -> Result<String, CompositeError> {
    let save_err = |source: ImageError| CompositeError::Save {
        path: path.to_path_buf(),
        source,
    };

    if is_jpeg(path) {
        let file = File::create(path).map_err(|err| save_err(ImageError::IoError(err)))?;
        let mut encoder = JpegEncoder::new_with_quality(BufWriter::new(file), JPEG_QUALITY);
        encoder.encode_image(img).map_err(save_err)?;
    } else {
        img.save(path).map_err(save_err)?;
    }

    let bytes = fs::read(path).map_err(|err| save_err(ImageError::IoError(err)))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}
