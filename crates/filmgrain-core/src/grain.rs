//! Procedural grain synthesis.
//!
//! A mask starts as Gaussian noise about the neutral 128, drawn at the
//! target resolution divided by the grain size, softened with a box-blur
//! approximation of a Gaussian, then rescaled to the target dimensions
//! with Lanczos resampling; low-resolution noise turns into visible
//! clumps. Blurring and resampling both shrink the field's spread, so
//! the finished mask is stretched back to a nominal deviation; grain
//! strength therefore stays comparable across size/smoothing
//! combinations.

use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};
use rand_distr::Normal;

use crate::error::InvalidParameterError;
use crate::mask::{GrainMask, MaskKind};
use crate::rng::DeterministicRng;

/// Spread (standard deviation) every finished mask is normalized to.
/// The stock presets were tuned to land near this value.
pub(crate) const NOMINAL_DEVIATION: f64 = 8.5;

/// Blur radius per unit of smoothing strength.
const BLUR_STRENGTH_DIVISOR: f32 = 30.0;

/// Box-blur passes used to approximate a Gaussian.
const BLUR_PASSES: usize = 3;

/// Generate a grain mask.
///
/// A negative `saturation` produces a single-channel mask; a value in
/// [0, 1] produces a color mask whose channels range from identical
/// (0) to fully independent (1). The same arguments always produce a
/// bit-identical mask.
pub fn grain_gen(
    width: u32,
    height: u32,
    grain_size: f32,
    grain_gauss: f32,
    saturation: f32,
    seed: u32,
) -> Result<GrainMask, InvalidParameterError> {
    if width == 0 {
        return Err(InvalidParameterError::new("width", 0.0));
    }
    if height == 0 {
        return Err(InvalidParameterError::new("height", 0.0));
    }
    if !(grain_size.is_finite() && grain_size > 0.0) {
        return Err(InvalidParameterError::new("grain_size", grain_size));
    }
    if !(grain_gauss.is_finite() && grain_gauss >= 0.0) {
        return Err(InvalidParameterError::new("grain_gauss", grain_gauss));
    }
    if !saturation.is_finite() || saturation > 1.0 {
        return Err(InvalidParameterError::new("saturation", saturation));
    }

    // Grain size 1 draws noise 1:1; size 2 draws at half resolution and
    // rescales 1:2, doubling the apparent clump size.
    let noise_w = ((width as f32 / grain_size) as u32).max(1);
    let noise_h = ((height as f32 / grain_size) as u32).max(1);
    let radius = (grain_gauss / BLUR_STRENGTH_DIVISOR).round() as usize;

    if saturation < 0.0 {
        let field = deviation_field(noise_w, noise_h, grain_gauss, seed)?;
        let field = box_blur(field, noise_w as usize, noise_h as usize, radius);
        let plane = quantize(&field);
        let plane = resize_gray(plane, noise_w, noise_h, width, height);
        let plane = normalize_spread(plane);
        Ok(GrainMask::from_raw(width, height, MaskKind::Gray, plane))
    } else {
        let shared = deviation_field(noise_w, noise_h, grain_gauss, seed)?;
        let pixels = noise_w as usize * noise_h as usize;
        let mut interleaved = vec![0u8; pixels * 3];

        for channel in 0..3u32 {
            let chan_seed = DeterministicRng::derive_channel_seed(seed, channel);
            let chan = deviation_field(noise_w, noise_h, grain_gauss, chan_seed)?;
            let mut blended: Vec<f32> = shared
                .iter()
                .zip(&chan)
                .map(|(s, c)| (1.0 - saturation) * s + saturation * c)
                .collect();
            blended = box_blur(blended, noise_w as usize, noise_h as usize, radius);
            let plane = quantize(&blended);
            for (i, v) in plane.into_iter().enumerate() {
                interleaved[i * 3 + channel as usize] = v;
            }
        }

        let data = resize_rgb(interleaved, noise_w, noise_h, width, height);
        let data = normalize_spread(data);
        Ok(GrainMask::from_raw(width, height, MaskKind::Rgb, data))
    }
}

/// Zero-mean Gaussian deviations with the given spread.
fn deviation_field(
    width: u32,
    height: u32,
    sigma: f32,
    seed: u32,
) -> Result<Vec<f32>, InvalidParameterError> {
    let pixels = width as usize * height as usize;
    if sigma == 0.0 {
        return Ok(vec![0.0; pixels]);
    }
    let normal = Normal::new(0.0f32, sigma)
        .map_err(|_| InvalidParameterError::new("grain_gauss", sigma))?;
    let mut rng = DeterministicRng::new(seed);
    Ok((0..pixels).map(|_| rng.sample(&normal)).collect())
}

/// Gaussian blur approximated by repeated box blurs with clamped edges.
fn box_blur(mut field: Vec<f32>, w: usize, h: usize, radius: usize) -> Vec<f32> {
    if radius == 0 {
        return field;
    }
    let mut scratch = vec![0.0f32; field.len()];
    for _ in 0..BLUR_PASSES {
        box_blur_h(&field, &mut scratch, w, h, radius);
        box_blur_v(&scratch, &mut field, w, h, radius);
    }
    field
}

fn box_blur_h(src: &[f32], dst: &mut [f32], w: usize, h: usize, r: usize) {
    let d = (2 * r + 1) as f32;
    let mut prefix = vec![0.0f32; w + 1];
    for y in 0..h {
        let row = &src[y * w..(y + 1) * w];
        for x in 0..w {
            prefix[x + 1] = prefix[x] + row[x];
        }
        for x in 0..w {
            let lo = x.saturating_sub(r);
            let hi = (x + r + 1).min(w);
            // Windows running past an edge repeat the border sample.
            let before = r.saturating_sub(x) as f32 * row[0];
            let after = (x + r + 1).saturating_sub(w) as f32 * row[w - 1];
            dst[y * w + x] = (prefix[hi] - prefix[lo] + before + after) / d;
        }
    }
}

fn box_blur_v(src: &[f32], dst: &mut [f32], w: usize, h: usize, r: usize) {
    let d = (2 * r + 1) as f32;
    let mut prefix = vec![0.0f32; h + 1];
    for x in 0..w {
        for y in 0..h {
            prefix[y + 1] = prefix[y] + src[y * w + x];
        }
        for y in 0..h {
            let lo = y.saturating_sub(r);
            let hi = (y + r + 1).min(h);
            let before = r.saturating_sub(y) as f32 * src[x];
            let after = (y + r + 1).saturating_sub(h) as f32 * src[(h - 1) * w + x];
            dst[y * w + x] = (prefix[hi] - prefix[lo] + before + after) / d;
        }
    }
}

/// Deviations to bytes about the neutral 128.
fn quantize(field: &[f32]) -> Vec<u8> {
    field
        .iter()
        .map(|dev| (128.0 + dev).round().clamp(0.0, 255.0) as u8)
        .collect()
}

fn resize_gray(plane: Vec<u8>, from_w: u32, from_h: u32, to_w: u32, to_h: u32) -> Vec<u8> {
    if (from_w, from_h) == (to_w, to_h) {
        return plane;
    }
    let img = GrayImage::from_raw(from_w, from_h, plane).expect("plane matches its dimensions");
    imageops::resize(&img, to_w, to_h, FilterType::Lanczos3).into_raw()
}

fn resize_rgb(data: Vec<u8>, from_w: u32, from_h: u32, to_w: u32, to_h: u32) -> Vec<u8> {
    if (from_w, from_h) == (to_w, to_h) {
        return data;
    }
    let img = RgbImage::from_raw(from_w, from_h, data).expect("buffer matches its dimensions");
    imageops::resize(&img, to_w, to_h, FilterType::Lanczos3).into_raw()
}

/// Stretch the finished field's deviations about 128 to the nominal
/// spread. A degenerate flat field becomes uniformly neutral instead.
fn normalize_spread(mut data: Vec<u8>) -> Vec<u8> {
    let n = data.len() as f64;
    let mean = data.iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = data
        .iter()
        .map(|&v| {
            let dev = v as f64 - mean;
            dev * dev
        })
        .sum::<f64>()
        / n;
    let spread = variance.sqrt();

    if spread < 1e-6 {
        data.fill(128);
        return data;
    }

    let gain = NOMINAL_DEVIATION / spread;
    for v in &mut data {
        *v = (128.0 + (*v as f64 - mean) * gain).round().clamp(0.0, 255.0) as u8;
    }
    data
}
