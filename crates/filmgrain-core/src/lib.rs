//! Film grain synthesis and compositing.
//!
//! This crate generates deterministic, seed-controlled film-grain masks
//! and composites them onto photographs through a precomputed
//! tone-response lookup table.
//!
//! # Pipeline
//!
//! 1. Load the photograph and convert it to RGB.
//! 2. Optionally downscale it; grain clump size grows with the factor,
//!    because the grain is applied at the reduced size and enlarged with
//!    the image afterwards.
//! 3. Build the [`ToneMap`] for the gamma and grain-strength parameters.
//! 4. Obtain a [`GrainMask`] of matching dimensions through the
//!    [`MaskCache`], generating and persisting it on a miss.
//! 5. Map every pixel through the table, per channel or via luma.
//! 6. Scale back, optionally sharpen, save.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use filmgrain_core::{composite, CompositeOptions, GrainPreset, MaskCache};
//!
//! let options = CompositeOptions {
//!     preset: GrainPreset::Coarse,
//!     grain_power: 0.8,
//!     ..CompositeOptions::default()
//! };
//! let cache = MaskCache::new("/tmp/filmgrain-masks");
//! let summary = composite(
//!     Path::new("portrait.jpg"),
//!     Path::new("portrait-grain.png"),
//!     &options,
//!     &cache,
//! )
//! .unwrap();
//! println!("grained at {}x{}", summary.working_width, summary.working_height);
//! ```
//!
//! # Determinism
//!
//! - Same parameters + same seed = bit-identical masks
//! - PCG32 drives all random draws; per-channel sub-seeds come from BLAKE3
//! - Mask artifacts are PNG with fixed fast-compression settings

pub mod cache;
pub mod composite;
pub mod error;
pub mod grain;
pub mod mask;
pub mod mask_png;
pub mod preset;
pub mod rng;
pub mod tone;

// Re-export the main types for convenience
pub use cache::{CacheKey, CacheOutcome, CacheStatus, MaskCache, Saturation};
pub use composite::{apply_tone_map, composite, CompositeError, CompositeOptions, CompositeSummary};
pub use error::InvalidParameterError;
pub use grain::grain_gen;
pub use mask::{GrainMask, MaskKind};
pub use mask_png::{read_mask, write_mask, MaskPngError};
pub use preset::{GrainPreset, UnknownGrainTypeError};
pub use rng::DeterministicRng;
pub use tone::{ToneMap, NEUTRAL_GRAIN};
