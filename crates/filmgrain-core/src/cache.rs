//! Grain mask cache.
//!
//! One PNG artifact per parameter combination, so repeated runs against
//! the same geometry reuse the mask instead of regenerating it. A stored
//! artifact is the exact generator output for its key; entries live until
//! something external evicts them.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use crate::error::InvalidParameterError;
use crate::grain;
use crate::mask::{GrainMask, MaskKind};
use crate::mask_png::{self, MaskPngError};

/// Saturation component of a cache key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Saturation {
    /// Single-channel mask.
    Grayscale,
    /// Color mask with the given saturation.
    Color(f32),
}

impl Saturation {
    /// Value handed to the generator; negative selects grayscale there.
    fn generator_value(self) -> f32 {
        match self {
            Saturation::Grayscale => -1.0,
            Saturation::Color(sat) => sat,
        }
    }

    fn mask_kind(self) -> MaskKind {
        match self {
            Saturation::Grayscale => MaskKind::Gray,
            Saturation::Color(_) => MaskKind::Rgb,
        }
    }
}

impl fmt::Display for Saturation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Saturation::Grayscale => write!(f, "BW"),
            Saturation::Color(sat) => write!(f, "{sat}"),
        }
    }
}

/// Identifies one grain mask.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheKey {
    pub width: u32,
    pub height: u32,
    pub saturation: Saturation,
    pub grain_size: f32,
    pub grain_gauss: f32,
    pub seed: u32,
}

impl CacheKey {
    /// Artifact filename for this key.
    pub fn file_name(&self) -> String {
        format!(
            "grain-{}-{}-{}-{}-{}-{}.png",
            self.width, self.height, self.saturation, self.grain_size, self.grain_gauss, self.seed
        )
    }
}

/// How a fetched mask was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheStatus {
    /// Decoded from an existing artifact.
    Hit,
    /// Freshly generated and persisted.
    Generated,
    /// Freshly generated; persisting failed for the attached reason.
    GeneratedUnsaved(String),
}

/// A fetched mask together with how it was obtained.
#[derive(Debug)]
pub struct CacheOutcome {
    pub mask: GrainMask,
    pub status: CacheStatus,
}

/// Persistent mask store rooted at an injected directory.
pub struct MaskCache {
    root: PathBuf,
}

impl MaskCache {
    /// Cache rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Platform default root.
    pub fn default_root() -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| dir.join("filmgrain").join("masks"))
    }

    /// The injected root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the artifact for `key`.
    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.file_name())
    }

    /// Return the mask for `key`, generating and persisting it on a miss.
    ///
    /// An unreadable artifact, or one whose shape contradicts the key,
    /// counts as a miss and is overwritten. Failing to persist is not
    /// fatal: the generated mask is returned with the reason attached.
    pub fn fetch(&self, key: &CacheKey) -> Result<CacheOutcome, InvalidParameterError> {
        let path = self.entry_path(key);

        if path.is_file() {
            if let Ok(mask) = mask_png::read_mask(&path) {
                if mask.width() == key.width
                    && mask.height() == key.height
                    && mask.kind() == key.saturation.mask_kind()
                {
                    return Ok(CacheOutcome {
                        mask,
                        status: CacheStatus::Hit,
                    });
                }
            }
            // Corrupt or mismatched entry: fall through and overwrite.
        }

        let mask = grain::grain_gen(
            key.width,
            key.height,
            key.grain_size,
            key.grain_gauss,
            key.saturation.generator_value(),
            key.seed,
        )?;

        let status = match self.persist(&path, &mask) {
            Ok(()) => CacheStatus::Generated,
            Err(err) => CacheStatus::GeneratedUnsaved(err.to_string()),
        };

        Ok(CacheOutcome { mask, status })
    }

    // Writes go through a process-unique sibling and a rename, so a
    // concurrent reader of the same key never maps a partial artifact.
    fn persist(&self, path: &Path, mask: &GrainMask) -> Result<(), MaskPngError> {
        fs::create_dir_all(&self.root)?;
        let tmp = path.with_extension(format!("png.tmp{}", process::id()));
        mask_png::write_mask(&tmp, mask)?;
        fs::rename(&tmp, path).map_err(|err| {
            let _ = fs::remove_file(&tmp);
            MaskPngError::from(err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_encodes_every_key_component() {
        let key = CacheKey {
            width: 640,
            height: 480,
            saturation: Saturation::Grayscale,
            grain_size: 1.5,
            grain_gauss: 50.0,
            seed: 7,
        };
        assert_eq!(key.file_name(), "grain-640-480-BW-1.5-50-7.png");

        let key = CacheKey {
            saturation: Saturation::Color(0.5),
            grain_size: 0.8,
            grain_gauss: 63.0,
            ..key
        };
        assert_eq!(key.file_name(), "grain-640-480-0.5-0.8-63-7.png");
    }

    #[test]
    fn distinct_keys_get_distinct_file_names() {
        let base = CacheKey {
            width: 64,
            height: 64,
            saturation: Saturation::Color(1.0),
            grain_size: 1.0,
            grain_gauss: 45.0,
            seed: 1,
        };
        let other_seed = CacheKey { seed: 2, ..base.clone() };
        let gray = CacheKey {
            saturation: Saturation::Grayscale,
            ..base.clone()
        };
        assert_ne!(base.file_name(), other_seed.file_name());
        assert_ne!(base.file_name(), gray.file_name());
    }
}
