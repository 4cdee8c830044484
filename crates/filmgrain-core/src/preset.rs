//! Grain-type presets.
//!
//! Each preset pairs a spatial scale factor for the noise field with a
//! smoothing strength. The pairs were tuned together so that differently
//! sized grain ends up with a comparable spread in the finished mask.

use thiserror::Error;

/// Raised for a grain-type id outside the known presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown grain type: {0} (expected 1-4)")]
pub struct UnknownGrainTypeError(pub u8);

/// A named grain texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrainPreset {
    /// Fine grain with visible texture.
    Fine,
    /// Plainer fine grain.
    FineSimple,
    /// Coarse grain.
    Coarse,
    /// Coarser grain.
    Coarser,
}

/// `(id, grain_size, grain_gauss)` per preset, in variant order.
const PRESET_TABLE: [(u8, f32, f32); 4] = [
    (1, 0.8, 63.0),
    (2, 1.0, 45.0),
    (3, 1.5, 50.0),
    (4, 1.6666, 50.0),
];

impl GrainPreset {
    /// Every preset, in id order.
    pub const ALL: [GrainPreset; 4] = [
        GrainPreset::Fine,
        GrainPreset::FineSimple,
        GrainPreset::Coarse,
        GrainPreset::Coarser,
    ];

    #[inline]
    fn row(self) -> (u8, f32, f32) {
        PRESET_TABLE[self as usize]
    }

    /// Numeric id as exposed on the command line.
    pub fn id(self) -> u8 {
        self.row().0
    }

    /// Spatial scale of grain clumps; larger means coarser.
    pub fn grain_size(self) -> f32 {
        self.row().1
    }

    /// Smoothing strength for the raw noise field.
    pub fn grain_gauss(self) -> f32 {
        self.row().2
    }

    /// Human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            GrainPreset::Fine => "fine",
            GrainPreset::FineSimple => "fine simple",
            GrainPreset::Coarse => "coarse",
            GrainPreset::Coarser => "coarser",
        }
    }
}

impl TryFrom<u8> for GrainPreset {
    type Error = UnknownGrainTypeError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|preset| preset.id() == id)
            .ok_or(UnknownGrainTypeError(id))
    }
}
