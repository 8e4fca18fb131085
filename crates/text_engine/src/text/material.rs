//! SDF material parameters
//!
//! Face, outline, underlay and glow settings of the signed distance field
//! text shader. Only the parameter block and the shader defines it implies
//! live here; binding them to a GPU material is the renderer's job.

use std::collections::BTreeMap;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::foundation::color;
use crate::foundation::math::{Vec2, Vec4};

bitflags! {
    /// Optional shader passes enabled by a uniform block
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SdfFeatures: u32 {
        /// Outline pass
        const OUTLINE = 1 << 0;
        /// Drop shadow pass
        const UNDERLAY = 1 << 1;
        /// Glow pass
        const GLOW = 1 << 2;
    }
}

/// Uniform block of the SDF text material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdfUniform {
    /// Fill color
    pub face_color: Vec4,
    /// Distance threshold of the fill edge
    pub face_dilate: f32,
    /// Fill edge softness
    pub face_softness: f32,

    /// Enable the outline pass
    pub enable_outline: bool,
    /// Outline color
    pub outline_color: Vec4,
    /// Outline width in distance units
    pub outline_thickness: f32,

    /// Enable the underlay pass
    pub enable_underlay: bool,
    /// Underlay color
    pub underlay_color: Vec4,
    /// Underlay offset in -1..1
    pub underlay_offset: Vec2,
    /// Underlay threshold
    pub underlay_dilate: f32,
    /// Underlay softness
    pub underlay_softness: f32,

    /// Enable the glow pass
    pub enable_glow: bool,
    /// Glow color
    pub glow_color: Vec4,
    /// Glow offset
    pub glow_offset: f32,
    /// Glow falloff inside the glyph
    pub glow_inner: f32,
    /// Glow falloff outside the glyph
    pub glow_outer: f32,
    /// Glow intensity
    pub glow_power: f32,
}

impl Default for SdfUniform {
    fn default() -> Self {
        Self {
            face_color: color::WHITE,
            face_dilate: 0.5,
            face_softness: 0.01,
            enable_outline: false,
            outline_color: color::RED,
            outline_thickness: 0.1,
            enable_underlay: false,
            underlay_color: color::BLACK,
            underlay_offset: Vec2::zeros(),
            underlay_dilate: 0.5,
            underlay_softness: 0.1,
            enable_glow: false,
            glow_color: color::GREEN,
            glow_offset: 0.5,
            glow_inner: 0.01,
            glow_outer: 0.01,
            glow_power: 1.0,
        }
    }
}

impl SdfUniform {
    /// Enabled shader passes
    pub fn features(&self) -> SdfFeatures {
        let mut features = SdfFeatures::empty();
        features.set(SdfFeatures::OUTLINE, self.enable_outline);
        features.set(SdfFeatures::UNDERLAY, self.enable_underlay);
        features.set(SdfFeatures::GLOW, self.enable_glow);
        features
    }

    /// Shader defines for this block and `texture_count` atlas pages
    pub fn shader_defines(&self, texture_count: usize) -> BTreeMap<&'static str, bool> {
        let features = self.features();
        BTreeMap::from([
            ("USE_OUTLINE", features.contains(SdfFeatures::OUTLINE)),
            ("USE_UNDERLAY", features.contains(SdfFeatures::UNDERLAY)),
            ("USE_GLOW", features.contains(SdfFeatures::GLOW)),
            ("USE_TEXTURE_LEVEL_1", texture_count > 0),
            ("USE_TEXTURE_LEVEL_2", texture_count > 1),
            ("USE_TEXTURE_LEVEL_3", texture_count > 2),
            ("USE_TEXTURE_LEVEL_4", texture_count > 3),
        ])
    }
}
