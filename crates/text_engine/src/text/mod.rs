//! Single-style SDF text
//!
//! A [`FontAtlas`] describes the glyphs of one signed-distance-field font.
//! [`LayoutEngine`] places the characters of a string, [`QuadAssembler`]
//! turns the placed characters into a [`TextMesh`], and [`TextLabel`]
//! drives both as a component with dirty tracking.

pub mod chars;
pub mod font_atlas;
pub mod layout;
pub mod assembler;
pub mod mesh;
pub mod material;
pub mod label;

pub use font_atlas::{FontAtlas, FontError, FontResult, GlyphDef, GlyphKey};
pub use layout::{
    HorizontalAlign, LayoutEngine, LayoutParams, LetterInfo, Overflow, TextLayout, VerticalAlign, WrapMode,
};
pub use assembler::{ColorGradient, QuadAssembler, QuadColors};
pub use mesh::{TextMesh, TextVertex};
pub use material::{SdfFeatures, SdfUniform};
pub use label::{LabelConfig, LayoutObserver, LayoutPhase, TextLabel};
