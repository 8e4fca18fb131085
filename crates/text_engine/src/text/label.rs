//! Single-style text label
//!
//! [`TextLabel`] ties a [`LabelConfig`], a string and a shared
//! [`FontAtlas`] together and keeps the resulting mesh up to date. Every
//! property change marks the vertices dirty; [`TextLabel::update_render_data`]
//! relayouts only when something changed.
//!
//! # Re-entrancy
//!
//! Committing a new content size notifies a [`LayoutObserver`]. The host may
//! react by resizing or updating the same label synchronously; such nested
//! calls hit the `LayingOut` phase and return without doing anything.

use std::collections::BTreeMap;
use std::sync::Arc;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::foundation::color;
use crate::foundation::math::{Vec2, Vec3, Vec4};
use super::assembler::{self, ColorGradient, QuadAssembler, QuadColors};
use super::font_atlas::FontAtlas;
use super::layout::{
    HorizontalAlign, LayoutEngine, LayoutParams, LetterInfo, Overflow, VerticalAlign, WrapMode,
};
use super::material::SdfUniform;
use super::mesh::TextMesh;

/// Every property of a single-style label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Requested font size
    pub font_size: f32,
    /// Distance between baselines
    pub line_height: f32,
    /// Extra space between lines
    pub line_spacing: f32,
    /// Extra space after every glyph
    pub spacing_x: f32,
    /// Overflow policy
    pub overflow: Overflow,
    /// Wrapping for CLAMP and ELLIPSIS
    pub enable_wrap_text: bool,
    /// Line break granularity
    pub wrap_mode: WrapMode,
    /// Horizontal alignment
    pub horizontal_align: HorizontalAlign,
    /// Vertical alignment
    pub vertical_align: VerticalAlign,
    /// Shear glyphs
    pub italic: bool,
    /// Draw underline bars
    pub underline: bool,
    /// Underline offset at the nominal font size
    pub underline_offset: f32,
    /// Draw strikethrough bars
    pub strikethrough: bool,
    /// Strikethrough offset at the nominal font size
    pub strikethrough_offset: f32,
    /// Primary vertex colour
    pub color: Vec4,
    /// Whether `gradient` tints the extra colour channel
    pub color_gradient: bool,
    /// Anchor of the node, (0, 0) is bottom-left
    pub anchor: Vec2,
    /// Container size; replaced by the measured size after layout
    pub content_size: Vec2,
    /// Corner colours used when `color_gradient` is set
    pub gradient: ColorGradient,
    /// SDF material parameters
    pub sdf: SdfUniform,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            font_size: 32.0,
            line_height: 32.0,
            line_spacing: 0.0,
            spacing_x: 0.0,
            overflow: Overflow::None,
            enable_wrap_text: true,
            wrap_mode: WrapMode::Word,
            horizontal_align: HorizontalAlign::Left,
            vertical_align: VerticalAlign::Top,
            italic: false,
            underline: false,
            underline_offset: 0.0,
            strikethrough: false,
            strikethrough_offset: 0.0,
            color: color::WHITE,
            color_gradient: false,
            anchor: Vec2::new(0.5, 0.5),
            content_size: Vec2::zeros(),
            gradient: ColorGradient::default(),
            sdf: SdfUniform::default(),
        }
    }
}

impl Config for LabelConfig {}

impl LabelConfig {
    /// Layout inputs derived from this configuration
    pub fn layout_params(&self) -> LayoutParams {
        LayoutParams {
            font_size: self.font_size,
            line_height: self.line_height,
            line_spacing: self.line_spacing,
            spacing_x: self.spacing_x,
            overflow: self.overflow,
            enable_wrap_text: self.enable_wrap_text,
            wrap_mode: self.wrap_mode,
            horizontal_align: self.horizontal_align,
            vertical_align: self.vertical_align,
            content_size: self.content_size,
            anchor: self.anchor,
            italic: self.italic,
            underline: self.underline,
            underline_offset: self.underline_offset,
            strikethrough: self.strikethrough,
            strikethrough_offset: self.strikethrough_offset,
        }
    }

    fn active_gradient(&self) -> Option<&ColorGradient> {
        self.color_gradient.then_some(&self.gradient)
    }
}

/// Layout state of a label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutPhase {
    /// No layout in progress
    #[default]
    Idle,
    /// A layout pass is running; nested requests are ignored
    LayingOut,
}

/// Receives layout side effects from a label
pub trait LayoutObserver {
    /// The resolved content size differs from the previous one
    fn content_size_changed(&mut self, _label: &mut TextLabel, _size: Vec2) {}
}

impl LayoutObserver for () {}

/// Single-style text component
#[derive(Debug, Clone, Default)]
pub struct TextLabel {
    config: LabelConfig,
    string: String,
    font: Option<Arc<FontAtlas>>,
    letters: Vec<LetterInfo>,
    mesh: TextMesh,
    actual_font_size: f32,
    rich_text_delta_x: f32,
    number_of_lines: usize,
    vert_dirty: bool,
    phase: LayoutPhase,
}

impl TextLabel {
    /// Create a label with the given configuration
    pub fn new(config: LabelConfig) -> Self {
        Self {
            actual_font_size: config.font_size,
            config,
            vert_dirty: true,
            ..Self::default()
        }
    }

    /// Current configuration
    pub fn config(&self) -> &LabelConfig {
        &self.config
    }

    /// Mutable configuration access; marks the vertices dirty
    pub fn config_mut(&mut self) -> &mut LabelConfig {
        self.vert_dirty = true;
        &mut self.config
    }

    /// Displayed string
    pub fn string(&self) -> &str {
        &self.string
    }

    /// Replace the displayed string
    pub fn set_string(&mut self, string: impl Into<String>) {
        let string = string.into();
        if self.string != string {
            self.string = string;
            self.vert_dirty = true;
        }
    }

    /// Font atlas, if one is set
    pub fn font(&self) -> Option<&Arc<FontAtlas>> {
        self.font.as_ref()
    }

    /// Replace the font atlas
    pub fn set_font(&mut self, font: Arc<FontAtlas>) {
        self.font = Some(font);
        self.vert_dirty = true;
    }

    /// Resize the container
    pub fn set_content_size(&mut self, size: Vec2) {
        if self.config.content_size != size {
            self.config.content_size = size;
            self.vert_dirty = true;
        }
    }

    /// Move the anchor point
    pub fn set_anchor(&mut self, anchor: Vec2) {
        if self.config.anchor != anchor {
            self.config.anchor = anchor;
            self.vert_dirty = true;
        }
    }

    /// Mark the vertices for rebuild
    pub fn mark_dirty(&mut self) {
        self.vert_dirty = true;
    }

    /// Whether the vertices need a rebuild
    pub fn is_dirty(&self) -> bool {
        self.vert_dirty
    }

    /// Current layout phase
    pub fn phase(&self) -> LayoutPhase {
        self.phase
    }

    /// Relayout if dirty
    ///
    /// Returns whether a layout pass ran.
    pub fn update_render_data(&mut self) -> bool {
        self.update_render_data_with(&mut ())
    }

    /// Relayout if dirty, reporting content size changes to `observer`
    pub fn update_render_data_with(&mut self, observer: &mut dyn LayoutObserver) -> bool {
        if self.phase == LayoutPhase::LayingOut {
            log::trace!("Ignoring nested layout request");
            return false;
        }
        if !self.vert_dirty {
            return false;
        }
        let Some(font) = self.font.clone() else {
            return false;
        };

        self.phase = LayoutPhase::LayingOut;

        let params = self.config.layout_params();
        let mut layout = LayoutEngine::layout(&font, &self.string, &params);
        let colors = QuadColors {
            color: self.config.color,
            gradient: self.config.active_gradient().copied(),
        };
        self.mesh = QuadAssembler::assemble(&font, &mut layout, &params, &colors);

        self.actual_font_size = layout.font_size;
        self.rich_text_delta_x = layout.rich_text_delta_x;
        self.number_of_lines = layout.number_of_lines;
        self.letters = layout.letters;

        let size_changed = self.config.content_size != layout.content_size;
        self.config.content_size = layout.content_size;
        self.vert_dirty = false;

        if size_changed {
            observer.content_size_changed(self, layout.content_size);
        }

        self.phase = LayoutPhase::Idle;
        true
    }

    /// Recolour every vertex without relayout
    pub fn update_color(&mut self, color: Vec4) {
        self.config.color = color;
        self.mesh.set_color(color);
    }

    /// Enable, replace or disable the corner gradient without relayout
    pub fn set_color_gradient(&mut self, gradient: Option<ColorGradient>) {
        self.config.color_gradient = gradient.is_some();
        if let Some(gradient) = gradient {
            self.config.gradient = gradient;
        }
        assembler::update_color_extra(&self.letters, &mut self.mesh, self.config.active_gradient());
    }

    /// Resolved content size
    pub fn content_size(&self) -> Vec2 {
        self.config.content_size
    }

    /// Font size after shrink-to-fit
    pub fn actual_font_size(&self) -> f32 {
        self.actual_font_size
    }

    /// Cursor advance beyond the last visible glyph
    pub fn rich_text_delta_x(&self) -> f32 {
        self.rich_text_delta_x
    }

    /// Line count of the last layout
    pub fn number_of_lines(&self) -> usize {
        self.number_of_lines
    }

    /// Letters of the last layout
    pub fn letters(&self) -> &[LetterInfo] {
        &self.letters
    }

    /// Current mesh
    pub fn mesh(&self) -> &TextMesh {
        &self.mesh
    }

    /// Shader defines for the SDF material of this label
    pub fn shader_defines(&self) -> BTreeMap<&'static str, bool> {
        let pages = self.font.as_ref().map_or(0, |font| font.texture_count());
        self.config.sdf.shader_defines(pages)
    }

    /// Whether a character is drawn and not hidden
    pub fn is_visible(&self, index: usize) -> bool {
        assembler::is_visible(&self.letters, index)
    }

    /// Show or hide one character
    pub fn set_visible(&mut self, index: usize, visible: bool) {
        assembler::set_visible(&mut self.letters, &mut self.mesh, index, visible, self.config.active_gradient());
    }

    /// Extra colours of a character in `[LB, RB, LT, RT]` order
    pub fn color_extra_vertices(&self, index: usize) -> Option<[Vec4; 4]> {
        assembler::color_extra_vertices(&self.letters, &self.mesh, index)
    }

    /// Overwrite the extra colours of a character
    pub fn set_color_extra_vertices(&mut self, index: usize, colors: [Vec4; 4]) {
        assembler::set_color_extra_vertices(&self.letters, &mut self.mesh, index, colors);
    }

    /// Corner positions of a character in `[LB, RB, LT, RT]` order
    pub fn pos_vertices(&self, index: usize) -> Option<[Vec3; 4]> {
        assembler::pos_vertices(&self.letters, &self.mesh, index)
    }

    /// Overwrite the corner positions of a character
    pub fn set_pos_vertices(&mut self, index: usize, positions: [Vec3; 4]) {
        assembler::set_pos_vertices(&self.letters, &mut self.mesh, index, positions);
    }
}
