//! Single-style text layout
//!
//! Positions every character of one string against a [`FontAtlas`]: line
//! breaking, overflow policy, shrink-to-fit and alignment. The result is a
//! [`TextLayout`] holding one [`LetterInfo`] per processed character plus
//! the line metrics the quad assembler needs.
//!
//! # Coordinate System
//!
//! - Origin is the top-left of the first line
//! - +X points right, +Y points up, so lines move towards negative Y
//! - Glyph `offset_y` values come from the atlas with +Y down and are
//!   subtracted
//!
//! # Example
//!
//! ```no_run
//! use text_engine::text::{FontAtlas, LayoutEngine, LayoutParams, Overflow};
//! use text_engine::foundation::math::Vec2;
//!
//! let atlas = FontAtlas::load("resources/fonts/body.json")?;
//! let params = LayoutParams {
//!     overflow: Overflow::ResizeHeight,
//!     content_size: Vec2::new(200.0, 0.0),
//!     ..LayoutParams::default()
//! };
//! let layout = LayoutEngine::layout(&atlas, "Hello wrapped world", &params);
//! println!("{} lines", layout.number_of_lines);
//! # Ok::<(), text_engine::text::FontError>(())
//! ```

use std::collections::HashSet;
use serde::{Deserialize, Serialize};

use crate::foundation::math::{rotate_degrees, round2, Vec2};
use super::chars::{is_unicode_cjk, is_unicode_space};
use super::font_atlas::{FontAtlas, GlyphDef, GlyphKey};

/// Italic shear angle in degrees
pub const ITALIC_DEGREES: f32 = 15.0;

/// Glyph used for underline and strikethrough bars
pub const UNDERLINE_CHAR: char = '_';

/// Glyph repeated to form the ellipsis
pub const ELLIPSIS_CHAR: char = '.';

/// Number of ellipsis glyphs appended on truncation
pub const ELLIPSIS_COUNT: usize = 3;

/// What happens when text does not fit its container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Overflow {
    /// Container grows to fit, no wrapping
    #[default]
    None,
    /// Glyphs are clipped against the container edges
    Clamp,
    /// The last visible line is truncated with "..."
    Ellipsis,
    /// Font size is reduced until the text fits
    Shrink,
    /// Width is fixed, height grows with the wrapped text
    ResizeHeight,
}

/// Horizontal alignment of lines within the container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HorizontalAlign {
    /// Lines start at the left edge
    #[default]
    Left,
    /// Lines are centered
    Center,
    /// Lines end at the right edge
    Right,
}

impl HorizontalAlign {
    /// Alignment as a factor of half widths (0, 1, 2)
    pub const fn factor(self) -> f32 {
        match self {
            Self::Left => 0.0,
            Self::Center => 1.0,
            Self::Right => 2.0,
        }
    }
}

/// Vertical alignment of the text block within the container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VerticalAlign {
    /// Text block hangs from the top edge
    #[default]
    Top,
    /// Text block is centered
    Center,
    /// Text block sits on the bottom edge
    Bottom,
}

/// Granularity of automatic line breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WrapMode {
    /// Words move to the next line as a whole
    #[default]
    Word,
    /// Lines may break between any two characters
    Char,
}

/// Inputs of one layout pass
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutParams {
    /// Requested font size in pixels
    pub font_size: f32,
    /// Distance between baselines
    pub line_height: f32,
    /// Extra space added between lines
    pub line_spacing: f32,
    /// Extra space added after every glyph
    pub spacing_x: f32,
    /// Overflow policy
    pub overflow: Overflow,
    /// Whether wrapping is enabled for CLAMP and ELLIPSIS
    pub enable_wrap_text: bool,
    /// Line break granularity
    pub wrap_mode: WrapMode,
    /// Horizontal alignment
    pub horizontal_align: HorizontalAlign,
    /// Vertical alignment
    pub vertical_align: VerticalAlign,
    /// Container size
    pub content_size: Vec2,
    /// Anchor point of the container, (0, 0) is bottom-left
    pub anchor: Vec2,
    /// Shear glyphs by [`ITALIC_DEGREES`]
    pub italic: bool,
    /// Draw underline bars
    pub underline: bool,
    /// Underline offset at the nominal font size
    pub underline_offset: f32,
    /// Draw strikethrough bars
    pub strikethrough: bool,
    /// Strikethrough offset at the nominal font size
    pub strikethrough_offset: f32,
}

impl Default for LayoutParams {
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
            content_size: Vec2::zeros(),
            anchor: Vec2::new(0.5, 0.5),
            italic: false,
            underline: false,
            underline_offset: 0.0,
            strikethrough: false,
            strikethrough_offset: 0.0,
        }
    }
}

/// Per-character layout record
///
/// Indices match the processed string one to one. Ellipsis truncation
/// removes the trailing slots it replaced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterInfo {
    /// Source character
    pub ch: char,
    /// Glyph key used for the lookup
    pub key: GlyphKey,
    /// Pen position, before alignment
    pub x: f32,
    /// Glyph top, before alignment
    pub y: f32,
    /// Zero-based line index
    pub line: usize,
    /// Whether this slot draws a glyph
    pub valid: bool,
    /// Visibility toggled through the query API
    pub visible: bool,
    /// Index among emitted quads, if the glyph produced one
    pub quads_index: Option<usize>,
}

impl LetterInfo {
    fn placeholder(ch: char, key: GlyphKey, x: f32, y: f32, line: usize) -> Self {
        Self { ch, key, x, y, line, valid: false, visible: true, quads_index: None }
    }
}

/// Result of one layout pass
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextLayout {
    /// One record per processed character
    pub letters: Vec<LetterInfo>,
    /// Right edge of every line
    pub lines_width: Vec<f32>,
    /// Horizontal alignment offset of every line
    pub lines_offset_x: Vec<f32>,
    /// Vertical offset applied to every glyph
    pub letter_offset_y: f32,
    /// Resolved content size
    pub content_size: Vec2,
    /// Fixed container width, 0 when measured
    pub label_width: f32,
    /// Fixed container height, 0 when measured
    pub label_height: f32,
    /// Upper clip bound for CLAMP
    pub tailored_top_y: f32,
    /// Lower clip bound for CLAMP
    pub tailored_bottom_y: f32,
    /// `font_size / origin_font_size` after shrinking
    pub scale: f32,
    /// Effective font size after shrinking
    pub font_size: f32,
    /// Nominal size of the atlas
    pub origin_font_size: f32,
    /// Number of lines
    pub number_of_lines: usize,
    /// Height the text needs
    pub text_desired_height: f32,
    /// Cursor advance minus the last visible right edge
    pub rich_text_delta_x: f32,
}

/// Italic shear vector for a glyph of the given scaled height
pub fn italic_vector(height: f32) -> Vec2 {
    rotate_degrees(Vec2::new(0.0, height / 2.0), ITALIC_DEGREES)
}

/// Per-call layout context
///
/// All mutable state of a pass lives here so that layouts never share
/// scratch data.
pub struct LayoutEngine<'a> {
    atlas: &'a FontAtlas,
    params: &'a LayoutParams,
    chars: Vec<char>,

    scale: f32,
    font_size: f32,
    origin_font_size: f32,
    is_wrap_text: bool,
    label_width: f32,
    label_height: f32,
    max_line_width: f32,
    content_size: Vec2,
    ellipsis: Option<GlyphDef>,
    ellipsis_width: f32,

    letters: Vec<LetterInfo>,
    lines_width: Vec<f32>,
    number_of_lines: usize,
    text_desired_height: f32,
    tailored_top_y: f32,
    tailored_bottom_y: f32,
    rich_text_delta_x: f32,

    reported_missing: HashSet<char>,
}

impl<'a> LayoutEngine<'a> {
    /// Lay out `text` with one style
    ///
    /// # Arguments
    ///
    /// * `atlas` - Glyph metrics
    /// * `text` - String to position; `\n` starts a new line
    /// * `params` - Style and container
    pub fn layout(atlas: &'a FontAtlas, text: &str, params: &'a LayoutParams) -> TextLayout {
        let mut engine = Self::new(atlas, text, params);
        engine.align_text();
        engine.finish()
    }

    fn new(atlas: &'a FontAtlas, text: &str, params: &'a LayoutParams) -> Self {
        let origin_font_size = atlas.origin_font_size();
        let scale = params.font_size / origin_font_size;

        let is_wrap_text = match params.overflow {
            Overflow::None | Overflow::Shrink => false,
            Overflow::ResizeHeight => true,
            Overflow::Clamp | Overflow::Ellipsis => params.enable_wrap_text,
        };

        let mut content_size = params.content_size;
        let (label_width, label_height) = match params.overflow {
            Overflow::None => (0.0, 0.0),
            Overflow::ResizeHeight => (content_size.x, 0.0),
            _ => (content_size.x, content_size.y),
        };

        // Sheared glyphs reach further sideways and less far vertically
        if params.italic {
            let iv = italic_vector(content_size.y);
            content_size.x += iv.x.abs() * 2.0;
            content_size.y -= (content_size.y / 2.0 - iv.y).abs() * 2.0;
        }

        let mut engine = Self {
            atlas,
            params,
            chars: text.chars().collect(),
            scale,
            font_size: params.font_size,
            origin_font_size,
            is_wrap_text,
            label_width,
            label_height,
            max_line_width: label_width,
            content_size,
            ellipsis: None,
            ellipsis_width: 0.0,
            letters: Vec::new(),
            lines_width: Vec::new(),
            number_of_lines: 0,
            text_desired_height: 0.0,
            tailored_top_y: 0.0,
            tailored_bottom_y: 0.0,
            rich_text_delta_x: 0.0,
            reported_missing: HashSet::new(),
        };

        if params.overflow == Overflow::Ellipsis {
            match atlas.glyph(ELLIPSIS_CHAR) {
                Some(def) => {
                    engine.ellipsis = Some(*def);
                    engine.ellipsis_width = (def.x_advance * scale + params.spacing_x) * ELLIPSIS_COUNT as f32;
                }
                None => log::warn!("Ellipsis glyph '{ELLIPSIS_CHAR}' missing from font atlas, truncation disabled"),
            }
        }

        engine
    }

    fn font_scale(&self) -> f32 {
        if self.params.overflow == Overflow::Shrink {
            self.scale
        } else {
            1.0
        }
    }

    fn align_text(&mut self) {
        self.wrap_pass();

        if self.params.overflow == Overflow::Shrink && self.font_size > 0.0 {
            self.shrink_to_fit();
        }

        // Alignment offsets are computed by finish()
    }

    /// Reduce the scale so the text fits, then lay out exactly once more
    fn shrink_to_fit(&mut self) {
        let mut scale_height = self.scale;
        let mut scale_width = self.scale;
        let mut need_reset = false;

        if self.text_desired_height > self.content_size.y {
            scale_height = (self.content_size.y / self.text_desired_height) * self.scale;
            need_reset = true;
        }

        let max_width = self.lines_width.iter().copied().fold(0.0_f32, f32::max);
        if max_width > self.content_size.x {
            scale_width = (self.content_size.x / max_width) * self.scale;
            need_reset = true;
        }

        self.scale = scale_height.min(scale_width);

        if need_reset {
            self.font_size = self.scale * self.origin_font_size;
            log::debug!("Shrinking text to font size {:.2}", self.font_size);
            self.wrap_pass();
        }
    }

    fn wrap_pass(&mut self) {
        self.letters.clear();
        self.lines_width.clear();

        let scale = self.scale;
        let spacing_x = self.params.spacing_x;
        let italic = self.params.italic;
        let line_advance = self.params.line_height * self.font_scale() + self.params.line_spacing;
        let ellipsis_max_lines = self
            .ellipsis
            .map(|_| (self.content_size.y / self.params.line_height).floor().max(1.0) as usize);

        let text_len = self.chars.len();
        let mut line_index = 0;
        let mut next_token_x = 0.0_f32;
        let mut next_token_y = 0.0_f32;
        let mut longest_line = 0.0_f32;
        let mut letter_right = 0.0_f32;
        let mut highest_y = 0.0_f32;
        let mut lowest_y = 0.0_f32;

        let mut index = 0;
        'text: while index < text_len {
            let ch = self.chars[index];
            if ch == '\n' {
                if let (Some(def), Some(max_lines)) = (self.ellipsis, ellipsis_max_lines) {
                    if line_index + 1 >= max_lines {
                        letter_right = self.record_ellipsis(def, next_token_y, line_index);
                        break;
                    }
                }

                self.lines_width.push(letter_right);
                letter_right = 0.0;
                line_index += 1;
                next_token_x = 0.0;
                next_token_y -= line_advance;
                self.record_placeholder(index, ch, 0.0, next_token_y, line_index);
                index += 1;
                continue;
            }

            let token_len = match self.params.wrap_mode {
                WrapMode::Word => self.first_word_len(index),
                WrapMode::Char => 1,
            };
            let mut token_highest_y = highest_y;
            let mut token_lowest_y = lowest_y;
            let mut token_right = letter_right;
            let mut next_letter_x = next_token_x;

            for letter_index in index..index + token_len {
                let ch = self.chars[letter_index];
                if ch == '\r' {
                    self.record_placeholder(letter_index, ch, next_letter_x, next_token_y, line_index);
                    continue;
                }
                let Some(def) = self.atlas.glyph(ch).copied() else {
                    self.report_missing(ch);
                    self.record_placeholder(letter_index, ch, next_letter_x, next_token_y, line_index);
                    continue;
                };

                let mut letter_x = next_letter_x + def.offset_x * scale;
                if italic {
                    letter_x += italic_vector(def.h * scale).x.abs();
                }
                let right_edge = letter_x + (def.x_advance - def.offset_x) * scale;

                if let (Some(ellipsis), Some(max_lines)) = (self.ellipsis, ellipsis_max_lines) {
                    if right_edge > self.max_line_width && (!self.is_wrap_text || line_index + 1 >= max_lines) {
                        letter_right = self.record_ellipsis(ellipsis, next_token_y, line_index);
                        break 'text;
                    }
                }

                if self.is_wrap_text
                    && self.max_line_width > 0.0
                    && next_token_x > 0.0
                    && right_edge > self.max_line_width
                    && !is_unicode_space(ch)
                {
                    // Restart the whole token on a fresh line
                    self.lines_width.push(letter_right);
                    letter_right = 0.0;
                    line_index += 1;
                    next_token_x = 0.0;
                    next_token_y -= line_advance;
                    continue 'text;
                }

                let letter_y = next_token_y - def.offset_y * scale;
                self.record_letter(letter_index, ch, letter_x, letter_y, line_index, def.valid);

                next_letter_x += def.x_advance * scale + spacing_x;

                token_right = next_letter_x;
                if italic {
                    token_right += italic_vector(def.h * scale).x.abs();
                }

                token_highest_y = token_highest_y.max(letter_y);
                token_lowest_y = token_lowest_y.min(letter_y - def.h * scale);
            }

            next_token_x = next_letter_x;
            letter_right = token_right;
            highest_y = highest_y.max(token_highest_y);
            lowest_y = lowest_y.min(token_lowest_y);
            longest_line = longest_line.max(letter_right);

            index += token_len;
        }

        self.lines_width.push(letter_right);

        self.number_of_lines = line_index + 1;
        let lines = self.number_of_lines as f32;
        self.text_desired_height = lines * self.params.line_height * self.font_scale();
        if self.number_of_lines > 1 {
            self.text_desired_height += (lines - 1.0) * self.params.line_spacing;
        }

        self.content_size.x = if self.label_width > 0.0 { self.label_width } else { round2(longest_line) };
        self.content_size.y = if self.label_height > 0.0 {
            self.label_height
        } else {
            round2(self.text_desired_height)
        };

        self.tailored_top_y = self.content_size.y;
        self.tailored_bottom_y = 0.0;
        if self.params.overflow != Overflow::Clamp {
            if highest_y > 0.0 {
                self.tailored_top_y = self.content_size.y + highest_y;
            }
            if lowest_y < -self.text_desired_height {
                self.tailored_bottom_y = self.text_desired_height + lowest_y;
            }
        }

        self.rich_text_delta_x = next_token_x - letter_right;
    }

    /// Length of the token starting at `start`
    ///
    /// CJK, whitespace and `\n` are single-character tokens. A word stops
    /// before the character that would overflow the line, before a missing
    /// glyph, or after a space or CJK character.
    fn first_word_len(&self, start: usize) -> usize {
        let ch = self.chars[start];
        if is_unicode_cjk(ch) || ch == '\n' || is_unicode_space(ch) {
            return 1;
        }

        let mut len = 1;
        let Some(def) = self.atlas.glyph(ch) else {
            return len;
        };
        let scale = self.scale;
        let spacing_x = self.params.spacing_x;
        let mut next_letter_x = def.x_advance * scale + spacing_x;

        for &ch in &self.chars[start + 1..] {
            let Some(def) = self.atlas.glyph(ch) else {
                break;
            };
            let letter_x = next_letter_x + def.offset_x * scale;

            if letter_x + (def.x_advance - def.offset_x) * scale > self.max_line_width
                && !is_unicode_space(ch)
                && self.max_line_width > 0.0
            {
                return len;
            }
            next_letter_x += def.x_advance * scale + spacing_x;
            if ch == '\n' || is_unicode_space(ch) || is_unicode_cjk(ch) {
                break;
            }
            len += 1;
        }

        len
    }

    /// Pop glyphs until the ellipsis fits, then append it
    ///
    /// Returns the right edge of the truncated line.
    fn record_ellipsis(&mut self, ellipsis: GlyphDef, next_token_y: f32, line_index: usize) -> f32 {
        let scale = self.scale;
        let spacing_x = self.params.spacing_x;

        let mut next_x = 0.0;
        while let Some(last) = self.letters.last() {
            let (w, x_advance, offset_x) = self
                .atlas
                .glyph_by_key(last.key)
                .map_or((0.0, 0.0, 0.0), |def| (def.w, def.x_advance, def.offset_x));
            let last_right_x = last.x + w * scale;
            next_x = last.x + (x_advance - offset_x) * scale + spacing_x;
            if self.max_line_width >= last_right_x + self.ellipsis_width {
                break;
            }
            self.letters.pop();
        }
        if self.letters.is_empty() {
            next_x = 0.0;
        }

        let y = next_token_y - ellipsis.offset_y * scale;
        let mut right = 0.0;
        for _ in 0..ELLIPSIS_COUNT {
            let x = next_x + ellipsis.offset_x * scale;
            let index = self.letters.len();
            self.record_letter(index, ELLIPSIS_CHAR, x, y, line_index, ellipsis.valid);
            right = x + (ellipsis.x_advance - ellipsis.offset_x) * scale + spacing_x;
            next_x += ellipsis.x_advance * scale + spacing_x;
        }
        right
    }

    fn record_letter(&mut self, index: usize, ch: char, x: f32, y: f32, line: usize, valid: bool) {
        self.letters.truncate(index);
        self.letters.push(LetterInfo {
            ch,
            key: self.atlas.key_for(ch),
            x,
            y,
            line,
            valid,
            visible: true,
            quads_index: None,
        });
    }

    fn record_placeholder(&mut self, index: usize, ch: char, x: f32, y: f32, line: usize) {
        self.letters.truncate(index);
        self.letters.push(LetterInfo::placeholder(ch, self.atlas.key_for(ch), x, y, line));
    }

    fn report_missing(&mut self, ch: char) {
        if self.reported_missing.insert(ch) {
            log::warn!("Can't find letter definition in font atlas. letter: {ch:?}");
        }
    }

    fn finish(self) -> TextLayout {
        let lines_offset_x = match self.params.horizontal_align {
            HorizontalAlign::Left => vec![0.0; self.number_of_lines],
            HorizontalAlign::Center => self
                .lines_width
                .iter()
                .map(|width| (self.content_size.x - width) / 2.0)
                .collect(),
            HorizontalAlign::Right => self.lines_width.iter().map(|width| self.content_size.x - width).collect(),
        };

        let mut letter_offset_y = self.content_size.y;
        if self.params.vertical_align != VerticalAlign::Top {
            let blank = self.content_size.y - self.text_desired_height
                + self.params.line_height * self.font_scale()
                - self.origin_font_size * self.scale;
            if self.params.vertical_align == VerticalAlign::Bottom {
                letter_offset_y -= blank;
            } else {
                letter_offset_y -= blank / 2.0;
            }
        }

        TextLayout {
            letters: self.letters,
            lines_width: self.lines_width,
            lines_offset_x,
            letter_offset_y,
            content_size: self.content_size,
            label_width: self.label_width,
            label_height: self.label_height,
            tailored_top_y: self.tailored_top_y,
            tailored_bottom_y: self.tailored_bottom_y,
            scale: self.scale,
            font_size: self.font_size,
            origin_font_size: self.origin_font_size,
            number_of_lines: self.number_of_lines,
            text_desired_height: self.text_desired_height,
            rich_text_delta_x: self.rich_text_delta_x,
        }
    }
}

impl TextLayout {
    /// Letter at a character index
    pub fn letter(&self, index: usize) -> Option<&LetterInfo> {
        self.letters.get(index)
    }

    /// Alignment offset of a line, 0 for unknown lines
    pub fn line_offset_x(&self, line: usize) -> f32 {
        self.lines_offset_x.get(line).copied().unwrap_or(0.0)
    }
}
