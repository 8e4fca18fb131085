//! Rich text composition
//!
//! [`RichTextComposer`] turns a marked-up string into a list of placed
//! [`Segment`]s. Each text segment is a single-style [`TextLabel`]; inline
//! images become sprite placeholders. Composition runs in two passes:
//!
//! 1. **Line building** walks the parsed runs, measures text with a scratch
//!    label, wraps at `max_width` and assigns every segment its line.
//! 2. **Placement** positions the segments from the per-line widths, the
//!    horizontal alignment and the anchor.
//!
//! Changing only colours or other non-geometric style attributes skips
//! line building and re-applies the styles to the existing segments.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::foundation::color;
use crate::foundation::math::Vec2;
use crate::text::chars::{is_unicode_cjk, is_unicode_space};
use crate::text::{FontAtlas, HorizontalAlign, Overflow, TextLabel, VerticalAlign};
use super::fragment::{fragment_text, split_approximately};
use super::image_atlas::SpriteAtlas;
use super::markup::{ClickEvent, ImageAlign, MarkupParser, Run, StyleFrame};
use super::segment::{Segment, SegmentPool};

/// Extra height below the last baseline, as a fraction of the line height
pub const BASELINE_RATIO: f32 = 0.26;

/// Warning code reported when an inline image cannot be resolved
pub const MISSING_SPRITE_WARNING: u32 = 4400;

/// Properties of a rich text block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RichTextConfig {
    /// Font size of runs without a `<size>` tag
    pub font_size: f32,
    /// Distance between baselines
    pub line_height: f32,
    /// Wrap width; 0 disables wrapping
    pub max_width: f32,
    /// Horizontal alignment of every line
    pub horizontal_align: HorizontalAlign,
    /// Vertical alignment handed to each text segment
    pub vertical_align: VerticalAlign,
    /// Whether click handlers respond to hit tests
    pub handle_touch_event: bool,
    /// Pivot of the block, (0, 0) bottom-left to (1, 1) top-right
    pub anchor: Vec2,
}

impl Default for RichTextConfig {
    fn default() -> Self {
        Self {
            font_size: 32.0,
            line_height: 32.0,
            max_width: 0.0,
            horizontal_align: HorizontalAlign::Left,
            vertical_align: VerticalAlign::Top,
            handle_touch_event: true,
            anchor: Vec2::new(0.5, 0.5),
        }
    }
}

impl Config for RichTextConfig {}

impl RichTextConfig {
    /// Whether switching from `self` to `other` needs new line breaks
    fn layout_differs(&self, other: &Self) -> bool {
        self.font_size != other.font_size
            || self.line_height != other.line_height
            || self.max_width != other.max_width
            || self.horizontal_align != other.horizontal_align
            || self.vertical_align != other.vertical_align
    }
}

/// Whether a style on its own changes geometry
fn style_affects_layout(style: &StyleFrame) -> bool {
    style.size.is_some() || style.italic == Some(true) || style.is_image() || style.outline.is_some()
}

/// Whether new runs can reuse the current segments
fn needs_relayout(old: &[Run], new: &[Run]) -> bool {
    if old.len() != new.len() {
        return true;
    }

    old.iter().zip(new).any(|(old, new)| {
        if old.text != new.text {
            return true;
        }
        match (&old.style, &new.style) {
            (Some(old), Some(new)) => {
                old.outline.is_some() != new.outline.is_some()
                    || old.size != new.size
                    || old.italic != new.italic
                    || old.is_image != new.is_image
                    || old.src != new.src
                    || old.image_align != new.image_align
                    || old.image_height != new.image_height
                    || old.image_width != new.image_width
                    || old.image_offset != new.image_offset
            }
            (Some(style), None) | (None, Some(style)) => style_affects_layout(style),
            (None, None) => false,
        }
    })
}

/// Length of the word starting at `start`; spaces and CJK stand alone
fn first_word_len(chars: &[char], start: usize) -> usize {
    let breaks = |ch: char| is_unicode_cjk(ch) || is_unicode_space(ch);
    match chars.get(start) {
        None => 0,
        Some(&ch) if breaks(ch) => 1,
        Some(_) => 1 + chars[start + 1..].iter().take_while(|&&ch| !breaks(ch)).count(),
    }
}

/// Everything needed to style a text segment from its run
struct StyleContext<'a> {
    config: &'a RichTextConfig,
    font: &'a Arc<FontAtlas>,
    runs: &'a [Run],
}

impl StyleContext<'_> {
    /// Configure `label` from run `style_index` and lay it out
    ///
    /// Returns the click handler of the run.
    fn apply(&self, label: &mut TextLabel, style_index: usize) -> Option<ClickEvent> {
        let style = self.runs.get(style_index).and_then(|run| run.style.as_ref());

        if label.font().map_or(true, |font| !Arc::ptr_eq(font, self.font)) {
            label.set_font(Arc::clone(self.font));
        }

        let config = label.config_mut();
        config.overflow = Overflow::None;
        config.anchor = Vec2::zeros();
        config.content_size = Vec2::zeros();
        config.vertical_align = self.config.vertical_align;
        config.line_height = self.config.line_height;
        config.font_size = style.and_then(|s| s.size).unwrap_or(self.config.font_size);
        config.color = style.and_then(|s| s.color).unwrap_or(color::WHITE);

        let gradient = style.and_then(|s| s.color_gradient);
        config.color_gradient = gradient.is_some();
        if let Some(gradient) = gradient {
            config.gradient = gradient;
        }

        let face = style.and_then(|s| s.face).unwrap_or_default();
        config.sdf.face_color = face.color;
        config.sdf.face_dilate = face.dilate;
        config.sdf.face_softness = face.softness;

        config.italic = style.and_then(|s| s.italic).unwrap_or(false);
        let offset = style.and_then(|s| s.offset).unwrap_or(0.0);
        config.underline = style.and_then(|s| s.underline).unwrap_or(false);
        if config.underline {
            config.underline_offset = offset;
        }
        config.strikethrough = style.and_then(|s| s.strikethrough).unwrap_or(false);
        if config.strikethrough {
            config.strikethrough_offset = offset;
        }

        let outline = style.and_then(|s| s.outline);
        config.sdf.enable_outline = outline.is_some();
        if let Some(outline) = outline {
            config.sdf.outline_color = outline.color;
            config.sdf.outline_thickness = outline.thickness;
        }

        let underlay = style.and_then(|s| s.underlay);
        config.sdf.enable_underlay = underlay.is_some();
        if let Some(underlay) = underlay {
            config.sdf.underlay_color = underlay.color;
            config.sdf.underlay_offset = Vec2::new(underlay.x, underlay.y);
            config.sdf.underlay_dilate = underlay.dilate;
            config.sdf.underlay_softness = underlay.softness;
        }

        let glow = style.and_then(|s| s.glow);
        config.sdf.enable_glow = glow.is_some();
        if let Some(glow) = glow {
            config.sdf.glow_color = glow.color;
            config.sdf.glow_offset = glow.offset;
            config.sdf.glow_inner = glow.inner;
            config.sdf.glow_outer = glow.outer;
            config.sdf.glow_power = glow.power;
        }

        label.update_render_data();

        style
            .and_then(|s| s.event.clone())
            .filter(|event| !event.click.is_empty())
    }

    /// Width of `text` laid out with the style of run `style_index`
    fn measure(&self, label: &mut TextLabel, style_index: usize, text: &str) -> f32 {
        label.set_string(text);
        self.apply(label, style_index);
        label.content_size().x
    }
}

/// Result of the line building pass
struct Composition {
    segments: Vec<Segment>,
    lines_width: Vec<f32>,
    line_count: usize,
    label_width: f32,
    label_height: f32,
}

/// Line building pass state
struct LineBuilder<'a> {
    style: StyleContext<'a>,
    image_atlas: Option<&'a SpriteAtlas>,
    pool: &'a mut SegmentPool,
    scratch: &'a mut TextLabel,
    segments: Vec<Segment>,
    lines_width: Vec<f32>,
    line_offset_x: f32,
    line_count: usize,
    label_width: f32,
}

impl<'a> LineBuilder<'a> {
    fn new(
        style: StyleContext<'a>,
        image_atlas: Option<&'a SpriteAtlas>,
        pool: &'a mut SegmentPool,
        scratch: &'a mut TextLabel,
    ) -> Self {
        Self {
            style,
            image_atlas,
            pool,
            scratch,
            segments: Vec::new(),
            lines_width: Vec::new(),
            line_offset_x: 0.0,
            line_count: 1,
            label_width: 0.0,
        }
    }

    fn measure(&mut self, style_index: usize, text: &str) -> f32 {
        self.style.measure(self.scratch, style_index, text)
    }

    fn max_width(&self) -> f32 {
        self.style.config.max_width
    }

    /// Close the current line
    fn new_line(&mut self) {
        self.lines_width.push(self.line_offset_x);
        self.line_offset_x = 0.0;
        self.line_count += 1;
    }

    /// Append a text segment on the current line and return its width
    fn add_text_segment(&mut self, text: &str, style_index: usize) -> f32 {
        let mut segment = self.pool.text_segment();
        segment.label.set_string(text);
        segment.style_index = style_index;
        segment.line_count = self.line_count;
        segment.click = self.style.apply(&mut segment.label, style_index);

        let width = segment.label.content_size().x;
        self.segments.push(Segment::Text(segment));
        width
    }

    fn add_image(&mut self, style_index: usize, style: &StyleFrame) {
        let atlas = self.image_atlas;
        let name = style.src.as_deref().unwrap_or_default();
        let Some(frame) = atlas.and_then(|atlas| atlas.sprite_frame(name)) else {
            log::warn!("Inline image '{name}' is not in the image atlas (warning {MISSING_SPRITE_WARNING})");
            return;
        };

        let line_height = self.style.config.line_height;
        let mut size = frame.size();
        let target_height = style.image_height.filter(|h| *h > 0.0).unwrap_or(line_height);
        if size.y > 0.0 {
            size *= target_height / size.y;
        }
        if let Some(width) = style.image_width.filter(|w| *w > 0.0) {
            size.x = width;
        }

        if self.max_width() > 0.0 {
            if self.line_offset_x + size.x > self.max_width() {
                self.new_line();
            }
            self.line_offset_x += size.x;
        } else {
            self.line_offset_x += size.x;
            self.label_width = self.label_width.max(self.line_offset_x);
        }

        let mut image = self.pool.image_segment(frame);
        image.size = size;
        image.align = style.image_align.unwrap_or(ImageAlign::Bottom);
        image.offset = style.image_offset.unwrap_or_else(Vec2::zeros);
        image.line_count = self.line_count;
        image.style_index = style_index;
        image.click = style.event.clone().filter(|event| !event.click.is_empty());
        self.segments.push(Segment::Image(image));
    }

    /// Place one line fragment when wrapping is on
    fn add_wrapped(&mut self, text: &str, width: f32, style_index: usize) {
        let max_width = self.max_width();
        let mut text = text.to_owned();
        let mut fragment_width = width;

        // Pack leading words onto the partially filled line
        if self.line_offset_x > 0.0 && fragment_width + self.line_offset_x > max_width {
            let chars: Vec<char> = text.chars().collect();
            let mut start = 0;
            loop {
                if start >= chars.len() {
                    self.add_text_segment(&text, style_index);
                    return;
                }

                let word_len = first_word_len(&chars, start);
                let word: String = chars[start..start + word_len].iter().collect();
                let word_width = self.measure(style_index, &word);

                if self.line_offset_x + word_width <= max_width {
                    self.line_offset_x += word_width;
                    start += word_len;
                    continue;
                }

                if start > 0 {
                    let packed: String = chars[..start].iter().collect();
                    self.add_text_segment(&packed, style_index);
                    text = chars[start..].iter().collect();
                    fragment_width = self.measure(style_index, &text);
                }
                self.new_line();
                break;
            }
        }

        if fragment_width > max_width {
            let fragments = fragment_text(&text, fragment_width, max_width, |s| self.measure(style_index, s));
            let last = fragments.len().saturating_sub(1);
            for (k, fragment) in fragments.iter().enumerate() {
                self.line_offset_x += self.add_text_segment(fragment, style_index);
                if k < last {
                    self.new_line();
                }
            }
        } else {
            self.line_offset_x += fragment_width;
            self.add_text_segment(&text, style_index);
        }
    }

    fn build(mut self) -> Composition {
        let runs = self.style.runs;
        let mut last_empty_line = false;

        for (index, run) in runs.iter().enumerate() {
            if run.text.is_empty() {
                if let Some(style) = &run.style {
                    if style.is_new_line() {
                        self.new_line();
                    } else if style.is_image() {
                        self.add_image(index, style);
                    }
                }
                continue;
            }

            let max_width = self.max_width();
            let text = split_approximately(&run.text, max_width, |s| self.measure(index, s)).join("\n");
            let lines: Vec<&str> = text.split('\n').collect();
            let last = lines.len() - 1;

            for (j, line) in lines.iter().enumerate() {
                if line.is_empty() {
                    // A trailing newline does not open an extra empty line
                    if j == last && text.ends_with('\n') {
                        continue;
                    }
                    self.new_line();
                    last_empty_line = true;
                    continue;
                }
                last_empty_line = false;

                if max_width > 0.0 {
                    let width = self.measure(index, line);
                    self.add_wrapped(line, width, index);
                } else {
                    self.line_offset_x += self.add_text_segment(line, index);
                    self.label_width = self.label_width.max(self.line_offset_x);
                }

                if j < last {
                    self.new_line();
                }
            }
        }

        if !last_empty_line {
            self.lines_width.push(self.line_offset_x);
        }

        let max_width = self.max_width();
        if max_width > 0.0 {
            self.label_width = max_width;
        }
        let line_height = self.style.config.line_height;

        Composition {
            label_height: (self.line_count as f32 + BASELINE_RATIO) * line_height,
            segments: self.segments,
            lines_width: self.lines_width,
            line_count: self.line_count,
            label_width: self.label_width,
        }
    }
}

/// Multi-style text block built from inline markup
#[derive(Debug)]
pub struct RichTextComposer {
    config: RichTextConfig,
    string: String,
    font: Option<Arc<FontAtlas>>,
    image_atlas: Option<Arc<SpriteAtlas>>,
    parser: MarkupParser,
    runs: Vec<Run>,
    segments: Vec<Segment>,
    pool: SegmentPool,
    scratch: TextLabel,
    lines_width: Vec<f32>,
    line_count: usize,
    label_width: f32,
    label_height: f32,
    layout_dirty: bool,
    rebuild_count: usize,
}

impl Default for RichTextComposer {
    fn default() -> Self {
        Self::new(RichTextConfig::default())
    }
}

impl RichTextComposer {
    /// Create an empty composer
    pub fn new(config: RichTextConfig) -> Self {
        Self {
            config,
            string: String::new(),
            font: None,
            image_atlas: None,
            parser: MarkupParser::new(),
            runs: Vec::new(),
            segments: Vec::new(),
            pool: SegmentPool::new(),
            scratch: TextLabel::default(),
            lines_width: Vec::new(),
            line_count: 1,
            label_width: 0.0,
            label_height: 0.0,
            layout_dirty: true,
            rebuild_count: 0,
        }
    }

    /// Current configuration
    pub fn config(&self) -> &RichTextConfig {
        &self.config
    }

    /// Replace the whole configuration
    pub fn set_config(&mut self, config: RichTextConfig) {
        let relayout = self.config.layout_differs(&config);
        let anchor_moved = self.config.anchor != config.anchor;
        self.config = config;

        if relayout {
            self.invalidate_layout();
        } else if anchor_moved {
            self.place_segments();
        }
    }

    /// Markup source
    pub fn string(&self) -> &str {
        &self.string
    }

    /// Replace the markup and recompose
    pub fn set_string(&mut self, string: impl Into<String>) {
        let string = string.into();
        if self.string != string {
            self.string = string;
            self.update_rich_text();
        }
    }

    /// Font used by every text segment
    pub fn font(&self) -> Option<&Arc<FontAtlas>> {
        self.font.as_ref()
    }

    /// Replace the font and recompose
    pub fn set_font(&mut self, font: Arc<FontAtlas>) {
        self.font = Some(font);
        self.invalidate_layout();
    }

    /// Sprites available to `<img>`
    pub fn image_atlas(&self) -> Option<&Arc<SpriteAtlas>> {
        self.image_atlas.as_ref()
    }

    /// Replace the image atlas and recompose
    pub fn set_image_atlas(&mut self, atlas: Option<Arc<SpriteAtlas>>) {
        self.image_atlas = atlas;
        self.invalidate_layout();
    }

    /// Set the default font size
    pub fn set_font_size(&mut self, font_size: f32) {
        if self.config.font_size != font_size {
            self.config.font_size = font_size;
            self.invalidate_layout();
        }
    }

    /// Set the distance between baselines
    pub fn set_line_height(&mut self, line_height: f32) {
        if self.config.line_height != line_height {
            self.config.line_height = line_height;
            self.invalidate_layout();
        }
    }

    /// Set the wrap width; 0 disables wrapping
    pub fn set_max_width(&mut self, max_width: f32) {
        if self.config.max_width != max_width {
            self.config.max_width = max_width;
            self.invalidate_layout();
        }
    }

    /// Set the horizontal alignment of the lines
    pub fn set_horizontal_align(&mut self, align: HorizontalAlign) {
        if self.config.horizontal_align != align {
            self.config.horizontal_align = align;
            self.invalidate_layout();
        }
    }

    /// Set the vertical alignment of the text segments
    pub fn set_vertical_align(&mut self, align: VerticalAlign) {
        if self.config.vertical_align != align {
            self.config.vertical_align = align;
            self.invalidate_layout();
        }
    }

    /// Move the pivot; only positions change
    pub fn set_anchor(&mut self, anchor: Vec2) {
        if self.config.anchor != anchor {
            self.config.anchor = anchor;
            self.place_segments();
        }
    }

    /// Enable or disable click hit tests
    pub fn set_handle_touch_event(&mut self, enabled: bool) {
        self.config.handle_touch_event = enabled;
    }

    fn invalidate_layout(&mut self) {
        self.layout_dirty = true;
        self.update_rich_text();
    }

    /// Parse the markup and bring the segments up to date
    ///
    /// Without a font nothing happens and the layout stays dirty.
    pub fn update_rich_text(&mut self) {
        let Some(font) = self.font.clone() else {
            log::debug!("Rich text has no font yet, composition deferred");
            return;
        };

        let runs = self.parser.parse(&self.string);
        if !self.layout_dirty && !needs_relayout(&self.runs, &runs) {
            self.runs = runs;
            let style = StyleContext {
                config: &self.config,
                font: &font,
                runs: &self.runs,
            };
            for segment in &mut self.segments {
                if let Segment::Text(text) = segment {
                    text.click = style.apply(&mut text.label, text.style_index);
                }
            }
            return;
        }

        self.runs = runs;
        for segment in self.segments.drain(..) {
            self.pool.recycle(segment);
        }

        let builder = LineBuilder::new(
            StyleContext {
                config: &self.config,
                font: &font,
                runs: &self.runs,
            },
            self.image_atlas.as_deref(),
            &mut self.pool,
            &mut self.scratch,
        );
        let composition = builder.build();

        self.segments = composition.segments;
        self.lines_width = composition.lines_width;
        self.line_count = composition.line_count;
        self.label_width = composition.label_width;
        self.label_height = composition.label_height;

        self.place_segments();
        self.layout_dirty = false;
        self.rebuild_count += 1;

        log::debug!(
            "Composed {} runs into {} segments on {} lines ({}x{})",
            self.runs.len(),
            self.segments.len(),
            self.line_count,
            self.label_width,
            self.label_height
        );
    }

    /// Position every segment from line widths, alignment and anchor
    fn place_segments(&mut self) {
        let anchor = self.config.anchor;
        let align = self.config.horizontal_align;
        let line_height = self.config.line_height;
        let real_line_height = line_height * (1.0 + BASELINE_RATIO);
        let total_lines = self.line_count;

        let mut next_token_x = 0.0;
        let mut next_line = 1;
        for segment in &mut self.segments {
            let line = segment.line_count();
            if line > next_line {
                next_token_x = 0.0;
                next_line = line;
            }

            let line_width = self.lines_width.get(line.saturating_sub(1)).copied().unwrap_or(0.0);
            let mut line_offset_x = self.label_width * (align.factor() * 0.5 - anchor.x);
            match align {
                HorizontalAlign::Left => {}
                HorizontalAlign::Center => line_offset_x -= line_width / 2.0,
                HorizontalAlign::Right => line_offset_x -= line_width,
            }

            let mut position = Vec2::new(
                next_token_x + line_offset_x,
                line_height * total_lines.saturating_sub(line) as f32 - self.label_height * anchor.y,
            );

            if line == next_line {
                next_token_x += segment.size().x;
                if let Segment::Text(text) = segment {
                    next_token_x += text.label.rich_text_delta_x();
                }
            }

            if let Segment::Image(image) = segment {
                position.y += match image.align {
                    ImageAlign::Top => line_height + (real_line_height - line_height) / 2.0,
                    ImageAlign::Center => real_line_height / 2.0,
                    ImageAlign::Bottom => (real_line_height - line_height) / 2.0,
                };
                position += image.offset;
            }

            segment.set_position(position);
        }
    }

    /// Composed width and height
    pub fn content_size(&self) -> Vec2 {
        Vec2::new(self.label_width, self.label_height)
    }

    /// Placed segments in composition order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Parsed runs the segments were built from
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Number of lines
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Width of every line
    pub fn lines_width(&self) -> &[f32] {
        &self.lines_width
    }

    /// How many full rebuilds have run
    pub fn rebuild_count(&self) -> usize {
        self.rebuild_count
    }

    /// Click handlers of every segment whose bounds contain `point`
    ///
    /// `point` is in the block's local space. Returns nothing while touch
    /// handling is disabled.
    pub fn hit_test(&self, point: Vec2) -> Vec<&ClickEvent> {
        if !self.config.handle_touch_event {
            return Vec::new();
        }
        self.segments
            .iter()
            .filter_map(|segment| segment.click().filter(|_| segment.bounds().contains(point)))
            .collect()
    }
}
