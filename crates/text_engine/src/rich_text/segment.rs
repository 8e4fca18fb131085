//! Placed pieces of composed rich text

use crate::foundation::collections::{Pool, Poolable};
use crate::foundation::math::{Rect, Vec2};
use crate::text::{LabelConfig, TextLabel};
use super::image_atlas::SpriteFrame;
use super::markup::{ClickEvent, ImageAlign};

/// Pooled text segments kept between rebuilds
pub const TEXT_POOL_CAPACITY: usize = 20;

/// Pooled image segments kept between rebuilds
pub const IMAGE_POOL_CAPACITY: usize = 10;

/// Run of single-style text drawn by its own label
#[derive(Debug, Clone, Default)]
pub struct TextSegment {
    /// Label holding the text and its mesh
    pub label: TextLabel,
    /// 1-based line within the composed text
    pub line_count: usize,
    /// Index of the run the style comes from
    pub style_index: usize,
    /// Position of the bottom-left corner
    pub position: Vec2,
    /// Click handler of the run
    pub click: Option<ClickEvent>,
}

impl TextSegment {
    fn new() -> Self {
        Self {
            label: TextLabel::new(LabelConfig::default()),
            line_count: 1,
            ..Self::default()
        }
    }
}

impl Poolable for TextSegment {
    fn reset(&mut self) {
        self.label.set_string(String::new());
        self.line_count = 1;
        self.style_index = 0;
        self.position = Vec2::zeros();
        self.click = None;
    }
}

/// Inline image placeholder
#[derive(Debug, Clone)]
pub struct ImageSegment {
    /// Sprite drawn at this spot
    pub frame: SpriteFrame,
    /// Displayed size after scaling
    pub size: Vec2,
    /// Vertical placement from the `align` attribute
    pub align: ImageAlign,
    /// Extra displacement from the `offset` attribute
    pub offset: Vec2,
    /// 1-based line within the composed text
    pub line_count: usize,
    /// Index of the run the image comes from
    pub style_index: usize,
    /// Position of the anchor point
    pub position: Vec2,
    /// Click handler of the image
    pub click: Option<ClickEvent>,
}

impl ImageSegment {
    fn new(frame: SpriteFrame) -> Self {
        Self {
            size: frame.size(),
            frame,
            align: ImageAlign::Bottom,
            offset: Vec2::zeros(),
            line_count: 1,
            style_index: 0,
            position: Vec2::zeros(),
            click: None,
        }
    }
}

impl Poolable for ImageSegment {
    fn reset(&mut self) {
        self.align = ImageAlign::Bottom;
        self.offset = Vec2::zeros();
        self.line_count = 1;
        self.style_index = 0;
        self.position = Vec2::zeros();
        self.click = None;
    }
}

/// One placed piece of rich text
#[derive(Debug, Clone)]
pub enum Segment {
    /// Styled text
    Text(TextSegment),
    /// Inline image
    Image(ImageSegment),
}

impl Segment {
    /// 1-based line the segment sits on
    pub fn line_count(&self) -> usize {
        match self {
            Self::Text(text) => text.line_count,
            Self::Image(image) => image.line_count,
        }
    }

    /// Index of the source run
    pub fn style_index(&self) -> usize {
        match self {
            Self::Text(text) => text.style_index,
            Self::Image(image) => image.style_index,
        }
    }

    /// Placed position
    pub fn position(&self) -> Vec2 {
        match self {
            Self::Text(text) => text.position,
            Self::Image(image) => image.position,
        }
    }

    pub(crate) fn set_position(&mut self, position: Vec2) {
        match self {
            Self::Text(text) => text.position = position,
            Self::Image(image) => image.position = position,
        }
    }

    /// Width and height
    pub fn size(&self) -> Vec2 {
        match self {
            Self::Text(text) => text.label.content_size(),
            Self::Image(image) => image.size,
        }
    }

    /// Local bounding box used for click hit tests
    pub fn bounds(&self) -> Rect {
        let size = self.size();
        let position = self.position();
        let anchor_y = match self {
            Self::Text(_) => 0.0,
            Self::Image(image) => image.align.anchor_y(),
        };
        Rect::new(position.x, position.y - size.y * anchor_y, size.x, size.y)
    }

    /// Click handler, if any
    pub fn click(&self) -> Option<&ClickEvent> {
        match self {
            Self::Text(text) => text.click.as_ref(),
            Self::Image(image) => image.click.as_ref(),
        }
    }

    /// Displayed text, empty for images
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text.label.string(),
            Self::Image(_) => "",
        }
    }

    /// Number of quads drawn for this segment
    pub fn quad_count(&self) -> usize {
        match self {
            Self::Text(text) => text.label.mesh().quad_count(),
            Self::Image(_) => 1,
        }
    }

    /// Whether this is an inline image
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image(_))
    }
}

/// Recycles segments across rebuilds
#[derive(Debug)]
pub struct SegmentPool {
    text: Pool<TextSegment>,
    image: Pool<ImageSegment>,
}

impl Default for SegmentPool {
    fn default() -> Self {
        Self {
            text: Pool::new(TEXT_POOL_CAPACITY),
            image: Pool::new(IMAGE_POOL_CAPACITY),
        }
    }
}

impl SegmentPool {
    /// Create a pool with the default capacities
    pub fn new() -> Self {
        Self::default()
    }

    /// A cleared text segment
    pub fn text_segment(&mut self) -> TextSegment {
        self.text.acquire_or_else(TextSegment::new)
    }

    /// A cleared image segment showing `frame`
    pub fn image_segment(&mut self, frame: &SpriteFrame) -> ImageSegment {
        match self.image.acquire() {
            Some(mut image) => {
                image.frame = frame.clone();
                image.size = frame.size();
                image
            }
            None => ImageSegment::new(frame.clone()),
        }
    }

    /// Hand a segment back for reuse
    pub fn recycle(&mut self, segment: Segment) {
        match segment {
            Segment::Text(text) => {
                self.text.release(text);
            }
            Segment::Image(image) => {
                self.image.release(image);
            }
        }
    }

    /// Segments waiting for reuse, text and image
    pub fn idle_counts(&self) -> (usize, usize) {
        (self.text.len(), self.image.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> SpriteFrame {
        SpriteFrame::new("coin", Rect::new(0.0, 0.0, 40.0, 20.0))
    }

    #[test]
    fn test_recycled_text_segment_is_cleared() {
        let mut pool = SegmentPool::new();
        let mut text = pool.text_segment();
        text.label.set_string("hello");
        text.line_count = 3;
        text.click = Some(ClickEvent {
            click: "buy".into(),
            param: None,
        });
        pool.recycle(Segment::Text(text));
        assert_eq!(pool.idle_counts(), (1, 0));

        let reused = pool.text_segment();
        assert_eq!(reused.label.string(), "");
        assert_eq!(reused.line_count, 1);
        assert!(reused.click.is_none());
    }

    #[test]
    fn test_image_segment_takes_new_frame() {
        let mut pool = SegmentPool::new();
        let mut image = pool.image_segment(&frame());
        image.size = Vec2::new(1.0, 1.0);
        pool.recycle(Segment::Image(image));

        let other = SpriteFrame::new("gem", Rect::new(0.0, 0.0, 8.0, 8.0));
        let reused = pool.image_segment(&other);
        assert_eq!(reused.frame.name, "gem");
        assert_eq!(reused.size, Vec2::new(8.0, 8.0));
    }

    #[test]
    fn test_pool_capacity_is_bounded() {
        let mut pool = SegmentPool::new();
        for _ in 0..IMAGE_POOL_CAPACITY + 5 {
            let image = ImageSegment::new(frame());
            pool.recycle(Segment::Image(image));
        }
        assert_eq!(pool.idle_counts(), (0, IMAGE_POOL_CAPACITY));
    }

    #[test]
    fn test_image_bounds_follow_anchor() {
        let mut image = ImageSegment::new(frame());
        image.align = ImageAlign::Top;
        image.position = Vec2::new(5.0, 30.0);
        let segment = Segment::Image(image);

        let bounds = segment.bounds();
        assert_eq!(bounds, Rect::new(5.0, 10.0, 40.0, 20.0));
        assert!(segment.is_image());
        assert_eq!(segment.quad_count(), 1);
    }
}
