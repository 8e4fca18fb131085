//! Multi-style text from inline markup
//!
//! [`MarkupParser`] splits a tagged string into styled runs and
//! [`RichTextComposer`] lays the runs out as single-style segments plus
//! inline images.

pub mod markup;
pub mod fragment;
pub mod image_atlas;
pub mod segment;
pub mod composer;

pub use markup::{ClickEvent, ImageAlign, MarkupParser, Run, StyleFrame};
pub use image_atlas::{SpriteAtlas, SpriteFrame};
pub use segment::{ImageSegment, Segment, SegmentPool, TextSegment};
pub use composer::{RichTextComposer, RichTextConfig};
