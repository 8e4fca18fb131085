//! # Text Engine
//!
//! Signed-distance-field text for the engine's UI layer.
//!
//! ## Features
//!
//! - **Layout**: word and character wrapping, alignment, clamp, ellipsis,
//!   shrink-to-fit and resize-height overflow modes
//! - **Quad Assembly**: glyph quads with italic shear, underline and
//!   strikethrough bars, corner gradients and an extra colour channel
//! - **Rich Text**: inline markup for colour, size, decorations, SDF
//!   effects, images and click regions
//! - **Presets**: label and rich text settings in TOML or RON files
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use text_engine::prelude::*;
//!
//! fn main() -> Result<(), FontError> {
//!     let font = Arc::new(FontAtlas::load("assets/fonts/roboto.json")?);
//!
//!     let mut composer = RichTextComposer::new(RichTextConfig {
//!         max_width: 300.0,
//!         ..RichTextConfig::default()
//!     });
//!     composer.set_font(font);
//!     composer.set_string("<color=#ffcc00>Gold</color> and <i>italic</i><br/>next line");
//!
//!     for segment in composer.segments() {
//!         println!("line {} at {:?}: {:?}", segment.line_count(), segment.position(), segment.text());
//!     }
//!     Ok(())
//! }
//! ```

pub mod foundation;
pub mod config;
pub mod text;
pub mod rich_text;

#[cfg(test)]
mod tests;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        foundation::math::{Mat4, Rect, Vec2, Vec3, Vec4},
        rich_text::{
            ClickEvent, MarkupParser, RichTextComposer, RichTextConfig, Segment, SpriteAtlas, SpriteFrame,
        },
        text::{
            FontAtlas, FontError, HorizontalAlign, LabelConfig, LayoutEngine, LayoutParams, Overflow,
            QuadAssembler, TextLabel, TextMesh, VerticalAlign, WrapMode,
        },
    };
}
