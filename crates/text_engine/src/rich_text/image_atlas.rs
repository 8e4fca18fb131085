//! Named sprites for inline images

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Rect, Vec2};

/// One sprite inside an image atlas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteFrame {
    /// Name `<img src=...>` refers to
    pub name: String,
    /// Region of the atlas texture in pixels
    pub rect: Rect,
}

impl SpriteFrame {
    /// Create a frame covering `rect`
    pub fn new(name: impl Into<String>, rect: Rect) -> Self {
        Self {
            name: name.into(),
            rect,
        }
    }

    /// Original pixel size of the sprite
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.rect.width, self.rect.height)
    }
}

/// Sprite lookup by name
#[derive(Debug, Clone, Default)]
pub struct SpriteAtlas {
    frames: HashMap<String, SpriteFrame>,
}

impl SpriteAtlas {
    /// Create an empty atlas
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an atlas from a JSON array of frames
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let frames: Vec<SpriteFrame> = serde_json::from_str(json)?;
        Ok(frames.into_iter().collect())
    }

    /// Register a frame, replacing any frame with the same name
    pub fn insert(&mut self, frame: SpriteFrame) {
        self.frames.insert(frame.name.clone(), frame);
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with_frame(mut self, frame: SpriteFrame) -> Self {
        self.insert(frame);
        self
    }

    /// Look a sprite up by name
    pub fn sprite_frame(&self, name: &str) -> Option<&SpriteFrame> {
        self.frames.get(name)
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the atlas has no frames
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FromIterator<SpriteFrame> for SpriteAtlas {
    fn from_iter<I: IntoIterator<Item = SpriteFrame>>(iter: I) -> Self {
        let mut atlas = Self::new();
        for frame in iter {
            atlas.insert(frame);
        }
        atlas
    }
}
