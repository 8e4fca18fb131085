//! Font atlas lookup tables
//!
//! A [`FontAtlas`] is built once from a BMFont-style JSON description of a
//! pre-rendered SDF atlas. It maps characters to [`GlyphDef`] metrics and
//! texture pages to their pixel dimensions. Nothing is rasterized here; the
//! atlas textures are produced offline and uploaded by the renderer.
//!
//! # Example
//!
//! ```no_run
//! use text_engine::text::FontAtlas;
//!
//! let atlas = FontAtlas::load("resources/fonts/title.json")?
//!     .with_texture_size(0, 1024, 1024);
//! let glyph = atlas.glyph('A');
//! # Ok::<(), text_engine::text::FontError>(())
//! ```

use std::collections::HashMap;
use std::path::Path;
use serde::Deserialize;

/// Result type for font operations
pub type FontResult<T> = Result<T, FontError>;

/// Errors that can occur while loading a font atlas
#[derive(Debug, thiserror::Error)]
pub enum FontError {
    /// The font file could not be read
    #[error("Failed to read font file: {0}")]
    Io(#[from] std::io::Error),

    /// The font JSON could not be deserialized
    #[error("Failed to parse font JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The font declares no texture pages
    #[error("Font declares no texture pages")]
    NoPages,

    /// The nominal font size is not positive
    #[error("Invalid nominal font size: {0}")]
    InvalidSize(f32),
}

/// Glyph lookup key: a character code, optionally qualified by the style
/// hash of the atlas instance that owns it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GlyphKey {
    /// Unicode scalar value
    pub code: u32,
    /// Per-atlas disambiguation suffix
    pub style_hash: Option<u32>,
}

impl GlyphKey {
    /// Key for a character in an atlas with the given style hash
    pub const fn new(ch: char, style_hash: Option<u32>) -> Self {
        Self { code: ch as u32, style_hash }
    }
}

/// Metrics of one glyph inside the atlas, in atlas pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlyphDef {
    /// Left of the glyph rectangle in the texture
    pub u: f32,
    /// Top of the glyph rectangle in the texture
    pub v: f32,
    /// Width of the glyph rectangle
    pub w: f32,
    /// Height of the glyph rectangle
    pub h: f32,
    /// Horizontal offset from the pen position
    pub offset_x: f32,
    /// Vertical offset from the line top, +Y down
    pub offset_y: f32,
    /// Pen advance after this glyph
    pub x_advance: f32,
    /// Texture page holding the glyph
    pub texture_id: u32,
    /// Whether this glyph draws anything
    pub valid: bool,
}

/// Font asset JSON as exported by the atlas tool
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontJson {
    /// Nominal size the atlas was rendered at
    pub size: f32,
    /// Line height at the nominal size
    #[serde(default)]
    pub line_height: f32,
    /// Baseline distance from the line top
    #[serde(default)]
    pub base: f32,
    /// Texture width shared by all pages
    #[serde(default)]
    pub scale_w: u32,
    /// Texture height shared by all pages
    #[serde(default)]
    pub scale_h: u32,
    /// Number of texture pages
    #[serde(default)]
    pub pages: u32,
    /// Texture page files
    #[serde(default)]
    pub page_data: Vec<PageJson>,
    /// Glyph entries
    #[serde(default)]
    pub char_data: Vec<CharJson>,
}

/// One texture page entry
#[derive(Debug, Clone, Deserialize)]
pub struct PageJson {
    /// Page id referenced by glyphs
    pub id: u32,
    /// Texture file name
    #[serde(default)]
    pub file: String,
}

/// One glyph entry
#[derive(Debug, Clone, Deserialize)]
#[allow(missing_docs)]
pub struct CharJson {
    pub id: u32,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub xoffset: f32,
    #[serde(default)]
    pub yoffset: f32,
    #[serde(default)]
    pub xadvance: f32,
    #[serde(default)]
    pub page: u32,
}

/// Read-only glyph and texture lookup for one font asset
#[derive(Debug, Clone)]
pub struct FontAtlas {
    glyphs: HashMap<GlyphKey, GlyphDef>,
    textures: HashMap<u32, (u32, u32)>,
    page_files: HashMap<u32, String>,
    origin_font_size: f32,
    line_height: f32,
    base: f32,
    style_hash: Option<u32>,
}

impl FontAtlas {
    /// Build an atlas from a parsed font description
    ///
    /// Every page is registered with the shared `scaleW x scaleH` texture
    /// size. Duplicate glyph ids keep the last entry.
    pub fn from_font_json(json: FontJson) -> FontResult<Self> {
        if json.size <= 0.0 {
            return Err(FontError::InvalidSize(json.size));
        }
        if json.page_data.is_empty() && json.pages == 0 {
            return Err(FontError::NoPages);
        }

        let mut textures = HashMap::new();
        let mut page_files = HashMap::new();
        for page in &json.page_data {
            textures.insert(page.id, (json.scale_w, json.scale_h));
            page_files.insert(page.id, page.file.clone());
        }
        // Page list may be omitted when only the count is given
        for id in 0..json.pages {
            textures.entry(id).or_insert((json.scale_w, json.scale_h));
        }

        let mut glyphs = HashMap::with_capacity(json.char_data.len());
        for entry in &json.char_data {
            let key = GlyphKey { code: entry.id, style_hash: None };
            glyphs.insert(key, GlyphDef {
                u: entry.x,
                v: entry.y,
                w: entry.width,
                h: entry.height,
                offset_x: entry.xoffset,
                offset_y: entry.yoffset,
                x_advance: entry.xadvance,
                texture_id: entry.page,
                valid: true,
            });
        }

        log::debug!(
            "Loaded font atlas: size {}, {} glyphs, {} pages",
            json.size,
            glyphs.len(),
            textures.len()
        );

        Ok(Self {
            glyphs,
            textures,
            page_files,
            origin_font_size: json.size,
            line_height: json.line_height,
            base: json.base,
            style_hash: None,
        })
    }

    /// Parse a font description from JSON text
    pub fn from_json(json: &str) -> FontResult<Self> {
        let parsed: FontJson = serde_json::from_str(json)?;
        Self::from_font_json(parsed)
    }

    /// Read and parse a font description file
    pub fn load(path: impl AsRef<Path>) -> FontResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }

    /// Override the pixel size of one texture page
    #[must_use]
    pub fn with_texture_size(mut self, id: u32, width: u32, height: u32) -> Self {
        self.textures.insert(id, (width, height));
        self
    }

    /// Qualify every glyph key with a style hash
    ///
    /// Used when several atlases of the same font are alive at once.
    #[must_use]
    pub fn with_style_hash(mut self, hash: u32) -> Self {
        self.glyphs = self
            .glyphs
            .into_iter()
            .map(|(key, def)| (GlyphKey { code: key.code, style_hash: Some(hash) }, def))
            .collect();
        self.style_hash = Some(hash);
        self
    }

    /// Lookup key this atlas uses for `ch`
    pub const fn key_for(&self, ch: char) -> GlyphKey {
        GlyphKey::new(ch, self.style_hash)
    }

    /// Glyph metrics for a character
    pub fn glyph(&self, ch: char) -> Option<&GlyphDef> {
        self.glyphs.get(&self.key_for(ch))
    }

    /// Glyph metrics for a previously resolved key
    pub fn glyph_by_key(&self, key: GlyphKey) -> Option<&GlyphDef> {
        self.glyphs.get(&key)
    }

    /// Pixel dimensions of a texture page
    pub fn texture_size(&self, id: u32) -> Option<(u32, u32)> {
        self.textures.get(&id).copied()
    }

    /// Number of texture pages
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Texture file backing a page, if the asset named one
    pub fn page_file(&self, id: u32) -> Option<&str> {
        self.page_files.get(&id).map(String::as_str)
    }

    /// Size the atlas was rendered at; layout scale is `font_size / origin_font_size`
    pub const fn origin_font_size(&self) -> f32 {
        self.origin_font_size
    }

    /// Line height at the nominal size
    pub const fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Baseline distance from the line top at the nominal size
    pub const fn base(&self) -> f32 {
        self.base
    }

    /// Style hash applied to the keys, if any
    pub const fn style_hash(&self) -> Option<u32> {
        self.style_hash
    }

    /// Number of glyphs in the atlas
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }
}
