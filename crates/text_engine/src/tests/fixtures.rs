//! Shared test fixtures

use serde_json::{json, Value};

use crate::foundation::logging;
use crate::text::FontAtlas;

fn glyph(id: u32, x: u32, y: u32, width: u32, height: u32, advance: u32) -> Value {
    offset_glyph(id, [x, y, width, height], (0, 0), advance)
}

fn offset_glyph(id: u32, rect: [u32; 4], offset: (i32, i32), advance: u32) -> Value {
    let [x, y, width, height] = rect;
    json!({
        "id": id, "x": x, "y": y, "width": width, "height": height,
        "xoffset": offset.0, "yoffset": offset.1, "xadvance": advance, "page": 0, "chnl": 15
    })
}

fn single_page_font(chars: Vec<Value>) -> FontAtlas {
    let font = json!({
        "size": 20, "bold": 0, "italic": 0, "padding": [0, 0, 0, 0], "spacing": [0, 0],
        "outline": 0, "lineHeight": 20, "base": 16, "scaleW": 256, "scaleH": 256,
        "pages": 1, "packed": 0,
        "pageData": [{ "id": 0, "file": "test.png" }],
        "charData": chars
    });

    FontAtlas::from_json(&font.to_string()).expect("fixture font must load")
}

/// Monospaced 20px atlas on a single 256x256 page
///
/// Printable ASCII glyphs are 10x20 with an advance of 10 and sit on a
/// 16x24 grid. Space advances 10 without drawing. '中' and '文' are 20x20.
/// '€' is deliberately missing.
pub(crate) fn test_atlas() -> FontAtlas {
    logging::init_for_tests();
    let mut chars = vec![glyph(32, 0, 0, 0, 0, 10)];
    for code in 33..=126_u32 {
        let cell = code - 32;
        chars.push(glyph(code, (cell % 16) * 16, (cell / 16) * 24, 10, 20, 10));
    }
    chars.push(glyph('中' as u32, 0, 200, 20, 20, 20));
    chars.push(glyph('文' as u32, 24, 200, 20, 20, 20));
    single_page_font(chars)
}

/// 20px atlas whose glyphs carry bearings
///
/// | glyph | rect (x, y, w, h) | offset | advance |
/// |-------|-------------------|--------|---------|
/// | `A`   | 0, 0, 10, 16      | 2, 4   | 14      |
/// | `i`   | 16, 0, 4, 14      | 1, 6   | 6       |
/// | `.`   | 24, 0, 3, 3       | 1, 15  | 5       |
/// | space | empty             | 0, 0   | 8       |
pub(crate) fn metrics_atlas() -> FontAtlas {
    logging::init_for_tests();
    single_page_font(vec![
        glyph(32, 0, 0, 0, 0, 8),
        offset_glyph('A' as u32, [0, 0, 10, 16], (2, 4), 14),
        offset_glyph('i' as u32, [16, 0, 4, 14], (1, 6), 6),
        offset_glyph('.' as u32, [24, 0, 3, 3], (1, 15), 5),
    ])
}
