//! Colour literals
//!
//! Markup and configuration files name colours either by a small set of
//! well-known names or as `#rrggbb[aa]` hex. Colours are normalized RGBA
//! vectors in 0..1.

use super::math::Vec4;

/// Opaque white
pub const WHITE: Vec4 = Vec4::new(1.0, 1.0, 1.0, 1.0);
/// Opaque black
pub const BLACK: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);
/// Opaque mid gray (127/255)
pub const GRAY: Vec4 = Vec4::new(127.0 / 255.0, 127.0 / 255.0, 127.0 / 255.0, 1.0);
/// Fully transparent black
pub const TRANSPARENT: Vec4 = Vec4::new(0.0, 0.0, 0.0, 0.0);
/// Opaque red
pub const RED: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);
/// Opaque green
pub const GREEN: Vec4 = Vec4::new(0.0, 1.0, 0.0, 1.0);
/// Opaque blue
pub const BLUE: Vec4 = Vec4::new(0.0, 0.0, 1.0, 1.0);
/// Opaque cyan
pub const CYAN: Vec4 = Vec4::new(0.0, 1.0, 1.0, 1.0);
/// Opaque magenta
pub const MAGENTA: Vec4 = Vec4::new(1.0, 0.0, 1.0, 1.0);
/// Opaque yellow
pub const YELLOW: Vec4 = Vec4::new(1.0, 1.0, 0.0, 1.0);

/// Look up a named colour (case insensitive)
pub fn named_color(name: &str) -> Option<Vec4> {
    let color = match name.to_ascii_lowercase().as_str() {
        "white" => WHITE,
        "gray" => GRAY,
        "black" => BLACK,
        "transparent" => TRANSPARENT,
        "red" => RED,
        "green" => GREEN,
        "blue" => BLUE,
        "cyan" => CYAN,
        "magenta" => MAGENTA,
        "yellow" => YELLOW,
        _ => return None,
    };
    Some(color)
}

/// Parse a colour literal
///
/// Named colours win; anything else is read as hex with an optional leading
/// `#`. Each two-character channel parses its leading hex digits, so
/// malformed channels degrade to 0 instead of failing. A missing or
/// unparseable alpha channel is opaque.
///
/// # Example
///
/// ```
/// use text_engine::foundation::color::parse_color_literal;
///
/// let red = parse_color_literal("#ff0000");
/// assert_eq!(red.x, 1.0);
/// assert_eq!(red.w, 1.0);
/// ```
pub fn parse_color_literal(literal: &str) -> Vec4 {
    if let Some(color) = named_color(literal) {
        return color;
    }

    let hex = literal.strip_prefix('#').unwrap_or(literal);
    let chars: Vec<char> = hex.chars().collect();
    let channel = |index: usize| -> Option<u8> {
        let start = (index * 2).min(chars.len());
        let end = (start + 2).min(chars.len());
        let digits: String = chars[start..end]
            .iter()
            .take_while(|c| c.is_ascii_hexdigit())
            .collect();
        u8::from_str_radix(&digits, 16).ok()
    };

    let r = channel(0).unwrap_or(0);
    let g = channel(1).unwrap_or(0);
    let b = channel(2).unwrap_or(0);
    let a = channel(3).unwrap_or(255);
    Vec4::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        f32::from(a) / 255.0,
    )
}
