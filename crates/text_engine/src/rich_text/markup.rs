//! Inline markup parsing
//!
//! Splits a marked-up string into [`Run`]s of uniformly styled text. Tags
//! open a [`StyleFrame`] that inherits every unset field from the frame
//! below it on the stack; closing tags pop. `<br/>` and `<img .../>` never
//! touch the stack: they emit a zero-text run of their own.
//!
//! ```text
//! <color=#ff0000 click="buy">red</color>   colour, optional click handler
//! <size=24>big</size>                      font size
//! <i> <b> <u[=offset]> <s[=offset]>        italic, bold, underline, strikethrough
//! <cg lb=.. rb=.. lt=.. rt=..>             corner colour gradient
//! <face color= dilate= softness=>          SDF face
//! <outline color= thickness=>              SDF outline
//! <underlay color= x= y= dilate= softness=>
//! <glow color= offset= inner= outer= power=>
//! <img src='name' height= width= align= offset= click= param= />
//! <br/>
//! ```
//!
//! Malformed numbers and colours fall back to the tag's default; parsing
//! never fails.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::foundation::color::{self, parse_color_literal};
use crate::foundation::math::{Vec2, Vec4};
use crate::text::ColorGradient;

static ATTRIBUTE_REG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z]+)\s*=\s*("[^"]*"|'[^']*'|[^\s"']+)"#).expect("attribute pattern must compile")
});

static TAG_NAME_REG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([A-Za-z]+)").expect("tag name pattern must compile"));

const ENTITIES: [(&str, &str); 6] = [
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&amp;", "&"),
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&nbsp;", " "),
];

/// Click handler attached to a span of text or an image
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClickEvent {
    /// Handler name
    pub click: String,
    /// Optional argument passed to the handler
    pub param: Option<String>,
}

/// SDF face parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceStyle {
    /// Fill colour
    pub color: Vec4,
    /// Distance threshold, larger is bolder
    pub dilate: f32,
    /// Edge blur
    pub softness: f32,
}

impl Default for FaceStyle {
    fn default() -> Self {
        Self { color: color::WHITE, dilate: 0.5, softness: 0.01 }
    }
}

/// SDF outline parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlineStyle {
    /// Outline colour
    pub color: Vec4,
    /// Outline width in distance units
    pub thickness: f32,
}

impl Default for OutlineStyle {
    fn default() -> Self {
        Self { color: color::WHITE, thickness: 0.1 }
    }
}

/// SDF underlay (drop shadow) parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnderlayStyle {
    /// Shadow colour
    pub color: Vec4,
    /// Horizontal shadow offset
    pub x: f32,
    /// Vertical shadow offset
    pub y: f32,
    /// Shadow distance threshold
    pub dilate: f32,
    /// Shadow blur
    pub softness: f32,
}

impl Default for UnderlayStyle {
    fn default() -> Self {
        Self { color: color::WHITE, x: 0.0, y: 0.0, dilate: 0.5, softness: 0.1 }
    }
}

/// SDF glow parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlowStyle {
    /// Glow colour
    pub color: Vec4,
    /// Distance where the glow peaks
    pub offset: f32,
    /// Falloff towards the glyph
    pub inner: f32,
    /// Falloff away from the glyph
    pub outer: f32,
    /// Glow intensity exponent
    pub power: f32,
}

impl Default for GlowStyle {
    fn default() -> Self {
        Self { color: color::BLACK, offset: 0.5, inner: 0.01, outer: 0.01, power: 1.0 }
    }
}

/// Vertical placement of an inline image within its line box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageAlign {
    /// Image hangs from the top of the line box
    Top,
    /// Image is centered in the line box
    Center,
    /// Image sits on the bottom of the line box
    #[default]
    Bottom,
}

impl ImageAlign {
    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "top" => Self::Top,
            "center" => Self::Center,
            _ => Self::Bottom,
        }
    }

    /// Anchor y of the image sprite
    pub const fn anchor_y(self) -> f32 {
        match self {
            Self::Top => 1.0,
            Self::Center => 0.5,
            Self::Bottom => 0.0,
        }
    }
}

/// Style of one run; `None` fields fall back to the composer defaults
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleFrame {
    /// Text colour from `<color>`
    pub color: Option<Vec4>,
    /// Font size from `<size>`
    pub size: Option<f32>,
    /// Set by `<i>`
    pub italic: Option<bool>,
    /// Parsed but not rendered
    pub bold: Option<bool>,
    /// Set by `<u>`
    pub underline: Option<bool>,
    /// Set by `<s>`
    pub strikethrough: Option<bool>,
    /// Shared offset of underline and strikethrough
    pub offset: Option<f32>,
    /// Corner colours from `<cg>`
    pub color_gradient: Option<ColorGradient>,
    /// From `<face>`
    pub face: Option<FaceStyle>,
    /// From `<outline>`
    pub outline: Option<OutlineStyle>,
    /// From `<underlay>`
    pub underlay: Option<UnderlayStyle>,
    /// From `<glow>`
    pub glow: Option<GlowStyle>,
    /// Whether the run is an `<img>`
    pub is_image: Option<bool>,
    /// Sprite name of an `<img>`
    pub src: Option<String>,
    /// Displayed image width
    pub image_width: Option<f32>,
    /// Displayed image height
    pub image_height: Option<f32>,
    /// Image placement in the line box
    pub image_align: Option<ImageAlign>,
    /// Extra image displacement
    pub image_offset: Option<Vec2>,
    /// Whether the run is a `<br/>`
    pub is_new_line: Option<bool>,
    /// Click handler and argument
    pub event: Option<ClickEvent>,
}

impl StyleFrame {
    /// Fill every unset field from `parent`; fields set here win
    #[must_use]
    pub fn inherit(mut self, parent: &Self) -> Self {
        self.color = self.color.or(parent.color);
        self.size = self.size.or(parent.size);
        self.italic = self.italic.or(parent.italic);
        self.bold = self.bold.or(parent.bold);
        self.underline = self.underline.or(parent.underline);
        self.strikethrough = self.strikethrough.or(parent.strikethrough);
        self.offset = self.offset.or(parent.offset);
        self.color_gradient = self.color_gradient.or(parent.color_gradient);
        self.face = self.face.or(parent.face);
        self.outline = self.outline.or(parent.outline);
        self.underlay = self.underlay.or(parent.underlay);
        self.glow = self.glow.or(parent.glow);
        self.is_image = self.is_image.or(parent.is_image);
        self.src = self.src.or_else(|| parent.src.clone());
        self.image_width = self.image_width.or(parent.image_width);
        self.image_height = self.image_height.or(parent.image_height);
        self.image_align = self.image_align.or(parent.image_align);
        self.image_offset = self.image_offset.or(parent.image_offset);
        self.is_new_line = self.is_new_line.or(parent.is_new_line);
        self.event = self.event.or_else(|| parent.event.clone());
        self
    }

    /// Whether this frame marks a line break
    pub fn is_new_line(&self) -> bool {
        self.is_new_line == Some(true)
    }

    /// Whether this frame is an inline image
    pub fn is_image(&self) -> bool {
        self.is_image == Some(true)
    }
}

/// Uniformly styled piece of the parsed text
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Run {
    /// Text with entities decoded; empty for line breaks and images
    pub text: String,
    /// Active style, `None` outside any tag
    pub style: Option<StyleFrame>,
}

impl Run {
    /// Style of the run, or the empty frame
    pub fn style_or_default(&self) -> StyleFrame {
        self.style.clone().unwrap_or_default()
    }
}

/// One `name=value` attribute
struct Attribute<'a> {
    name: String,
    value: &'a str,
    quoted: bool,
}

fn attributes(body: &str) -> Vec<Attribute<'_>> {
    ATTRIBUTE_REG
        .captures_iter(body)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_ascii_lowercase();
            let raw = caps.get(2)?.as_str();
            let quoted = raw.len() >= 2 && (raw.starts_with('"') || raw.starts_with('\''));
            let value = if quoted { &raw[1..raw.len() - 1] } else { raw.trim_end_matches('/') };
            Some(Attribute { name, value, quoted })
        })
        .collect()
}

/// Leading number of `value`, or `fallback`
fn number_or(value: &str, fallback: f32) -> f32 {
    value.trim().parse().unwrap_or(fallback)
}

/// Leading integer of `value`, like a lenient `parseInt`
fn leading_integer(value: &str) -> Option<f32> {
    let value = value.trim();
    let sign_len = usize::from(value.starts_with('-') || value.starts_with('+'));
    let digits = value[sign_len..].chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    value[..sign_len + digits].parse::<i64>().ok().map(|n| n as f32)
}

fn parse_offset(value: &str) -> Vec2 {
    match value.split_once(',') {
        Some((x, y)) => Vec2::new(number_or(x, 0.0), number_or(y, 0.0)),
        None => Vec2::new(0.0, number_or(value, 0.0)),
    }
}

fn event_from(attrs: &[Attribute<'_>]) -> Option<ClickEvent> {
    let click = attrs.iter().find(|a| a.name == "click")?;
    let param = attrs.iter().find(|a| a.name == "param").map(|a| a.value.to_string());
    Some(ClickEvent { click: click.value.to_string(), param })
}

/// Decode the supported HTML entities
pub fn unescape_entities(text: &str) -> String {
    let mut decoded = text.to_string();
    for (entity, symbol) in ENTITIES {
        if decoded.contains(entity) {
            decoded = decoded.replace(entity, symbol);
        }
    }
    decoded
}

/// What a tag does to the parser state
enum TagAction {
    /// Push a style frame
    Open(StyleFrame),
    /// Emit a zero-text run without touching the stack
    Standalone(Option<StyleFrame>),
}

/// Markup to [`Run`] converter
///
/// The style stack lives only for the duration of one [`parse`](Self::parse)
/// call.
#[derive(Debug, Default)]
pub struct MarkupParser {
    stack: Vec<StyleFrame>,
    runs: Vec<Run>,
}

impl MarkupParser {
    /// Create a parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `markup` into runs in document order
    pub fn parse(&mut self, markup: &str) -> Vec<Run> {
        self.stack.clear();
        self.runs.clear();

        let mut start = 0;
        while start < markup.len() {
            let Some((tag_begin, tag_end)) = next_tag(markup, start) else {
                self.push_text(&markup[start..]);
                break;
            };

            let body = &markup[tag_begin + 1..tag_end];
            if body.trim().is_empty() {
                // "<>" carries no tag and stays literal
                self.push_text(&markup[start..=tag_end]);
                start = tag_end + 1;
                continue;
            }

            self.push_text(&markup[start..tag_begin]);
            if body.starts_with('/') {
                self.stack.pop();
            } else {
                self.apply_tag(body);
            }
            start = tag_end + 1;
        }

        std::mem::take(&mut self.runs)
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.runs.push(Run {
            text: unescape_entities(text),
            style: self.stack.last().cloned(),
        });
    }

    fn apply_tag(&mut self, body: &str) {
        match parse_tag(body) {
            TagAction::Open(frame) => {
                let frame = match self.stack.last() {
                    Some(parent) => frame.inherit(parent),
                    None => frame,
                };
                self.stack.push(frame);
            }
            TagAction::Standalone(Some(frame)) => self.runs.push(Run { text: String::new(), style: Some(frame) }),
            TagAction::Standalone(None) => {}
        }
    }
}

/// Byte range of the next `<...>` at or after `start`
///
/// A `>` with no `<` before it is literal text, as is a `<` with no `>`.
fn next_tag(markup: &str, start: usize) -> Option<(usize, usize)> {
    let mut search = start;
    loop {
        let tag_end = search + markup[search..].find('>')?;
        if let Some(tag_begin) = markup[start..tag_end].rfind('<') {
            return Some((start + tag_begin, tag_end));
        }
        search = tag_end + 1;
    }
}

fn parse_tag(body: &str) -> TagAction {
    let trimmed = body.trim();
    let self_closing = trimmed.ends_with('/');
    let name_match = TAG_NAME_REG.captures(trimmed).and_then(|caps| caps.get(1));
    let name = name_match.map_or(String::new(), |m| m.as_str().to_ascii_lowercase());
    let rest = &trimmed[name_match.map_or(0, |m| m.end())..];
    let attrs = attributes(trimmed);
    let value_of = |key: &str| attrs.iter().find(|a| a.name == key).map(|a| a.value);

    let mut frame = StyleFrame::default();
    match name.as_str() {
        "br" if self_closing => {
            return TagAction::Standalone(Some(StyleFrame { is_new_line: Some(true), ..StyleFrame::default() }));
        }
        "img" if self_closing => return TagAction::Standalone(parse_image(&attrs)),
        "color" => {
            frame.color = value_of("color").map(parse_color_literal);
            frame.event = event_from(&attrs);
        }
        "size" => {
            frame.size = value_of("size").and_then(leading_integer);
            frame.event = event_from(&attrs);
        }
        "cg" => {
            let mut gradient = ColorGradient::default();
            for attr in &attrs {
                let corner = parse_color_literal(attr.value);
                match attr.name.as_str() {
                    "lb" => gradient.lb = corner,
                    "rb" => gradient.rb = corner,
                    "lt" => gradient.lt = corner,
                    "rt" => gradient.rt = corner,
                    _ => {}
                }
            }
            frame.color_gradient = Some(gradient);
        }
        "face" => {
            let mut face = FaceStyle::default();
            for attr in &attrs {
                match attr.name.as_str() {
                    "color" => face.color = parse_color_literal(attr.value),
                    "dilate" => face.dilate = number_or(attr.value, face.dilate),
                    "softness" => face.softness = number_or(attr.value, face.softness),
                    _ => {}
                }
            }
            frame.face = Some(face);
            frame.event = event_from(&attrs);
        }
        "outline" => {
            let mut outline = OutlineStyle::default();
            for attr in &attrs {
                match attr.name.as_str() {
                    "color" => outline.color = parse_color_literal(attr.value),
                    "thickness" => outline.thickness = number_or(attr.value, outline.thickness),
                    _ => {}
                }
            }
            frame.outline = Some(outline);
            frame.event = event_from(&attrs);
        }
        "underlay" => {
            let mut underlay = UnderlayStyle::default();
            for attr in &attrs {
                match attr.name.as_str() {
                    "color" => underlay.color = parse_color_literal(attr.value),
                    "x" => underlay.x = number_or(attr.value, underlay.x),
                    "y" => underlay.y = number_or(attr.value, underlay.y),
                    "dilate" => underlay.dilate = number_or(attr.value, underlay.dilate),
                    "softness" => underlay.softness = number_or(attr.value, underlay.softness),
                    _ => {}
                }
            }
            frame.underlay = Some(underlay);
            frame.event = event_from(&attrs);
        }
        "glow" => {
            let mut glow = GlowStyle::default();
            for attr in &attrs {
                match attr.name.as_str() {
                    "color" => glow.color = parse_color_literal(attr.value),
                    "offset" => glow.offset = number_or(attr.value, glow.offset),
                    "inner" => glow.inner = number_or(attr.value, glow.inner),
                    "outer" => glow.outer = number_or(attr.value, glow.outer),
                    "power" => glow.power = number_or(attr.value, glow.power),
                    _ => {}
                }
            }
            frame.glow = Some(glow);
            frame.event = event_from(&attrs);
        }
        "u" | "s" => {
            if name == "u" {
                frame.underline = Some(true);
            } else {
                frame.strikethrough = Some(true);
            }
            frame.offset = rest
                .trim_start()
                .strip_prefix('=')
                .and_then(|v| v.split_whitespace().next())
                .map(|v| number_or(v, 0.0));
            frame.event = event_from(&attrs);
        }
        "i" => {
            frame.italic = Some(true);
            frame.event = event_from(&attrs);
        }
        "b" => {
            frame.bold = Some(true);
            frame.event = event_from(&attrs);
        }
        _ => log::debug!("Unknown markup tag <{trimmed}> opens an empty style"),
    }
    TagAction::Open(frame)
}

/// Image frame; only a quoted `src` makes the tag valid
fn parse_image(attrs: &[Attribute<'_>]) -> Option<StyleFrame> {
    let src = attrs.iter().find(|a| a.name == "src")?;
    if !src.quoted {
        log::warn!("Ignoring <img> with unquoted src {}", src.value);
        return None;
    }

    let mut frame = StyleFrame {
        is_image: Some(true),
        src: Some(src.value.to_string()),
        ..StyleFrame::default()
    };
    for attr in attrs {
        match attr.name.as_str() {
            "height" => frame.image_height = leading_integer(attr.value),
            "width" => frame.image_width = leading_integer(attr.value),
            "align" => frame.image_align = Some(ImageAlign::parse(attr.value)),
            "offset" => frame.image_offset = Some(parse_offset(attr.value)),
            _ => {}
        }
    }
    frame.event = event_from(attrs);
    Some(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(markup: &str) -> Vec<Run> {
        MarkupParser::new().parse(markup)
    }

    #[test]
    fn test_nested_tags_inherit_and_revert() {
        let runs = parse("<color=#ff0000>A<i>B</i>C</color>");
        assert_eq!(runs.len(), 3);

        let red = Some(color::RED);
        assert_eq!(runs[0].text, "A");
        assert_eq!(runs[0].style.as_ref().unwrap().color, red);
        assert_eq!(runs[0].style.as_ref().unwrap().italic, None);

        assert_eq!(runs[1].text, "B");
        assert_eq!(runs[1].style.as_ref().unwrap().color, red);
        assert_eq!(runs[1].style.as_ref().unwrap().italic, Some(true));

        assert_eq!(runs[2].text, "C");
        assert_eq!(runs[2].style.as_ref().unwrap().italic, None);
    }

    #[test]
    fn test_line_break_emits_standalone_run() {
        let runs = parse("line1<br/>line2");
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0], Run { text: "line1".into(), style: None });
        assert_eq!(runs[1].text, "");
        assert!(runs[1].style.as_ref().unwrap().is_new_line());
        assert_eq!(runs[2], Run { text: "line2".into(), style: None });
    }

    #[test]
    fn test_break_inside_tag_keeps_stack() {
        let runs = parse("<i>a<br />b</i>");
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[2].style.as_ref().unwrap().italic, Some(true));
        assert_eq!(runs[1].style.as_ref().unwrap().italic, None);
    }

    #[test]
    fn test_image_attributes() {
        let runs = parse(r#"a<img src='smile' height=30 width=40 align=top offset=2,3 click="tap" param='7'/>b"#);
        assert_eq!(runs.len(), 3);

        let image = runs[1].style.as_ref().unwrap();
        assert!(image.is_image());
        assert_eq!(image.src.as_deref(), Some("smile"));
        assert_eq!(image.image_height, Some(30.0));
        assert_eq!(image.image_width, Some(40.0));
        assert_eq!(image.image_align, Some(ImageAlign::Top));
        assert_eq!(image.image_offset, Some(Vec2::new(2.0, 3.0)));
        assert_eq!(image.event, Some(ClickEvent { click: "tap".into(), param: Some("7".into()) }));
        assert_eq!(runs[2].style, None);
    }

    #[test]
    fn test_image_with_unquoted_src_is_dropped() {
        let runs = parse("a<img src=smile/>b");
        let texts: Vec<&str> = runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[test]
    fn test_single_offset_is_vertical() {
        let runs = parse("<img src=\"x\" offset=5 />");
        assert_eq!(runs[0].style.as_ref().unwrap().image_offset, Some(Vec2::new(0.0, 5.0)));
    }

    #[test]
    fn test_decorations_with_offsets() {
        let runs = parse("<u=2>a</u><s>b</s>");
        let u = runs[0].style.as_ref().unwrap();
        assert_eq!(u.underline, Some(true));
        assert_eq!(u.offset, Some(2.0));
        let s = runs[1].style.as_ref().unwrap();
        assert_eq!(s.strikethrough, Some(true));
        assert_eq!(s.offset, None);
    }

    #[test]
    fn test_color_with_event() {
        let runs = parse("<color=green click='buy' param=\"sword\">x</color>");
        let style = runs[0].style.as_ref().unwrap();
        assert_eq!(style.color, Some(color::GREEN));
        assert_eq!(style.event.as_ref().unwrap().click, "buy");
        assert_eq!(style.event.as_ref().unwrap().param.as_deref(), Some("sword"));
    }

    #[test]
    fn test_unquoted_event_value_is_accepted() {
        let runs = parse("<b click=go>x</b>");
        assert_eq!(runs[0].style.as_ref().unwrap().event.as_ref().unwrap().click, "go");
    }

    #[test]
    fn test_size_is_lenient_integer() {
        assert_eq!(parse("<size=24px>x</size>")[0].style.as_ref().unwrap().size, Some(24.0));
        assert_eq!(parse("<size=big>x</size>")[0].style.as_ref().unwrap().size, None);
    }

    #[test]
    fn test_sdf_tags_use_defaults_for_malformed_values() {
        let runs = parse("<outline color=#0000ff thickness=oops><glow power=2>x</glow></outline>");
        let style = runs[0].style.as_ref().unwrap();
        let outline = style.outline.unwrap();
        assert_eq!(outline.color, color::BLUE);
        assert_eq!(outline.thickness, 0.1);
        let glow = style.glow.unwrap();
        assert_eq!(glow.power, 2.0);
        assert_eq!(glow.color, color::BLACK);
    }

    #[test]
    fn test_gradient_defaults_to_white() {
        let runs = parse("<cg lb=#ff0000>x</cg>");
        let gradient = runs[0].style.as_ref().unwrap().color_gradient.unwrap();
        assert_eq!(gradient.lb, color::RED);
        assert_eq!(gradient.rt, color::WHITE);
    }

    #[test]
    fn test_underlay_and_face() {
        let runs = parse("<underlay x=0.5 y=-0.5 softness=0.3><face dilate=0.4>x</face></underlay>");
        let style = runs[0].style.as_ref().unwrap();
        let underlay = style.underlay.unwrap();
        assert_eq!((underlay.x, underlay.y, underlay.softness), (0.5, -0.5, 0.3));
        assert_eq!(underlay.dilate, 0.5);
        assert_eq!(style.face.unwrap().dilate, 0.4);
    }

    #[test]
    fn test_entities_are_decoded() {
        let runs = parse("a &lt;b&gt; &amp;&nbsp;c");
        assert_eq!(runs[0].text, "a <b> & c");
    }

    #[test]
    fn test_stray_brackets_are_literal() {
        let runs = parse("1 < 2 <i>x</i> 3 > 2");
        let texts: Vec<&str> = runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["1 < 2 ", "x", " 3 > 2"]);

        let runs = parse("a<>b");
        assert_eq!(runs[0].text, "a<>");
        assert_eq!(runs[1].text, "b");
    }

    #[test]
    fn test_unclosed_tag_styles_rest() {
        let runs = parse("<i>a</i></i>b<u>c");
        assert_eq!(runs[1].style, None);
        assert_eq!(runs[2].style.as_ref().unwrap().underline, Some(true));
    }

    #[test]
    fn test_parser_is_reusable() {
        let mut parser = MarkupParser::new();
        parser.parse("<i>unclosed");
        let runs = parser.parse("plain");
        assert_eq!(runs[0].style, None);
    }
}
