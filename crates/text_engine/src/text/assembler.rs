//! Quad assembly
//!
//! Turns a finished [`TextLayout`] into a [`TextMesh`]: one quad per drawn
//! glyph, clipped in CLAMP mode, sheared for italic, followed by the
//! three-piece underline and strikethrough bars. Also owns the per-glyph
//! extra colour channel and the character-addressed vertex accessors used by
//! animation code.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

use crate::foundation::color;
use crate::foundation::math::{Rect, Vec3, Vec4};
use super::chars::is_unicode_space;
use super::font_atlas::{FontAtlas, GlyphDef};
use super::layout::{italic_vector, LayoutParams, LetterInfo, Overflow, TextLayout, UNDERLINE_CHAR};
use super::mesh::{QuadGeometry, TextMesh};

/// Corner colours multiplied into the extra colour channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorGradient {
    /// Left bottom
    pub lb: Vec4,
    /// Right bottom
    pub rb: Vec4,
    /// Left top
    pub lt: Vec4,
    /// Right top
    pub rt: Vec4,
}

impl Default for ColorGradient {
    fn default() -> Self {
        Self { lb: color::WHITE, rb: color::WHITE, lt: color::WHITE, rt: color::WHITE }
    }
}

impl ColorGradient {
    /// Colours in vertex order `[LB, RB, LT, RT]`
    pub fn corners(&self) -> [Vec4; 4] {
        [self.lb, self.rb, self.lt, self.rt]
    }
}

/// Colour inputs of one assembly pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadColors {
    /// Primary vertex colour
    pub color: Vec4,
    /// Gradient applied to the extra channel, if enabled
    pub gradient: Option<ColorGradient>,
}

impl Default for QuadColors {
    fn default() -> Self {
        Self { color: color::WHITE, gradient: None }
    }
}

/// First and last glyph drawn on a line, for decoration bars
#[derive(Debug, Clone, Copy)]
struct LineSpan {
    first: usize,
    last: usize,
}

/// Builds glyph and decoration quads
pub struct QuadAssembler;

impl QuadAssembler {
    /// Emit the mesh for a layout
    ///
    /// Assigns `quads_index` on every letter that produced a quad and clears
    /// it on every other letter.
    pub fn assemble(atlas: &FontAtlas, layout: &mut TextLayout, params: &LayoutParams, colors: &QuadColors) -> TextMesh {
        let mut mesh = TextMesh::new();
        let anchor_x = params.anchor.x * layout.content_size.x;
        let anchor_y = params.anchor.y * layout.content_size.y;
        let scale = layout.scale;
        let clamp = params.overflow == Overflow::Clamp;
        let wants_bars = params.underline || params.strikethrough;

        let mut spans: BTreeMap<usize, LineSpan> = BTreeMap::new();

        for index in 0..layout.letters.len() {
            let letter = layout.letters[index];
            layout.letters[index].quads_index = None;
            if !letter.valid {
                continue;
            }
            let Some(def) = atlas.glyph_by_key(letter.key) else {
                continue;
            };

            let mut uv = Rect::new(def.u, def.v, def.w, def.h);
            let mut py = letter.y + layout.letter_offset_y;

            if layout.label_height > 0.0 && clamp {
                if py > layout.tailored_top_y {
                    let clip_top = py - layout.tailored_top_y;
                    uv.y += clip_top / scale;
                    uv.height -= clip_top / scale;
                    py -= clip_top;
                }
                if py - uv.height * scale < layout.tailored_bottom_y {
                    uv.height = if py < layout.tailored_bottom_y {
                        0.0
                    } else {
                        (py - layout.tailored_bottom_y) / scale
                    };
                }
            }

            let mut px = letter.x + layout.line_offset_x(letter.line);
            if layout.label_width > 0.0 && clamp {
                if px < 0.0 {
                    uv.x += -px / scale;
                    uv.width -= -px / scale;
                    px = 0.0;
                }
                let overshoot = px + uv.width * scale - layout.content_size.x;
                if overshoot > 0.0 {
                    uv.width -= overshoot / scale;
                }
            }

            if uv.width <= 0.0 || uv.height <= 0.0 {
                continue;
            }

            let pos = Rect::new(px - anchor_x, py - anchor_y, uv.width * scale, uv.height * scale);
            let Some(quad) = quad_geometry(atlas, def.texture_id, uv, pos, params.italic) else {
                continue;
            };
            layout.letters[index].quads_index = Some(mesh.push_quad(&quad, colors.color));

            if wants_bars && !is_unicode_space(letter.ch) {
                spans
                    .entry(letter.line)
                    .and_modify(|span| span.last = span.last.max(index))
                    .or_insert(LineSpan { first: index, last: index });
            }
        }

        if wants_bars {
            match atlas.glyph(UNDERLINE_CHAR).copied() {
                Some(bar) => {
                    let font_size = layout.font_size;
                    if params.underline {
                        let offset_y = -font_size + params.underline_offset * scale;
                        emit_bars(atlas, layout, params, &spans, &bar, offset_y, &mut mesh, colors.color);
                    }
                    if params.strikethrough {
                        let offset_y = -font_size / 2.0 + params.strikethrough_offset * scale;
                        emit_bars(atlas, layout, params, &spans, &bar, offset_y, &mut mesh, colors.color);
                    }
                }
                None => log::warn!("Decoration glyph '{UNDERLINE_CHAR}' missing from font atlas, bars disabled"),
            }
        }

        update_color_extra(&layout.letters, &mut mesh, colors.gradient.as_ref());
        mesh
    }
}

/// Left cap, right cap and stretched middle of one bar per line
fn emit_bars(
    atlas: &FontAtlas,
    layout: &TextLayout,
    params: &LayoutParams,
    spans: &BTreeMap<usize, LineSpan>,
    bar: &GlyphDef,
    offset_y: f32,
    mesh: &mut TextMesh,
    color: Vec4,
) {
    let scale = layout.scale;
    let anchor_x = params.anchor.x * layout.content_size.x;
    let anchor_y = params.anchor.y * layout.content_size.y;

    for (&line, span) in spans {
        let first = layout.letters[span.first];
        let last = layout.letters[span.last];
        let (Some(first_def), Some(last_def)) = (atlas.glyph_by_key(first.key), atlas.glyph_by_key(last.key)) else {
            continue;
        };

        let max_width = last.x + last_def.w * scale - first.x;
        let w_left = if max_width >= bar.w * scale { bar.w * scale / 3.0 } else { max_width / 2.0 };
        let w_right = w_left;
        let w_mid = max_width - w_left - w_right;
        let left_x = first.x + layout.line_offset_x(line);
        let mid_x = left_x + w_left;
        let right_x = mid_x + w_mid;

        let mut uv = Rect::new(bar.u, bar.v, w_left / scale, bar.h);
        let mut py = first.y + layout.letter_offset_y + first_def.offset_y * scale + offset_y;

        if layout.label_height > 0.0 {
            if py > layout.tailored_top_y {
                let clip_top = py - layout.tailored_top_y;
                uv.y += clip_top;
                uv.height -= clip_top;
                py -= clip_top;
            }
            if params.overflow == Overflow::Clamp && py - bar.h * scale < layout.tailored_bottom_y {
                uv.height = if py < layout.tailored_bottom_y {
                    0.0
                } else {
                    (py - layout.tailored_bottom_y) / scale
                };
            }
        }
        if uv.height <= 0.0 {
            continue;
        }
        let height = uv.height * scale;

        let mut push = |uv: Rect, x: f32, width: f32| {
            if uv.width <= 0.0 {
                return;
            }
            let pos = Rect::new(x - anchor_x, py - anchor_y, width, height);
            if let Some(quad) = quad_geometry(atlas, bar.texture_id, uv, pos, params.italic) {
                mesh.push_quad(&quad, color);
            }
        };

        push(uv, left_x, w_left);

        uv.width = w_right / scale;
        uv.x = bar.u + bar.w - uv.width;
        push(uv, right_x, w_right);

        if w_mid > 0.0 {
            // Middle samples the centre columns of the bar glyph
            uv.width = bar.w - w_left * 2.0 / scale;
            uv.x = bar.u + uv.width;
            push(uv, mid_x, w_mid);
        }
    }
}

/// Corner positions and UVs of one quad
///
/// `uv` is in atlas pixels, `pos.y` is the quad's top edge.
fn quad_geometry(atlas: &FontAtlas, texture_id: u32, uv: Rect, pos: Rect, italic: bool) -> Option<QuadGeometry> {
    let Some((tex_w, tex_h)) = atlas.texture_size(texture_id) else {
        log::warn!("No texture size registered for atlas page {texture_id}");
        return None;
    };
    let (tex_w, tex_h) = (tex_w as f32, tex_h as f32);

    let u_l = uv.x / tex_w;
    let u_r = (uv.x + uv.width) / tex_w;
    let v_b = (uv.y + uv.height) / tex_h;
    let v_t = uv.y / tex_h;

    let l = pos.x;
    let r = pos.x + pos.width;
    let b = pos.y - pos.height;
    let t = pos.y;

    let positions = if italic {
        let half = (t - b) / 2.0;
        let shear = italic_vector(t - b);
        let dx = shear.x.abs();
        let dy = (half - shear.y).abs();
        [
            Vec3::new(l - dx, b + dy, 0.0),
            Vec3::new(r - dx, b + dy, 0.0),
            Vec3::new(l + dx, t - dy, 0.0),
            Vec3::new(r + dx, t - dy, 0.0),
        ]
    } else {
        [Vec3::new(l, b, 0.0), Vec3::new(r, b, 0.0), Vec3::new(l, t, 0.0), Vec3::new(r, t, 0.0)]
    };

    Some(QuadGeometry {
        positions,
        uvs: [[u_l, v_b], [u_r, v_b], [u_l, v_t], [u_r, v_t]],
        texture_id,
    })
}

fn extra_corners(visible: bool, gradient: Option<&ColorGradient>) -> [Vec4; 4] {
    let alpha = if visible { 1.0 } else { 0.0 };
    let base = Vec4::new(1.0, 1.0, 1.0, alpha);
    match gradient {
        Some(gradient) => gradient.corners().map(|corner| base.component_mul(&corner)),
        None => [base; 4],
    }
}

fn write_extra(mesh: &mut TextMesh, quad_index: usize, corners: &[Vec4; 4]) {
    if let Some(vertices) = mesh.quad_mut(quad_index) {
        for (vertex, corner) in vertices.iter_mut().zip(corners) {
            vertex.color_extra = (*corner).into();
        }
    }
}

/// Recompute the extra colour of every glyph quad
///
/// Decoration quads keep plain white.
pub fn update_color_extra(letters: &[LetterInfo], mesh: &mut TextMesh, gradient: Option<&ColorGradient>) {
    for letter in letters {
        if !letter.valid || is_unicode_space(letter.ch) {
            continue;
        }
        if let Some(quad_index) = letter.quads_index {
            write_extra(mesh, quad_index, &extra_corners(letter.visible, gradient));
        }
    }
}

/// Quad of a drawable, non-whitespace letter
fn drawable_quad(letters: &[LetterInfo], index: usize) -> Option<usize> {
    let letter = letters.get(index)?;
    if !letter.valid || is_unicode_space(letter.ch) {
        return None;
    }
    letter.quads_index
}

/// Whether the character at `index` is drawn and not hidden
pub fn is_visible(letters: &[LetterInfo], index: usize) -> bool {
    letters
        .get(index)
        .is_some_and(|letter| letter.valid && letter.visible && !is_unicode_space(letter.ch))
}

/// Show or hide one character by zeroing its extra colour alpha
pub fn set_visible(
    letters: &mut [LetterInfo],
    mesh: &mut TextMesh,
    index: usize,
    visible: bool,
    gradient: Option<&ColorGradient>,
) {
    let Some(quad_index) = drawable_quad(letters, index) else {
        return;
    };
    if letters[index].visible == visible {
        return;
    }
    letters[index].visible = visible;
    write_extra(mesh, quad_index, &extra_corners(visible, gradient));
}

/// Extra colours of a character's quad in `[LB, RB, LT, RT]` order
pub fn color_extra_vertices(letters: &[LetterInfo], mesh: &TextMesh, index: usize) -> Option<[Vec4; 4]> {
    let letter = letters.get(index)?;
    if !letter.valid {
        return None;
    }
    let vertices = mesh.quad(letter.quads_index?)?;
    Some([0, 1, 2, 3].map(|i| Vec4::from(vertices[i].color_extra)))
}

/// Overwrite the extra colours of a character's quad
pub fn set_color_extra_vertices(letters: &[LetterInfo], mesh: &mut TextMesh, index: usize, colors: [Vec4; 4]) {
    if let Some(quad_index) = drawable_quad(letters, index) {
        write_extra(mesh, quad_index, &colors);
    }
}

/// Corner positions of a character's quad in `[LB, RB, LT, RT]` order
pub fn pos_vertices(letters: &[LetterInfo], mesh: &TextMesh, index: usize) -> Option<[Vec3; 4]> {
    let letter = letters.get(index)?;
    if !letter.valid {
        return None;
    }
    let vertices = mesh.quad(letter.quads_index?)?;
    Some([0, 1, 2, 3].map(|i| Vec3::from(vertices[i].position)))
}

/// Overwrite the corner positions of a character's quad
pub fn set_pos_vertices(letters: &[LetterInfo], mesh: &mut TextMesh, index: usize, positions: [Vec3; 4]) {
    let Some(quad_index) = drawable_quad(letters, index) else {
        return;
    };
    if let Some(vertices) = mesh.quad_mut(quad_index) {
        for (vertex, position) in vertices.iter_mut().zip(positions) {
            vertex.position = position.into();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec2;
    use crate::tests::fixtures::test_atlas;
    use crate::text::layout::LayoutEngine;
    use approx::assert_relative_eq;

    fn params(overflow: Overflow, width: f32, height: f32) -> LayoutParams {
        LayoutParams {
            font_size: 20.0,
            line_height: 20.0,
            overflow,
            content_size: Vec2::new(width, height),
            anchor: Vec2::zeros(),
            ..LayoutParams::default()
        }
    }

    fn build(text: &str, p: &LayoutParams) -> (TextLayout, TextMesh) {
        let atlas = test_atlas();
        let mut layout = LayoutEngine::layout(&atlas, text, p);
        let mesh = QuadAssembler::assemble(&atlas, &mut layout, p, &QuadColors::default());
        (layout, mesh)
    }

    #[test]
    fn test_one_quad_per_drawn_glyph() {
        let p = params(Overflow::None, 0.0, 0.0);
        let (layout, mesh) = build("a b\nc", &p);

        assert_eq!(mesh.quad_count(), 3);
        assert_eq!(mesh.indices.len(), 18);
        let quads: Vec<Option<usize>> = layout.letters.iter().map(|l| l.quads_index).collect();
        assert_eq!(quads, vec![Some(0), None, Some(1), None, Some(2)]);
    }

    #[test]
    fn test_quad_positions_and_uvs() {
        let p = params(Overflow::None, 0.0, 0.0);
        let (_, mesh) = build("a", &p);
        let quad = mesh.quad(0).unwrap();

        // 'a' sits at (16, 96) in the 256x256 page
        assert_eq!(quad[0].position, [0.0, 0.0, 0.0]);
        assert_eq!(quad[3].position, [10.0, 20.0, 0.0]);
        assert_relative_eq!(quad[0].uv[0], 16.0 / 256.0);
        assert_relative_eq!(quad[0].uv[1], 116.0 / 256.0);
        assert_relative_eq!(quad[3].uv[0], 26.0 / 256.0);
        assert_relative_eq!(quad[3].uv[1], 96.0 / 256.0);
    }

    #[test]
    fn test_anchor_offsets_positions() {
        let mut p = params(Overflow::None, 0.0, 0.0);
        p.anchor = Vec2::new(0.5, 0.5);
        let (_, mesh) = build("ab", &p);
        assert_eq!(mesh.quad(0).unwrap()[0].position, [-10.0, -10.0, 0.0]);
    }

    #[test]
    fn test_clamp_clips_right_edge() {
        let mut p = params(Overflow::Clamp, 15.0, 20.0);
        p.enable_wrap_text = false;
        let (layout, mesh) = build("abc", &p);

        assert_eq!(mesh.quad_count(), 2);
        let b = mesh.quad(1).unwrap();
        assert_relative_eq!(b[1].position[0] - b[0].position[0], 5.0);
        assert_eq!(layout.letters[2].quads_index, None);
    }

    #[test]
    fn test_underline_adds_three_pieces_per_line() {
        let mut p = params(Overflow::None, 0.0, 0.0);
        p.underline = true;
        let (_, mesh) = build("ab\ncd", &p);
        assert_eq!(mesh.quad_count(), 4 + 6);

        // left cap of the first line spans a third of the bar glyph
        let cap = mesh.quad(4).unwrap();
        assert_relative_eq!(cap[1].position[0] - cap[0].position[0], 10.0 / 3.0, epsilon = 1e-4);
        assert_relative_eq!(cap[2].position[1], 0.0);
    }

    #[test]
    fn test_strikethrough_sits_at_half_height() {
        let mut p = params(Overflow::None, 0.0, 0.0);
        p.strikethrough = true;
        let (_, mesh) = build("ab", &p);
        assert_eq!(mesh.quad_count(), 5);
        assert_relative_eq!(mesh.quad(2).unwrap()[2].position[1], 10.0);
    }

    #[test]
    fn test_italic_shears_corners() {
        let mut p = params(Overflow::None, 0.0, 0.0);
        p.italic = true;
        let (layout, mesh) = build("a", &p);
        let quad = mesh.quad(0).unwrap();

        let shear = italic_vector(20.0);
        let l = layout.letters[0].x;
        let dy = (10.0 - shear.y).abs();
        assert_relative_eq!(quad[0].position[0], l - shear.x.abs());
        assert_relative_eq!(quad[0].position[1], dy);
        assert_relative_eq!(quad[3].position[0], l + 10.0 + shear.x.abs());
        assert_relative_eq!(quad[3].position[1], 20.0 - dy);
    }

    #[test]
    fn test_visibility_toggles_alpha() {
        let p = params(Overflow::None, 0.0, 0.0);
        let (mut layout, mut mesh) = build("ab", &p);

        set_visible(&mut layout.letters, &mut mesh, 1, false, None);
        assert!(!is_visible(&layout.letters, 1));
        let extra = color_extra_vertices(&layout.letters, &mesh, 1).unwrap();
        assert!(extra.iter().all(|c| c.w == 0.0));

        set_visible(&mut layout.letters, &mut mesh, 1, true, None);
        assert!(is_visible(&layout.letters, 1));
        let extra = color_extra_vertices(&layout.letters, &mesh, 1).unwrap();
        assert!(extra.iter().all(|c| c.w == 1.0));
    }

    #[test]
    fn test_gradient_multiplies_extra_channel() {
        let atlas = test_atlas();
        let p = params(Overflow::None, 0.0, 0.0);
        let mut layout = LayoutEngine::layout(&atlas, "a", &p);
        let gradient = ColorGradient { lb: color::RED, rt: Vec4::new(0.0, 0.0, 1.0, 0.5), ..ColorGradient::default() };
        let colors = QuadColors { color: color::WHITE, gradient: Some(gradient) };
        let mut mesh = QuadAssembler::assemble(&atlas, &mut layout, &p, &colors);

        let extra = color_extra_vertices(&layout.letters, &mesh, 0).unwrap();
        assert_eq!(extra[0], color::RED);
        assert_eq!(extra[3], Vec4::new(0.0, 0.0, 1.0, 0.5));

        set_visible(&mut layout.letters, &mut mesh, 0, false, Some(&gradient));
        let extra = color_extra_vertices(&layout.letters, &mesh, 0).unwrap();
        assert_eq!(extra[0], Vec4::new(1.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_queries_ignore_whitespace_and_missing() {
        let p = params(Overflow::None, 0.0, 0.0);
        let (mut layout, mut mesh) = build("a b", &p);

        assert!(!is_visible(&layout.letters, 1));
        assert!(color_extra_vertices(&layout.letters, &mesh, 1).is_none());
        assert!(pos_vertices(&layout.letters, &mesh, 7).is_none());

        let before = mesh.clone();
        set_visible(&mut layout.letters, &mut mesh, 1, false, None);
        set_pos_vertices(&layout.letters, &mut mesh, 1, [Vec3::zeros(); 4]);
        assert_eq!(mesh, before);
    }

    #[test]
    fn test_set_pos_vertices_round_trip() {
        let p = params(Overflow::None, 0.0, 0.0);
        let (layout, mut mesh) = build("ab", &p);
        let moved = [Vec3::new(1.0, 2.0, 0.0), Vec3::new(3.0, 2.0, 0.0), Vec3::new(1.0, 4.0, 0.0), Vec3::new(3.0, 4.0, 0.0)];

        set_pos_vertices(&layout.letters, &mut mesh, 1, moved);
        assert_eq!(pos_vertices(&layout.letters, &mesh, 1), Some(moved));
        assert_eq!(pos_vertices(&layout.letters, &mesh, 0).unwrap()[0], Vec3::zeros());
    }

    #[test]
    fn test_assembly_is_idempotent() {
        let mut p = params(Overflow::Ellipsis, 45.0, 40.0);
        p.underline = true;
        let (_, first) = build("repeatable\nquads here", &p);
        let (_, second) = build("repeatable\nquads here", &p);
        assert_eq!(first, second);
    }
}
