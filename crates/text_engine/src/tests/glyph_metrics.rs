//! Glyph bearings through layout and assembly
//!
//! Uses an atlas where offsets, ink width and advance all differ so that
//! pen position, line right edge and quad corners can be told apart.

use crate::foundation::math::Vec2;
use crate::tests::fixtures::metrics_atlas;
use crate::text::{LayoutEngine, LayoutParams, Overflow, QuadAssembler, QuadColors, TextLayout, TextMesh};
use approx::assert_relative_eq;

#[cfg(test)]
mod tests {
    use super::*;

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
        let atlas = metrics_atlas();
        let mut layout = LayoutEngine::layout(&atlas, text, p);
        let mesh = QuadAssembler::assemble(&atlas, &mut layout, p, &QuadColors::default());
        (layout, mesh)
    }

    #[test]
    fn test_bearings_move_letters_not_cursor() {
        let (layout, _) = build("Ai A", &params(Overflow::None, 0.0, 0.0));

        let xs: Vec<f32> = layout.letters.iter().map(|l| l.x).collect();
        let ys: Vec<f32> = layout.letters.iter().map(|l| l.y).collect();
        // Pen advances 14, 6, 8; each glyph is pushed right by its offset_x
        assert_eq!(xs, vec![2.0, 15.0, 20.0, 30.0]);
        assert_eq!(ys, vec![-4.0, -6.0, 0.0, -4.0]);

        assert_eq!(layout.lines_width, vec![42.0]);
        assert_relative_eq!(layout.content_size.x, 42.0);
        assert_relative_eq!(layout.rich_text_delta_x, 0.0);
    }

    #[test]
    fn test_quad_corners_follow_offsets() {
        let (layout, mesh) = build("Ai A", &params(Overflow::None, 0.0, 0.0));

        assert_eq!(mesh.quad_count(), 3);
        let quads: Vec<Option<usize>> = layout.letters.iter().map(|l| l.quads_index).collect();
        assert_eq!(quads, vec![Some(0), Some(1), None, Some(2)]);

        // 'A' is 10 wide, 16 tall, dropped 4 below the top of a 20px line
        let a = mesh.quad(0).unwrap();
        assert_eq!(a[0].position, [2.0, 0.0, 0.0]);
        assert_eq!(a[1].position, [12.0, 0.0, 0.0]);
        assert_eq!(a[2].position, [2.0, 16.0, 0.0]);
        assert_eq!(a[3].position, [12.0, 16.0, 0.0]);
        assert_relative_eq!(a[3].uv[0], 10.0 / 256.0);
        assert_relative_eq!(a[0].uv[1], 16.0 / 256.0);

        let i = mesh.quad(1).unwrap();
        assert_eq!(i[0].position, [15.0, 0.0, 0.0]);
        assert_eq!(i[3].position, [19.0, 14.0, 0.0]);

        let second_a = mesh.quad(2).unwrap();
        assert_eq!(second_a[0].position, [30.0, 0.0, 0.0]);
        assert_eq!(second_a[3].position, [40.0, 16.0, 0.0]);
    }

    #[test]
    fn test_wrap_uses_advance_not_ink() {
        // Third 'A' ends its ink at 40 but its advance reaches 42
        let (wrapped, _) = build("AAA", &params(Overflow::ResizeHeight, 40.0, 0.0));
        assert_eq!(wrapped.number_of_lines, 2);
        assert_eq!(wrapped.lines_width, vec![28.0, 14.0]);
        let third = wrapped.letters[2];
        assert_eq!((third.x, third.y, third.line), (2.0, -24.0, 1));

        let (fits, _) = build("AAA", &params(Overflow::ResizeHeight, 42.0, 0.0));
        assert_eq!(fits.number_of_lines, 1);
        assert_eq!(fits.lines_width, vec![42.0]);
    }

    #[test]
    fn test_ellipsis_stays_inside_line() {
        let max_width = 40.0;
        let (layout, mesh) = build("AAAA", &params(Overflow::Ellipsis, max_width, 20.0));

        let summary: Vec<(char, f32)> = layout.letters.iter().map(|l| (l.ch, l.x)).collect();
        assert_eq!(summary, vec![('A', 2.0), ('.', 15.0), ('.', 20.0), ('.', 25.0)]);
        assert_eq!(layout.lines_width, vec![29.0]);
        assert!(layout.lines_width[0] <= max_width);

        // Cursor stopped at 28 while the dots end at 29
        assert_relative_eq!(layout.rich_text_delta_x, -1.0);

        let right_most = (0..mesh.quad_count())
            .map(|q| mesh.quad(q).unwrap()[3].position[0])
            .fold(f32::MIN, f32::max);
        assert_relative_eq!(right_most, 28.0);
        assert!(right_most <= max_width);

        // Dots hang 15 below the line top and are 3 tall
        let dot = mesh.quad(1).unwrap();
        assert_eq!(dot[0].position, [15.0, 2.0, 0.0]);
        assert_eq!(dot[3].position, [18.0, 5.0, 0.0]);
    }
}
