//! Label scenarios from font file to world-space vertex buffer
//!
//! Exercises loading, presets, layout and assembly together the way a
//! host drives a label every frame.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::foundation::math::{Mat4, Vec2, Vec3};
use crate::tests::fixtures::test_atlas;
use crate::text::mesh::FLOATS_PER_VERTEX;
use crate::text::{FontAtlas, HorizontalAlign, LabelConfig, Overflow, TextLabel};
use approx::assert_relative_eq;

#[cfg(test)]
mod tests {
    use super::*;

    const FONT_JSON: &str = r#"{
        "size": 32, "lineHeight": 32, "base": 26, "scaleW": 128, "scaleH": 128,
        "pages": 1, "pageData": [{"id": 0, "file": "title.png"}],
        "charData": [
            {"id": 65, "x": 0, "y": 0, "width": 20, "height": 30, "xoffset": 1, "yoffset": 2, "xadvance": 22, "page": 0}
        ]
    }"#;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("text_engine_{}_{name}", std::process::id()))
    }

    #[test]
    fn test_font_file_to_world_buffer() {
        let path = temp_path("title.json");
        std::fs::write(&path, FONT_JSON).unwrap();
        let atlas = FontAtlas::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let mut label = TextLabel::new(LabelConfig {
            anchor: Vec2::zeros(),
            ..LabelConfig::default()
        });
        label.set_font(Arc::new(atlas));
        label.set_string("AA");
        assert!(label.update_render_data());

        let mesh = label.mesh();
        assert_eq!(mesh.quad_count(), 2);

        let world = Mat4::new_translation(&Vec3::new(100.0, -50.0, 0.0));
        let mut buffer = Vec::new();
        mesh.write_world_buffer(&world, &mut buffer);

        assert_eq!(buffer.len(), mesh.vertices.len() * FLOATS_PER_VERTEX);
        for (i, vertex) in mesh.vertices.iter().enumerate() {
            let base = i * FLOATS_PER_VERTEX;
            assert_relative_eq!(buffer[base], vertex.position[0] + 100.0);
            assert_relative_eq!(buffer[base + 1], vertex.position[1] - 50.0);
            assert_relative_eq!(buffer[base + 3], vertex.uv[0]);
        }
    }

    #[test]
    fn test_missing_font_file_is_io_error() {
        let err = FontAtlas::load(temp_path("does_not_exist.json")).unwrap_err();
        assert!(matches!(err, crate::text::FontError::Io(_)));
    }

    #[test]
    fn test_preset_file_drives_wrapped_label() {
        let preset = LabelConfig {
            font_size: 20.0,
            line_height: 20.0,
            overflow: Overflow::ResizeHeight,
            horizontal_align: HorizontalAlign::Right,
            content_size: Vec2::new(60.0, 0.0),
            anchor: Vec2::zeros(),
            ..LabelConfig::default()
        };
        let path = temp_path("label.ron");
        let path_str = path.to_string_lossy().into_owned();
        preset.save_to_file(&path_str).unwrap();
        let loaded = LabelConfig::load_from_file(&path_str).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, preset);

        let mut label = TextLabel::new(loaded);
        label.set_font(Arc::new(test_atlas()));
        label.set_string("hello world");
        label.update_render_data();

        assert_eq!(label.number_of_lines(), 2);
        assert_eq!(label.content_size(), Vec2::new(60.0, 40.0));

        // "world" is 50 wide on a 60 wide line
        let w = label.pos_vertices(6).unwrap();
        assert_relative_eq!(w[0].x, 10.0);
    }

    #[test]
    fn test_relayout_after_resize_keeps_quads_in_bounds() {
        let mut label = TextLabel::new(LabelConfig {
            font_size: 20.0,
            line_height: 20.0,
            overflow: Overflow::Clamp,
            enable_wrap_text: false,
            anchor: Vec2::zeros(),
            content_size: Vec2::new(100.0, 20.0),
            ..LabelConfig::default()
        });
        label.set_font(Arc::new(test_atlas()));
        label.set_string("abcdefgh");
        label.update_render_data();
        assert_eq!(label.mesh().quad_count(), 8);

        label.set_content_size(Vec2::new(35.0, 20.0));
        assert!(label.update_render_data());
        for vertex in &label.mesh().vertices {
            assert!(vertex.position[0] <= 35.0 + 1e-4);
        }
        assert_eq!(label.mesh().quad_count(), 4);
    }
}
