//! Rich text scenarios: markup in, styled and placed segments out

use std::sync::Arc;

use crate::config::Config;
use crate::foundation::color;
use crate::foundation::math::{Rect, Vec2};
use crate::rich_text::{RichTextComposer, RichTextConfig, Segment, SpriteAtlas, SpriteFrame};
use crate::tests::fixtures::test_atlas;
use crate::text::HorizontalAlign;
use approx::assert_relative_eq;

#[cfg(test)]
mod tests {
    use super::*;

    fn compose(markup: &str, config: RichTextConfig) -> RichTextComposer {
        let mut composer = RichTextComposer::new(config);
        let sprites = SpriteAtlas::new().with_frame(SpriteFrame::new("coin", Rect::new(0.0, 0.0, 40.0, 20.0)));
        composer.set_image_atlas(Some(Arc::new(sprites)));
        composer.set_string(markup);
        composer.set_font(Arc::new(test_atlas()));
        composer
    }

    fn small() -> RichTextConfig {
        RichTextConfig {
            font_size: 20.0,
            line_height: 20.0,
            anchor: Vec2::zeros(),
            ..RichTextConfig::default()
        }
    }

    fn text_segment(composer: &RichTextComposer, index: usize) -> &crate::rich_text::TextSegment {
        match &composer.segments()[index] {
            Segment::Text(text) => text,
            Segment::Image(_) => panic!("segment {index} is an image"),
        }
    }

    #[test]
    fn test_styles_reach_segment_labels() {
        let composer = compose(
            "<i>slant</i> <u>under</u><br/><outline color=#00ff00 thickness=0.2>edge</outline>",
            small(),
        );

        let summary: Vec<(&str, usize)> = composer.segments().iter().map(|s| (s.text(), s.line_count())).collect();
        assert_eq!(summary, vec![("slant", 1), (" ", 1), ("under", 1), ("edge", 2)]);

        assert!(text_segment(&composer, 0).label.config().italic);

        let under = &text_segment(&composer, 2).label;
        assert!(under.config().underline);
        assert_eq!(under.mesh().quad_count(), 5 + 3);

        let edge = &text_segment(&composer, 3).label;
        assert!(edge.config().sdf.enable_outline);
        assert_eq!(edge.config().sdf.outline_color, color::GREEN);
        assert_relative_eq!(edge.config().sdf.outline_thickness, 0.2);
        assert!(edge.shader_defines()["USE_OUTLINE"]);
        assert!(!edge.config().italic);
    }

    #[test]
    fn test_size_tag_scales_segment() {
        let composer = compose("a<size=40>b</size>", small());

        assert_relative_eq!(composer.segments()[1].size().x, 20.0);
        assert_relative_eq!(composer.segments()[1].position().x, 10.0);
        assert_relative_eq!(composer.content_size().x, 30.0);
    }

    #[test]
    fn test_entities_render_literally() {
        let composer = compose("&lt;b&gt;", small());
        assert_eq!(composer.segments().len(), 1);
        assert_eq!(composer.segments()[0].text(), "<b>");
    }

    #[test]
    fn test_cjk_wraps_between_characters() {
        let composer = compose("中文中文中文", RichTextConfig { max_width: 50.0, ..small() });

        let summary: Vec<(&str, usize)> = composer.segments().iter().map(|s| (s.text(), s.line_count())).collect();
        assert_eq!(summary, vec![("中文", 1), ("中文", 2), ("中文", 3)]);
        assert!(composer.segments().iter().all(|s| s.size().x <= 50.0));
    }

    #[test]
    fn test_clickable_image() {
        let composer = compose("<img src='coin' click='collect' param='5'/>", small());
        let image = &composer.segments()[0];

        assert!(image.is_image());
        assert_eq!(image.size(), Vec2::new(40.0, 20.0));
        assert_relative_eq!(image.position().y, 2.6, epsilon = 1e-4);

        let hits = composer.hit_test(Vec2::new(20.0, 10.0));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].click, "collect");
        assert_eq!(hits[0].param.as_deref(), Some("5"));
        assert!(composer.hit_test(Vec2::new(60.0, 10.0)).is_empty());
    }

    #[test]
    fn test_preset_file_configures_composer() {
        let preset = RichTextConfig {
            horizontal_align: HorizontalAlign::Right,
            ..small()
        };
        let path = std::env::temp_dir().join(format!("text_engine_{}_rich.toml", std::process::id()));
        let path_str = path.to_string_lossy().into_owned();
        preset.save_to_file(&path_str).unwrap();
        let loaded = RichTextConfig::load_from_file(&path_str).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, preset);

        let composer = compose("abcd<br/>ab", loaded);
        // Right aligned: label width 40, second line is 20 wide
        assert_relative_eq!(composer.segments()[0].position().x, 0.0);
        assert_relative_eq!(composer.segments()[1].position().x, 20.0);
    }

    #[test]
    fn test_rebuild_recycles_segments() {
        let mut composer = compose("one<br/>two<br/>three", small());
        assert_eq!(composer.segments().len(), 3);

        composer.set_string("four");
        assert_eq!(composer.segments().len(), 1);
        assert_eq!(composer.segments()[0].text(), "four");
        assert_eq!(composer.line_count(), 1);
    }
}
