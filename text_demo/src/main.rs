//! Rich text demo application
//!
//! Loads an SDF font asset, composes a markup string and prints where every
//! segment landed. Handy for checking wrap and alignment presets without a
//! renderer.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, Command};
use text_engine::config::Config;
use text_engine::foundation::logging;
use text_engine::rich_text::{RichTextComposer, RichTextConfig, Segment, SpriteAtlas};
use text_engine::text::FontAtlas;

const DEFAULT_MARKUP: &str = "<color=#ffcc00>Rich</color> <i>text</i> <u>demo</u><br/><size=48>big</size> and small";

fn build_cli() -> Command {
    Command::new("text_demo")
        .about("Composes rich text with an SDF font atlas and prints the resulting segments")
        .arg(
            Arg::new("font")
                .short('f')
                .long("font")
                .value_name("JSON")
                .help("Font atlas description exported by the atlas tool")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("markup")
                .short('m')
                .long("markup")
                .value_name("TEXT")
                .help("Marked-up string to compose")
                .default_value(DEFAULT_MARKUP),
        )
        .arg(
            Arg::new("sprites")
                .long("sprites")
                .value_name("JSON")
                .help("Sprite atlas for <img> tags")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Rich text preset (.toml or .ron)"),
        )
        .arg(
            Arg::new("max-width")
                .long("max-width")
                .value_name("PIXELS")
                .help("Wrap width, 0 disables wrapping")
                .value_parser(value_parser!(f32)),
        )
        .arg(
            Arg::new("font-size")
                .long("font-size")
                .value_name("PIXELS")
                .help("Default font size")
                .value_parser(value_parser!(f32)),
        )
        .arg(
            Arg::new("line-height")
                .long("line-height")
                .value_name("PIXELS")
                .help("Distance between baselines")
                .value_parser(value_parser!(f32)),
        )
}

fn main() -> Result<()> {
    logging::init();
    let matches = build_cli().get_matches();

    let mut config = match matches.get_one::<String>("config") {
        Some(path) => RichTextConfig::load_from_file(path).with_context(|| format!("Failed to load preset {path}"))?,
        None => RichTextConfig::default(),
    };
    if let Some(&max_width) = matches.get_one::<f32>("max-width") {
        config.max_width = max_width;
    }
    if let Some(&font_size) = matches.get_one::<f32>("font-size") {
        config.font_size = font_size;
    }
    if let Some(&line_height) = matches.get_one::<f32>("line-height") {
        config.line_height = line_height;
    }

    let font_path = matches
        .get_one::<PathBuf>("font")
        .context("--font is required")?;
    let font = FontAtlas::load(font_path)
        .with_context(|| format!("Failed to load font {}", font_path.display()))?;
    log::info!("Loaded font {} with {} glyphs", font_path.display(), font.glyph_count());

    let mut composer = RichTextComposer::new(config);
    if let Some(path) = matches.get_one::<PathBuf>("sprites") {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read sprite atlas {}", path.display()))?;
        let sprites = SpriteAtlas::from_json(&json)
            .with_context(|| format!("Failed to parse sprite atlas {}", path.display()))?;
        composer.set_image_atlas(Some(Arc::new(sprites)));
    }

    let markup = matches
        .get_one::<String>("markup")
        .map_or(DEFAULT_MARKUP, String::as_str);
    composer.set_string(markup);
    composer.set_font(Arc::new(font));

    let size = composer.content_size();
    println!("Composed {} lines, {:.2} x {:.2}", composer.line_count(), size.x, size.y);
    for (index, segment) in composer.segments().iter().enumerate() {
        let position = segment.position();
        let kind = match segment {
            Segment::Text(_) => "text",
            Segment::Image(image) => image.frame.name.as_str(),
        };
        println!(
            "{index:>3}  line {:<3} {kind:<8} at ({:>8.2}, {:>8.2})  size {:>7.2} x {:<7.2} quads {:<4} {:?}",
            segment.line_count(),
            position.x,
            position.y,
            segment.size().x,
            segment.size().y,
            segment.quad_count(),
            segment.text(),
        );
    }

    Ok(())
}
