//! Cross-module scenario tests

pub(crate) mod fixtures;

mod glyph_metrics;
mod label_pipeline;
mod rich_text_pipeline;
