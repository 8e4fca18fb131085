//! Width-bounded splitting of text runs
//!
//! Both splitters work on measured widths only. They take a `measure`
//! closure so the caller decides how a candidate string is laid out
//! (font, size, italic) without this module knowing about labels.

use crate::text::chars::{
    leading_match_len, trailing_match_len, FIRST_ENGLISH_REG, LAST_ENGLISH_REG, LAST_WORD_REG,
    SYMBOL_REG, WORD_REG,
};

/// Widest run the renderer draws in a single pass
pub const MAX_DRAW_WIDTH: f32 = 2048.0;

/// Refinement steps allowed per direction in [`fragment_text`]
const REFINE_LIMIT: usize = 100;

/// Expand/reduce steps allowed per piece in [`split_long_string`]
const SPLIT_TRY_LIMIT: usize = 1000;

fn tail(chars: &[char], from: usize) -> String {
    chars[from.min(chars.len())..].iter().collect()
}

fn slice(chars: &[char], from: usize, to: usize) -> String {
    let to = to.min(chars.len());
    chars[from.min(to)..to].iter().collect()
}

/// Break `text` into pieces that each fit `max_width`
///
/// `all_width` is the measured width of the whole string. The break point
/// is estimated proportionally, refined by re-measuring, then snapped so
/// that an alphanumeric word is not cut in two and a closing punctuation
/// mark never opens a line. Every piece holds at least one character, so
/// a width too small for any glyph still terminates.
///
/// The first piece keeps its surrounding whitespace; later pieces are
/// trimmed and dropped when empty.
pub fn fragment_text<F>(text: &str, all_width: f32, max_width: f32, mut measure: F) -> Vec<String>
where
    F: FnMut(&str) -> f32,
{
    if text.is_empty() || max_width < 0.0 {
        return vec![String::new()];
    }

    let mut wrapped: Vec<String> = Vec::new();
    let mut chars: Vec<char> = text.chars().collect();
    let mut all_width = all_width;

    while all_width > max_width && chars.len() > 1 {
        let mut fuzzy_len = (chars.len() as f32 * (max_width / all_width)) as usize;
        let mut tmp_text = tail(&chars, fuzzy_len);
        let mut width = all_width - measure(&tmp_text);
        let mut next_line = tmp_text.clone();
        let mut push_num = 0;

        // Shrink until the head fits
        let mut steps = 0;
        while width > max_width && steps < REFINE_LIMIT {
            steps += 1;
            fuzzy_len = (fuzzy_len as f32 * (max_width / width)) as usize;
            tmp_text = tail(&chars, fuzzy_len);
            width = all_width - measure(&tmp_text);
        }

        // Grow word by word while the head still fits
        steps = 0;
        while !tmp_text.is_empty() && width <= max_width && steps < REFINE_LIMIT {
            steps += 1;
            push_num = leading_match_len(&WORD_REG, &tmp_text).unwrap_or(1);
            next_line = tmp_text.clone();

            fuzzy_len += push_num;
            tmp_text = tail(&chars, fuzzy_len);
            width = all_width - measure(&tmp_text);
        }

        fuzzy_len = fuzzy_len.saturating_sub(push_num);
        if fuzzy_len == 0 {
            fuzzy_len = 1;
            next_line = tail(&chars, 1);
        }

        let mut line = slice(&chars, 0, fuzzy_len);

        let opener = if next_line.is_empty() { &tmp_text } else { &next_line };
        if SYMBOL_REG.is_match(opener) {
            let last_word = trailing_match_len(&LAST_WORD_REG, &line).unwrap_or(0);
            fuzzy_len = fuzzy_len.saturating_sub(last_word).max(1);
            next_line = tail(&chars, fuzzy_len);
            line = slice(&chars, 0, fuzzy_len);
        }

        if FIRST_ENGLISH_REG.is_match(&next_line) {
            if let Some(word_len) = trailing_match_len(&LAST_ENGLISH_REG, &line) {
                if word_len < line.chars().count() {
                    fuzzy_len -= word_len;
                    next_line = tail(&chars, fuzzy_len);
                    line = slice(&chars, 0, fuzzy_len);
                }
            }
        }

        if wrapped.is_empty() {
            wrapped.push(line);
        } else {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                wrapped.push(trimmed.to_owned());
            }
        }

        let rest = if next_line.is_empty() { tmp_text } else { next_line };
        all_width = measure(&rest);
        chars = rest.chars().collect();
    }

    let rest: String = chars.into_iter().collect();
    if wrapped.is_empty() {
        wrapped.push(rest);
    } else {
        let trimmed = rest.trim();
        if !trimmed.is_empty() {
            wrapped.push(trimmed.to_owned());
        }
    }
    wrapped
}

/// Width each piece of a long string is cut to
fn part_limit(max_width: f32) -> f32 {
    if max_width > 0.0 {
        max_width.min(MAX_DRAW_WIDTH)
    } else {
        MAX_DRAW_WIDTH
    }
}

/// Pre-split a run that is too wide to draw in one pass
///
/// Runs narrower than [`MAX_DRAW_WIDTH`] come back unchanged. Wider runs
/// are cut at their newlines, and any line still too wide goes through
/// [`split_long_string`].
pub fn split_approximately<F>(text: &str, max_width: f32, mut measure: F) -> Vec<String>
where
    F: FnMut(&str) -> f32,
{
    if measure(text) < MAX_DRAW_WIDTH {
        return vec![text.to_owned()];
    }

    let mut parts = Vec::new();
    for line in text.split('\n') {
        if measure(line) < MAX_DRAW_WIDTH {
            parts.push(line.to_owned());
        } else {
            parts.extend(split_long_string(line, max_width, &mut measure));
        }
    }
    parts
}

/// Cut one over-wide line into contiguous pieces
///
/// Each piece is at most `min(max_width, 2048)` wide (2048 when
/// `max_width` is zero) unless it is a single character. Pieces end on a
/// word boundary where the line allows it. Concatenating the result gives
/// back the input.
pub fn split_long_string<F>(text: &str, max_width: f32, mut measure: F) -> Vec<String>
where
    F: FnMut(&str) -> f32,
{
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let limit = part_limit(max_width);
    let mut parts = Vec::new();

    let mut start = 0;
    let mut end = len / 2;
    let mut current = slice(&chars, start, end);
    let mut current_width = measure(&current);

    while current_width > limit {
        if end / 2 < 1 {
            break;
        }
        end /= 2;
        current = slice(&chars, start, end);
        current_width = measure(&current);
    }

    let mut left = tail(&chars, end);
    let mut tries = SPLIT_TRY_LIMIT;
    let mut step = 1;

    while start < len {
        // Expand by whole leading words while the piece fits
        while tries > 0 && current_width < limit && end < len {
            if let Some(word_len) = leading_match_len(&FIRST_ENGLISH_REG, &left) {
                step = word_len;
            }
            end = (end + step).min(len);
            current = slice(&chars, start, end);
            left = tail(&chars, end);
            current_width = measure(&current);
            tries -= 1;
        }

        // Reduce one character at a time after the first step back
        while tries > 0 && current.chars().count() >= 2 && current_width > limit {
            end = end.saturating_sub(step).max(start + 1);
            current = slice(&chars, start, end);
            current_width = measure(&current);
            step = 1;
            tries -= 1;
        }

        // Out of tries: drop characters until the piece fits
        while current_width > limit && end > start + 1 {
            end -= 1;
            current = slice(&chars, start, end);
            current_width = measure(&current);
        }

        // A word cut at the end of this piece moves to the next one
        let current_len = current.chars().count();
        if current_len >= 2 {
            if let Some(word_len) = trailing_match_len(&LAST_ENGLISH_REG, &current) {
                if word_len < current_len {
                    end -= word_len;
                    current = slice(&chars, start, end);
                }
            }
        }

        let part_step = current.chars().count().max(1);
        parts.push(current);
        start = end;
        end = (start + part_step).min(len);
        current = slice(&chars, start, end);
        left = tail(&chars, end);
        tries = SPLIT_TRY_LIMIT;

        let rest = tail(&chars, start);
        if measure(&rest) < limit {
            if !rest.is_empty() {
                parts.push(rest);
            }
            break;
        }
        current_width = measure(&current);
    }

    parts
}
