//! Character classification used by line breaking
//!
//! Whitespace and CJK characters always form single-character tokens. The
//! word patterns decide where a wrapped line may be cut without splitting
//! an alphanumeric word in two.

use once_cell::sync::Lazy;
use regex::Regex;

/// Latin, Latin extended, Cyrillic and Vietnamese letters plus digits
const WORD_CLASS: &str = r"[0-9A-Za-z\u{00C0}-\u{024F}\u{0400}-\u{04FF}\u{1E00}-\u{1EFF}]";

/// Leading word, or a single non-space character
pub static WORD_REG: Lazy<Regex> = Lazy::new(|| word_regex(&format!(r"^(?:{WORD_CLASS}+|\S)")));

/// Punctuation that may not start a wrapped line
pub static SYMBOL_REG: Lazy<Regex> = Lazy::new(|| word_regex(r"^[!,.:;'}\]%?>、‘“》？。，！]"));

/// Trailing word, or a single trailing non-space character
pub static LAST_WORD_REG: Lazy<Regex> = Lazy::new(|| word_regex(&format!(r"(?:{WORD_CLASS}+|\S)$")));

/// Trailing run of word characters
pub static LAST_ENGLISH_REG: Lazy<Regex> = Lazy::new(|| word_regex(&format!(r"{WORD_CLASS}+$")));

/// Leading run of word characters
pub static FIRST_ENGLISH_REG: Lazy<Regex> = Lazy::new(|| word_regex(&format!(r"^{WORD_CLASS}+")));

fn word_regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in word pattern must compile")
}

/// Whitespace as far as line breaking is concerned
pub const fn is_unicode_space(ch: char) -> bool {
    matches!(
        ch as u32,
        9..=13 | 32 | 133 | 160 | 5760 | 8192..=8202 | 8232 | 8233 | 8239 | 8287 | 12288
    )
}

/// Chinese, Japanese or Korean character that can break anywhere
pub const fn is_unicode_cjk(ch: char) -> bool {
    matches!(
        ch as u32,
        // Han
        0x3400..=0x4DFF | 0x4E00..=0x9FFF
        // CJK punctuation, kana, full width forms
        | 0x3000..=0x30FF | 0xFF00..=0xFFEF
        // Stars, arrows and the reference mark used in Japanese text
        | 0x2605..=0x2606 | 0x2190..=0x2195 | 0x203B
        // Hangul
        | 0x1100..=0x11FF | 0x3130..=0x318F | 0xA960..=0xA97F | 0xAC00..=0xD7FF
    )
}

/// Length in chars of a regex match at the start of `text`
pub fn leading_match_len(regex: &Regex, text: &str) -> Option<usize> {
    regex.find(text).filter(|m| m.start() == 0).map(|m| m.as_str().chars().count())
}

/// Length in chars of a regex match that ends `text`
pub fn trailing_match_len(regex: &Regex, text: &str) -> Option<usize> {
    regex.find(text).filter(|m| m.end() == text.len()).map(|m| m.as_str().chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spaces() {
        assert!(is_unicode_space(' '));
        assert!(is_unicode_space('\t'));
        assert!(is_unicode_space('\n'));
        assert!(is_unicode_space('\u{3000}'));
        assert!(is_unicode_space('\u{a0}'));
        assert!(!is_unicode_space('a'));
        assert!(!is_unicode_space('_'));
    }

    #[test]
    fn test_cjk() {
        assert!(is_unicode_cjk('中'));
        assert!(is_unicode_cjk('の'));
        assert!(is_unicode_cjk('한'));
        assert!(is_unicode_cjk('。'));
        assert!(!is_unicode_cjk('a'));
        assert!(!is_unicode_cjk('é'));
    }

    #[test]
    fn test_word_patterns() {
        assert_eq!(leading_match_len(&WORD_REG, "héllo world"), Some(5));
        assert_eq!(leading_match_len(&WORD_REG, "!abc"), Some(1));
        assert_eq!(leading_match_len(&FIRST_ENGLISH_REG, " abc"), None);
        assert_eq!(trailing_match_len(&LAST_ENGLISH_REG, "say привет"), Some(6));
        assert_eq!(trailing_match_len(&LAST_ENGLISH_REG, "trailing "), None);
        assert_eq!(trailing_match_len(&LAST_WORD_REG, "end."), Some(1));
        assert!(SYMBOL_REG.is_match("。next"));
        assert!(!SYMBOL_REG.is_match("next."));
    }
}
