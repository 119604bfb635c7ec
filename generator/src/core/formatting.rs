//! Pure text helpers applied to generated content

use regex::Regex;
use std::sync::OnceLock;

const BOLD_UPPER_A: u32 = 0x1D400;
const BOLD_LOWER_A: u32 = 0x1D41A;
const BOLD_DIGIT_0: u32 = 0x1D7CE;

fn bold_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\*\*(.*?)\*\*").expect("static regex"))
}

fn heading_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^#+[^\n]*\n?").expect("static regex"))
}

/// Map one character onto its Mathematical Bold counterpart, if it has one
fn to_bold_char(ch: char) -> char {
    let offset = match ch {
        'A'..='Z' => BOLD_UPPER_A + (ch as u32 - 'A' as u32),
        'a'..='z' => BOLD_LOWER_A + (ch as u32 - 'a' as u32),
        '0'..='9' => BOLD_DIGIT_0 + (ch as u32 - '0' as u32),
        _ => return ch,
    };
    char::from_u32(offset).unwrap_or(ch)
}

/// Replace `**word**` markers with Unicode bold characters
///
/// Only Latin letters and digits have bold equivalents; other scripts inside
/// the markers are kept as-is (without the asterisks).
pub fn apply_unicode_bold(text: &str) -> String {
    bold_marker()
        .replace_all(text, |caps: &regex::Captures<'_>| caps[1].chars().map(to_bold_char).collect::<String>())
        .into_owned()
}

/// Drop markdown heading lines that models like to prepend
pub fn strip_heading_lines(text: &str) -> String {
    heading_line().replace_all(text, "").into_owned()
}

/// Full post-processing applied to generated post text
pub fn polish_post_text(raw: &str) -> String {
    let stripped = strip_heading_lines(raw.trim());
    apply_unicode_bold(stripped.trim())
}

/// Reduce a word to characters that are safe in a file name
pub fn safe_file_stem(word: &str) -> String {
    word.chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_latin_and_digits() {
        assert_eq!(apply_unicode_bold("**Ab1**"), "𝐀𝐛𝟏");
    }

    #[test]
    fn test_bold_leaves_other_scripts() {
        assert_eq!(apply_unicode_bold("x **শব্দ** y"), "x শব্দ y");
    }

    #[test]
    fn test_bold_spans_lines() {
        assert_eq!(apply_unicode_bold("**a\nb**"), "𝐚\n𝐛");
    }

    #[test]
    fn test_text_without_markers_is_unchanged() {
        assert_eq!(apply_unicode_bold("plain * text"), "plain * text");
    }

    #[test]
    fn test_strip_heading_lines() {
        let raw = "# Title\nline one\n## Sub\nline two";
        assert_eq!(strip_heading_lines(raw), "line one\nline two");
    }

    #[test]
    fn test_polish_trims_and_bolds() {
        assert_eq!(polish_post_text("\n# Heading\n**ok** done\n"), "𝐨𝐤 done");
    }

    #[test]
    fn test_safe_file_stem() {
        assert_eq!(safe_file_stem("well-being's_2 x/y"), "well-beings_2xy");
    }
}
