//! # Text Layout
//!
//! Line breaking and text measurement for table cells.
//!
//! Greedy breaking over UAX#14 break opportunities. Breaks happen after
//! spaces and other allowed points; a word wider than the column is split
//! between characters. Line text keeps its trailing spaces (they hang past
//! the column edge and are not counted in `width`), so joining the lines of
//! a cell gives back the original text minus explicit line breaks.

use unicode_linebreak::{linebreaks, BreakOpportunity};

use crate::font::encoding::is_line_break;
use crate::font::FontContext;

/// A line of text after line-breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokenLine {
    pub text: String,
    /// Width in points, excluding trailing spaces.
    pub width: f64,
}

/// Compute UAX#14 break opportunities indexed by char position.
///
/// Returns a vec of length `text.chars().count()`. Each entry is the break
/// opportunity *before* that character position. Index 0 is always `None`.
fn compute_break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    // linebreaks() yields the byte offset of the start of the next segment.
    let mut byte_to_char = vec![0usize; text.len() + 1];
    for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
        byte_to_char[byte_idx] = char_idx;
    }
    byte_to_char[text.len()] = char_count;

    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        // A break at the very end of the text carries no information.
        if char_idx < char_count {
            result[char_idx] = Some(opp);
        }
    }

    result
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TextLayout;

impl TextLayout {
    pub fn new() -> Self {
        Self
    }

    /// Break a string into lines no wider than `max_width` points.
    ///
    /// Always returns at least one line; empty text gives one empty line.
    /// A single character wider than `max_width` still gets a line of its
    /// own rather than looping.
    pub fn break_into_lines(
        &self,
        font: &FontContext,
        text: &str,
        max_width: f64,
    ) -> Vec<BrokenLine> {
        if text.is_empty() {
            return vec![BrokenLine {
                text: String::new(),
                width: 0.0,
            }];
        }

        let chars: Vec<char> = text.chars().collect();
        let char_widths: Vec<f64> = chars
            .iter()
            .map(|&ch| if is_line_break(ch) { 0.0 } else { font.char_width(ch) })
            .collect();
        let break_opps = compute_break_opportunities(text);

        let mut lines = Vec::new();
        let mut line_start = 0;
        let mut line_width = 0.0;
        let mut last_break_point: Option<usize> = None;

        for (i, &ch) in chars.iter().enumerate() {
            let char_width = char_widths[i];

            // A break *before* char[i] means the previous line may end at char[i-1].
            if i > 0 {
                match break_opps[i] {
                    Some(BreakOpportunity::Mandatory) => {
                        lines.push(self.make_line(&chars[line_start..i], &char_widths[line_start..i]));
                        line_start = i;
                        line_width = 0.0;
                        last_break_point = None;
                    }
                    Some(BreakOpportunity::Allowed) => {
                        last_break_point = Some(i - 1);
                    }
                    None => {}
                }
            }

            // Spaces hang past the edge; only visible glyphs can overflow.
            if is_line_break(ch) || ch.is_whitespace() {
                line_width += char_width;
                continue;
            }

            if line_width + char_width > max_width && line_start < i {
                let break_at = match last_break_point {
                    Some(bp) if bp >= line_start => bp + 1,
                    // No break point on this line: split the word here.
                    _ => i,
                };
                lines.push(self.make_line(
                    &chars[line_start..break_at],
                    &char_widths[line_start..break_at],
                ));
                line_start = break_at;
                line_width = char_widths[line_start..=i].iter().sum();
                last_break_point = None;
                continue;
            }

            line_width += char_width;
        }

        if line_start < chars.len() || lines.is_empty() {
            lines.push(self.make_line(&chars[line_start..], &char_widths[line_start..]));
        }

        lines
    }

    /// Create a BrokenLine, dropping line break characters and excluding
    /// trailing whitespace from the measured width.
    fn make_line(&self, chars: &[char], widths: &[f64]) -> BrokenLine {
        let mut text = String::with_capacity(chars.len());
        let mut width = 0.0;
        let mut trailing = 0.0;
        for (&ch, &w) in chars.iter().zip(widths) {
            if is_line_break(ch) {
                continue;
            }
            text.push(ch);
            if ch.is_whitespace() {
                trailing += w;
            } else {
                width += trailing + w;
                trailing = 0.0;
            }
        }
        BrokenLine { text, width }
    }

    /// Measure the width of a string on a single line, in points.
    pub fn measure_width(&self, font: &FontContext, text: &str) -> f64 {
        font.measure_string(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontFamily;

    fn ctx() -> FontContext {
        FontContext::new(FontFamily::Helvetica, 12.0)
    }

    fn texts(lines: &[BrokenLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_single_line() {
        let lines = TextLayout::new().break_into_lines(&ctx(), "Hello", 200.0);
        assert_eq!(texts(&lines), vec!["Hello"]);
    }

    #[test]
    fn test_line_break_at_space() {
        let lines = TextLayout::new().break_into_lines(&ctx(), "Hello World", 40.0);
        assert_eq!(texts(&lines), vec!["Hello ", "World"]);
        assert!(lines.iter().all(|l| l.width <= 40.0));
    }

    #[test]
    fn test_explicit_newline() {
        let lines = TextLayout::new().break_into_lines(&ctx(), "Hello\nWorld", 200.0);
        assert_eq!(texts(&lines), vec!["Hello", "World"]);
    }

    #[test]
    fn test_crlf_is_one_break() {
        let lines = TextLayout::new().break_into_lines(&ctx(), "a\r\nb", 200.0);
        assert_eq!(texts(&lines), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_string() {
        let lines = TextLayout::new().break_into_lines(&ctx(), "", 200.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].width, 0.0);
    }

    #[test]
    fn test_long_word_splits_between_chars() {
        let fc = ctx();
        let lines = TextLayout::new().break_into_lines(&fc, "Supercalifragilistic", 30.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.width <= 30.0, "{:?} too wide", line);
        }
        let joined: String = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(joined, "Supercalifragilistic");
    }

    #[test]
    fn test_narrower_than_one_char_still_progresses() {
        let lines = TextLayout::new().break_into_lines(&ctx(), "WWW", 1.0);
        assert_eq!(texts(&lines), vec!["W", "W", "W"]);
    }

    #[test]
    fn test_joined_lines_reproduce_text() {
        let text = "a very long string that must wrap across multiple lines";
        let lines = TextLayout::new().break_into_lines(&ctx(), text, 60.0);
        assert!(lines.len() > 2);
        let joined: String = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn test_trailing_space_not_measured() {
        let tl = TextLayout::new();
        let fc = ctx();
        let lines = tl.break_into_lines(&fc, "ab ", 200.0);
        assert!((lines[0].width - tl.measure_width(&fc, "ab")).abs() < 1e-9);
    }
}
