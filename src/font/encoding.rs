//! WinAnsi text encoding for the standard fonts.
//!
//! The base-14 fonts are addressed through single-byte WinAnsiEncoding
//! (Windows-1252). Anything outside it has no glyph, so cell text is
//! sanitized before layout: each unsupported code point becomes one `?`.

use std::borrow::Cow;

/// Substituted for every code point the encoding cannot represent.
pub const REPLACEMENT: char = '?';

/// Map a Unicode codepoint to a WinAnsiEncoding byte value.
///
/// Most codepoints in 0x20..=0x7E and 0xA0..=0xFF map directly. The
/// 0x80..=0x9F range holds smart quotes, bullets, dashes, etc.
pub fn unicode_to_winansi(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    match cp {
        0x20AC => Some(0x80), // Euro sign
        0x201A => Some(0x82), // Single low-9 quotation mark
        0x0192 => Some(0x83), // Latin small letter f with hook
        0x201E => Some(0x84), // Double low-9 quotation mark
        0x2026 => Some(0x85), // Horizontal ellipsis
        0x2020 => Some(0x86), // Dagger
        0x2021 => Some(0x87), // Double dagger
        0x02C6 => Some(0x88), // Modifier letter circumflex accent
        0x2030 => Some(0x89), // Per mille sign
        0x0160 => Some(0x8A), // Latin capital letter S with caron
        0x2039 => Some(0x8B), // Single left-pointing angle quotation
        0x0152 => Some(0x8C), // Latin capital ligature OE
        0x017D => Some(0x8E), // Latin capital letter Z with caron
        0x2018 => Some(0x91), // Left single quotation mark
        0x2019 => Some(0x92), // Right single quotation mark
        0x201C => Some(0x93), // Left double quotation mark
        0x201D => Some(0x94), // Right double quotation mark
        0x2022 => Some(0x95), // Bullet
        0x2013 => Some(0x96), // En dash
        0x2014 => Some(0x97), // Em dash
        0x02DC => Some(0x98), // Small tilde
        0x2122 => Some(0x99), // Trade mark sign
        0x0161 => Some(0x9A), // Latin small letter s with caron
        0x203A => Some(0x9B), // Single right-pointing angle quotation
        0x0153 => Some(0x9C), // Latin small ligature oe
        0x017E => Some(0x9E), // Latin small letter z with caron
        0x0178 => Some(0x9F), // Latin capital letter Y with diaeresis
        _ => None,
    }
}

/// Line break characters survive sanitizing; the wrapper consumes them.
pub(crate) fn is_line_break(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Replace every code point the encoding can't represent with [`REPLACEMENT`].
///
/// Borrows when nothing needs replacing, which is the common case.
pub fn sanitize(text: &str) -> Cow<'_, str> {
    let supported = |ch: char| is_line_break(ch) || unicode_to_winansi(ch).is_some();
    if text.chars().all(supported) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.chars()
            .map(|ch| if supported(ch) { ch } else { REPLACEMENT })
            .collect(),
    )
}

/// Encode already-sanitized text to WinAnsi bytes.
pub fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .filter(|ch| !is_line_break(*ch))
        .map(|ch| unicode_to_winansi(ch).unwrap_or(REPLACEMENT as u8))
        .collect()
}
