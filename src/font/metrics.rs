//! Glyph advance widths for the standard fonts, in 1/1000 em.
//!
//! Printable ASCII comes straight from the Adobe AFM files. Characters
//! outside ASCII use the font's average width, which is close enough for
//! line breaking; they are rare in tabular data and the WinAnsi range has
//! no glyphs much wider than `W`.

pub struct StandardFontMetrics {
    /// Widths for U+0020..=U+007E.
    ascii: [u16; 95],
    /// Width used for everything else.
    default_width: u16,
}

impl StandardFontMetrics {
    /// Advance width of `ch` in points at `font_size`.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let cp = ch as u32;
        let w = if (0x20..=0x7E).contains(&cp) {
            self.ascii[(cp - 0x20) as usize]
        } else {
            self.default_width
        };
        w as f64 * font_size / 1000.0
    }

    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|ch| self.char_width(ch, font_size)).sum()
    }
}

#[rustfmt::skip]
pub static HELVETICA: StandardFontMetrics = StandardFontMetrics {
    ascii: [
        // space ! " # $ % & ' ( ) * + , - . /
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0-9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // : ; < = > ? @
        278, 278, 584, 584, 584, 556, 1015,
        // A-Z
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [ \ ] ^ _ `
        278, 278, 278, 469, 556, 333,
        // a-z
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
        // { | } ~
        334, 260, 334, 584,
    ],
    default_width: 556,
};

pub static COURIER: StandardFontMetrics = StandardFontMetrics {
    ascii: [600; 95],
    default_width: 600,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helvetica_table_is_aligned() {
        assert!((HELVETICA.char_width('A', 1000.0) - 667.0).abs() < 1e-9);
        assert!((HELVETICA.char_width('z', 1000.0) - 500.0).abs() < 1e-9);
        assert!((HELVETICA.char_width('~', 1000.0) - 584.0).abs() < 1e-9);
        assert!((HELVETICA.char_width('0', 1000.0) - 556.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_ascii_uses_default() {
        assert!((HELVETICA.char_width('é', 10.0) - 5.56).abs() < 1e-9);
    }
}
