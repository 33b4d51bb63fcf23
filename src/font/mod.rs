//! # Font Management
//!
//! Text measurement for the standard PDF fonts.
//!
//! Tables are set in one of the base-14 fonts (Helvetica or Courier), which
//! every PDF reader ships, so nothing is embedded. Glyph widths come from
//! the Adobe font metrics in [`metrics`]; text is encoded as WinAnsi, see
//! [`encoding`].

pub mod encoding;
pub mod metrics;

use serde::{Deserialize, Serialize};

pub use metrics::StandardFontMetrics;

/// Font families available for table text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    Helvetica,
    Courier,
}

impl FontFamily {
    /// The PDF base font name.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::Courier => "Courier",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica => &metrics::HELVETICA,
            Self::Courier => &metrics::COURIER,
        }
    }
}

/// Measures text for the active font and size.
///
/// Widths are returned in points; the canvas divides by its unit scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontContext {
    pub family: FontFamily,
    /// Font size in points.
    pub size: f64,
}

impl Default for FontContext {
    fn default() -> Self {
        Self {
            family: FontFamily::Helvetica,
            size: 12.0,
        }
    }
}

impl FontContext {
    pub fn new(family: FontFamily, size: f64) -> Self {
        Self { family, size }
    }

    /// Advance width of a single character in points.
    pub fn char_width(&self, ch: char) -> f64 {
        self.family.metrics().char_width(ch, self.size)
    }

    /// Width of a string on a single line, in points.
    pub fn measure_string(&self, text: &str) -> f64 {
        self.family.metrics().measure_string(text, self.size)
    }
}
