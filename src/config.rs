//! # Render Options
//!
//! Everything the table composer needs to know about the page: size,
//! orientation, the user unit, margins, and the font. All fields have
//! defaults, so an empty JSON object is a valid configuration.
//!
//! Lengths are in the configured user unit (millimetres by default). Font
//! sizes are always in points, as in every PDF tool.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::font::FontFamily;

/// The unit all canvas coordinates are expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Pt,
    #[default]
    Mm,
    Cm,
    In,
}

impl Unit {
    /// Points per user unit.
    pub fn scale(&self) -> f64 {
        match self {
            Unit::Pt => 1.0,
            Unit::Mm => 72.0 / 25.4,
            Unit::Cm => 72.0 / 2.54,
            Unit::In => 72.0,
        }
    }
}

/// Standard page sizes in points (portrait).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
    /// Width and height in points.
    Custom { width: f64, height: f64 },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A4 => (595.28, 841.89),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Tabloid => (792.0, 1224.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    #[default]
    Landscape,
}

/// Page margins in user units. `bottom` is where automatic page breaks
/// trigger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 10.0,
            right: 10.0,
            bottom: 20.0,
            left: 10.0,
        }
    }
}

impl Margins {
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }
}

/// Page configuration: size, orientation, unit, margins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageConfig {
    pub size: PageSize,
    pub orientation: Orientation,
    pub unit: Unit,
    pub margin: Margins,
}

impl PageConfig {
    /// Oriented page (width, height) in user units.
    pub fn dimensions(&self) -> (f64, f64) {
        let (w, h) = self.size.dimensions();
        let (w, h) = match self.orientation {
            Orientation::Portrait => (w.min(h), w.max(h)),
            Orientation::Landscape => (w.max(h), w.min(h)),
        };
        let k = self.unit.scale();
        (w / k, h / k)
    }

    /// Page width minus the left and right margins.
    pub fn usable_width(&self) -> f64 {
        self.dimensions().0 - self.margin.horizontal()
    }
}

/// Options for rendering a table to PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    pub page: PageConfig,
    pub font: FontFamily,
    /// Font size in points.
    pub font_size: f64,
    /// Height of one wrapped text line, in user units.
    pub line_height: f64,
    /// Horizontal inset of text inside its cell border, in user units.
    pub cell_padding: f64,
    /// Stroke width of cell borders, in user units.
    pub border_width: f64,
    /// Redraw the header row at the top of every continuation page.
    pub repeat_header: bool,
    pub auto_page_break: bool,
    /// Deflate page content streams.
    pub compress: bool,
    /// Document title written to the PDF Info dictionary.
    pub title: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            page: PageConfig::default(),
            font: FontFamily::Helvetica,
            font_size: 8.0,
            line_height: 5.0,
            cell_padding: 1.0,
            border_width: 0.2,
            repeat_header: false,
            auto_page_break: true,
            compress: true,
            title: None,
        }
    }
}

impl RenderOptions {
    /// Parse options from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
