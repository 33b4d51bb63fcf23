//! # Canvas
//!
//! The drawing surface the table layout talks to. A canvas owns the pages,
//! the active font, and the cursor. Layout code never reaches into a backend
//! directly; it goes through the [`Canvas`] trait, which keeps the row engine
//! testable with any recording implementation.
//!
//! Coordinates are in the page's user unit with the origin at the top-left
//! corner of the page and y growing downwards.

mod document;

pub use document::{CanvasPage, DocumentCanvas, DrawOp, LayoutInfo};

use serde::Serialize;

use crate::config::Margins;
use crate::error::Result;
use crate::font::FontFamily;

/// Where the next drawing operation starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CursorState {
    pub x: f64,
    pub y: f64,
    /// 1-based page number; 0 until the first page is added.
    pub page: usize,
}

/// Page dimensions and margins in user units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin: Margins,
}

impl PageGeometry {
    /// Page width minus the left and right margins.
    pub fn usable_width(&self) -> f64 {
        self.width - self.margin.horizontal()
    }
}

/// A page-oriented drawing surface.
pub trait Canvas {
    /// Start a new page and move the cursor to its top-left margin corner.
    fn add_page(&mut self) -> Result<()>;

    /// Select the font used for measuring and drawing text.
    fn set_font(&mut self, family: FontFamily, size: f64);

    /// Enable or disable automatic pagination. `margin` is the distance from
    /// the bottom edge at which content no longer fits.
    fn set_auto_page_break(&mut self, enabled: bool, margin: f64);

    fn geometry(&self) -> PageGeometry;

    fn cursor(&self) -> CursorState;

    /// Move the cursor on the current page.
    fn set_cursor(&mut self, x: f64, y: f64);

    /// Vertical space left before the page-break trigger. Infinite when
    /// automatic pagination is off.
    fn remaining_height(&self) -> f64;

    /// Whether the cursor sits at the top margin of the current page.
    fn at_page_top(&self) -> bool;

    /// Draw an unfilled rectangle.
    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<()>;

    /// Wrap `text` to fit a cell `width` units wide with the active font.
    /// Measures only; nothing is drawn.
    fn wrap_text(&self, text: &str, width: f64) -> Vec<String>;

    /// Write one line of text in a borderless cell at the cursor, then
    /// advance the cursor right by `width`.
    fn cell(&mut self, width: f64, height: f64, text: &str) -> Result<()>;

    /// Serialize the document.
    fn output(&self) -> Result<Vec<u8>>;
}
