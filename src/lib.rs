//! # Datasweep
//!
//! Tabular data conversion with a page-aware PDF table renderer.
//!
//! Tables read from CSV or XLSX can be cleaned, written back out as CSV or
//! XLSX, or laid out as a bordered grid in a PDF. The PDF path is the
//! interesting one: cells wrap inside equal-width columns, every cell of a
//! row shares the height of the tallest one, and a row that does not fit
//! above the bottom margin moves whole to the next page.
//!
//! ## Architecture
//!
//! ```text
//! CSV / XLSX bytes
//!       ↓
//!   [convert]  read into a Table
//!       ↓
//!   [model]    Table + cleaning operations
//!       ↓
//!   [layout]   rows -> wrapped lines -> draw ops on a Canvas
//!       ↓
//!   [canvas]   recorded pages (user units, top-left origin)
//!       ↓
//!   [pdf]      serialize to PDF bytes
//! ```
//!
//! Word and PDF documents take a different route, through an external
//! office suite (see [`convert::office`]).

pub mod canvas;
pub mod config;
pub mod convert;
pub mod error;
pub mod font;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod text;

pub use error::{Result, SweepError};

use canvas::{Canvas, DocumentCanvas};
use config::RenderOptions;
use layout::TableComposer;
use model::Table;

/// Render a table to PDF bytes.
pub fn render_table(table: &Table, options: &RenderOptions) -> Result<Vec<u8>> {
    let canvas = layout_table(table, options)?;
    canvas.output()
}

/// Lay a table out without serializing it. The returned canvas exposes the
/// recorded pages for inspection.
pub fn layout_table(table: &Table, options: &RenderOptions) -> Result<DocumentCanvas> {
    let mut canvas = DocumentCanvas::from_options(options);
    TableComposer::new(options.clone()).render(table, &mut canvas)?;
    Ok(canvas)
}

/// Render a table described as JSON (`{"header": [...], "rows": [[...]]}`)
/// with default options.
pub fn render_json(json: &str) -> Result<Vec<u8>> {
    let table: Table = serde_json::from_str(json)?;
    render_table(&table, &RenderOptions::default())
}
