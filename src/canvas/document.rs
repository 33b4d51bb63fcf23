//! In-memory canvas that records draw operations per page and serializes
//! them with [`PdfWriter`](crate::pdf::PdfWriter).

use serde::Serialize;
use tracing::debug;

use super::{Canvas, CursorState, PageGeometry};
use crate::config::{PageConfig, RenderOptions};
use crate::error::{Result, SweepError};
use crate::font::{FontContext, FontFamily};
use crate::pdf::{Metadata, PdfWriter};
use crate::text::TextLayout;

/// Tolerance for "is the cursor at the top margin" comparisons.
const EPSILON: f64 = 1e-6;

/// A single recorded drawing operation, in user units.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DrawOp {
    /// Unfilled rectangle (cell border).
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    /// One line of text placed in a cell box. The text starts `padding`
    /// units in from the box's left edge and is centred vertically.
    #[serde(rename_all = "camelCase")]
    Text {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        padding: f64,
        text: String,
        font: FontFamily,
        font_size: f64,
    },
}

/// A page and everything drawn on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanvasPage {
    pub width: f64,
    pub height: f64,
    pub ops: Vec<DrawOp>,
}

impl CanvasPage {
    pub fn rects(&self) -> impl Iterator<Item = (f64, f64, f64, f64)> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Rect {
                x,
                y,
                width,
                height,
            } => Some((*x, *y, *width, *height)),
            DrawOp::Text { .. } => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            DrawOp::Rect { .. } => None,
        })
    }
}

/// Serializable snapshot of every page, for debugging layouts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutInfo {
    pub unit: crate::config::Unit,
    pub pages: Vec<CanvasPage>,
}

/// The default canvas: records pages in memory, writes PDF on `output`.
#[derive(Debug, Clone)]
pub struct DocumentCanvas {
    config: PageConfig,
    font: FontContext,
    text_layout: TextLayout,
    cell_padding: f64,
    line_width: f64,
    /// Bottom margin for automatic page breaks, if enabled.
    auto_page_break: Option<f64>,
    cursor: CursorState,
    pages: Vec<CanvasPage>,
    title: Option<String>,
    compress: bool,
}

impl DocumentCanvas {
    pub fn new(config: PageConfig) -> Self {
        let defaults = RenderOptions::default();
        Self {
            config,
            font: FontContext::new(defaults.font, defaults.font_size),
            text_layout: TextLayout::new(),
            cell_padding: defaults.cell_padding,
            line_width: defaults.border_width,
            auto_page_break: Some(config.margin.bottom),
            cursor: CursorState {
                x: config.margin.left,
                y: config.margin.top,
                page: 0,
            },
            pages: Vec::new(),
            title: None,
            compress: true,
        }
    }

    /// A canvas configured from render options. The font is left to the
    /// composer, which sets it after starting the first page.
    pub fn from_options(options: &RenderOptions) -> Self {
        let mut canvas = Self::new(options.page);
        canvas.cell_padding = options.cell_padding;
        canvas.line_width = options.border_width;
        canvas.title = options.title.clone();
        canvas.compress = options.compress;
        canvas
    }

    pub fn pages(&self) -> &[CanvasPage] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn layout_info(&self) -> LayoutInfo {
        LayoutInfo {
            unit: self.config.unit,
            pages: self.pages.clone(),
        }
    }

    fn current_page_mut(&mut self) -> Result<&mut CanvasPage> {
        self.pages
            .last_mut()
            .ok_or_else(|| SweepError::Render("no page has been added to the canvas".to_string()))
    }
}

impl Canvas for DocumentCanvas {
    fn add_page(&mut self) -> Result<()> {
        let (width, height) = self.config.dimensions();
        self.pages.push(CanvasPage {
            width,
            height,
            ops: Vec::new(),
        });
        self.cursor = CursorState {
            x: self.config.margin.left,
            y: self.config.margin.top,
            page: self.pages.len(),
        };
        debug!(page = self.pages.len(), width, height, "added page");
        Ok(())
    }

    fn set_font(&mut self, family: FontFamily, size: f64) {
        self.font = FontContext::new(family, size);
    }

    fn set_auto_page_break(&mut self, enabled: bool, margin: f64) {
        self.auto_page_break = enabled.then_some(margin);
    }

    fn geometry(&self) -> PageGeometry {
        let (width, height) = self.config.dimensions();
        PageGeometry {
            width,
            height,
            margin: self.config.margin,
        }
    }

    fn cursor(&self) -> CursorState {
        self.cursor
    }

    fn set_cursor(&mut self, x: f64, y: f64) {
        self.cursor.x = x;
        self.cursor.y = y;
    }

    fn remaining_height(&self) -> f64 {
        match self.auto_page_break {
            Some(bottom) => {
                let trigger = self.config.dimensions().1 - bottom;
                (trigger - self.cursor.y).max(0.0)
            }
            None => f64::INFINITY,
        }
    }

    fn at_page_top(&self) -> bool {
        self.cursor.page > 0 && self.cursor.y <= self.config.margin.top + EPSILON
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<()> {
        self.current_page_mut()?.ops.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
        });
        Ok(())
    }

    fn wrap_text(&self, text: &str, width: f64) -> Vec<String> {
        let max_width = (width - 2.0 * self.cell_padding) * self.config.unit.scale();
        self.text_layout
            .break_into_lines(&self.font, text, max_width)
            .into_iter()
            .map(|line| line.text)
            .collect()
    }

    fn cell(&mut self, width: f64, height: f64, text: &str) -> Result<()> {
        let CursorState { x, y, .. } = self.cursor;
        if !text.is_empty() {
            let op = DrawOp::Text {
                x,
                y,
                width,
                height,
                padding: self.cell_padding,
                text: text.to_string(),
                font: self.font.family,
                font_size: self.font.size,
            };
            self.current_page_mut()?.ops.push(op);
        } else if self.pages.is_empty() {
            return Err(SweepError::Render(
                "no page has been added to the canvas".to_string(),
            ));
        }
        self.cursor.x += width;
        Ok(())
    }

    fn output(&self) -> Result<Vec<u8>> {
        if self.pages.is_empty() {
            return Err(SweepError::Render("document has no pages".to_string()));
        }
        let metadata = Metadata {
            title: self.title.clone(),
        };
        PdfWriter::new()
            .compress(self.compress)
            .write(&self.pages, &metadata, self.config.unit.scale(), self.line_width)
    }
}
