//! # Table Layout Engine
//!
//! Lays a table out as a bordered grid, one row at a time, directly onto
//! pages.
//!
//! ## Rows
//!
//! Every cell of a row is wrapped to its column first. The row is as tall
//! as its tallest cell (`max_lines * line_height`), and every column's
//! border rectangle gets that same height, so the grid stays aligned no
//! matter how uneven the content is. Text is then written line by line
//! across the columns, and the cursor ends at the next row's origin.
//!
//! ## Pages
//!
//! Rows are never split. Before a row is drawn we ask whether it fits above
//! the page-break trigger; if not, a new page is started and the whole row
//! goes there. The header can optionally be repeated on continuation pages.

pub mod page_break;

use tracing::{debug, trace, warn};

use crate::canvas::{Canvas, CursorState};
use crate::config::RenderOptions;
use crate::error::{Result, SweepError};
use crate::font::encoding;
use crate::model::Table;
use page_break::{decide_break, BreakDecision};

/// Equal-width column plan: `count` columns sharing `usable_width`.
pub fn column_widths(usable_width: f64, count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    vec![usable_width / count as f64; count]
}

/// A measured row, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct RowPlan {
    /// Wrapped lines per cell.
    pub lines: Vec<Vec<String>>,
    /// Line count of the tallest cell, at least 1.
    pub max_lines: usize,
    pub line_height: f64,
}

impl RowPlan {
    pub fn height(&self) -> f64 {
        self.max_lines as f64 * self.line_height
    }
}

fn check_row_contract(cell_count: usize, widths: &[f64], line_height: f64) -> Result<()> {
    if cell_count == 0 {
        return Err(SweepError::Layout("row has no cells".to_string()));
    }
    if cell_count != widths.len() {
        return Err(SweepError::Layout(format!(
            "row has {} cells but {} column widths",
            cell_count,
            widths.len()
        )));
    }
    if let Some(w) = widths.iter().find(|w| !(**w > 0.0)) {
        return Err(SweepError::Layout(format!("column width must be positive, got {}", w)));
    }
    if !(line_height > 0.0) {
        return Err(SweepError::Layout(format!(
            "line height must be positive, got {}",
            line_height
        )));
    }
    Ok(())
}

/// Sanitize and wrap every cell of a row. Draws nothing.
pub fn measure_row<C, S>(canvas: &C, cells: &[S], widths: &[f64], line_height: f64) -> Result<RowPlan>
where
    C: Canvas + ?Sized,
    S: AsRef<str>,
{
    check_row_contract(cells.len(), widths, line_height)?;

    let lines: Vec<Vec<String>> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| {
            let raw = cell.as_ref();
            let text = encoding::sanitize(raw);
            if text != raw {
                warn!(cell = raw, "replaced characters the PDF font cannot encode");
            }
            canvas.wrap_text(&text, width)
        })
        .collect();
    let max_lines = lines.iter().map(Vec::len).max().unwrap_or(0).max(1);

    Ok(RowPlan {
        lines,
        max_lines,
        line_height,
    })
}

/// Draw a measured row at the cursor, starting a new page first if it
/// doesn't fit. Returns the next row's origin.
pub fn render_planned_row<C>(canvas: &mut C, plan: &RowPlan, widths: &[f64]) -> Result<CursorState>
where
    C: Canvas + ?Sized,
{
    check_row_contract(plan.lines.len(), widths, plan.line_height)?;
    let decision = decide_break(canvas.remaining_height(), plan.height(), canvas.at_page_top());
    place_row(canvas, plan, widths, decision)
}

/// Draw a measured row according to a break decision already taken.
fn place_row<C>(
    canvas: &mut C,
    plan: &RowPlan,
    widths: &[f64],
    decision: BreakDecision,
) -> Result<CursorState>
where
    C: Canvas + ?Sized,
{
    let row_height = plan.height();

    let mut origin = canvas.cursor();
    match decision {
        BreakDecision::Place => {}
        BreakDecision::MoveToNextPage => {
            canvas.add_page()?;
            // Same column layout on the new page: keep x, take the new top.
            origin.y = canvas.cursor().y;
            origin.page = canvas.cursor().page;
            canvas.set_cursor(origin.x, origin.y);
        }
        BreakDecision::Overflow => {
            warn!(
                row_height,
                remaining = canvas.remaining_height(),
                "row is taller than a page and will overflow the bottom margin"
            );
        }
    }

    let mut x = origin.x;
    for &width in widths {
        canvas.rect(x, origin.y, width, row_height)?;
        x += width;
    }

    for line_idx in 0..plan.max_lines {
        canvas.set_cursor(origin.x, origin.y + line_idx as f64 * plan.line_height);
        for (cell_lines, &width) in plan.lines.iter().zip(widths) {
            let text = cell_lines.get(line_idx).map(String::as_str).unwrap_or("");
            canvas.cell(width, plan.line_height, text)?;
        }
    }

    canvas.set_cursor(origin.x, origin.y + row_height);
    trace!(page = origin.page, y = origin.y, row_height, "rendered row");
    Ok(canvas.cursor())
}

/// Render one row with uniform height across its columns.
///
/// The cursor is the row's top-left corner. Each cell is wrapped to its
/// column, every column gets a border as tall as the tallest cell, and the
/// returned cursor is the next row's origin.
pub fn render_row<C, S>(canvas: &mut C, cells: &[S], widths: &[f64], line_height: f64) -> Result<CursorState>
where
    C: Canvas + ?Sized,
    S: AsRef<str>,
{
    let plan = measure_row(&*canvas, cells, widths, line_height)?;
    render_planned_row(canvas, &plan, widths)
}

/// What a table render produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSummary {
    /// Pages the table touched, including the one it started on.
    pub pages: usize,
    /// Rows drawn, counting the header once per time it was drawn.
    pub rows_drawn: usize,
    pub column_widths: Vec<f64>,
    pub cursor: CursorState,
}

/// Lays a whole table onto a canvas: new landscape page, fixed font,
/// equal-width columns, header first, then every data row in order.
#[derive(Debug, Clone, Default)]
pub struct TableComposer {
    options: RenderOptions,
}

impl TableComposer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn render<C>(&self, table: &Table, canvas: &mut C) -> Result<TableSummary>
    where
        C: Canvas + ?Sized,
    {
        let opts = &self.options;
        if table.column_count() == 0 {
            return Err(SweepError::Layout("table has no columns".to_string()));
        }
        table.validate()?;

        canvas.set_auto_page_break(opts.auto_page_break, opts.page.margin.bottom);
        canvas.add_page()?;
        canvas.set_font(opts.font, opts.font_size);

        let first_page = canvas.cursor().page;
        let widths = column_widths(canvas.geometry().usable_width(), table.column_count());
        let header = table.header();

        render_row(canvas, header, &widths, opts.line_height)?;
        let mut rows_drawn = 1;

        for row in table.rows() {
            let cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
            let plan = measure_row(&*canvas, &cells, &widths, opts.line_height)?;

            if opts.repeat_header
                && decide_break(canvas.remaining_height(), plan.height(), canvas.at_page_top())
                    == BreakDecision::MoveToNextPage
            {
                canvas.add_page()?;
                render_row(canvas, header, &widths, opts.line_height)?;
                rows_drawn += 1;

                // Under a fresh header is as good as this row gets; a row
                // that still doesn't fit overflows here.
                let decision = match decide_break(canvas.remaining_height(), plan.height(), false) {
                    BreakDecision::Place => BreakDecision::Place,
                    BreakDecision::MoveToNextPage | BreakDecision::Overflow => BreakDecision::Overflow,
                };
                place_row(canvas, &plan, &widths, decision)?;
                rows_drawn += 1;
                continue;
            }

            render_planned_row(canvas, &plan, &widths)?;
            rows_drawn += 1;
        }

        let cursor = canvas.cursor();
        let summary = TableSummary {
            pages: cursor.page - first_page + 1,
            rows_drawn,
            column_widths: widths,
            cursor,
        };
        debug!(
            columns = table.column_count(),
            rows = table.row_count(),
            pages = summary.pages,
            "rendered table"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DocumentCanvas, DrawOp};
    use crate::config::PageConfig;
    use crate::font::FontFamily;

    fn canvas() -> DocumentCanvas {
        let mut c = DocumentCanvas::new(PageConfig::default());
        c.add_page().unwrap();
        c.set_font(FontFamily::Helvetica, 8.0);
        c
    }

    #[test]
    fn test_widths_split_evenly() {
        let widths = column_widths(277.0, 4);
        assert_eq!(widths, vec![69.25; 4]);
        assert!((widths.iter().sum::<f64>() - 277.0).abs() < 1e-9);
        assert_eq!(column_widths(277.0, 4), widths);
    }

    #[test]
    fn test_empty_cell_still_takes_one_line() {
        let c = canvas();
        let plan = measure_row(&c, &["", ""], &[50.0, 50.0], 5.0).unwrap();
        assert_eq!(plan.max_lines, 1);
        assert_eq!(plan.height(), 5.0);
    }

    #[test]
    fn test_mismatched_widths_are_rejected() {
        let mut c = canvas();
        let err = render_row(&mut c, &["a", "b"], &[50.0], 5.0).unwrap_err();
        assert!(matches!(err, SweepError::Layout(_)));
        assert!(c.pages()[0].ops.is_empty());
    }

    #[test]
    fn test_zero_line_height_is_rejected() {
        let mut c = canvas();
        assert!(render_row(&mut c, &["a"], &[50.0], 0.0).is_err());
        assert!(render_row(&mut c, &["a"], &[0.0], 5.0).is_err());
        let empty: [&str; 0] = [];
        assert!(render_row(&mut c, &empty, &[], 5.0).is_err());
    }

    #[test]
    fn test_row_borders_share_one_height() {
        let mut c = canvas();
        let cells = ["short", "a very long string that must wrap across multiple lines"];
        let widths = [20.0, 20.0];
        let plan = measure_row(&c, &cells, &widths, 5.0).unwrap();
        assert_eq!(plan.lines[0].len(), 1);
        assert!(plan.lines[1].len() > 1);

        let next = render_row(&mut c, &cells, &widths, 5.0).unwrap();
        let rects: Vec<_> = c.pages()[0].rects().collect();
        assert_eq!(rects.len(), 2);
        let expected = plan.lines[1].len() as f64 * 5.0;
        for (_, _, _, h) in &rects {
            assert!((h - expected).abs() < 1e-9);
        }
        // Adjacent borders, no gap.
        assert!((rects[1].0 - (rects[0].0 + rects[0].2)).abs() < 1e-9);
        assert!((next.y - (10.0 + expected)).abs() < 1e-9);
        assert!((next.x - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_text_lines_step_down_by_line_height() {
        let mut c = canvas();
        render_row(&mut c, &["one\ntwo\nthree", "x"], &[40.0, 40.0], 5.0).unwrap();
        let ys: Vec<(f64, f64, &str)> = c.pages()[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { x, y, text, .. } => Some((*x, *y, text.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(
            ys,
            vec![(10.0, 10.0, "one"), (50.0, 10.0, "x"), (10.0, 15.0, "two"), (10.0, 20.0, "three")]
        );
    }

    #[test]
    fn test_unsupported_characters_are_replaced() {
        let mut c = canvas();
        render_row(&mut c, &["\u{4f60}\u{597d} ok"], &[100.0], 5.0).unwrap();
        let texts: Vec<&str> = c.pages()[0].texts().collect();
        assert_eq!(texts, vec!["?? ok"]);
    }

    #[test]
    fn test_row_that_does_not_fit_moves_whole() {
        let mut c = canvas();
        // 180mm of room on the first page.
        c.set_cursor(10.0, 187.0);
        let next = render_row(&mut c, &["a\nb", "c"], &[50.0, 50.0], 5.0).unwrap();
        assert_eq!(c.page_count(), 2);
        assert!(c.pages()[0].ops.is_empty());
        assert_eq!(c.pages()[1].rects().count(), 2);
        assert_eq!(next.page, 2);
        assert!((next.y - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_oversized_row_stays_on_fresh_page() {
        let mut c = canvas();
        let tall = vec!["x"; 60].join("\n");
        render_row(&mut c, &[tall.as_str()], &[50.0], 5.0).unwrap();
        assert_eq!(c.page_count(), 1);
        assert!(c.cursor().y > 190.0);
    }

    #[test]
    fn test_repeated_header_stays_with_oversized_row() {
        let tall = vec!["line"; 50].join("\n");
        let table = Table::new(
            vec!["h".into()],
            vec![vec!["x".into()], vec![tall.as_str().into()], vec!["after".into()]],
        )
        .unwrap();
        let composer = TableComposer::new(RenderOptions {
            repeat_header: true,
            ..Default::default()
        });
        let mut c = DocumentCanvas::new(PageConfig::default());
        let summary = composer.render(&table, &mut c).unwrap();

        assert_eq!(c.page_count(), 3);
        assert_eq!(c.pages()[0].texts().collect::<Vec<_>>(), vec!["h", "x"]);
        let second: Vec<&str> = c.pages()[1].texts().collect();
        assert_eq!(second.len(), 51);
        assert_eq!(second[0], "h");
        assert!(second[1..].iter().all(|t| *t == "line"));
        assert_eq!(c.pages()[2].texts().collect::<Vec<_>>(), vec!["h", "after"]);
        // header x3, three data rows
        assert_eq!(summary.rows_drawn, 6);
    }
}
