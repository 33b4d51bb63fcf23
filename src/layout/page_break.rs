//! # Page Break Decisions
//!
//! Table rows are unbreakable: a row's borders and all of its text land on
//! one page. This module decides, per row, whether it goes on the current
//! page or starts a new one.

/// What to do with a row before drawing it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BreakDecision {
    /// The row fits in the remaining space.
    Place,
    /// Start a new page and draw the row at its top.
    MoveToNextPage,
    /// The row is taller than an empty page. Draw it here and let it run
    /// past the bottom margin; moving it would not help.
    Overflow,
}

/// Slack for rows that end exactly on the trigger line.
const EPSILON: f64 = 1e-9;

/// Given the remaining height on the page and the row height, decide where
/// the row goes. `at_page_top` is true when nothing has been drawn below
/// the top margin yet.
pub fn decide_break(remaining_height: f64, row_height: f64, at_page_top: bool) -> BreakDecision {
    if row_height <= remaining_height + EPSILON {
        return BreakDecision::Place;
    }
    if at_page_top {
        return BreakDecision::Overflow;
    }
    BreakDecision::MoveToNextPage
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_fits() {
        assert_eq!(decide_break(100.0, 20.0, false), BreakDecision::Place);
    }

    #[test]
    fn test_row_ending_on_trigger_fits() {
        assert_eq!(decide_break(15.0, 15.0, false), BreakDecision::Place);
    }

    #[test]
    fn test_row_moves_to_next_page() {
        assert_eq!(decide_break(10.0, 15.0, false), BreakDecision::MoveToNextPage);
    }

    #[test]
    fn test_oversized_row_at_top_overflows() {
        assert_eq!(decide_break(180.0, 400.0, true), BreakDecision::Overflow);
    }

    #[test]
    fn test_pagination_disabled_always_places() {
        assert_eq!(decide_break(f64::INFINITY, 1e6, false), BreakDecision::Place);
    }
}
