//! # Table Model
//!
//! The input representation for the layout engine and the converters. A
//! table is a header (column names) plus rows of cells aligned positionally
//! to the header. Every reader produces one, every writer consumes one.
//!
//! Cells carry a loose type (number, boolean, text) because the spreadsheet
//! writer and the cleaning operations care about it. The PDF layout does
//! not: it only ever sees the `Display` form of a cell.

pub mod clean;

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SweepError};

/// A single cell value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Int(i64),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Infer a typed value from raw text, the way a CSV reader sees it.
    ///
    /// Empty strings and `NaN` are missing values. Integers stay integers,
    /// other numerics become floats, `true`/`false` (any case) become
    /// booleans. Everything else is kept as text, untrimmed.
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return CellValue::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_nan() {
                return CellValue::Empty;
            }
            return CellValue::Number(f);
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return CellValue::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return CellValue::Bool(false);
        }
        CellValue::Text(raw.to_string())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Numeric view of the cell, if it holds a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Number(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            CellValue::Int(i) => write!(f, "{}", i),
            // Whole floats keep their decimal point so 2.0 doesn't read as an integer.
            CellValue::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e16 => {
                write!(f, "{:.1}", n)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

// Floats compare by bit pattern so that CellValue can key a HashSet, with
// -0.0 folded onto 0.0. NaN never reaches a cell (`infer` maps it to Empty).
fn float_key(f: f64) -> u64 {
    if f == 0.0 {
        0f64.to_bits()
    } else {
        f.to_bits()
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Empty, CellValue::Empty) => true,
            (CellValue::Bool(a), CellValue::Bool(b)) => a == b,
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            (CellValue::Number(a), CellValue::Number(b)) => float_key(*a) == float_key(*b),
            (CellValue::Text(a), CellValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Empty => {}
            CellValue::Bool(b) => b.hash(state),
            CellValue::Int(i) => i.hash(state),
            CellValue::Number(n) => float_key(*n).hash(state),
            CellValue::Text(s) => s.hash(state),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Number(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

/// A tabular dataset: column names plus rows aligned to them.
///
/// Construct through [`Table::new`] or deserialize; both reject rows whose
/// length differs from the header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

/// Wire form of [`Table`], checked on the way in.
#[derive(Deserialize)]
struct RawTable {
    header: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<CellValue>>,
}

impl TryFrom<RawTable> for Table {
    type Error = SweepError;

    fn try_from(raw: RawTable) -> Result<Self> {
        Table::new(raw.header, raw.rows)
    }
}

impl Table {
    pub fn new(header: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let table = Self { header, rows };
        table.validate()?;
        Ok(table)
    }

    /// Check the row-length invariant.
    pub fn validate(&self) -> Result<()> {
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != self.header.len() {
                return Err(SweepError::InvalidTable(format!(
                    "row {} has {} cells but the header has {} columns",
                    i + 1,
                    row.len(),
                    self.header.len()
                )));
            }
        }
        Ok(())
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// A copy holding only the first `n` rows.
    pub fn head(&self, n: usize) -> Table {
        Table {
            header: self.header.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Every row (header first) as display text, ready for layout.
    pub fn text_rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        std::iter::once(self.header.clone()).chain(
            self.rows
                .iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect()),
        )
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Vec<CellValue>> {
        &mut self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_types() {
        assert_eq!(CellValue::infer(""), CellValue::Empty);
        assert_eq!(CellValue::infer("  "), CellValue::Empty);
        assert_eq!(CellValue::infer("NaN"), CellValue::Empty);
        assert_eq!(CellValue::infer("42"), CellValue::Int(42));
        assert_eq!(CellValue::infer("-3.5"), CellValue::Number(-3.5));
        assert_eq!(CellValue::infer("TRUE"), CellValue::Bool(true));
        assert_eq!(CellValue::infer("hello"), CellValue::Text("hello".into()));
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(CellValue::Empty.to_string(), "");
        assert_eq!(CellValue::Int(7).to_string(), "7");
        assert_eq!(CellValue::Number(2.0).to_string(), "2.0");
        assert_eq!(CellValue::Number(1.25).to_string(), "1.25");
        assert_eq!(CellValue::Bool(false).to_string(), "False");
    }

    #[test]
    fn test_signed_zeros_compare_and_hash_equal() {
        use std::collections::hash_map::DefaultHasher;
        let hash = |c: &CellValue| {
            let mut h = DefaultHasher::new();
            c.hash(&mut h);
            h.finish()
        };
        let (pos, neg) = (CellValue::Number(0.0), CellValue::infer("-0.0"));
        assert_eq!(neg, CellValue::Number(-0.0));
        assert_eq!(pos, neg);
        assert_eq!(hash(&pos), hash(&neg));
        assert_ne!(CellValue::Number(1.0), CellValue::Number(-1.0));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Table::new(
            vec!["a".into(), "b".into()],
            vec![vec![CellValue::Int(1)]],
        )
        .unwrap_err();
        assert!(matches!(err, SweepError::InvalidTable(_)));
    }

    #[test]
    fn test_text_rows_start_with_header() {
        let table = Table::new(
            vec!["name".into(), "qty".into()],
            vec![vec!["bolt".into(), CellValue::Int(3)]],
        )
        .unwrap();
        let rows: Vec<Vec<String>> = table.text_rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["name", "qty"]);
        assert_eq!(rows[1], vec!["bolt", "3"]);
    }

    #[test]
    fn test_deserialized_table_mixes_types() {
        let table: Table =
            serde_json::from_str(r#"{ "header": ["a", "b"], "rows": [[1, "x"], [2.5, null]] }"#)
                .unwrap();
        assert_eq!(table.rows()[0][0], CellValue::Int(1));
        assert_eq!(table.rows()[1][0], CellValue::Number(2.5));
        assert_eq!(table.rows()[1][1], CellValue::Empty);
    }

    #[test]
    fn test_ragged_json_fails_to_deserialize() {
        let err = serde_json::from_str::<Table>(r#"{ "header": ["a", "b"], "rows": [["x"]] }"#)
            .unwrap_err();
        assert!(err.is_data());
        assert!(err.to_string().contains("row 1 has 1 cells"), "{}", err);

        let err: SweepError =
            serde_json::from_str::<Table>(r#"{ "header": ["a"], "rows": [[1, 2]] }"#)
                .unwrap_err()
                .into();
        assert!(matches!(err, SweepError::Parse { .. }));
    }

    #[test]
    fn test_missing_rows_deserialize_as_header_only() {
        let table: Table = serde_json::from_str(r#"{ "header": ["a"] }"#).unwrap();
        assert_eq!(table.row_count(), 0);
    }
}
