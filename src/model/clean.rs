//! Data cleaning passes applied before conversion.

use std::collections::HashSet;

use tracing::debug;

use super::{CellValue, Table};
use crate::error::{Result, SweepError};

impl Table {
    /// Remove rows equal to an earlier row, keeping the first occurrence.
    /// Returns how many rows were dropped.
    pub fn drop_duplicates(&mut self) -> usize {
        let before = self.row_count();
        let mut seen: HashSet<Vec<CellValue>> = HashSet::with_capacity(before);
        self.rows_mut().retain(|row| seen.insert(row.clone()));
        let removed = before - self.row_count();
        debug!(removed, "dropped duplicate rows");
        removed
    }

    /// Indices of columns where every non-empty cell is numeric and at least
    /// one cell is.
    pub fn numeric_columns(&self) -> Vec<usize> {
        (0..self.column_count())
            .filter(|&col| {
                let mut any_numeric = false;
                for row in self.rows() {
                    match &row[col] {
                        CellValue::Empty => {}
                        CellValue::Int(_) | CellValue::Number(_) => any_numeric = true,
                        _ => return false,
                    }
                }
                any_numeric
            })
            .collect()
    }

    /// Fill empty cells of numeric columns with the column mean.
    /// Returns how many cells were filled.
    ///
    /// A column that receives a mean becomes a float column: its integer
    /// cells are widened to [`CellValue::Number`] as well. Columns with
    /// nothing to fill keep their integers.
    pub fn fill_missing_with_mean(&mut self) -> usize {
        let mut filled = 0;
        for col in self.numeric_columns() {
            if !self.rows().iter().any(|r| r[col].is_empty()) {
                continue;
            }
            let values: Vec<f64> = self.rows().iter().filter_map(|r| r[col].as_f64()).collect();
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            for row in self.rows_mut().iter_mut() {
                match row[col] {
                    CellValue::Empty => {
                        row[col] = CellValue::Number(mean);
                        filled += 1;
                    }
                    CellValue::Int(i) => row[col] = CellValue::Number(i as f64),
                    _ => {}
                }
            }
        }
        debug!(filled, "filled missing numeric cells");
        filled
    }

    /// Keep only the named columns, in the order given.
    pub fn select_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<Table> {
        let indices = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.column_index(name)
                    .ok_or_else(|| SweepError::UnknownColumn(name.to_string()))
            })
            .collect::<Result<Vec<usize>>>()?;

        let header = indices.iter().map(|&i| self.header()[i].clone()).collect();
        let rows = self
            .rows()
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Table::new(header, rows)
    }
}
