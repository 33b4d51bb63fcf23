//! XLSX reading (calamine) and writing (rust_xlsxwriter).

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::Workbook;
use tracing::debug;

use crate::error::{Result, SweepError};
use crate::model::{CellValue, Table};

/// Read the first worksheet. Its first row is the header.
///
/// Whole-number floats come back as integers: XLSX stores every number as
/// a double, so `4` written as an integer reads back as `4.0`.
pub fn read_xlsx(bytes: &[u8]) -> Result<Table> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let sheet_names = workbook.sheet_names().to_vec();
    let first = sheet_names
        .first()
        .ok_or_else(|| SweepError::InvalidTable("workbook contains no sheets".to_string()))?;

    let range = workbook.worksheet_range(first)?;
    debug!(sheet = %first, rows = range.height(), columns = range.width(), "reading worksheet");

    let mut rows = range.rows();
    let header: Vec<String> = match rows.next() {
        Some(cells) => cells.iter().map(|c| cell_value(c).to_string()).collect(),
        None => {
            return Err(SweepError::InvalidTable(format!(
                "worksheet '{}' is empty",
                first
            )))
        }
    };

    let body = rows
        .map(|cells| cells.iter().map(cell_value).collect())
        .collect();

    Table::new(header, body)
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::infer(s),
        Data::Float(f) if f.is_nan() => CellValue::Empty,
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => CellValue::Int(*f as i64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Int(*i),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::Text(format!("{:?}", e)),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

/// Write the table to a single-sheet workbook: header on row 0, data below.
pub fn write_xlsx(table: &Table) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, name) in table.header().iter().enumerate() {
        worksheet.write_string(0, col as u16, name)?;
    }

    for (r, row) in table.rows().iter().enumerate() {
        let r = r as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                CellValue::Empty => {}
                CellValue::Bool(b) => {
                    worksheet.write_boolean(r, col, *b)?;
                }
                CellValue::Int(i) => {
                    worksheet.write_number(r, col, *i as f64)?;
                }
                CellValue::Number(n) => {
                    worksheet.write_number(r, col, *n)?;
                }
                CellValue::Text(s) => {
                    worksheet.write_string(r, col, s)?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xlsx_round_trip_keeps_types() {
        let table = Table::new(
            vec!["name".into(), "qty".into(), "price".into(), "stock".into()],
            vec![
                vec!["bolt".into(), CellValue::Int(3), CellValue::Number(0.25), true.into()],
                vec!["nut".into(), CellValue::Empty, CellValue::Number(1.5), false.into()],
            ],
        )
        .unwrap();

        let bytes = write_xlsx(&table).unwrap();
        assert!(bytes.starts_with(b"PK"));
        assert_eq!(read_xlsx(&bytes).unwrap(), table);
    }

    #[test]
    fn test_header_only_workbook() {
        let table = Table::new(vec!["a".into(), "b".into()], vec![]).unwrap();
        let back = read_xlsx(&write_xlsx(&table).unwrap()).unwrap();
        assert_eq!(back.header(), &["a", "b"]);
        assert_eq!(back.row_count(), 0);
    }

    #[test]
    fn test_garbage_is_an_xlsx_error() {
        let err = read_xlsx(b"not a zip archive").unwrap_err();
        assert!(matches!(err, SweepError::XlsxRead(_)));
    }
}
