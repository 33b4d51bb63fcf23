//! CSV reading and writing.

use csv::{ReaderBuilder, WriterBuilder};

use crate::error::{Result, SweepError};
use crate::model::{CellValue, Table};

/// Read CSV bytes. The first record is the header; cell types are inferred.
pub fn read_csv(bytes: &[u8]) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);

    let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if header.is_empty() {
        return Err(SweepError::InvalidTable("CSV has no header row".to_string()));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(CellValue::infer).collect());
    }

    Table::new(header, rows)
}

/// Write a table as CSV: header, then one record per row.
pub fn write_csv(table: &Table) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(table.header())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|c| c.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| SweepError::Io(e.into_error()))
}
