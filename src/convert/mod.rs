//! # Format Conversion
//!
//! Dispatch between file formats. Tabular formats (CSV, XLSX) are read into
//! a [`Table`] and written back out as CSV, XLSX or a PDF grid. Word and PDF
//! documents are handed to an external office suite, see [`office`].

pub mod delimited;
pub mod office;
pub mod spreadsheet;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::config::RenderOptions;
use crate::error::{Result, SweepError};
use crate::model::Table;

/// File formats the tool knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Format {
    Csv,
    Xlsx,
    Pdf,
    Docx,
}

impl Format {
    /// Resolve a format from a bare extension such as `"csv"` or `".XLSX"`.
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "csv" => Ok(Format::Csv),
            "xlsx" => Ok(Format::Xlsx),
            "pdf" => Ok(Format::Pdf),
            "docx" => Ok(Format::Docx),
            other => Err(SweepError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| SweepError::UnsupportedFormat(path.display().to_string()))?;
        Self::from_extension(ext)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Xlsx => "xlsx",
            Format::Pdf => "pdf",
            Format::Docx => "docx",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Format::Csv => "text/csv",
            Format::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Format::Pdf => "application/pdf",
            Format::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// Whether the format holds a table this crate can read directly.
    pub fn is_tabular(&self) -> bool {
        matches!(self, Format::Csv | Format::Xlsx)
    }
}

/// A finished conversion, ready to be saved or offered as a download.
#[derive(Debug, Clone)]
pub struct Converted {
    pub bytes: Vec<u8>,
    pub format: Format,
}

impl Converted {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn extension(&self) -> &'static str {
        self.format.extension()
    }

    /// Output name for an input file: same stem, new extension.
    pub fn file_name(&self, input: &Path) -> String {
        output_file_name(input, self.format)
    }
}

/// `report.CSV` + Pdf -> `report.pdf`.
pub fn output_file_name(input: &Path, target: Format) -> String {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    format!("{}.{}", stem, target.extension())
}

/// Where a conversion of `input` lands when no output path is given: next
/// to the input, with the target extension. A same-format conversion gets
/// a `.cleaned` infix so it never replaces its source.
pub fn default_output_path(input: &Path, target: Format) -> PathBuf {
    let dir = input.parent().unwrap_or_else(|| Path::new(""));
    let name = output_file_name(input, target);
    // Case-insensitive filesystems treat `a.CSV` and `a.csv` as one file.
    let clashes = input
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.eq_ignore_ascii_case(&name));
    if !clashes {
        return dir.join(name);
    }
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    dir.join(format!("{}.cleaned.{}", stem, target.extension()))
}

/// Parse a tabular file's bytes.
pub fn read_table(bytes: &[u8], format: Format) -> Result<Table> {
    match format {
        Format::Csv => delimited::read_csv(bytes),
        Format::Xlsx => spreadsheet::read_xlsx(bytes),
        other => Err(SweepError::UnsupportedConversion {
            from: other.extension().to_string(),
            to: "table".to_string(),
        }),
    }
}

/// Write a table in the target format.
pub fn convert_table(table: &Table, target: Format, options: &RenderOptions) -> Result<Converted> {
    let bytes = match target {
        Format::Csv => delimited::write_csv(table)?,
        Format::Xlsx => spreadsheet::write_xlsx(table)?,
        Format::Pdf => crate::render_table(table, options)?,
        Format::Docx => {
            return Err(SweepError::UnsupportedConversion {
                from: "table".to_string(),
                to: target.extension().to_string(),
            })
        }
    };
    info!(
        target = target.extension(),
        rows = table.row_count(),
        bytes = bytes.len(),
        "converted table"
    );
    Ok(Converted {
        bytes,
        format: target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellValue;

    fn table() -> Table {
        Table::new(
            vec!["item".into(), "price".into()],
            vec![
                vec!["tea".into(), CellValue::Number(2.5)],
                vec!["cake".into(), CellValue::Int(4)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_formats_from_extensions() {
        assert_eq!(Format::from_extension("CSV").unwrap(), Format::Csv);
        assert_eq!(Format::from_extension(".xlsx").unwrap(), Format::Xlsx);
        assert_eq!(Format::from_path(Path::new("a/b/Report.PDF")).unwrap(), Format::Pdf);
        assert!(matches!(
            Format::from_extension("txt"),
            Err(SweepError::UnsupportedFormat(ext)) if ext == "txt"
        ));
        assert!(Format::from_path(Path::new("no_extension")).is_err());
    }

    #[test]
    fn test_output_names_swap_extension() {
        assert_eq!(output_file_name(Path::new("data/sales.csv"), Format::Xlsx), "sales.xlsx");
        assert_eq!(output_file_name(Path::new("sales.tar.csv"), Format::Pdf), "sales.tar.pdf");
    }

    #[test]
    fn test_default_output_never_replaces_input() {
        assert_eq!(
            default_output_path(Path::new("data/sales.csv"), Format::Pdf),
            PathBuf::from("data/sales.pdf")
        );
        assert_eq!(
            default_output_path(Path::new("data/sales.csv"), Format::Csv),
            PathBuf::from("data/sales.cleaned.csv")
        );
        assert_eq!(
            default_output_path(Path::new("sales.xlsx"), Format::Xlsx),
            PathBuf::from("sales.cleaned.xlsx")
        );
        assert_eq!(
            default_output_path(Path::new("Sales.CSV"), Format::Csv),
            PathBuf::from("Sales.cleaned.csv")
        );
    }

    #[test]
    fn test_table_to_pdf_has_pdf_mime() {
        let converted = convert_table(&table(), Format::Pdf, &RenderOptions::default()).unwrap();
        assert_eq!(converted.mime_type(), "application/pdf");
        assert!(converted.bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_table_to_docx_is_unsupported() {
        let err = convert_table(&table(), Format::Docx, &RenderOptions::default()).unwrap_err();
        assert!(matches!(err, SweepError::UnsupportedConversion { .. }));
    }

    #[test]
    fn test_csv_round_trip_through_dispatch() {
        let converted = convert_table(&table(), Format::Csv, &RenderOptions::default()).unwrap();
        let back = read_table(&converted.bytes, Format::Csv).unwrap();
        assert_eq!(back, table());
    }

    #[test]
    fn test_pdf_is_not_readable_as_table() {
        assert!(read_table(b"%PDF-1.7", Format::Pdf).is_err());
    }
}
