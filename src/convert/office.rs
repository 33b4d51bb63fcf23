//! # Document Conversion
//!
//! Word <-> PDF conversion is delegated to an office suite reached through
//! the [`DocumentConverter`] trait. Two backends exist:
//!
//! - [`NativeWord`] scripts an installed Microsoft Word (PowerShell COM on
//!   Windows, AppleScript on macOS). It only exports PDF.
//! - [`HeadlessOffice`] shells out to LibreOffice's `soffice`, both ways.
//!
//! [`select_converter`] picks one for a platform and conversion pair.
//!
//! All intermediate files live in a [`tempfile::TempDir`] that is removed
//! when [`convert_document`] returns, on success or failure.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;
use tracing::{debug, info};

use super::Format;
use crate::error::{Result, SweepError};

/// Something that can turn a document file into another format.
pub trait DocumentConverter {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Convert `input` to `target`, writing into `out_dir`. Returns the path
    /// of the produced file.
    fn convert(&self, input: &Path, target: Format, out_dir: &Path) -> Result<PathBuf>;
}

/// Operating systems with a known office suite install location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    /// Default `soffice` executable for the platform.
    pub fn office_program(&self) -> PathBuf {
        match self {
            Platform::Windows => PathBuf::from(r"C:\Program Files\LibreOffice\program\soffice.exe"),
            Platform::MacOs => PathBuf::from("/Applications/LibreOffice.app/Contents/MacOS/soffice"),
            Platform::Linux => PathBuf::from("soffice"),
        }
    }
}

/// Whether a document conversion pair is supported.
pub fn is_supported(source: Format, target: Format) -> bool {
    matches!((source, target), (Format::Docx, Format::Pdf) | (Format::Pdf, Format::Docx))
}

/// Pick a backend: Word where it can do the job natively, LibreOffice
/// everywhere else.
pub fn select_converter(platform: Platform, source: Format, target: Format) -> Box<dyn DocumentConverter> {
    match (platform, source, target) {
        (Platform::Windows | Platform::MacOs, Format::Docx, Format::Pdf) => {
            Box::new(NativeWord::new(platform))
        }
        _ => Box::new(HeadlessOffice::for_platform(platform)),
    }
}

/// Run an external program, mapping spawn failures and non-zero exits to
/// [`SweepError::Converter`].
fn run_program(program: &Path, args: &[String]) -> Result<()> {
    let output = Command::new(program).args(args).output().map_err(|e| {
        SweepError::Converter(format!("could not start '{}': {}", program.display(), e))
    })?;

    if !output.status.success() {
        return Err(SweepError::Converter(format!(
            "'{}' exited with {}: {}",
            program.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(())
}

/// Where a converter writes its result: `out_dir/<input stem>.<ext>`.
fn expected_output(input: &Path, target: Format, out_dir: &Path) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("document");
    out_dir.join(format!("{}.{}", stem, target.extension()))
}

fn check_produced(path: PathBuf) -> Result<PathBuf> {
    if path.exists() {
        Ok(path)
    } else {
        Err(SweepError::Converter(format!(
            "converter reported success but {} was not produced",
            path.display()
        )))
    }
}

/// Microsoft Word driven by the platform's scripting host.
#[derive(Debug, Clone, Copy)]
pub struct NativeWord {
    platform: Platform,
}

impl NativeWord {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    /// Program and arguments that export `input` as PDF to `output`.
    fn invocation(&self, input: &Path, output: &Path) -> Result<(PathBuf, Vec<String>)> {
        match self.platform {
            Platform::Windows => {
                // wdFormatPDF = 17
                let script = format!(
                    "$w = New-Object -ComObject Word.Application; $w.Visible = $false; \
                     $d = $w.Documents.Open('{}', $false, $true); \
                     $d.SaveAs([ref] '{}', [ref] 17); $d.Close(); $w.Quit()",
                    powershell_quote(input),
                    powershell_quote(output)
                );
                Ok((
                    PathBuf::from("powershell"),
                    vec![
                        "-NoProfile".to_string(),
                        "-NonInteractive".to_string(),
                        "-Command".to_string(),
                        script,
                    ],
                ))
            }
            Platform::MacOs => {
                let script = format!(
                    "tell application \"Microsoft Word\"\n\
                     open POSIX file \"{}\"\n\
                     set d to active document\n\
                     save as d file name (POSIX file \"{}\" as string) file format format PDF\n\
                     close d saving no\n\
                     end tell",
                    applescript_quote(input),
                    applescript_quote(output)
                );
                Ok((PathBuf::from("osascript"), vec!["-e".to_string(), script]))
            }
            Platform::Linux => Err(SweepError::Converter(
                "Microsoft Word is not available on Linux".to_string(),
            )),
        }
    }
}

fn powershell_quote(path: &Path) -> String {
    path.display().to_string().replace('\'', "''")
}

fn applescript_quote(path: &Path) -> String {
    path.display()
        .to_string()
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
}

impl DocumentConverter for NativeWord {
    fn name(&self) -> &'static str {
        "word"
    }

    fn convert(&self, input: &Path, target: Format, out_dir: &Path) -> Result<PathBuf> {
        if target != Format::Pdf {
            return Err(SweepError::UnsupportedConversion {
                from: "docx".to_string(),
                to: target.extension().to_string(),
            });
        }
        let output = expected_output(input, target, out_dir);
        let (program, args) = self.invocation(input, &output)?;
        debug!(program = %program.display(), "running Word export");
        run_program(&program, &args)?;
        check_produced(output)
    }
}

/// LibreOffice (or compatible) run in headless mode.
#[derive(Debug, Clone)]
pub struct HeadlessOffice {
    program: PathBuf,
}

impl HeadlessOffice {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn for_platform(platform: Platform) -> Self {
        Self::new(platform.office_program())
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Command-line arguments for one conversion.
    fn arguments(&self, input: &Path, target: Format, out_dir: &Path) -> Vec<String> {
        let mut args = vec!["--headless".to_string()];
        // PDFs open in Draw by default; the Writer import filter is needed
        // to get a text document out.
        if input.extension().and_then(|e| e.to_str()) == Some("pdf") {
            args.push("--infilter=writer_pdf_import".to_string());
        }
        let filter = match target {
            Format::Docx => "docx:MS Word 2007 XML".to_string(),
            other => other.extension().to_string(),
        };
        args.extend([
            "--convert-to".to_string(),
            filter,
            "--outdir".to_string(),
            out_dir.display().to_string(),
            input.display().to_string(),
        ]);
        args
    }
}

impl Default for HeadlessOffice {
    fn default() -> Self {
        Self::for_platform(Platform::current())
    }
}

impl DocumentConverter for HeadlessOffice {
    fn name(&self) -> &'static str {
        "soffice"
    }

    fn convert(&self, input: &Path, target: Format, out_dir: &Path) -> Result<PathBuf> {
        let args = self.arguments(input, target, out_dir);
        debug!(program = %self.program.display(), ?args, "running office converter");
        run_program(&self.program, &args)?;
        check_produced(expected_output(input, target, out_dir))
    }
}

/// Convert document bytes from `source` to `target` through `converter`.
pub fn convert_document(
    bytes: &[u8],
    source: Format,
    target: Format,
    converter: &dyn DocumentConverter,
) -> Result<Vec<u8>> {
    if !is_supported(source, target) {
        return Err(SweepError::UnsupportedConversion {
            from: source.extension().to_string(),
            to: target.extension().to_string(),
        });
    }

    let work = TempDir::new()?;
    let input = work.path().join(format!("input.{}", source.extension()));
    fs::write(&input, bytes)?;
    let out_dir = work.path().join("out");
    fs::create_dir(&out_dir)?;

    let produced = converter.convert(&input, target, &out_dir)?;
    let result = fs::read(&produced)?;
    info!(
        backend = converter.name(),
        from = source.extension(),
        to = target.extension(),
        bytes = result.len(),
        "converted document"
    );
    Ok(result)
}
