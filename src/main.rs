//! # Datasweep CLI
//!
//! Usage:
//!   datasweep convert sales.csv --to pdf -o sales.pdf
//!   datasweep convert sales.xlsx --to csv --dedup --columns region,total
//!   datasweep convert letter.docx --to pdf
//!   datasweep inspect sales.csv --rows 10
//!   datasweep example-config > render.json

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use datasweep::canvas::Canvas;
use datasweep::config::RenderOptions;
use datasweep::convert::office::{convert_document, select_converter, Platform};
use datasweep::convert::{self, default_output_path, Format};
use datasweep::model::Table;

#[derive(Parser, Debug)]
#[command(name = "datasweep", version, about = "Convert and clean tabular files")]
struct Args {
    /// Log at debug level (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a file to another format.
    Convert {
        input: PathBuf,

        /// Target format: csv, xlsx, pdf or docx.
        #[arg(long)]
        to: String,

        /// Output path. Defaults to the input name with the new extension
        /// (`<name>.cleaned.<ext>` when the format is unchanged).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON file with PDF render options.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Drop duplicate rows.
        #[arg(long)]
        dedup: bool,

        /// Fill empty cells of numeric columns with the column mean.
        #[arg(long)]
        fill_missing: bool,

        /// Keep only these columns, in this order.
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Also write the PDF page layout as JSON.
        #[arg(long)]
        layout_json: Option<PathBuf>,
    },

    /// Show a file's columns and first rows.
    Inspect {
        input: PathBuf,

        #[arg(long, default_value_t = 5)]
        rows: usize,
    },

    /// Print the default render options as JSON.
    ExampleConfig,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Convert {
            input,
            to,
            output,
            config,
            dedup,
            fill_missing,
            columns,
            layout_json,
        } => {
            let target = Format::from_extension(&to)?;
            let options = match config {
                Some(path) => {
                    let json = fs::read_to_string(&path)
                        .with_context(|| format!("reading config {}", path.display()))?;
                    RenderOptions::from_json(&json)?
                }
                None => RenderOptions::default(),
            };
            let output = output.unwrap_or_else(|| default_output_path(&input, target));
            if output == input {
                bail!(
                    "refusing to overwrite the input file {}; pass a different -o",
                    input.display()
                );
            }
            let cleaning = Cleaning {
                dedup,
                fill_missing,
                columns,
            };
            run_convert(&input, target, &output, &options, &cleaning, layout_json.as_deref())
        }
        Command::Inspect { input, rows } => run_inspect(&input, rows),
        Command::ExampleConfig => {
            println!("{}", serde_json::to_string_pretty(&RenderOptions::default())?);
            Ok(())
        }
    }
}

struct Cleaning {
    dedup: bool,
    fill_missing: bool,
    columns: Vec<String>,
}

impl Cleaning {
    fn is_noop(&self) -> bool {
        !self.dedup && !self.fill_missing && self.columns.is_empty()
    }

    fn apply(&self, mut table: Table) -> Result<Table> {
        if self.dedup {
            let removed = table.drop_duplicates();
            info!(removed, "removed duplicate rows");
        }
        if self.fill_missing {
            let filled = table.fill_missing_with_mean();
            info!(filled, "filled missing values");
        }
        if !self.columns.is_empty() {
            table = table.select_columns(&self.columns)?;
        }
        Ok(table)
    }
}

fn read_input(input: &Path) -> Result<(Vec<u8>, Format)> {
    let source = Format::from_path(input)?;
    let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    Ok((bytes, source))
}

fn run_convert(
    input: &Path,
    target: Format,
    output: &Path,
    options: &RenderOptions,
    cleaning: &Cleaning,
    layout_json: Option<&Path>,
) -> Result<()> {
    let (bytes, source) = read_input(input)?;

    let out_bytes = if source.is_tabular() {
        let table = cleaning.apply(convert::read_table(&bytes, source)?)?;
        if target == Format::Pdf {
            let canvas = datasweep::layout_table(&table, options)?;
            if let Some(path) = layout_json {
                let json = serde_json::to_string_pretty(&canvas.layout_info())?;
                fs::write(path, json)
                    .with_context(|| format!("writing layout to {}", path.display()))?;
            }
            canvas.output()?
        } else {
            convert::convert_table(&table, target, options)?.bytes
        }
    } else {
        if !cleaning.is_noop() {
            warn!("cleaning options apply to tabular files only; ignoring them");
        }
        if layout_json.is_some() {
            bail!("--layout-json needs a CSV or XLSX input");
        }
        let converter = select_converter(Platform::current(), source, target);
        convert_document(&bytes, source, target, converter.as_ref())?
    };

    fs::write(output, &out_bytes).with_context(|| format!("writing {}", output.display()))?;
    eprintln!("✓ Written {} bytes to {}", out_bytes.len(), output.display());
    Ok(())
}

fn run_inspect(input: &Path, preview_rows: usize) -> Result<()> {
    let (bytes, source) = read_input(input)?;
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    println!("File: {}", name);
    println!("Size: {:.2} KB", bytes.len() as f64 / 1024.0);

    if !source.is_tabular() {
        println!("Type: {}", source.mime_type());
        return Ok(());
    }

    let table = convert::read_table(&bytes, source)?;
    println!("Rows: {}", table.row_count());
    println!("Columns: {}", table.header().join(", "));
    let numeric: Vec<&str> = table
        .numeric_columns()
        .into_iter()
        .map(|i| table.header()[i].as_str())
        .collect();
    if !numeric.is_empty() {
        println!("Numeric: {}", numeric.join(", "));
    }

    println!();
    for row in table.head(preview_rows).text_rows() {
        println!("{}", row.join(" | "));
    }
    Ok(())
}
