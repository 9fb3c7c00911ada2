use anyhow::{anyhow, bail, Context, Result};
use flate2::read::GzDecoder;
use log::{debug, info};
use polars::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use super::{ListField, RawRecord};

/// Supported input layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Header row plus one paper per row
    Csv,
    /// One JSON object per line (arXiv metadata snapshot shape)
    JsonLines { gzip: bool },
}

impl InputFormat {
    /// Pick the format from the file extension
    pub fn detect(path: &Path) -> Result<Self> {
        let ext = extension_lower(path);
        match ext.as_deref() {
            Some("csv") => Ok(InputFormat::Csv),
            Some("jsonl") | Some("json") | Some("ndjson") => Ok(InputFormat::JsonLines { gzip: false }),
            Some("gz") => {
                let inner = path.file_stem().map(Path::new).and_then(extension_lower);
                match inner.as_deref() {
                    Some("jsonl") | Some("json") | Some("ndjson") => {
                        Ok(InputFormat::JsonLines { gzip: true })
                    }
                    _ => bail!("Unsupported compressed input (expected .jsonl.gz): {}", path.display()),
                }
            }
            _ => bail!("Unsupported input format (expected .csv or .jsonl): {}", path.display()),
        }
    }
}

fn extension_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Read a CSV file with every column as a string column
pub fn read_csv_strings(path: &Path) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?
        .finish()
        .with_context(|| format!("Failed to parse CSV file: {}", path.display()))
}

/// Look up an optional string column
pub fn optional_str_column<'a>(df: &'a DataFrame, name: &str) -> Result<Option<&'a StringChunked>> {
    match df.column(name) {
        Ok(column) => Ok(Some(
            column
                .str()
                .with_context(|| format!("Column '{}' is not a string column", name))?,
        )),
        Err(_) => Ok(None),
    }
}

/// Look up a required string column
pub fn required_str_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked> {
    optional_str_column(df, name)?.ok_or_else(|| anyhow!("Missing required column '{}'", name))
}

fn cell(column: Option<&StringChunked>, row: usize) -> Option<String> {
    column.and_then(|c| c.get(row)).map(|s| s.to_string())
}

/// Read raw records from a CSV file
pub fn read_csv_records(path: &Path) -> Result<Vec<RawRecord>> {
    let df = read_csv_strings(path)?;

    let ids = required_str_column(&df, "id")?;
    let titles = optional_str_column(&df, "title")?;
    let authors = optional_str_column(&df, "authors")?;
    let authors_parsed = optional_str_column(&df, "authors_parsed")?;
    let categories = optional_str_column(&df, "categories")?;
    let abstracts = optional_str_column(&df, "abstract")?;
    let citations = optional_str_column(&df, "citations")?;
    let update_dates = optional_str_column(&df, "update_date")?;

    info!("Read {} CSV rows from {}", df.height(), path.display());

    let records = (0..df.height())
        .map(|row| RawRecord {
            id: ids.get(row).map(|s| s.to_string()),
            title: cell(titles, row),
            authors: cell(authors, row).map(ListField::Literal),
            authors_parsed: cell(authors_parsed, row).map(ListField::Literal),
            categories: cell(categories, row),
            abstract_text: cell(abstracts, row),
            citations: cell(citations, row).map(ListField::Literal),
            update_date: cell(update_dates, row),
        })
        .collect();

    Ok(records)
}

/// Read raw records from a JSON Lines stream. Malformed lines are skipped.
/// Returns the records and the number of malformed lines.
pub fn read_jsonl_from<R: Read>(reader: R) -> Result<(Vec<RawRecord>, usize)> {
    let reader = BufReader::new(reader);
    let mut records = Vec::new();
    let mut malformed = 0;

    for (line_no, line_result) in reader.lines().enumerate() {
        let line = line_result.context("Failed to read line")?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<RawRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                debug!("Skipping malformed line {}: {}", line_no + 1, e);
                malformed += 1;
            }
        }
    }

    Ok((records, malformed))
}

/// Read raw records from a JSON Lines file, optionally gzip-compressed
pub fn read_jsonl_records(path: &Path, gzip: bool) -> Result<(Vec<RawRecord>, usize)> {
    let file = File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;

    let (records, malformed) = if gzip {
        read_jsonl_from(GzDecoder::new(file))
    } else {
        read_jsonl_from(file)
    }
    .with_context(|| format!("Failed to read JSON lines from: {}", path.display()))?;

    info!(
        "Read {} JSON records from {} ({} malformed lines)",
        records.len(),
        path.display(),
        malformed
    );
    Ok((records, malformed))
}
