pub mod authors;
pub mod category;
pub mod literal;
pub mod paper;
pub mod patterns;
pub mod reader;

pub use authors::{author_id, clean_authors, is_valid_author, AUTHOR_ID_PREFIX};
pub use category::{display_category, top_levels, TopLevel, OTHER_CATEGORY};
pub use literal::{parse_nested_string_list, parse_string_list, LiteralError};
pub use paper::{Paper, PaperTable};
pub use patterns::extract_year;
pub use reader::InputFormat;

use anyhow::Result;
use log::{debug, info};
use serde::Deserialize;
use std::path::Path;
use std::time::Instant;
use thiserror::Error;

use crate::common::{create_spinner, format_elapsed, IngestStats};

/// A list-valued column: already structured (JSON input) or a textual literal (CSV input).
/// Any other JSON shape lands in `Malformed` so the rest of the record survives.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ListField<T> {
    Parsed(T),
    Literal(String),
    Malformed(serde_json::Value),
}

/// One input row before normalization
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Option<ListField<Vec<String>>>,
    #[serde(default)]
    pub authors_parsed: Option<ListField<Vec<Vec<String>>>>,
    #[serde(default)]
    pub categories: Option<String>,
    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub citations: Option<ListField<Vec<String>>>,
    #[serde(default)]
    pub update_date: Option<String>,
}

/// Why a record could not become a paper
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    #[error("skipping record {id:?}: {reason}")]
    SkipRecord { id: String, reason: &'static str },
}

/// A normalized paper plus the recoverable issues found on the way
#[derive(Debug, Clone)]
pub struct Normalized {
    pub paper: Paper,
    pub authors_rejected: usize,
    pub citations_malformed: bool,
}

/// A raw author cell is either a list literal or a delimited string
fn author_candidates(text: &str) -> Vec<String> {
    if text.trim_start().starts_with('[') {
        if let Ok(names) = parse_string_list(text) {
            return names.iter().map(|name| authors::normalize_name(name)).collect();
        }
    }
    authors::split_author_string(text)
}

fn resolve_authors(raw: &RawRecord) -> (Vec<String>, usize) {
    let parsed = match &raw.authors_parsed {
        Some(ListField::Parsed(parts)) => Some(parts.clone()),
        Some(ListField::Literal(text)) => parse_nested_string_list(text).ok(),
        Some(ListField::Malformed(_)) | None => None,
    };

    let candidates = match parsed {
        Some(parts) if !parts.is_empty() => authors::names_from_parsed(&parts),
        _ => match &raw.authors {
            Some(ListField::Parsed(names)) => names.iter().map(|name| authors::normalize_name(name)).collect(),
            Some(ListField::Literal(text)) => author_candidates(text),
            Some(ListField::Malformed(value)) => {
                debug!("Unusable authors value for {:?}: {}", raw.id, value);
                Vec::new()
            }
            None => Vec::new(),
        },
    };

    clean_authors(candidates.into_iter().filter(|name| !name.is_empty()))
}

fn resolve_citations(raw: &RawRecord) -> (Vec<String>, bool) {
    match &raw.citations {
        Some(ListField::Parsed(ids)) => (ids.iter().map(|s| s.trim().to_string()).collect(), false),
        Some(ListField::Literal(text)) => match parse_string_list(text) {
            Ok(ids) => (ids.into_iter().map(|s| s.trim().to_string()).collect(), false),
            Err(e) => {
                debug!("Malformed citation list for {:?}: {}", raw.id, e);
                (Vec::new(), true)
            }
        },
        Some(ListField::Malformed(value)) => {
            debug!("Malformed citation list for {:?}: {}", raw.id, value);
            (Vec::new(), true)
        }
        None => (Vec::new(), false),
    }
}

fn resolve_categories(raw: &RawRecord) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    for code in raw.categories.as_deref().unwrap_or("").split_whitespace() {
        if !categories.iter().any(|c| c == code) {
            categories.push(code.to_string());
        }
    }
    categories
}

/// Normalize a raw row into a canonical paper.
///
/// Fails with [`IngestError::SkipRecord`] when the id is missing or no
/// publication year can be derived from it. A malformed citation literal is
/// recovered as an empty list.
pub fn normalize_record(raw: &RawRecord) -> Result<Normalized, IngestError> {
    let id = raw.id.as_deref().map(str::trim).unwrap_or("");
    if id.is_empty() {
        return Err(IngestError::SkipRecord {
            id: String::new(),
            reason: "missing id",
        });
    }

    let year = extract_year(id).ok_or_else(|| IngestError::SkipRecord {
        id: id.to_string(),
        reason: "no publication year in id",
    })?;

    let (authors, authors_rejected) = resolve_authors(raw);
    let (citations, citations_malformed) = resolve_citations(raw);

    let mut paper = Paper::new(id, year);
    paper.title = raw.title.as_deref().unwrap_or("").trim().to_string();
    paper.authors = authors;
    paper.categories = resolve_categories(raw);
    paper.abstract_text = raw.abstract_text.as_deref().unwrap_or("").trim().to_string();
    paper.citations = citations;
    paper.update_date = raw.update_date.as_deref().unwrap_or("").trim().to_string();

    Ok(Normalized {
        paper,
        authors_rejected,
        citations_malformed,
    })
}

/// Normalize every record into one canonical table
pub fn build_table<I>(records: I) -> (PaperTable, IngestStats)
where
    I: IntoIterator<Item = RawRecord>,
{
    let mut table = PaperTable::new();
    let mut stats = IngestStats::default();

    for raw in records {
        stats.rows_read += 1;
        match normalize_record(&raw) {
            Ok(normalized) => {
                stats.authors_rejected += normalized.authors_rejected;
                if normalized.citations_malformed {
                    stats.malformed_citations += 1;
                }
                if !table.insert(normalized.paper) {
                    stats.duplicate_ids += 1;
                }
            }
            Err(e) => {
                debug!("{}", e);
                stats.skipped_no_year += 1;
            }
        }
    }

    stats.papers = table.len();
    (table, stats)
}

/// Read an input dataset and build the canonical paper table
pub fn load_papers(input: &str) -> Result<(PaperTable, IngestStats)> {
    let start = Instant::now();
    let path = Path::new(input);

    if !path.exists() {
        return Err(anyhow::anyhow!("Input file does not exist: {}", input));
    }

    let format = InputFormat::detect(path)?;
    let progress = create_spinner(&format!("Reading {}...", input));

    let (records, malformed_lines) = match format {
        InputFormat::Csv => (reader::read_csv_records(path)?, 0),
        InputFormat::JsonLines { gzip } => reader::read_jsonl_records(path, gzip)?,
    };

    progress.set_message("Normalizing records...");
    let (table, mut stats) = build_table(records);
    stats.malformed_lines = malformed_lines;
    progress.finish_with_message("Ingest complete");

    info!(
        "Ingested {} papers from {} rows in {}",
        stats.papers,
        stats.rows_read,
        format_elapsed(start.elapsed())
    );
    if stats.skipped_no_year > 0 {
        info!("  ({} records skipped: no publication year)", stats.skipped_no_year);
    }
    if stats.duplicate_ids > 0 {
        info!("  ({} duplicate ids dropped)", stats.duplicate_ids);
    }
    if stats.malformed_citations > 0 {
        info!("  ({} malformed citation lists treated as empty)", stats.malformed_citations);
    }
    if stats.malformed_lines > 0 {
        info!("  ({} malformed input lines skipped)", stats.malformed_lines);
    }

    Ok((table, stats))
}
