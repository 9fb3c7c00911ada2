use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Modern arXiv ID format: YYMM.NNNN or YYMM.NNNNN, optional version
    pub static ref MODERN_ID_PATTERN: Regex = Regex::new(
        r"^(\d{2})(\d{2})\.\d{4,5}(?:v\d+)?$"
    ).unwrap();

    // Legacy format: archive[.subject]/YYMMNNN, optional version
    // Examples: hep-th/9901001, math.AG/0501123, cond-mat/0102030v2
    pub static ref LEGACY_ID_PATTERN: Regex = Regex::new(
        r"(?i)^[a-z][a-z0-9.-]*/(\d{2})(\d{2})\d{3}(?:v\d+)?$"
    ).unwrap();

    // Word tokens of two or more characters, used for keywords and hashing embeddings
    pub static ref TOKEN_PATTERN: Regex = Regex::new(r"(?u)\b\w\w+\b").unwrap();

    // Separators between names in a raw author string
    pub static ref AUTHOR_SEPARATOR: Regex = Regex::new(r"(?i),|;|\s+and\s+").unwrap();

    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Map a two-digit year onto a four-digit year (51..99 -> 19xx, 00..50 -> 20xx)
pub fn expand_two_digit_year(yy: u32) -> i32 {
    if yy > 50 {
        1900 + yy as i32
    } else {
        2000 + yy as i32
    }
}

/// Extract the publication year embedded in an arXiv identifier
pub fn extract_year(paper_id: &str) -> Option<i32> {
    let id = paper_id.trim();
    let caps = MODERN_ID_PATTERN
        .captures(id)
        .or_else(|| LEGACY_ID_PATTERN.captures(id))?;
    let yy: u32 = caps.get(1)?.as_str().parse().ok()?;
    Some(expand_two_digit_year(yy))
}

/// Lowercased word tokens of a text
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}
