/// Statistics from the ingest step
#[derive(Debug, Clone, Default)]
pub struct IngestStats {
    pub rows_read: usize,
    pub papers: usize,
    pub skipped_no_year: usize,
    pub duplicate_ids: usize,
    pub malformed_lines: usize,
    pub malformed_citations: usize,
    pub authors_rejected: usize,
}

/// Size of a built graph view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
}

/// Statistics from the subfield aggregation step
#[derive(Debug, Clone, Default)]
pub struct SubfieldStats {
    pub papers_mapped: usize,
    pub unknown_codes: usize,
    pub fields: usize,
    pub fields_written: usize,
    pub edges: usize,
}

/// Statistics from the semantic clustering step
#[derive(Debug, Clone, Default)]
pub struct ClusterStats {
    pub categories_seen: usize,
    pub too_small: usize,
    pub too_few_abstracts: usize,
    pub failed: usize,
    pub written: usize,
}

/// Statistics from the category summary step
#[derive(Debug, Clone, Default)]
pub struct CategoryStats {
    pub categories: usize,
    pub papers_counted: usize,
    pub uncategorized: usize,
}
