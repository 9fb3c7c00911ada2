use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::category::{display_category, top_levels, TopLevel};

/// Canonical paper record shared read-only by every graph view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub categories: Vec<String>,
    pub year: i32,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub citations: Vec<String>,
    pub update_date: String,
    /// Number of known papers citing this one (filled by the citation view)
    pub citation_count: usize,
    /// PageRank over the citation view (filled by the citation view)
    pub pagerank: f64,
}

impl Paper {
    pub fn new(id: &str, year: i32) -> Self {
        Self {
            id: id.to_string(),
            title: String::new(),
            authors: Vec::new(),
            categories: Vec::new(),
            year,
            abstract_text: String::new(),
            citations: Vec::new(),
            update_date: String::new(),
            citation_count: 0,
            pagerank: 0.0,
        }
    }

    pub fn display_category(&self) -> &'static str {
        display_category(&self.categories)
    }

    pub fn top_levels(&self) -> Vec<TopLevel> {
        top_levels(&self.categories)
    }

    pub fn has_abstract(&self) -> bool {
        !self.abstract_text.trim().is_empty()
    }
}

/// Papers in input order with an id index.
///
/// Duplicate ids are rejected on insert, so the first occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct PaperTable {
    papers: Vec<Paper>,
    index: HashMap<String, usize>,
}

impl PaperTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            papers: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Insert a paper; returns false if a paper with the same id already exists
    pub fn insert(&mut self, paper: Paper) -> bool {
        if self.index.contains_key(&paper.id) {
            return false;
        }
        self.index.insert(paper.id.clone(), self.papers.len());
        self.papers.push(paper);
        true
    }

    pub fn from_papers<I: IntoIterator<Item = Paper>>(papers: I) -> Self {
        let mut table = Self::new();
        for paper in papers {
            table.insert(paper);
        }
        table
    }

    pub fn get(&self, id: &str) -> Option<&Paper> {
        self.index.get(id).map(|&pos| &self.papers[pos])
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn papers(&self) -> &[Paper] {
        &self.papers
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Paper> {
        self.papers.iter()
    }

    pub fn len(&self) -> usize {
        self.papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }

    /// Known, distinct, non-self citations of the paper at `pos`, in listed order
    pub fn known_citations(&self, pos: usize) -> Vec<usize> {
        let paper = &self.papers[pos];
        let mut out: Vec<usize> = Vec::new();
        for cited in &paper.citations {
            if let Some(target) = self.position(cited) {
                if target != pos && !out.contains(&target) {
                    out.push(target);
                }
            }
        }
        out
    }

    /// Write citation counts and citation-view PageRank back onto the papers.
    /// Papers missing from either map keep zero.
    pub fn apply_citation_metrics(
        &mut self,
        citation_counts: &HashMap<String, usize>,
        pagerank: &HashMap<String, f64>,
    ) {
        for paper in &mut self.papers {
            paper.citation_count = citation_counts.get(&paper.id).copied().unwrap_or(0);
            paper.pagerank = pagerank.get(&paper.id).copied().unwrap_or(0.0);
        }
    }

    /// Positions of the papers in each top-level category, categories in order of
    /// first appearance, positions in table order
    pub fn by_top_level(&self) -> Vec<(TopLevel, Vec<usize>)> {
        let mut groups: Vec<(TopLevel, Vec<usize>)> = Vec::new();
        let mut slot: HashMap<TopLevel, usize> = HashMap::new();

        for (pos, paper) in self.papers.iter().enumerate() {
            for top in paper.top_levels() {
                let idx = *slot.entry(top).or_insert_with(|| {
                    groups.push((top, Vec::new()));
                    groups.len() - 1
                });
                groups[idx].1.push(pos);
            }
        }

        groups
    }
}
