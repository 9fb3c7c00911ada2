pub mod categories;
pub mod documents;
pub mod table;

pub use categories::{category_listings, category_summary, CategoryListing, CategorySummary};
pub use documents::{
    bipartite_document, citation_document, coauthor_document, paper_node, sample_document,
};
pub use table::{cluster_tables, field_tables, write_partitioned, write_table, TableFormat, TablePair};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::common::{serialize_rounded_opt, StagedOutput};

pub const COAUTHOR_GRAPH_FILE: &str = "coauthor_graph.json";
pub const CITATION_GRAPH_FILE: &str = "citation_graph.json";
pub const AUTHOR_PAPER_GRAPH_FILE: &str = "author_paper_graph.json";
pub const AUTHOR_PAPER_SUBSET_FILE: &str = "author_paper_graph_subset.json";
pub const CATEGORIES_FILE: &str = "categories.json";
pub const CATEGORIES_DIR: &str = "categories";
pub const GRAPHDATA_DIR: &str = "graphdata";
pub const CLUSTERS_DIR: &str = "semantic_clusters";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Paper,
    Author,
}

/// A node of a whole-graph document. Attributes a view does not produce are omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_rounded_opt"
    )]
    pub pagerank: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coauthor_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degree: Option<usize>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_rounded_opt"
    )]
    pub betweenness: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_rounded_opt"
    )]
    pub closeness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_list: Option<Vec<String>>,
}

impl NodeRecord {
    pub fn new(id: &str, label: &str, kind: NodeKind) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            kind,
            category: None,
            year: None,
            pagerank: None,
            citation_count: None,
            paper_count: None,
            coauthor_count: None,
            degree: None,
            betweenness: None,
            closeness: None,
            author_list: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub papers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titles: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl LinkRecord {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            weight: None,
            papers: None,
            titles: None,
            category: None,
        }
    }
}

/// Whole-graph document consumed by the visualization layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub nodes: Vec<NodeRecord>,
    pub links: Vec<LinkRecord>,
}

/// Serialize `value` as JSON into a staged file
pub fn write_json<T: Serialize>(out: &mut StagedOutput, relative: &str, value: &T) -> Result<PathBuf> {
    let path = out.staged_path(relative)?;
    let file = File::create(&path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)
        .with_context(|| format!("Failed to serialize {}", relative))?;
    writer.flush()?;
    Ok(path)
}

pub fn read_graph_document(path: &Path) -> Result<GraphDocument> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open graph document: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse graph document: {}", path.display()))
}
