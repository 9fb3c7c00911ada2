use log::debug;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::Taxonomy;
use crate::centrality::{pagerank, PageRankConfig};
use crate::common::SubfieldStats;
use crate::graph::{CitationView, Graph};
use crate::ingest::PaperTable;

#[derive(Debug, Clone, PartialEq)]
pub struct SubfieldNode {
    pub id: String,
    pub paper_count: usize,
    pub pagerank: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubfieldEdge {
    pub source: String,
    pub target: String,
    pub weight: f64,
    pub raw_count: usize,
}

/// Directed subfield influence graph of one field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldGraph {
    pub field: String,
    pub nodes: Vec<SubfieldNode>,
    pub edges: Vec<SubfieldEdge>,
}

/// Citation volume between two subfields relative to their sizes.
/// Empty subfields yield 0.
pub fn normalized_weight(raw_count: usize, source_size: usize, target_size: usize) -> f64 {
    if source_size == 0 || target_size == 0 {
        return 0.0;
    }
    raw_count as f64 / (source_size as f64 * target_size as f64)
}

/// Subfields of one paper grouped by field
type PaperFields = BTreeMap<String, BTreeSet<String>>;

fn map_papers(table: &PaperTable, taxonomy: &Taxonomy, stats: &mut SubfieldStats) -> Vec<PaperFields> {
    table
        .iter()
        .map(|paper| {
            let mut fields = PaperFields::new();
            for code in &paper.categories {
                match taxonomy.lookup(code) {
                    Some((field, subfield)) => {
                        fields
                            .entry(field.to_string())
                            .or_default()
                            .insert(subfield.to_string());
                    }
                    None => stats.unknown_codes += 1,
                }
            }
            if !fields.is_empty() {
                stats.papers_mapped += 1;
            }
            fields
        })
        .collect()
}

/// Count, normalize and rank the subfield edges of a single field
fn build_field_graph(
    field: &str,
    edges: &[(usize, usize)],
    paper_fields: &[PaperFields],
    sizes: &HashMap<(String, String), usize>,
    config: &PageRankConfig,
) -> Option<FieldGraph> {
    let mut counts: Vec<((String, String), usize)> = Vec::new();
    let mut slot: HashMap<(String, String), usize> = HashMap::new();

    for &(cited, citing) in edges {
        let (Some(sources), Some(targets)) =
            (paper_fields[cited].get(field), paper_fields[citing].get(field))
        else {
            continue;
        };
        for source in sources {
            for target in targets {
                let key = (source.clone(), target.clone());
                let idx = *slot.entry(key.clone()).or_insert_with(|| {
                    counts.push((key, 0));
                    counts.len() - 1
                });
                counts[idx].1 += 1;
            }
        }
    }

    let size_of = |subfield: &str| {
        sizes
            .get(&(field.to_string(), subfield.to_string()))
            .copied()
            .unwrap_or(0)
    };

    let mut graph = Graph::directed();
    let mut subfield_edges = Vec::new();
    for ((source, target), raw_count) in counts {
        let (source_size, target_size) = (size_of(&source), size_of(&target));
        if source_size == 0 || target_size == 0 {
            continue;
        }
        let weight = normalized_weight(raw_count, source_size, target_size);
        graph.add_edge(&source, &target, weight);
        subfield_edges.push(SubfieldEdge {
            source,
            target,
            weight,
            raw_count,
        });
    }

    if subfield_edges.is_empty() {
        debug!("Field '{}' has no subfield edges", field);
        return None;
    }

    let ranks = pagerank(&graph, config);
    let nodes = graph
        .ids()
        .iter()
        .zip(ranks)
        .map(|(id, rank)| SubfieldNode {
            id: id.clone(),
            paper_count: size_of(id),
            pagerank: rank,
        })
        .collect();

    Some(FieldGraph {
        field: field.to_string(),
        nodes,
        edges: subfield_edges,
    })
}

/// Build one subfield influence graph per field.
///
/// Fields are returned in order of first appearance in the paper table; fields
/// without any surviving edge are omitted.
pub fn aggregate_subfields(
    table: &PaperTable,
    citations: &CitationView,
    taxonomy: &Taxonomy,
    config: &PageRankConfig,
) -> (Vec<FieldGraph>, SubfieldStats) {
    let mut stats = SubfieldStats::default();
    let paper_fields = map_papers(table, taxonomy, &mut stats);

    let mut fields: Vec<String> = Vec::new();
    let mut field_slot: HashMap<String, usize> = HashMap::new();
    let mut sizes: HashMap<(String, String), usize> = HashMap::new();

    for mapped in &paper_fields {
        for (field, subfields) in mapped {
            if !field_slot.contains_key(field) {
                field_slot.insert(field.clone(), fields.len());
                fields.push(field.clone());
            }
            for subfield in subfields {
                *sizes.entry((field.clone(), subfield.clone())).or_insert(0) += 1;
            }
        }
    }

    let mut field_edges: Vec<Vec<(usize, usize)>> = vec![Vec::new(); fields.len()];
    for &(cited, citing) in &citations.edges {
        for field in paper_fields[cited].keys() {
            if paper_fields[citing].contains_key(field) {
                field_edges[field_slot[field]].push((cited, citing));
            }
        }
    }

    let graphs: Vec<FieldGraph> = fields
        .par_iter()
        .zip(field_edges.par_iter())
        .map(|(field, edges)| build_field_graph(field, edges, &paper_fields, &sizes, config))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect();

    stats.fields = fields.len();
    stats.fields_written = graphs.len();
    stats.edges = graphs.iter().map(|g| g.edges.len()).sum();
    (graphs, stats)
}
