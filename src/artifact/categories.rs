use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{paper_node, NodeRecord};
use crate::common::{round_to, CategoryStats};
use crate::ingest::{PaperTable, TopLevel};

/// One entry of `categories.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub count: usize,
    /// Share of all papers, two decimals
    pub percentage: f64,
    /// Paper counts keyed by update year
    pub years: BTreeMap<String, usize>,
}

/// Papers of one top-level category, sliced into pages by the serving layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryListing {
    pub nodes: Vec<NodeRecord>,
}

fn update_year(update_date: &str) -> Option<&str> {
    let year = update_date.get(..4)?;
    year.bytes().all(|b| b.is_ascii_digit()).then_some(year)
}

/// Per-category counts keyed by slug. A paper counts once for each of its
/// top-level categories.
pub fn category_summary(table: &PaperTable) -> (BTreeMap<String, CategorySummary>, CategoryStats) {
    let mut stats = CategoryStats::default();
    let mut counts: BTreeMap<TopLevel, (usize, BTreeMap<String, usize>)> = BTreeMap::new();

    for paper in table.iter() {
        let tops = paper.top_levels();
        if tops.is_empty() {
            stats.uncategorized += 1;
            continue;
        }
        stats.papers_counted += 1;

        let year = update_year(&paper.update_date);
        for top in tops {
            let (count, years) = counts.entry(top).or_default();
            *count += 1;
            if let Some(year) = year {
                *years.entry(year.to_string()).or_insert(0) += 1;
            }
        }
    }

    let total = table.len().max(1) as f64;
    let summary: BTreeMap<String, CategorySummary> = counts
        .into_iter()
        .map(|(top, (count, years))| {
            let entry = CategorySummary {
                count,
                percentage: round_to(count as f64 * 100.0 / total, 2),
                years,
            };
            (top.slug().to_string(), entry)
        })
        .collect();

    stats.categories = summary.len();
    (summary, stats)
}

/// Paper listings per top-level category, categories in order of first appearance
pub fn category_listings(table: &PaperTable) -> Vec<(TopLevel, CategoryListing)> {
    let papers = table.papers();
    table
        .by_top_level()
        .into_iter()
        .map(|(top, positions)| {
            let nodes = positions.iter().map(|&pos| paper_node(&papers[pos])).collect();
            (top, CategoryListing { nodes })
        })
        .collect()
}
