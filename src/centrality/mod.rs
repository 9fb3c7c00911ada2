pub mod pagerank;
pub mod paths;

pub use pagerank::{pagerank, PageRankConfig};
pub use paths::{betweenness, closeness};

use log::debug;
use std::time::Instant;

use crate::common::format_elapsed;
use crate::graph::Graph;

/// Centrality measures the engine can compute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    PageRank,
    Degree,
    Betweenness,
    Closeness,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::PageRank,
        Metric::Degree,
        Metric::Betweenness,
        Metric::Closeness,
    ];
}

/// Scores per node index for each requested metric
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CentralityScores {
    pub pagerank: Option<Vec<f64>>,
    pub degree: Option<Vec<usize>>,
    pub betweenness: Option<Vec<f64>>,
    pub closeness: Option<Vec<f64>>,
}

impl CentralityScores {
    pub fn pagerank_of(&self, idx: usize) -> Option<f64> {
        self.pagerank.as_ref().map(|v| v[idx])
    }

    pub fn degree_of(&self, idx: usize) -> Option<usize> {
        self.degree.as_ref().map(|v| v[idx])
    }

    pub fn betweenness_of(&self, idx: usize) -> Option<f64> {
        self.betweenness.as_ref().map(|v| v[idx])
    }

    pub fn closeness_of(&self, idx: usize) -> Option<f64> {
        self.closeness.as_ref().map(|v| v[idx])
    }
}

/// Batch computation of centrality metrics over a graph view
#[derive(Debug, Clone, Default)]
pub struct CentralityEngine {
    pub pagerank: PageRankConfig,
}

impl CentralityEngine {
    pub fn new(pagerank: PageRankConfig) -> Self {
        Self { pagerank }
    }

    pub fn compute(&self, graph: &Graph, metrics: &[Metric]) -> CentralityScores {
        let mut scores = CentralityScores::default();

        for metric in metrics {
            let start = Instant::now();
            match metric {
                Metric::PageRank => scores.pagerank = Some(pagerank(graph, &self.pagerank)),
                Metric::Degree => {
                    scores.degree = Some((0..graph.node_count()).map(|u| graph.degree(u)).collect())
                }
                Metric::Betweenness => scores.betweenness = Some(betweenness(graph)),
                Metric::Closeness => scores.closeness = Some(closeness(graph)),
            }
            debug!(
                "{:?} over {} nodes / {} edges in {}",
                metric,
                graph.node_count(),
                graph.edge_count(),
                format_elapsed(start.elapsed())
            );
        }

        scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_only_requested_metrics() {
        let mut g = Graph::undirected();
        g.add_edge("a", "b", 2.0);
        g.add_node("c");

        let engine = CentralityEngine::default();
        let scores = engine.compute(&g, &[Metric::PageRank, Metric::Degree]);
        assert!(scores.betweenness.is_none());
        assert!(scores.closeness.is_none());
        assert_eq!(scores.degree, Some(vec![1, 1, 0]));

        let total: f64 = scores.pagerank.as_ref().unwrap().iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_isolated_author_scores() {
        let mut g = Graph::undirected();
        g.add_edge("author:A", "author:B", 1.0);
        g.add_edge("author:B", "author:C", 1.0);
        let lonely = g.add_node("author:Lonely");

        let scores = CentralityEngine::default().compute(&g, &Metric::ALL);
        assert_eq!(scores.degree_of(lonely), Some(0));
        assert_eq!(scores.betweenness_of(lonely), Some(0.0));
        assert_eq!(scores.closeness_of(lonely), Some(0.0));
        assert!(scores.pagerank_of(lonely).unwrap() > 0.0);
    }
}
