use std::collections::{HashMap, HashSet};

use super::Graph;
use crate::common::GraphStats;
use crate::ingest::PaperTable;

/// Citation view over the paper table.
///
/// Edges are stored as (cited, citing) table positions, which is also the
/// orientation written to artifacts. Only citations whose both endpoints are
/// known papers survive; self-citations and repeated ids are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CitationView {
    pub edges: Vec<(usize, usize)>,
    /// Number of distinct known papers citing each paper, by table position
    pub citation_counts: Vec<usize>,
}

impl CitationView {
    pub fn build(table: &PaperTable) -> Self {
        let mut edges = Vec::new();
        let mut citation_counts = vec![0usize; table.len()];

        for citing in 0..table.len() {
            for cited in table.known_citations(citing) {
                edges.push((cited, citing));
                citation_counts[cited] += 1;
            }
        }

        Self {
            edges,
            citation_counts,
        }
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            nodes: self.citation_counts.len(),
            edges: self.edges.len(),
        }
    }

    /// Citation counts keyed by paper id
    pub fn citation_count_map(&self, table: &PaperTable) -> HashMap<String, usize> {
        table
            .iter()
            .zip(&self.citation_counts)
            .map(|(paper, &count)| (paper.id.clone(), count))
            .collect()
    }

    /// Directed analytic graph in which rank flows from citing to cited paper
    pub fn graph(&self, table: &PaperTable) -> Graph {
        let mut graph = Graph::directed();
        for paper in table.iter() {
            graph.add_node(&paper.id);
        }
        for &(cited, citing) in &self.edges {
            graph.add_edge_between(citing, cited, 1.0);
        }
        graph
    }

    /// Analytic graph restricted to `positions`; nodes follow the given order
    pub fn subgraph(&self, table: &PaperTable, positions: &[usize]) -> Graph {
        let members: HashSet<usize> = positions.iter().copied().collect();
        let mut graph = Graph::directed();
        let mut local: HashMap<usize, usize> = HashMap::with_capacity(positions.len());

        for &pos in positions {
            local.insert(pos, graph.add_node(&table.papers()[pos].id));
        }
        for &(cited, citing) in &self.edges {
            if members.contains(&cited) && members.contains(&citing) {
                graph.add_edge_between(local[&citing], local[&cited], 1.0);
            }
        }
        graph
    }

    /// Edges (cited, citing) with both endpoints in `positions`, in view order
    pub fn edges_among(&self, positions: &[usize]) -> Vec<(usize, usize)> {
        let members: HashSet<usize> = positions.iter().copied().collect();
        self.edges
            .iter()
            .copied()
            .filter(|(cited, citing)| members.contains(cited) && members.contains(citing))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::Paper;

    fn paper(id: &str, cites: &[&str]) -> Paper {
        let mut p = Paper::new(id, 2007);
        p.citations = cites.iter().map(|c| c.to_string()).collect();
        p
    }

    fn fixture() -> PaperTable {
        PaperTable::from_papers(vec![
            paper("P1", &["P2", "unknown", "P1"]),
            paper("P2", &["P3", "P3"]),
            paper("P3", &[]),
        ])
    }

    #[test]
    fn test_edges_point_from_cited_to_citing() {
        let view = CitationView::build(&fixture());
        assert_eq!(view.edges, vec![(1, 0), (2, 1)]);
        assert_eq!(view.citation_counts, vec![0, 1, 1]);
        assert_eq!(view.stats(), GraphStats { nodes: 3, edges: 2 });
    }

    #[test]
    fn test_graph_flows_to_cited_paper() {
        let table = fixture();
        let graph = CitationView::build(&table).graph(&table);
        assert!(graph.has_edge("P1", "P2"));
        assert!(graph.has_edge("P2", "P3"));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_subgraph_restricts_edges() {
        let table = fixture();
        let view = CitationView::build(&table);
        let sub = view.subgraph(&table, &[2, 1]);
        assert_eq!(sub.ids(), &["P3".to_string(), "P2".to_string()]);
        assert!(sub.has_edge("P2", "P3"));
        assert_eq!(sub.edge_count(), 1);
        assert_eq!(view.edges_among(&[0, 1]), vec![(1, 0)]);
    }

    #[test]
    fn test_rebuild_is_identical() {
        let table = fixture();
        assert_eq!(CitationView::build(&table), CitationView::build(&table));
    }
}
