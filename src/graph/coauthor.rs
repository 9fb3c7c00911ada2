use std::collections::HashMap;

use super::Graph;
use crate::common::GraphStats;
use crate::ingest::{author_id, PaperTable, OTHER_CATEGORY};

/// An author in the co-author view
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorNode {
    /// Graph id, `author:<name>`
    pub id: String,
    pub name: String,
    pub paper_count: usize,
    /// Number of distinct co-authors
    pub coauthor_count: usize,
    /// Display categories of the author's papers with their counts, in order of first appearance
    category_counts: Vec<(&'static str, usize)>,
}

impl AuthorNode {
    fn new(name: &str) -> Self {
        Self {
            id: author_id(name),
            name: name.to_string(),
            paper_count: 0,
            coauthor_count: 0,
            category_counts: Vec::new(),
        }
    }

    fn record_category(&mut self, category: &'static str) {
        match self.category_counts.iter_mut().find(|(c, _)| *c == category) {
            Some((_, count)) => *count += 1,
            None => self.category_counts.push((category, 1)),
        }
    }

    /// Most common display category; ties go to the one seen first
    pub fn dominant_category(&self) -> &'static str {
        let mut best: Option<(&'static str, usize)> = None;
        for &(category, count) in &self.category_counts {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((category, count));
            }
        }
        best.map(|(c, _)| c).unwrap_or(OTHER_CATEGORY)
    }
}

/// An undirected co-authorship edge, keyed by the lexicographically ordered id pair
#[derive(Debug, Clone, PartialEq)]
pub struct CoauthorEdge {
    pub source: String,
    pub target: String,
    /// Number of shared papers
    pub weight: usize,
    pub papers: Vec<String>,
    pub titles: Vec<String>,
    /// Display category of the most recent shared paper
    pub category: &'static str,
}

/// Co-authorship view: every valid author is a node, every pair of authors
/// sharing a paper is an edge weighted by the number of shared papers
#[derive(Debug, Clone, Default)]
pub struct CoauthorView {
    pub authors: Vec<AuthorNode>,
    pub edges: Vec<CoauthorEdge>,
    author_index: HashMap<String, usize>,
}

impl CoauthorView {
    pub fn build(table: &PaperTable) -> Self {
        let mut authors: Vec<AuthorNode> = Vec::new();
        let mut author_index: HashMap<String, usize> = HashMap::new();
        let mut edges: Vec<CoauthorEdge> = Vec::new();
        let mut edge_index: HashMap<(usize, usize), usize> = HashMap::new();

        for paper in table.iter() {
            let category = paper.display_category();

            let members: Vec<usize> = paper
                .authors
                .iter()
                .map(|name| {
                    let idx = *author_index.entry(name.clone()).or_insert_with(|| {
                        authors.push(AuthorNode::new(name));
                        authors.len() - 1
                    });
                    authors[idx].paper_count += 1;
                    authors[idx].record_category(category);
                    idx
                })
                .collect();

            for i in 0..members.len() {
                for j in (i + 1)..members.len() {
                    let (a, b) = (members[i], members[j]);
                    if a == b {
                        continue;
                    }
                    let (lo, hi) = if authors[a].id <= authors[b].id { (a, b) } else { (b, a) };

                    let e = *edge_index.entry((lo, hi)).or_insert_with(|| {
                        edges.push(CoauthorEdge {
                            source: authors[lo].id.clone(),
                            target: authors[hi].id.clone(),
                            weight: 0,
                            papers: Vec::new(),
                            titles: Vec::new(),
                            category,
                        });
                        edges.len() - 1
                    });

                    let edge = &mut edges[e];
                    edge.weight += 1;
                    edge.papers.push(paper.id.clone());
                    edge.titles.push(paper.title.clone());
                    edge.category = category;
                }
            }
        }

        for &(lo, hi) in edge_index.keys() {
            authors[lo].coauthor_count += 1;
            authors[hi].coauthor_count += 1;
        }

        Self {
            authors,
            edges,
            author_index,
        }
    }

    pub fn author(&self, name: &str) -> Option<&AuthorNode> {
        self.author_index.get(name).map(|&idx| &self.authors[idx])
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            nodes: self.authors.len(),
            edges: self.edges.len(),
        }
    }

    /// Undirected analytic graph; edge weight is the shared-paper count
    pub fn graph(&self) -> Graph {
        let mut graph = Graph::undirected();
        for author in &self.authors {
            graph.add_node(&author.id);
        }
        for edge in &self.edges {
            graph.add_edge(&edge.source, &edge.target, edge.weight as f64);
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::Paper;

    fn paper(id: &str, authors: &[&str], cats: &[&str]) -> Paper {
        let mut p = Paper::new(id, 2007);
        p.title = format!("Title {}", id);
        p.authors = authors.iter().map(|a| a.to_string()).collect();
        p.categories = cats.iter().map(|c| c.to_string()).collect();
        p
    }

    fn fixture() -> PaperTable {
        PaperTable::from_papers(vec![
            paper("0704.0001", &["Zoe Young", "Adam Baker", "Mia Chen"], &["cs.LG"]),
            paper("0704.0002", &["Adam Baker", "Zoe Young"], &["math.CO"]),
            paper("0704.0003", &["Solo Writer"], &["hep-th"]),
            paper("0704.0004", &["Mia Chen"], &["math.AG"]),
        ])
    }

    #[test]
    fn test_edges_are_canonical_and_weighted_by_shared_papers() {
        let view = CoauthorView::build(&fixture());

        for edge in &view.edges {
            assert!(edge.source < edge.target, "{} !< {}", edge.source, edge.target);
            assert_eq!(edge.weight, edge.papers.len());
        }

        let ab = view
            .edges
            .iter()
            .find(|e| e.source == "author:Adam Baker" && e.target == "author:Zoe Young")
            .unwrap();
        assert_eq!(ab.weight, 2);
        assert_eq!(ab.papers, vec!["0704.0001", "0704.0002"]);
        assert_eq!(ab.titles, vec!["Title 0704.0001", "Title 0704.0002"]);
        assert_eq!(ab.category, "Mathematics");
        assert_eq!(view.edges.len(), 3);
    }

    #[test]
    fn test_author_attributes() {
        let view = CoauthorView::build(&fixture());

        let mia = view.author("Mia Chen").unwrap();
        assert_eq!(mia.id, "author:Mia Chen");
        assert_eq!(mia.paper_count, 2);
        assert_eq!(mia.coauthor_count, 2);
        // One Computer Science paper, one Mathematics paper: first seen wins
        assert_eq!(mia.dominant_category(), "Computer Science");

        let solo = view.author("Solo Writer").unwrap();
        assert_eq!(solo.coauthor_count, 0);
        assert_eq!(solo.dominant_category(), "Physics");
        assert_eq!(view.stats(), GraphStats { nodes: 4, edges: 3 });
    }

    #[test]
    fn test_rebuild_is_identical() {
        let table = fixture();
        let a = CoauthorView::build(&table);
        let b = CoauthorView::build(&table);
        assert_eq!(a.authors, b.authors);
        assert_eq!(a.edges, b.edges);
    }

    #[test]
    fn test_graph_includes_isolated_authors() {
        let graph = CoauthorView::build(&fixture()).graph();
        assert!(!graph.is_directed());
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        let solo = graph.index_of("author:Solo Writer").unwrap();
        assert_eq!(graph.degree(solo), 0);
    }
}
