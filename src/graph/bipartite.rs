use std::collections::{HashMap, HashSet};

use super::Graph;
use crate::common::GraphStats;
use crate::ingest::{author_id, PaperTable};

#[derive(Debug, Clone, PartialEq)]
pub struct BipartiteAuthor {
    pub id: String,
    pub name: String,
    pub paper_count: usize,
    pub coauthor_count: usize,
}

/// Author–paper view: paper nodes, author nodes, and a weight-1 edge from
/// every author to each of their papers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BipartiteView {
    /// Table positions of the paper nodes
    pub papers: Vec<usize>,
    pub authors: Vec<BipartiteAuthor>,
    /// (author index, table position) pairs
    pub edges: Vec<(usize, usize)>,
}

impl BipartiteView {
    pub fn build(table: &PaperTable) -> Self {
        let mut authors: Vec<BipartiteAuthor> = Vec::new();
        let mut author_index: HashMap<&str, usize> = HashMap::new();
        let mut coauthors: Vec<HashSet<usize>> = Vec::new();
        let mut edges = Vec::new();

        for (pos, paper) in table.iter().enumerate() {
            let members: Vec<usize> = paper
                .authors
                .iter()
                .map(|name| {
                    *author_index.entry(name.as_str()).or_insert_with(|| {
                        authors.push(BipartiteAuthor {
                            id: author_id(name),
                            name: name.clone(),
                            paper_count: 0,
                            coauthor_count: 0,
                        });
                        coauthors.push(HashSet::new());
                        authors.len() - 1
                    })
                })
                .collect();

            for &a in &members {
                authors[a].paper_count += 1;
                edges.push((a, pos));
                coauthors[a].extend(members.iter().copied().filter(|&b| b != a));
            }
        }

        for (author, set) in authors.iter_mut().zip(&coauthors) {
            author.coauthor_count = set.len();
        }

        Self {
            papers: (0..table.len()).collect(),
            authors,
            edges,
        }
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            nodes: self.papers.len() + self.authors.len(),
            edges: self.edges.len(),
        }
    }

    /// The first `limit` papers, the authors linked to them and the links among them.
    /// Author attributes keep their whole-view values.
    pub fn subset(&self, limit: usize) -> Self {
        let papers: Vec<usize> = self.papers.iter().copied().take(limit).collect();
        let kept_papers: HashSet<usize> = papers.iter().copied().collect();

        let linked: HashSet<usize> = self
            .edges
            .iter()
            .filter(|(_, pos)| kept_papers.contains(pos))
            .map(|&(a, _)| a)
            .collect();

        let mut remap: HashMap<usize, usize> = HashMap::with_capacity(linked.len());
        let mut authors = Vec::with_capacity(linked.len());
        for (idx, author) in self.authors.iter().enumerate() {
            if linked.contains(&idx) {
                remap.insert(idx, authors.len());
                authors.push(author.clone());
            }
        }

        let edges = self
            .edges
            .iter()
            .filter(|(_, pos)| kept_papers.contains(pos))
            .map(|&(a, pos)| (remap[&a], pos))
            .collect();

        Self {
            papers,
            authors,
            edges,
        }
    }

    /// Directed analytic graph: paper nodes first, then author nodes, author → paper edges
    pub fn graph(&self, table: &PaperTable) -> Graph {
        let mut graph = Graph::directed();
        for &pos in &self.papers {
            graph.add_node(&table.papers()[pos].id);
        }
        for author in &self.authors {
            graph.add_node(&author.id);
        }
        for &(a, pos) in &self.edges {
            graph.add_edge(&self.authors[a].id, &table.papers()[pos].id, 1.0);
        }
        graph
    }
}
