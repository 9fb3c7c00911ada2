pub mod bipartite;
pub mod citation;
pub mod coauthor;

pub use bipartite::{BipartiteAuthor, BipartiteView};
pub use citation::CitationView;
pub use coauthor::{AuthorNode, CoauthorEdge, CoauthorView};

use std::collections::HashMap;

/// Compact adjacency graph over string node ids.
///
/// Nodes and edges keep insertion order. Adding an edge that already exists
/// replaces its weight. Undirected graphs store each edge once and list it in
/// the adjacency of both endpoints.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    directed: bool,
    ids: Vec<String>,
    index: HashMap<String, usize>,
    edges: Vec<(usize, usize, f64)>,
    edge_index: HashMap<(usize, usize), usize>,
    out_adj: Vec<Vec<usize>>,
    in_adj: Vec<Vec<usize>>,
}

impl Graph {
    pub fn directed() -> Self {
        Self {
            directed: true,
            ..Default::default()
        }
    }

    pub fn undirected() -> Self {
        Self::default()
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Insert a node if it is not present and return its index
    pub fn add_node(&mut self, id: &str) -> usize {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        let idx = self.ids.len();
        self.ids.push(id.to_string());
        self.index.insert(id.to_string(), idx);
        self.out_adj.push(Vec::new());
        if self.directed {
            self.in_adj.push(Vec::new());
        }
        idx
    }

    /// Insert or reweight an edge between two ids, adding missing endpoints
    pub fn add_edge(&mut self, source: &str, target: &str, weight: f64) {
        let u = self.add_node(source);
        let v = self.add_node(target);
        self.add_edge_between(u, v, weight);
    }

    /// Insert or reweight an edge between two existing node indices
    pub fn add_edge_between(&mut self, u: usize, v: usize, weight: f64) {
        let key = if self.directed || u <= v { (u, v) } else { (v, u) };
        if let Some(&e) = self.edge_index.get(&key) {
            self.edges[e].2 = weight;
            return;
        }

        let e = self.edges.len();
        self.edges.push((key.0, key.1, weight));
        self.edge_index.insert(key, e);

        if self.directed {
            self.out_adj[u].push(e);
            self.in_adj[v].push(e);
        } else {
            self.out_adj[u].push(e);
            if u != v {
                self.out_adj[v].push(e);
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn node_id(&self, idx: usize) -> &str {
        &self.ids[idx]
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        match (self.index_of(source), self.index_of(target)) {
            (Some(u), Some(v)) => {
                let key = if self.directed || u <= v { (u, v) } else { (v, u) };
                self.edge_index.contains_key(&key)
            }
            _ => false,
        }
    }

    /// Edges as (source, target, weight) in insertion order
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.edges.iter().copied()
    }

    fn other_end(&self, e: usize, from: usize) -> (usize, f64) {
        let (s, t, w) = self.edges[e];
        if s == from {
            (t, w)
        } else {
            (s, w)
        }
    }

    /// Successors of `u` with edge weights (all neighbors when undirected)
    pub fn out_neighbors(&self, u: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.out_adj[u].iter().map(move |&e| {
            if self.directed {
                let (_, t, w) = self.edges[e];
                (t, w)
            } else {
                self.other_end(e, u)
            }
        })
    }

    /// Predecessors of `v` with edge weights (all neighbors when undirected)
    pub fn in_neighbors(&self, v: usize) -> Box<dyn Iterator<Item = (usize, f64)> + '_> {
        if self.directed {
            Box::new(self.in_adj[v].iter().map(move |&e| {
                let (s, _, w) = self.edges[e];
                (s, w)
            }))
        } else {
            Box::new(self.out_neighbors(v))
        }
    }

    pub fn out_degree(&self, u: usize) -> usize {
        self.out_adj[u].len()
    }

    pub fn in_degree(&self, v: usize) -> usize {
        if self.directed {
            self.in_adj[v].len()
        } else {
            self.out_adj[v].len()
        }
    }

    /// Incident edge count: in + out for directed graphs, neighbor count otherwise
    pub fn degree(&self, u: usize) -> usize {
        if self.directed {
            self.out_adj[u].len() + self.in_adj[u].len()
        } else {
            self.out_adj[u].len()
        }
    }

    /// Sum of outgoing edge weights
    pub fn out_weight(&self, u: usize) -> f64 {
        self.out_neighbors(u).map(|(_, w)| w).sum()
    }
}
