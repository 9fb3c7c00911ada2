//! Weighted PageRank by power iteration.
//!
//! Each node passes `damping * rank / out_weight` along every outgoing edge in
//! proportion to the edge weight. Nodes without outgoing weight spread their
//! rank uniformly over all nodes, so scores always sum to 1. Undirected graphs
//! pass rank along both directions of each edge.

use log::{debug, warn};

use crate::graph::Graph;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRankConfig {
    /// Damping factor (probability of following an edge)
    pub damping: f64,
    /// Convergence threshold per node; iteration stops when the L1 change is below `n * tolerance`
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            tolerance: 1e-8,
            max_iterations: 100,
        }
    }
}

/// Compute PageRank scores indexed by node
pub fn pagerank(graph: &Graph, config: &PageRankConfig) -> Vec<f64> {
    let n = graph.node_count();
    if n == 0 {
        return Vec::new();
    }

    let n_f = n as f64;
    let damping = config.damping;
    let teleport = (1.0 - damping) / n_f;

    let out_weight: Vec<f64> = (0..n).map(|u| graph.out_weight(u)).collect();
    let dangling: Vec<usize> = (0..n).filter(|&u| out_weight[u] <= 0.0).collect();

    let mut rank = vec![1.0 / n_f; n];
    let mut next = vec![0.0; n];

    for iteration in 1..=config.max_iterations {
        let dangling_sum: f64 = dangling.iter().map(|&u| rank[u]).sum();
        let base = teleport + damping * dangling_sum / n_f;
        next.iter_mut().for_each(|x| *x = base);

        for u in 0..n {
            if out_weight[u] <= 0.0 {
                continue;
            }
            let share = damping * rank[u] / out_weight[u];
            for (v, w) in graph.out_neighbors(u) {
                next[v] += share * w;
            }
        }

        let change: f64 = next.iter().zip(&rank).map(|(a, b)| (a - b).abs()).sum();
        std::mem::swap(&mut rank, &mut next);

        if change < n_f * config.tolerance {
            debug!("PageRank converged after {} iterations", iteration);
            return rank;
        }
    }

    warn!(
        "PageRank did not converge within {} iterations ({} nodes); using last estimate",
        config.max_iterations, n
    );
    rank
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum(scores: &[f64]) -> f64 {
        scores.iter().sum()
    }

    #[test]
    fn test_chain_sink_accumulates_rank() {
        let mut g = Graph::directed();
        g.add_edge("P1", "P2", 1.0);
        g.add_edge("P2", "P3", 1.0);

        let pr = pagerank(&g, &PageRankConfig::default());
        assert!((sum(&pr) - 1.0).abs() < 1e-6);
        assert!(pr[2] > pr[1]);
        assert!(pr[1] > pr[0]);
    }

    #[test]
    fn test_cycle_is_uniform() {
        let mut g = Graph::directed();
        g.add_edge("a", "b", 1.0);
        g.add_edge("b", "c", 1.0);
        g.add_edge("c", "a", 1.0);

        let pr = pagerank(&g, &PageRankConfig::default());
        for score in &pr {
            assert!((score - 1.0 / 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_weights_shift_rank() {
        let mut g = Graph::directed();
        g.add_edge("hub", "heavy", 9.0);
        g.add_edge("hub", "light", 1.0);

        let pr = pagerank(&g, &PageRankConfig::default());
        assert!(pr[1] > pr[2]);
        assert!((sum(&pr) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_undirected_star() {
        let mut g = Graph::undirected();
        g.add_edge("center", "a", 1.0);
        g.add_edge("center", "b", 1.0);
        g.add_edge("center", "c", 1.0);
        g.add_node("isolated");

        let pr = pagerank(&g, &PageRankConfig::default());
        assert!((sum(&pr) - 1.0).abs() < 1e-6);
        assert!(pr[0] > pr[1]);
        assert!((pr[1] - pr[2]).abs() < 1e-12);
        assert!(pr[4] > 0.0);
    }

    #[test]
    fn test_empty_and_edgeless_graphs() {
        assert!(pagerank(&Graph::directed(), &PageRankConfig::default()).is_empty());

        let mut g = Graph::directed();
        g.add_node("a");
        g.add_node("b");
        let pr = pagerank(&g, &PageRankConfig::default());
        assert!((pr[0] - 0.5).abs() < 1e-12);
        assert!((pr[1] - 0.5).abs() < 1e-12);
    }
}
