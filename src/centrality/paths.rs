//! Shortest-path centralities over the unweighted topology.

use rayon::prelude::*;
use std::collections::VecDeque;

use crate::graph::Graph;

/// Sources handled per parallel task. Partial sums are reduced in chunk order
/// so results do not depend on scheduling.
const SOURCE_CHUNK: usize = 64;

/// Brandes dependency accumulation from a single source
fn accumulate_from(graph: &Graph, source: usize, scores: &mut [f64]) {
    let n = graph.node_count();
    let mut stack: Vec<usize> = Vec::with_capacity(n);
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0f64; n];
    let mut dist = vec![-1i64; n];
    let mut queue = VecDeque::new();

    sigma[source] = 1.0;
    dist[source] = 0;
    queue.push_back(source);

    while let Some(v) = queue.pop_front() {
        stack.push(v);
        for (w, _) in graph.out_neighbors(v) {
            if dist[w] < 0 {
                dist[w] = dist[v] + 1;
                queue.push_back(w);
            }
            if dist[w] == dist[v] + 1 {
                sigma[w] += sigma[v];
                preds[w].push(v);
            }
        }
    }

    let mut delta = vec![0.0f64; n];
    while let Some(w) = stack.pop() {
        for &v in &preds[w] {
            delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
        }
        if w != source {
            scores[w] += delta[w];
        }
    }
}

/// Normalized betweenness centrality (Brandes).
///
/// Scores are scaled by `1 / ((n - 1)(n - 2))`; for undirected graphs every
/// pair is counted in both directions, which that scale already accounts for.
pub fn betweenness(graph: &Graph) -> Vec<f64> {
    let n = graph.node_count();
    if n == 0 {
        return Vec::new();
    }

    let sources: Vec<usize> = (0..n).collect();
    let partials: Vec<Vec<f64>> = sources
        .par_chunks(SOURCE_CHUNK)
        .map(|chunk| {
            let mut partial = vec![0.0f64; n];
            for &s in chunk {
                accumulate_from(graph, s, &mut partial);
            }
            partial
        })
        .collect();

    let mut scores = vec![0.0f64; n];
    for partial in partials {
        for (total, value) in scores.iter_mut().zip(partial) {
            *total += value;
        }
    }

    if n > 2 {
        let scale = 1.0 / ((n - 1) as f64 * (n - 2) as f64);
        scores.iter_mut().for_each(|s| *s *= scale);
    }
    scores
}

/// BFS distances into `target`: along incoming edges for directed graphs
fn incoming_distances(graph: &Graph, target: usize) -> (usize, usize) {
    let n = graph.node_count();
    let mut dist = vec![usize::MAX; n];
    let mut queue = VecDeque::new();
    dist[target] = 0;
    queue.push_back(target);

    let mut reachable = 0usize;
    let mut total = 0usize;

    while let Some(v) = queue.pop_front() {
        reachable += 1;
        total += dist[v];
        for (u, _) in graph.in_neighbors(v) {
            if dist[u] == usize::MAX {
                dist[u] = dist[v] + 1;
                queue.push_back(u);
            }
        }
    }

    (reachable, total)
}

/// Closeness centrality with Wasserman–Faust scaling.
///
/// Only nodes that can reach `v` contribute; the raw closeness
/// `(r - 1) / total_distance` is scaled by `(r - 1) / (n - 1)`. A node nothing
/// can reach scores 0.
pub fn closeness(graph: &Graph) -> Vec<f64> {
    let n = graph.node_count();
    (0..n)
        .into_par_iter()
        .map(|v| {
            let (reachable, total) = incoming_distances(graph, v);
            if total == 0 || n <= 1 {
                return 0.0;
            }
            let others = (reachable - 1) as f64;
            (others / total as f64) * (others / (n - 1) as f64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph() -> Graph {
        let mut g = Graph::undirected();
        g.add_edge("a", "b", 1.0);
        g.add_edge("b", "c", 1.0);
        g.add_edge("c", "d", 1.0);
        g
    }

    #[test]
    fn test_betweenness_undirected_path() {
        let bc = betweenness(&path_graph());
        // b lies on a-c and a-d: 2 of 3 pairs not involving b
        assert!((bc[0] - 0.0).abs() < 1e-12);
        assert!((bc[1] - 2.0 / 3.0).abs() < 1e-12);
        assert!((bc[2] - 2.0 / 3.0).abs() < 1e-12);
        assert!((bc[3] - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_betweenness_splits_equal_paths() {
        // a - b - d and a - c - d
        let mut g = Graph::undirected();
        g.add_edge("a", "b", 1.0);
        g.add_edge("a", "c", 1.0);
        g.add_edge("b", "d", 1.0);
        g.add_edge("c", "d", 1.0);
        let bc = betweenness(&g);
        assert!((bc[1] - bc[2]).abs() < 1e-12);
        assert!((bc[1] - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_betweenness_directed_chain() {
        let mut g = Graph::directed();
        g.add_edge("a", "b", 1.0);
        g.add_edge("b", "c", 1.0);
        let bc = betweenness(&g);
        assert!((bc[1] - 0.5).abs() < 1e-12);
        assert_eq!(bc[0], 0.0);
    }

    #[test]
    fn test_closeness_undirected_path() {
        let cc = closeness(&path_graph());
        // a: distances 1 + 2 + 3
        assert!((cc[0] - 3.0 / 6.0).abs() < 1e-12);
        // b: distances 1 + 1 + 2
        assert!((cc[1] - 3.0 / 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_closeness_uses_incoming_paths_when_directed() {
        let mut g = Graph::directed();
        g.add_edge("a", "b", 1.0);
        g.add_edge("b", "c", 1.0);
        let cc = closeness(&g);
        assert_eq!(cc[0], 0.0);
        // c is reached from b (1) and a (2)
        assert!((cc[2] - (2.0 / 3.0) * (2.0 / 2.0)).abs() < 1e-12);
        // b is reached from a only
        assert!((cc[1] - (1.0 / 1.0) * (1.0 / 2.0)).abs() < 1e-12);
    }

    #[test]
    fn test_isolated_node_scores_zero() {
        let mut g = path_graph();
        g.add_node("isolated");
        let idx = g.index_of("isolated").unwrap();
        assert_eq!(betweenness(&g)[idx], 0.0);
        assert_eq!(closeness(&g)[idx], 0.0);
    }
}
