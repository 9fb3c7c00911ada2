use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use arxiv_graph::centrality::{betweenness, closeness, pagerank, PageRankConfig};
use arxiv_graph::graph::Graph;

/// Random directed graph with `nodes` nodes and about `edges_per_node` out-edges each
fn synthetic_graph(nodes: usize, edges_per_node: usize, directed: bool) -> Graph {
    let mut rng = StdRng::seed_from_u64(7);
    let mut graph = if directed { Graph::directed() } else { Graph::undirected() };
    for i in 0..nodes {
        graph.add_node(&format!("n{}", i));
    }
    for u in 0..nodes {
        for _ in 0..edges_per_node {
            let v = rng.gen_range(0..nodes);
            if u != v {
                graph.add_edge_between(u, v, 1.0);
            }
        }
    }
    graph
}

fn bench_pagerank(c: &mut Criterion) {
    let graph = synthetic_graph(10_000, 8, true);
    let config = PageRankConfig::default();

    let mut group = c.benchmark_group("pagerank");
    group.throughput(Throughput::Elements(graph.edge_count() as u64));
    group.bench_function("directed_10k", |b| b.iter(|| black_box(pagerank(&graph, &config))));
    group.finish();
}

fn bench_path_metrics(c: &mut Criterion) {
    let graph = synthetic_graph(1_000, 4, false);

    let mut group = c.benchmark_group("path_metrics");
    group.sample_size(10);
    group.bench_function("betweenness_1k", |b| b.iter(|| black_box(betweenness(&graph))));
    group.bench_function("closeness_1k", |b| b.iter(|| black_box(closeness(&graph))));
    group.finish();
}

criterion_group!(benches, bench_pagerank, bench_path_metrics);
criterion_main!(benches);
