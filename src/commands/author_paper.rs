use anyhow::Result;
use log::info;
use std::collections::HashMap;
use std::time::Instant;

use crate::artifact::{bipartite_document, write_json, AUTHOR_PAPER_GRAPH_FILE, AUTHOR_PAPER_SUBSET_FILE};
use crate::centrality::{CentralityEngine, Metric};
use crate::cli::AuthorPaperArgs;
use crate::commands::citation::annotate_citations;
use crate::common::{configure_thread_pool, format_elapsed, setup_logging, GraphStats, StagedOutput};
use crate::graph::{BipartiteView, CitationView};
use crate::ingest::{load_papers, PaperTable};

/// Stage the full author–paper document and its first-`subset_limit`-papers subset.
/// Returns the stats of the full view and of the subset.
pub fn write_author_paper_graphs(
    table: &PaperTable,
    engine: &CentralityEngine,
    subset_limit: usize,
    out: &mut StagedOutput,
) -> Result<(GraphStats, GraphStats)> {
    let view = BipartiteView::build(table);
    let graph = view.graph(table);
    let scores = engine.compute(&graph, &[Metric::PageRank]);

    let ranks: HashMap<String, f64> = match scores.pagerank {
        Some(ranks) => graph.ids().iter().cloned().zip(ranks).collect(),
        None => HashMap::new(),
    };

    write_json(out, AUTHOR_PAPER_GRAPH_FILE, &bipartite_document(table, &view, &ranks))?;

    let subset = view.subset(subset_limit);
    write_json(out, AUTHOR_PAPER_SUBSET_FILE, &bipartite_document(table, &subset, &ranks))?;

    let (full, partial) = (view.stats(), subset.stats());
    info!(
        "Author-paper graph: {} nodes, {} edges (subset: {} nodes, {} edges)",
        full.nodes, full.edges, partial.nodes, partial.edges
    );
    Ok((full, partial))
}

/// Run the author-paper command with the given arguments
pub fn run_author_paper(args: AuthorPaperArgs) -> Result<(GraphStats, GraphStats)> {
    let start_time = Instant::now();

    setup_logging(&args.input.log_level)?;

    info!("Building author-paper graph");
    info!("Input: {}", args.input.input);
    info!("Output directory: {}", args.input.output_dir);

    configure_thread_pool(args.input.threads);

    let (mut table, ingest_stats) = load_papers(&args.input.input)?;
    let engine = CentralityEngine::new(args.pagerank.config());

    // Paper nodes carry citation counts
    let citations = CitationView::build(&table);
    annotate_citations(&mut table, &citations, &engine, &[Metric::PageRank]);

    let mut out = StagedOutput::new(&args.input.output_dir)?;
    let (full, subset) = write_author_paper_graphs(&table, &engine, args.subset_limit, &mut out)?;
    out.commit()?;

    info!("==================== FINAL SUMMARY ====================");
    info!("Total execution time: {}", format_elapsed(start_time.elapsed()));
    info!("Papers ingested: {}", ingest_stats.papers);
    info!("Nodes (papers + authors): {}", full.nodes);
    info!("Authorship edges: {}", full.edges);
    info!("Subset nodes: {}", subset.nodes);
    info!("Subset edges: {}", subset.edges);
    info!("Output files: {}, {}", AUTHOR_PAPER_GRAPH_FILE, AUTHOR_PAPER_SUBSET_FILE);
    info!("========================================================");

    Ok((full, subset))
}
