use anyhow::Result;
use log::info;
use std::time::Instant;

use crate::artifact::{coauthor_document, write_json, COAUTHOR_GRAPH_FILE};
use crate::centrality::{CentralityEngine, Metric};
use crate::cli::CoauthorArgs;
use crate::common::{configure_thread_pool, format_elapsed, setup_logging, GraphStats, StagedOutput};
use crate::graph::CoauthorView;
use crate::ingest::{load_papers, PaperTable};

/// Build the co-author view, compute every centrality and stage the document
pub fn write_coauthor_graph(
    table: &PaperTable,
    engine: &CentralityEngine,
    out: &mut StagedOutput,
) -> Result<GraphStats> {
    let view = CoauthorView::build(table);
    let scores = engine.compute(&view.graph(), &Metric::ALL);
    let doc = coauthor_document(&view, &scores);
    write_json(out, COAUTHOR_GRAPH_FILE, &doc)?;

    let stats = view.stats();
    info!("Co-author graph: {} authors, {} edges", stats.nodes, stats.edges);
    Ok(stats)
}

/// Run the coauthor command with the given arguments
pub fn run_coauthor(args: CoauthorArgs) -> Result<GraphStats> {
    let start_time = Instant::now();

    setup_logging(&args.input.log_level)?;

    info!("Building co-author graph");
    info!("Input: {}", args.input.input);
    info!("Output directory: {}", args.input.output_dir);

    configure_thread_pool(args.input.threads);

    let (table, ingest_stats) = load_papers(&args.input.input)?;
    let engine = CentralityEngine::new(args.pagerank.config());

    let mut out = StagedOutput::new(&args.input.output_dir)?;
    let stats = write_coauthor_graph(&table, &engine, &mut out)?;
    out.commit()?;

    info!("==================== FINAL SUMMARY ====================");
    info!("Total execution time: {}", format_elapsed(start_time.elapsed()));
    info!("Papers ingested: {}", ingest_stats.papers);
    info!("Author names rejected: {}", ingest_stats.authors_rejected);
    info!("Authors: {}", stats.nodes);
    info!("Co-author edges: {}", stats.edges);
    info!("Output file: {}", COAUTHOR_GRAPH_FILE);
    info!("========================================================");

    Ok(stats)
}
