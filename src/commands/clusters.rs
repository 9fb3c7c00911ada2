use anyhow::{anyhow, Result};
use log::info;
use std::path::Path;
use std::time::Instant;

use crate::artifact::{cluster_tables, write_partitioned, TableFormat, CLUSTERS_DIR};
use crate::centrality::PageRankConfig;
use crate::cli::ClustersArgs;
use crate::cluster::{cluster_categories, ClusterConfig, Embedder};
use crate::common::{configure_thread_pool, format_elapsed, setup_logging, ClusterStats, StagedOutput};
use crate::graph::CitationView;
use crate::ingest::{load_papers, PaperTable};

/// Cluster every category and stage `semantic_clusters/<category>/{nodes,edges}` tables
#[allow(clippy::too_many_arguments)]
pub fn write_semantic_clusters(
    table: &PaperTable,
    citations: &CitationView,
    embedder: &dyn Embedder,
    config: &ClusterConfig,
    pagerank: &PageRankConfig,
    format: TableFormat,
    queue: usize,
    out: &mut StagedOutput,
) -> Result<ClusterStats> {
    let (stats, _) = write_partitioned(out, format, queue, |sender| {
        cluster_categories(table, citations, embedder, config, pagerank, |clusters| {
            let dir = Path::new(CLUSTERS_DIR).join(clusters.category.slug());
            sender
                .send(cluster_tables(&clusters, dir)?)
                .map_err(|_| anyhow!("Table writer stopped early"))
        })
    })?;
    Ok(stats)
}

/// Run the clusters command with the given arguments
pub fn run_clusters(args: ClustersArgs) -> Result<ClusterStats> {
    let start_time = Instant::now();

    setup_logging(&args.input.log_level)?;

    info!("Clustering papers per category");
    info!("Input: {}", args.input.input);
    info!("Output directory: {}", args.input.output_dir);

    let num_threads = configure_thread_pool(args.input.threads);

    let embedder = args.embedder.build()?;
    info!("Embedder: {}", embedder.name());

    let (table, ingest_stats) = load_papers(&args.input.input)?;
    let citations = CitationView::build(&table);

    let mut out = StagedOutput::new(&args.input.output_dir)?;
    let stats = write_semantic_clusters(
        &table,
        &citations,
        embedder.as_ref(),
        &args.cluster.config(),
        &args.pagerank.config(),
        args.table_format,
        num_threads * 2,
        &mut out,
    )?;
    out.commit()?;

    info!("==================== FINAL SUMMARY ====================");
    info!("Total execution time: {}", format_elapsed(start_time.elapsed()));
    info!("Papers ingested: {}", ingest_stats.papers);
    info!("Categories seen: {}", stats.categories_seen);
    info!("Categories clustered: {}", stats.written);
    info!("Skipped (too few papers): {}", stats.too_small);
    info!("Skipped (too few abstracts): {}", stats.too_few_abstracts);
    info!("Failed: {}", stats.failed);
    info!("Output directory: {}/", CLUSTERS_DIR);
    info!("========================================================");

    Ok(stats)
}
