use anyhow::{Context, Result};
use log::info;
use std::path::Path;
use std::time::Instant;

use crate::centrality::CentralityEngine;
use crate::cli::PipelineArgs;
use crate::commands::{
    write_author_paper_graphs, write_categories, write_citation_graph, write_coauthor_graph,
    write_semantic_clusters, write_subfield_graphs,
};
use crate::common::{
    configure_thread_pool, format_elapsed, setup_logging, CategoryStats, ClusterStats, GraphStats,
    IngestStats, StagedOutput, SubfieldStats,
};
use crate::graph::CitationView;
use crate::ingest::load_papers;
use crate::subfield::Taxonomy;

/// Statistics of every stage of a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    pub ingest: IngestStats,
    pub citation: GraphStats,
    pub coauthor: GraphStats,
    pub author_paper: GraphStats,
    pub author_paper_subset: GraphStats,
    pub categories: CategoryStats,
    pub subfields: Option<SubfieldStats>,
    pub clusters: Option<ClusterStats>,
    pub artifacts: usize,
}

/// Run the full pipeline: ingest once, build every view, commit all artifacts together
pub fn run_pipeline(args: PipelineArgs) -> Result<PipelineStats> {
    let start_time = Instant::now();

    setup_logging(&args.input.log_level)?;

    info!("Starting arXiv graph pipeline");
    info!("Input: {}", args.input.input);
    info!("Output directory: {}", args.input.output_dir);
    if let Some(ref taxonomy) = args.taxonomy {
        info!("Taxonomy: {}", taxonomy);
    }

    let num_threads = configure_thread_pool(args.input.threads);

    // Fail on a bad taxonomy or embedder before spending time on the graphs
    let taxonomy = args
        .taxonomy
        .as_ref()
        .map(|path| Taxonomy::load(Path::new(path)))
        .transpose()?;
    let embedder = if args.skip_clusters {
        None
    } else {
        Some(args.embedder.build()?)
    };

    let mut stats = PipelineStats::default();
    let engine = CentralityEngine::new(args.pagerank.config());
    let mut out = StagedOutput::new(&args.input.output_dir)?;

    info!("");
    info!("=== STEP 1/6: Ingesting papers ===");
    info!("");
    let (mut table, ingest_stats) = load_papers(&args.input.input)?;
    stats.ingest = ingest_stats;

    info!("");
    info!("=== STEP 2/6: Citation graph ===");
    info!("");
    stats.citation = write_citation_graph(&mut table, &engine, args.path_metrics, &mut out)
        .context("Citation stage failed")?;

    info!("");
    info!("=== STEP 3/6: Co-author graph ===");
    info!("");
    stats.coauthor = write_coauthor_graph(&table, &engine, &mut out).context("Co-author stage failed")?;

    info!("");
    info!("=== STEP 4/6: Author-paper graph ===");
    info!("");
    let (full, subset) = write_author_paper_graphs(&table, &engine, args.subset_limit, &mut out)
        .context("Author-paper stage failed")?;
    stats.author_paper = full;
    stats.author_paper_subset = subset;

    info!("");
    info!("=== STEP 5/6: Categories and subfields ===");
    info!("");
    stats.categories = write_categories(&table, &mut out).context("Category stage failed")?;

    let citations = CitationView::build(&table);
    if let Some(taxonomy) = &taxonomy {
        let subfields = write_subfield_graphs(
            &table,
            &citations,
            taxonomy,
            &engine.pagerank,
            args.table_format,
            &mut out,
        )
        .context("Subfield stage failed")?;
        stats.subfields = Some(subfields);
    } else {
        info!("No taxonomy given; skipping subfield graphs");
    }

    info!("");
    info!("=== STEP 6/6: Semantic clusters ===");
    info!("");
    if let Some(embedder) = &embedder {
        info!("Embedder: {}", embedder.name());
        let clusters = write_semantic_clusters(
            &table,
            &citations,
            embedder.as_ref(),
            &args.cluster.config(),
            &engine.pagerank,
            args.table_format,
            num_threads * 2,
            &mut out,
        )
        .context("Clustering stage failed")?;
        stats.clusters = Some(clusters);
    } else {
        info!("Skipping semantic clusters");
    }

    stats.artifacts = out.commit()?.len();

    info!("");
    info!("==================== PIPELINE COMPLETE ====================");
    info!("Total execution time: {}", format_elapsed(start_time.elapsed()));
    info!("");
    info!("Ingest:");
    info!("  Rows read: {}", stats.ingest.rows_read);
    info!("  Papers: {}", stats.ingest.papers);
    info!("  Skipped (no year): {}", stats.ingest.skipped_no_year);
    info!("  Duplicate ids: {}", stats.ingest.duplicate_ids);
    info!("  Malformed citation lists: {}", stats.ingest.malformed_citations);
    info!("");
    info!("Graphs:");
    info!("  Citation: {} nodes, {} edges", stats.citation.nodes, stats.citation.edges);
    info!("  Co-author: {} nodes, {} edges", stats.coauthor.nodes, stats.coauthor.edges);
    info!("  Author-paper: {} nodes, {} edges", stats.author_paper.nodes, stats.author_paper.edges);
    info!(
        "  Author-paper subset: {} nodes, {} edges",
        stats.author_paper_subset.nodes, stats.author_paper_subset.edges
    );
    info!("");
    info!("Categories: {}", stats.categories.categories);
    if let Some(ref subfields) = stats.subfields {
        info!("Subfields: {} fields written, {} edges", subfields.fields_written, subfields.edges);
    }
    if let Some(ref clusters) = stats.clusters {
        info!(
            "Clusters: {} categories clustered, {} skipped, {} failed",
            clusters.written,
            clusters.too_small + clusters.too_few_abstracts,
            clusters.failed
        );
    }
    info!("");
    info!("Artifacts committed: {}", stats.artifacts);
    info!("Output directory: {}", args.input.output_dir);
    info!("===========================================================");

    Ok(stats)
}
