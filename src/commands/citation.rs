use anyhow::Result;
use log::info;
use std::collections::HashMap;
use std::time::Instant;

use crate::artifact::{citation_document, write_json, CITATION_GRAPH_FILE};
use crate::centrality::{CentralityEngine, CentralityScores, Metric};
use crate::cli::CitationArgs;
use crate::common::{configure_thread_pool, format_elapsed, setup_logging, GraphStats, StagedOutput};
use crate::graph::CitationView;
use crate::ingest::{load_papers, PaperTable};

/// Compute citation-view metrics and write citation counts and PageRank back
/// onto the paper table. Scores are indexed by table position.
pub fn annotate_citations(
    table: &mut PaperTable,
    view: &CitationView,
    engine: &CentralityEngine,
    metrics: &[Metric],
) -> CentralityScores {
    let graph = view.graph(table);
    let scores = engine.compute(&graph, metrics);

    let ranks: HashMap<String, f64> = match &scores.pagerank {
        Some(ranks) => table.iter().map(|p| p.id.clone()).zip(ranks.iter().copied()).collect(),
        None => HashMap::new(),
    };
    let counts = view.citation_count_map(table);
    table.apply_citation_metrics(&counts, &ranks);
    scores
}

/// Build, annotate and stage the citation graph document
pub fn write_citation_graph(
    table: &mut PaperTable,
    engine: &CentralityEngine,
    path_metrics: bool,
    out: &mut StagedOutput,
) -> Result<GraphStats> {
    let view = CitationView::build(table);
    let metrics: &[Metric] = if path_metrics {
        &Metric::ALL
    } else {
        &[Metric::PageRank, Metric::Degree]
    };

    let scores = annotate_citations(table, &view, engine, metrics);
    let doc = citation_document(table, &view, &scores);
    write_json(out, CITATION_GRAPH_FILE, &doc)?;

    let stats = view.stats();
    info!("Citation graph: {} nodes, {} edges", stats.nodes, stats.edges);
    Ok(stats)
}

/// Run the citation command with the given arguments
pub fn run_citation(args: CitationArgs) -> Result<GraphStats> {
    let start_time = Instant::now();

    setup_logging(&args.input.log_level)?;

    info!("Building citation graph");
    info!("Input: {}", args.input.input);
    info!("Output directory: {}", args.input.output_dir);

    configure_thread_pool(args.input.threads);

    let (mut table, ingest_stats) = load_papers(&args.input.input)?;
    let engine = CentralityEngine::new(args.pagerank.config());

    let mut out = StagedOutput::new(&args.input.output_dir)?;
    let stats = write_citation_graph(&mut table, &engine, args.path_metrics, &mut out)?;
    out.commit()?;

    info!("==================== FINAL SUMMARY ====================");
    info!("Total execution time: {}", format_elapsed(start_time.elapsed()));
    info!("Papers ingested: {}", ingest_stats.papers);
    info!("Records skipped (no year): {}", ingest_stats.skipped_no_year);
    info!("Citation nodes: {}", stats.nodes);
    info!("Citation edges: {}", stats.edges);
    info!("Path metrics: {}", if args.path_metrics { "yes" } else { "no" });
    info!("Output file: {}", CITATION_GRAPH_FILE);
    info!("========================================================");

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::Paper;

    fn paper(id: &str, cites: &[&str]) -> Paper {
        let mut p = Paper::new(id, 2007);
        p.citations = cites.iter().map(|c| c.to_string()).collect();
        p
    }

    #[test]
    fn test_annotate_citations_writes_back_metrics() {
        let mut table = PaperTable::from_papers(vec![
            paper("P1", &["P2"]),
            paper("P2", &["P3"]),
            paper("P3", &[]),
        ]);
        let view = CitationView::build(&table);
        let scores = annotate_citations(&mut table, &view, &CentralityEngine::default(), &[Metric::PageRank]);

        assert!(scores.degree.is_none());
        let p1 = table.get("P1").unwrap();
        let p3 = table.get("P3").unwrap();
        assert!(p3.pagerank > p1.pagerank);
        assert_eq!(p3.citation_count, 1);
        assert_eq!(p1.citation_count, 0);
        let total: f64 = table.iter().map(|p| p.pagerank).sum();
        assert!((total - 1.0).abs() < 1e-6);
    }
}
