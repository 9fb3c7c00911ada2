use anyhow::{anyhow, Result};
use log::info;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::artifact::{field_tables, write_partitioned, TableFormat, GRAPHDATA_DIR};
use crate::centrality::PageRankConfig;
use crate::cli::SubfieldsArgs;
use crate::common::{
    configure_thread_pool, format_elapsed, setup_logging, unique_components, StagedOutput, SubfieldStats,
};
use crate::graph::CitationView;
use crate::ingest::{load_papers, PaperTable};
use crate::subfield::{aggregate_subfields, Taxonomy};

/// Aggregate subfield graphs and stage `graphdata/<field>/{nodes,edges}` tables
pub fn write_subfield_graphs(
    table: &PaperTable,
    citations: &CitationView,
    taxonomy: &Taxonomy,
    pagerank: &PageRankConfig,
    format: TableFormat,
    out: &mut StagedOutput,
) -> Result<SubfieldStats> {
    let (graphs, stats) = aggregate_subfields(table, citations, taxonomy, pagerank);
    let components = unique_components(graphs.iter().map(|g| g.field.as_str()));

    let (_, written) = write_partitioned(out, format, graphs.len(), |sender| {
        for (graph, component) in graphs.iter().zip(&components) {
            let dir: PathBuf = Path::new(GRAPHDATA_DIR).join(component);
            sender
                .send(field_tables(graph, dir)?)
                .map_err(|_| anyhow!("Table writer stopped early"))?;
        }
        Ok(())
    })?;

    info!(
        "Subfield graphs: {} of {} fields written, {} edges",
        written, stats.fields, stats.edges
    );
    Ok(stats)
}

/// Run the subfields command with the given arguments
pub fn run_subfields(args: SubfieldsArgs) -> Result<SubfieldStats> {
    let start_time = Instant::now();

    setup_logging(&args.input.log_level)?;

    info!("Aggregating subfield influence graphs");
    info!("Input: {}", args.input.input);
    info!("Taxonomy: {}", args.taxonomy);
    info!("Output directory: {}", args.input.output_dir);

    configure_thread_pool(args.input.threads);

    let taxonomy = Taxonomy::load(Path::new(&args.taxonomy))?;
    let (table, ingest_stats) = load_papers(&args.input.input)?;
    let citations = CitationView::build(&table);

    let mut out = StagedOutput::new(&args.input.output_dir)?;
    let stats = write_subfield_graphs(
        &table,
        &citations,
        &taxonomy,
        &args.pagerank.config(),
        args.table_format,
        &mut out,
    )?;
    out.commit()?;

    info!("==================== FINAL SUMMARY ====================");
    info!("Total execution time: {}", format_elapsed(start_time.elapsed()));
    info!("Papers ingested: {}", ingest_stats.papers);
    info!("Papers mapped to a subfield: {}", stats.papers_mapped);
    info!("Unknown category codes: {}", stats.unknown_codes);
    info!("Fields seen: {}", stats.fields);
    info!("Fields written: {}", stats.fields_written);
    info!("Subfield edges: {}", stats.edges);
    info!("Output directory: {}/", GRAPHDATA_DIR);
    info!("========================================================");

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::Paper;
    use tempfile::tempdir;

    fn paper(id: &str, category: &str, cites: &[&str]) -> Paper {
        let mut p = Paper::new(id, 2007);
        p.categories = vec![category.to_string()];
        p.citations = cites.iter().map(|c| c.to_string()).collect();
        p
    }

    #[test]
    fn test_colliding_field_names_get_separate_directories() {
        let table = PaperTable::from_papers(vec![
            paper("0704.0001", "a.one", &["0704.0002"]),
            paper("0704.0002", "a.two", &[]),
            paper("0704.0003", "b.one", &["0704.0004"]),
            paper("0704.0004", "b.two", &[]),
        ]);
        let taxonomy = Taxonomy::from_entries(vec![
            ("a.one", "A/B", "First"),
            ("a.two", "A/B", "Second"),
            ("b.one", "A_B", "Third"),
            ("b.two", "A_B", "Fourth"),
        ]);
        let citations = CitationView::build(&table);

        let dir = tempdir().unwrap();
        let mut out = StagedOutput::new(dir.path()).unwrap();
        let stats = write_subfield_graphs(
            &table,
            &citations,
            &taxonomy,
            &PageRankConfig::default(),
            TableFormat::Csv,
            &mut out,
        )
        .unwrap();
        out.commit().unwrap();

        assert_eq!(stats.fields_written, 2);
        let first = std::fs::read_to_string(dir.path().join("graphdata/A_B/nodes.csv")).unwrap();
        let second = std::fs::read_to_string(dir.path().join("graphdata/A_B_2/nodes.csv")).unwrap();
        assert!(first.contains("First"));
        assert!(second.contains("Third"));
    }
}
