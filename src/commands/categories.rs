use anyhow::Result;
use log::info;
use std::time::Instant;

use crate::artifact::{category_listings, category_summary, write_json, CATEGORIES_DIR, CATEGORIES_FILE};
use crate::centrality::{CentralityEngine, Metric};
use crate::cli::CategoriesArgs;
use crate::commands::citation::annotate_citations;
use crate::common::{configure_thread_pool, format_elapsed, setup_logging, CategoryStats, StagedOutput};
use crate::graph::CitationView;
use crate::ingest::{load_papers, PaperTable};

/// Stage `categories.json` and one listing per top-level category
pub fn write_categories(table: &PaperTable, out: &mut StagedOutput) -> Result<CategoryStats> {
    let (summary, stats) = category_summary(table);
    write_json(out, CATEGORIES_FILE, &summary)?;

    for (category, listing) in category_listings(table) {
        let relative = format!("{}/{}.json", CATEGORIES_DIR, category.slug());
        write_json(out, &relative, &listing)?;
    }

    info!(
        "Category summary: {} categories, {} papers ({} uncategorized)",
        stats.categories, stats.papers_counted, stats.uncategorized
    );
    Ok(stats)
}

/// Run the categories command with the given arguments
pub fn run_categories(args: CategoriesArgs) -> Result<CategoryStats> {
    let start_time = Instant::now();

    setup_logging(&args.input.log_level)?;

    info!("Summarizing categories");
    info!("Input: {}", args.input.input);
    info!("Output directory: {}", args.input.output_dir);

    configure_thread_pool(args.input.threads);

    let (mut table, ingest_stats) = load_papers(&args.input.input)?;

    // Listings carry citation counts and PageRank
    let engine = CentralityEngine::new(args.pagerank.config());
    let citations = CitationView::build(&table);
    annotate_citations(&mut table, &citations, &engine, &[Metric::PageRank]);

    let mut out = StagedOutput::new(&args.input.output_dir)?;
    let stats = write_categories(&table, &mut out)?;
    out.commit()?;

    info!("==================== FINAL SUMMARY ====================");
    info!("Total execution time: {}", format_elapsed(start_time.elapsed()));
    info!("Papers ingested: {}", ingest_stats.papers);
    info!("Categories: {}", stats.categories);
    info!("Papers counted: {}", stats.papers_counted);
    info!("Uncategorized papers: {}", stats.uncategorized);
    info!("Output: {} and {}/", CATEGORIES_FILE, CATEGORIES_DIR);
    info!("========================================================");

    Ok(stats)
}
