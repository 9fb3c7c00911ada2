use anyhow::Result;
use clap::Parser;

use arxiv_graph::cli::{Cli, Commands};
use arxiv_graph::commands::{
    run_author_paper, run_categories, run_citation, run_clusters, run_coauthor, run_pipeline,
    run_sample, run_subfields,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Coauthor(args) => {
            run_coauthor(args)?;
        }
        Commands::Citation(args) => {
            run_citation(args)?;
        }
        Commands::AuthorPaper(args) => {
            run_author_paper(args)?;
        }
        Commands::Subfields(args) => {
            run_subfields(args)?;
        }
        Commands::Clusters(args) => {
            run_clusters(args)?;
        }
        Commands::Categories(args) => {
            run_categories(args)?;
        }
        Commands::Sample(args) => {
            run_sample(args)?;
        }
        Commands::Pipeline(args) => {
            run_pipeline(args)?;
        }
    }

    Ok(())
}
