use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::time::Duration;

use crate::artifact::TableFormat;
use crate::centrality::PageRankConfig;
use crate::cluster::{ClusterConfig, Embedder, HashingEmbedder, HttpEmbedder};

#[derive(Parser)]
#[command(name = "arxiv-graph")]
#[command(about = "Build co-author, citation, author-paper, subfield and semantic-cluster graphs from arXiv metadata")]
#[command(version = "2.0.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the co-author graph with PageRank, degree, betweenness and closeness
    Coauthor(CoauthorArgs),

    /// Build the citation graph (cited -> citing) with PageRank and degree
    Citation(CitationArgs),

    /// Build the author-paper bipartite graph and its first-N-papers subset
    AuthorPaper(AuthorPaperArgs),

    /// Aggregate citations into per-field subfield influence graphs
    Subfields(SubfieldsArgs),

    /// Cluster the top papers of every top-level category by abstract
    Clusters(ClustersArgs),

    /// Write the category summary and per-category paper listings
    Categories(CategoriesArgs),

    /// Keep the top-N nodes by PageRank of an existing graph document
    Sample(SampleArgs),

    /// Ingest once and run every stage: citation -> coauthor -> author-paper -> categories -> subfields -> clusters
    Pipeline(PipelineArgs),
}

/// Options shared by every command that reads the paper dataset
#[derive(Args, Clone, Debug)]
pub struct InputArgs {
    /// Paper metadata (.csv, .jsonl or .jsonl.gz)
    #[arg(short, long, required = true)]
    pub input: String,

    /// Directory receiving the artifacts
    #[arg(short, long, default_value = ".")]
    pub output_dir: String,

    /// Logging level (DEBUG, INFO, WARN, ERROR)
    #[arg(short, long, default_value = "INFO")]
    pub log_level: String,

    /// Number of worker threads (0 = auto-detect)
    #[arg(short, long, default_value = "0")]
    pub threads: usize,
}

#[derive(Args, Clone, Debug)]
pub struct PageRankArgs {
    /// PageRank damping factor
    #[arg(long, default_value = "0.85")]
    pub damping: f64,

    /// PageRank convergence tolerance per node
    #[arg(long, default_value = "1e-8")]
    pub tolerance: f64,

    /// PageRank iteration cap
    #[arg(long, default_value = "100")]
    pub max_iterations: usize,
}

impl PageRankArgs {
    pub fn config(&self) -> PageRankConfig {
        PageRankConfig {
            damping: self.damping,
            tolerance: self.tolerance,
            max_iterations: self.max_iterations,
        }
    }
}

impl Default for PageRankArgs {
    fn default() -> Self {
        let config = PageRankConfig::default();
        Self {
            damping: config.damping,
            tolerance: config.tolerance,
            max_iterations: config.max_iterations,
        }
    }
}

#[derive(Args, Clone, Debug)]
pub struct ClusterArgs {
    /// Skip categories with fewer papers
    #[arg(long, default_value = "20")]
    pub min_category_papers: usize,

    /// Number of top-ranked papers with an abstract to cluster per category
    #[arg(long, default_value = "100")]
    pub top_papers: usize,

    /// Skip categories with fewer papers having an abstract
    #[arg(long, default_value = "10")]
    pub min_abstracts: usize,

    /// Number of k-means clusters
    #[arg(long, default_value = "10")]
    pub clusters: usize,

    /// k-means seed
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Keywords per cluster
    #[arg(long, default_value = "3")]
    pub keywords: usize,

    /// Vocabulary size for keyword extraction
    #[arg(long, default_value = "100")]
    pub max_features: usize,

    /// k-means iteration cap
    #[arg(long, default_value = "300")]
    pub max_kmeans_iterations: usize,
}

impl ClusterArgs {
    pub fn config(&self) -> ClusterConfig {
        ClusterConfig {
            min_category_papers: self.min_category_papers,
            top_papers: self.top_papers,
            min_abstracts: self.min_abstracts,
            clusters: self.clusters,
            seed: self.seed,
            keywords: self.keywords,
            max_features: self.max_features,
            max_kmeans_iterations: self.max_kmeans_iterations,
        }
    }
}

impl Default for ClusterArgs {
    fn default() -> Self {
        let config = ClusterConfig::default();
        Self {
            min_category_papers: config.min_category_papers,
            top_papers: config.top_papers,
            min_abstracts: config.min_abstracts,
            clusters: config.clusters,
            seed: config.seed,
            keywords: config.keywords,
            max_features: config.max_features,
            max_kmeans_iterations: config.max_kmeans_iterations,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EmbedderKind {
    /// Local feature-hashing embedder
    Hashing,
    /// OpenAI-compatible embeddings endpoint
    Http,
}

#[derive(Args, Clone, Debug)]
pub struct EmbedderArgs {
    /// Embedding backend
    #[arg(long, value_enum, default_value = "hashing")]
    pub embedder: EmbedderKind,

    /// Embeddings endpoint (http backend); bearer token read from EMBEDDING_API_KEY
    #[arg(long, default_value = "http://localhost:8080/v1/embeddings")]
    pub embedding_url: String,

    /// Model name sent to the endpoint (http backend)
    #[arg(long, default_value = "all-MiniLM-L6-v2")]
    pub embedding_model: String,

    /// Vector size (hashing backend)
    #[arg(long, default_value = "384")]
    pub embedding_dim: usize,

    /// Concurrent embedding requests (http backend)
    #[arg(long, default_value = "16")]
    pub embedding_concurrency: usize,

    /// Timeout in seconds per embedding request
    #[arg(long, default_value = "30")]
    pub timeout: u64,
}

impl EmbedderArgs {
    pub fn build(&self) -> Result<Box<dyn Embedder>> {
        Ok(match self.embedder {
            EmbedderKind::Hashing => Box::new(HashingEmbedder::new(self.embedding_dim)),
            EmbedderKind::Http => Box::new(HttpEmbedder::new(
                &self.embedding_url,
                &self.embedding_model,
                self.embedding_concurrency,
                Duration::from_secs(self.timeout),
            )?),
        })
    }
}

impl Default for EmbedderArgs {
    fn default() -> Self {
        Self {
            embedder: EmbedderKind::Hashing,
            embedding_url: "http://localhost:8080/v1/embeddings".to_string(),
            embedding_model: "all-MiniLM-L6-v2".to_string(),
            embedding_dim: 384,
            embedding_concurrency: 16,
            timeout: 30,
        }
    }
}

#[derive(Parser, Clone, Debug)]
pub struct CoauthorArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub pagerank: PageRankArgs,
}

#[derive(Parser, Clone, Debug)]
pub struct CitationArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub pagerank: PageRankArgs,

    /// Also compute betweenness and closeness (slow on large graphs)
    #[arg(long, default_value = "false")]
    pub path_metrics: bool,
}

#[derive(Parser, Clone, Debug)]
pub struct AuthorPaperArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub pagerank: PageRankArgs,

    /// Number of papers kept in the subset document
    #[arg(long, default_value = "5000")]
    pub subset_limit: usize,
}

#[derive(Parser, Clone, Debug)]
pub struct SubfieldsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub pagerank: PageRankArgs,

    /// CSV with category, field and subfield columns
    #[arg(long, required = true)]
    pub taxonomy: String,

    /// Table format of the per-field files
    #[arg(long, value_enum, default_value = "csv")]
    pub table_format: TableFormat,
}

#[derive(Parser, Clone, Debug)]
pub struct ClustersArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub pagerank: PageRankArgs,

    #[command(flatten)]
    pub cluster: ClusterArgs,

    #[command(flatten)]
    pub embedder: EmbedderArgs,

    /// Table format of the per-category files
    #[arg(long, value_enum, default_value = "csv")]
    pub table_format: TableFormat,
}

#[derive(Parser, Clone, Debug)]
pub struct CategoriesArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub pagerank: PageRankArgs,
}

#[derive(Parser, Clone, Debug)]
pub struct SampleArgs {
    /// Whole-graph JSON document
    #[arg(short, long, required = true)]
    pub input: String,

    /// Sampled JSON document
    #[arg(short, long, default_value = "sample_graph.json")]
    pub output: String,

    /// Number of nodes to keep
    #[arg(long, default_value = "10000")]
    pub top: usize,

    /// Logging level (DEBUG, INFO, WARN, ERROR)
    #[arg(short, long, default_value = "INFO")]
    pub log_level: String,
}

#[derive(Parser, Clone, Debug)]
pub struct PipelineArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub pagerank: PageRankArgs,

    #[command(flatten)]
    pub cluster: ClusterArgs,

    #[command(flatten)]
    pub embedder: EmbedderArgs,

    /// Taxonomy CSV; the subfield stage is skipped without it
    #[arg(long)]
    pub taxonomy: Option<String>,

    /// Number of papers kept in the author-paper subset document
    #[arg(long, default_value = "5000")]
    pub subset_limit: usize,

    /// Compute betweenness and closeness on the citation graph
    #[arg(long, default_value = "false")]
    pub path_metrics: bool,

    /// Skip the semantic clustering stage
    #[arg(long, default_value = "false")]
    pub skip_clusters: bool,

    /// Table format of per-field and per-category files
    #[arg(long, value_enum, default_value = "csv")]
    pub table_format: TableFormat,
}
