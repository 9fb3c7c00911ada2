use anyhow::Result;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::time::Instant;
use thiserror::Error;

use super::embed::{EmbedError, Embedder};
use super::keywords::{extract_keywords, keyword_label};
use super::kmeans::{kmeans, KMeansConfig, KMeansError};
use crate::centrality::{pagerank, PageRankConfig};
use crate::common::{create_count_progress_bar, format_elapsed, ClusterStats};
use crate::graph::CitationView;
use crate::ingest::{PaperTable, TopLevel};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterConfig {
    /// Categories with fewer papers are skipped
    pub min_category_papers: usize,
    /// Number of top-ranked papers with an abstract to cluster
    pub top_papers: usize,
    /// Categories with fewer qualifying papers are skipped
    pub min_abstracts: usize,
    pub clusters: usize,
    pub seed: u64,
    /// Keywords per cluster
    pub keywords: usize,
    /// Vocabulary cap for keyword extraction
    pub max_features: usize,
    pub max_kmeans_iterations: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            min_category_papers: 20,
            top_papers: 100,
            min_abstracts: 10,
            clusters: 10,
            seed: 42,
            keywords: 3,
            max_features: 100,
            max_kmeans_iterations: 300,
        }
    }
}

impl ClusterConfig {
    fn kmeans(&self) -> KMeansConfig {
        KMeansConfig {
            clusters: self.clusters,
            seed: self.seed,
            max_iterations: self.max_kmeans_iterations,
        }
    }
}

#[derive(Error, Debug)]
pub enum ClusterError {
    #[error(transparent)]
    Embed(#[from] EmbedError),

    #[error(transparent)]
    KMeans(#[from] KMeansError),
}

/// A selected paper with its cluster assignment
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterNode {
    pub id: String,
    pub title: String,
    /// PageRank within the category's citation subgraph
    pub pagerank: f64,
    pub abstract_text: String,
    pub cluster_id: usize,
    /// Keywords of the node's cluster, joined with ", "
    pub keywords: String,
}

/// Clustering output of one top-level category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryClusters {
    pub category: TopLevel,
    pub nodes: Vec<ClusterNode>,
    /// (cited, citing) id pairs among the selected papers
    pub edges: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CategoryOutcome {
    Clustered(CategoryClusters),
    TooSmall { papers: usize },
    TooFewAbstracts { qualified: usize },
}

/// Rank, embed and cluster the papers of one category.
///
/// `positions` are the category's table positions in table order.
pub fn cluster_category(
    table: &PaperTable,
    citations: &CitationView,
    category: TopLevel,
    positions: &[usize],
    embedder: &dyn Embedder,
    config: &ClusterConfig,
    pagerank_config: &PageRankConfig,
) -> Result<CategoryOutcome, ClusterError> {
    if positions.len() < config.min_category_papers {
        return Ok(CategoryOutcome::TooSmall {
            papers: positions.len(),
        });
    }

    let subgraph = citations.subgraph(table, positions);
    let ranks = pagerank(&subgraph, pagerank_config);

    let mut ranked: Vec<(usize, f64)> = positions.iter().copied().zip(ranks).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let papers = table.papers();
    let selected: Vec<(usize, f64)> = ranked
        .into_iter()
        .filter(|&(pos, _)| papers[pos].has_abstract())
        .take(config.top_papers)
        .collect();

    if selected.len() < config.min_abstracts {
        return Ok(CategoryOutcome::TooFewAbstracts {
            qualified: selected.len(),
        });
    }

    let abstracts: Vec<String> = selected
        .iter()
        .map(|&(pos, _)| papers[pos].abstract_text.clone())
        .collect();

    debug!("[{}] embedding {} abstracts with {}", category, abstracts.len(), embedder.name());
    let vectors = embedder.embed_all(&abstracts)?;
    let labels = kmeans(&vectors, &config.kmeans())?;

    let keyword_labels: Vec<String> = (0..config.clusters)
        .map(|cluster| {
            let members: Vec<&str> = labels
                .iter()
                .zip(&abstracts)
                .filter(|(&label, _)| label == cluster)
                .map(|(_, text)| text.as_str())
                .collect();
            keyword_label(&extract_keywords(&members, config.keywords, config.max_features))
        })
        .collect();

    let nodes = selected
        .iter()
        .zip(&labels)
        .map(|(&(pos, rank), &cluster_id)| {
            let paper = &papers[pos];
            ClusterNode {
                id: paper.id.clone(),
                title: paper.title.clone(),
                pagerank: rank,
                abstract_text: paper.abstract_text.clone(),
                cluster_id,
                keywords: keyword_labels[cluster_id].clone(),
            }
        })
        .collect();

    let chosen: Vec<usize> = selected.iter().map(|&(pos, _)| pos).collect();
    let edges = citations
        .edges_among(&chosen)
        .into_iter()
        .map(|(cited, citing)| (papers[cited].id.clone(), papers[citing].id.clone()))
        .collect();

    Ok(CategoryOutcome::Clustered(CategoryClusters {
        category,
        nodes,
        edges,
    }))
}

enum Tally {
    Written,
    TooSmall,
    TooFewAbstracts,
    Failed,
}

/// Cluster every top-level category in parallel and hand each result to `emit`.
///
/// A category whose embedding or clustering fails is logged and skipped; an
/// error from `emit` aborts the run.
pub fn cluster_categories<F>(
    table: &PaperTable,
    citations: &CitationView,
    embedder: &dyn Embedder,
    config: &ClusterConfig,
    pagerank_config: &PageRankConfig,
    emit: F,
) -> Result<ClusterStats>
where
    F: Fn(CategoryClusters) -> Result<()> + Sync,
{
    let start = Instant::now();
    let groups = table.by_top_level();
    let progress = create_count_progress_bar(groups.len() as u64);
    progress.set_message("Clustering categories");

    let tallies: Vec<Result<Tally>> = groups
        .par_iter()
        .map(|(category, positions)| {
            let outcome = cluster_category(
                table,
                citations,
                *category,
                positions,
                embedder,
                config,
                pagerank_config,
            );
            progress.inc(1);

            match outcome {
                Ok(CategoryOutcome::Clustered(clusters)) => {
                    debug!("[{}] {} nodes, {} edges", category, clusters.nodes.len(), clusters.edges.len());
                    emit(clusters)?;
                    Ok(Tally::Written)
                }
                Ok(CategoryOutcome::TooSmall { papers }) => {
                    debug!("[{}] skipped: only {} papers", category, papers);
                    Ok(Tally::TooSmall)
                }
                Ok(CategoryOutcome::TooFewAbstracts { qualified }) => {
                    debug!("[{}] skipped: only {} papers with abstracts", category, qualified);
                    Ok(Tally::TooFewAbstracts)
                }
                Err(e) => {
                    warn!("[{}] clustering failed: {}", category, e);
                    Ok(Tally::Failed)
                }
            }
        })
        .collect();

    progress.finish_with_message("Clustering complete");

    let mut stats = ClusterStats {
        categories_seen: groups.len(),
        ..Default::default()
    };
    for tally in tallies {
        match tally? {
            Tally::Written => stats.written += 1,
            Tally::TooSmall => stats.too_small += 1,
            Tally::TooFewAbstracts => stats.too_few_abstracts += 1,
            Tally::Failed => stats.failed += 1,
        }
    }

    info!(
        "Clustered {} of {} categories in {}",
        stats.written,
        stats.categories_seen,
        format_elapsed(start.elapsed())
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{EmbedError, Embedder, HashingEmbedder};
    use crate::ingest::Paper;
    use std::sync::Mutex;

    const TOPICS: [&str; 4] = [
        "quantum entanglement spin chains",
        "black hole thermodynamics horizons",
        "superconducting lattice phonons",
        "dark matter galaxy rotation",
    ];

    fn physics_table(count: usize) -> PaperTable {
        let papers = (0..count).map(|i| {
            let mut p = Paper::new(&format!("0704.{:04}", i + 1), 2007);
            p.title = format!("Paper {}", i);
            p.categories = vec!["hep-th".to_string()];
            p.abstract_text = format!("{} variant{} study{}", TOPICS[i % 4], i, i % 3);
            if i > 0 {
                p.citations = vec![format!("0704.{:04}", i)];
            }
            p
        });
        PaperTable::from_papers(papers)
    }

    fn run(table: &PaperTable) -> Result<CategoryOutcome, ClusterError> {
        let view = CitationView::build(table);
        let positions: Vec<usize> = (0..table.len()).collect();
        cluster_category(
            table,
            &view,
            TopLevel::Physics,
            &positions,
            &HashingEmbedder::new(64),
            &ClusterConfig::default(),
            &PageRankConfig::default(),
        )
    }

    #[test]
    fn test_nineteen_papers_produce_nothing() {
        assert_eq!(run(&physics_table(19)).unwrap(), CategoryOutcome::TooSmall { papers: 19 });
    }

    #[test]
    fn test_twenty_papers_are_clustered() {
        let table = physics_table(20);
        let CategoryOutcome::Clustered(clusters) = run(&table).unwrap() else {
            panic!("expected clusters");
        };
        assert_eq!(clusters.nodes.len(), 20);
        assert!(clusters.nodes.iter().all(|n| n.cluster_id < 10));
        assert!(clusters.nodes.iter().all(|n| !n.keywords.is_empty()));
        // Every chain link is among the selected papers
        assert_eq!(clusters.edges.len(), 19);
        // Ranks are non-increasing
        for pair in clusters.nodes.windows(2) {
            assert!(pair[0].pagerank >= pair[1].pagerank);
        }
    }

    #[test]
    fn test_clustering_is_reproducible() {
        let table = physics_table(30);
        assert_eq!(run(&table).unwrap(), run(&table).unwrap());
    }

    #[test]
    fn test_too_few_abstracts() {
        let mut papers: Vec<Paper> = physics_table(25).papers().to_vec();
        for p in papers.iter_mut().skip(9) {
            p.abstract_text.clear();
        }
        let table = PaperTable::from_papers(papers);
        assert_eq!(run(&table).unwrap(), CategoryOutcome::TooFewAbstracts { qualified: 9 });
    }

    #[test]
    fn test_cluster_categories_emits_and_counts() {
        let mut papers: Vec<Paper> = physics_table(20).papers().to_vec();
        let mut math = Paper::new("0705.0001", 2007);
        math.categories = vec!["math.CO".to_string()];
        papers.push(math);
        let table = PaperTable::from_papers(papers);
        let view = CitationView::build(&table);

        let emitted = Mutex::new(Vec::new());
        let stats = cluster_categories(
            &table,
            &view,
            &HashingEmbedder::new(32),
            &ClusterConfig::default(),
            &PageRankConfig::default(),
            |clusters| {
                emitted.lock().unwrap().push(clusters.category);
                Ok(())
            },
        )
        .unwrap();

        assert_eq!(stats.categories_seen, 2);
        assert_eq!(stats.written, 1);
        assert_eq!(stats.too_small, 1);
        assert_eq!(emitted.into_inner().unwrap(), vec![TopLevel::Physics]);
    }

    /// Fails on any text mentioning `poison`, hashes everything else
    struct FlakyEmbedder {
        inner: HashingEmbedder,
    }

    impl Embedder for FlakyEmbedder {
        fn name(&self) -> &str {
            "flaky"
        }

        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
            if text.contains("poison") {
                return Err(EmbedError::Status(503));
            }
            self.inner.embed(text)
        }
    }

    #[test]
    fn test_embedding_failure_stays_in_its_category() {
        let mut papers: Vec<Paper> = physics_table(20).papers().to_vec();
        for i in 0..20 {
            let mut p = Paper::new(&format!("0705.{:04}", i + 1), 2007);
            p.categories = vec!["math.CO".to_string()];
            p.abstract_text = format!("poison graph coloring bound {}", i);
            papers.push(p);
        }
        let table = PaperTable::from_papers(papers);
        let view = CitationView::build(&table);

        let emitted = Mutex::new(Vec::new());
        let stats = cluster_categories(
            &table,
            &view,
            &FlakyEmbedder { inner: HashingEmbedder::new(32) },
            &ClusterConfig::default(),
            &PageRankConfig::default(),
            |clusters| {
                emitted.lock().unwrap().push(clusters.category);
                Ok(())
            },
        )
        .unwrap();

        assert_eq!(stats.categories_seen, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.written, 1);
        assert_eq!(emitted.into_inner().unwrap(), vec![TopLevel::Physics]);
    }

    #[test]
    fn test_emit_error_is_fatal() {
        let table = physics_table(20);
        let view = CitationView::build(&table);
        let result = cluster_categories(
            &table,
            &view,
            &HashingEmbedder::new(32),
            &ClusterConfig::default(),
            &PageRankConfig::default(),
            |_| Err(anyhow::anyhow!("disk full")),
        );
        assert!(result.is_err());
    }
}
