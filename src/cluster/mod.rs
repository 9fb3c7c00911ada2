pub mod embed;
pub mod keywords;
pub mod kmeans;
pub mod semantic;

pub use embed::{EmbedError, Embedder, HashingEmbedder, HttpEmbedder, EMBEDDING_API_KEY_ENV};
pub use keywords::{extract_keywords, is_stop_word, keyword_label};
pub use kmeans::{kmeans, KMeansConfig, KMeansError};
pub use semantic::{
    cluster_categories, cluster_category, CategoryClusters, CategoryOutcome, ClusterConfig,
    ClusterError, ClusterNode,
};
