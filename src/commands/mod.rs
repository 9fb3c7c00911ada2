pub mod author_paper;
pub mod categories;
pub mod citation;
pub mod clusters;
pub mod coauthor;
pub mod pipeline;
pub mod sample;
pub mod subfields;

pub use author_paper::{run_author_paper, write_author_paper_graphs};
pub use categories::{run_categories, write_categories};
pub use citation::{annotate_citations, run_citation, write_citation_graph};
pub use clusters::{run_clusters, write_semantic_clusters};
pub use coauthor::{run_coauthor, write_coauthor_graph};
pub use pipeline::{run_pipeline, PipelineStats};
pub use sample::run_sample;
pub use subfields::{run_subfields, write_subfield_graphs};
