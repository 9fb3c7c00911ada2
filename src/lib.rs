//! Graph views and analytics over arXiv paper metadata.
//!
//! Papers are ingested once into a [`ingest::PaperTable`], from which the
//! co-author, citation and author–paper views are built. The centrality engine,
//! subfield aggregator and semantic clusterer read those views, and the
//! artifact writer stages their output for an atomic commit.

pub mod artifact;
pub mod centrality;
pub mod cli;
pub mod cluster;
pub mod commands;
pub mod common;
pub mod graph;
pub mod ingest;
pub mod subfield;
