use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use crossbeam_channel::{bounded, Sender};
use log::debug;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::thread;

use crate::cluster::CategoryClusters;
use crate::common::{round6, StagedOutput};
use crate::subfield::FieldGraph;

/// On-disk format of per-field and per-category tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TableFormat {
    #[default]
    Csv,
    Parquet,
}

impl TableFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Parquet => "parquet",
        }
    }
}

/// Write a DataFrame to `path` in the given format
pub fn write_table(df: &mut DataFrame, path: &Path, format: TableFormat) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create table file: {}", path.display()))?;

    match format {
        TableFormat::Csv => {
            CsvWriter::new(file)
                .include_header(true)
                .finish(df)
                .with_context(|| format!("Failed to write CSV: {}", path.display()))?;
        }
        TableFormat::Parquet => {
            ParquetWriter::new(file)
                .with_compression(ParquetCompression::Zstd(None))
                .finish(df)
                .with_context(|| format!("Failed to write parquet: {}", path.display()))?;
        }
    }
    Ok(())
}

/// A `nodes`/`edges` table pair destined for one output directory
pub struct TablePair {
    /// Directory relative to the output root
    pub dir: PathBuf,
    pub nodes: DataFrame,
    pub edges: DataFrame,
}

impl TablePair {
    fn write(mut self, out: &mut StagedOutput, format: TableFormat) -> Result<()> {
        let ext = format.extension();
        let nodes_path = out.staged_path(self.dir.join(format!("nodes.{}", ext)))?;
        write_table(&mut self.nodes, &nodes_path, format)?;
        let edges_path = out.staged_path(self.dir.join(format!("edges.{}", ext)))?;
        write_table(&mut self.edges, &edges_path, format)?;
        debug!(
            "Wrote {} ({} nodes, {} edges)",
            self.dir.display(),
            self.nodes.height(),
            self.edges.height()
        );
        Ok(())
    }
}

fn to_u64(values: impl Iterator<Item = usize>) -> Vec<u64> {
    values.map(|v| v as u64).collect()
}

/// Node and edge tables of one field's subfield graph
pub fn field_tables(graph: &FieldGraph, dir: PathBuf) -> Result<TablePair> {
    let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
    let paper_counts = to_u64(graph.nodes.iter().map(|n| n.paper_count));
    let ranks: Vec<f64> = graph.nodes.iter().map(|n| round6(n.pagerank)).collect();

    let nodes = DataFrame::new(vec![
        Column::new("id".into(), ids),
        Column::new("paper_count".into(), paper_counts),
        Column::new("pagerank".into(), ranks),
    ])
    .map_err(|e| anyhow!("Failed to create nodes DataFrame: {}", e))?;

    let sources: Vec<&str> = graph.edges.iter().map(|e| e.source.as_str()).collect();
    let targets: Vec<&str> = graph.edges.iter().map(|e| e.target.as_str()).collect();
    let weights: Vec<f64> = graph.edges.iter().map(|e| round6(e.weight)).collect();
    let raw_counts = to_u64(graph.edges.iter().map(|e| e.raw_count));

    let edges = DataFrame::new(vec![
        Column::new("source".into(), sources),
        Column::new("target".into(), targets),
        Column::new("weight".into(), weights),
        Column::new("raw_count".into(), raw_counts),
    ])
    .map_err(|e| anyhow!("Failed to create edges DataFrame: {}", e))?;

    Ok(TablePair { dir, nodes, edges })
}

/// Node and edge tables of one category's semantic clusters
pub fn cluster_tables(clusters: &CategoryClusters, dir: PathBuf) -> Result<TablePair> {
    let nodes = &clusters.nodes;
    let ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let titles: Vec<&str> = nodes.iter().map(|n| n.title.as_str()).collect();
    let ranks: Vec<f64> = nodes.iter().map(|n| round6(n.pagerank)).collect();
    let abstracts: Vec<&str> = nodes.iter().map(|n| n.abstract_text.as_str()).collect();
    let cluster_ids = to_u64(nodes.iter().map(|n| n.cluster_id));
    let keywords: Vec<&str> = nodes.iter().map(|n| n.keywords.as_str()).collect();

    let nodes = DataFrame::new(vec![
        Column::new("id".into(), ids),
        Column::new("title".into(), titles),
        Column::new("pagerank".into(), ranks),
        Column::new("abstract".into(), abstracts),
        Column::new("cluster_id".into(), cluster_ids),
        Column::new("keywords".into(), keywords),
    ])
    .map_err(|e| anyhow!("Failed to create nodes DataFrame: {}", e))?;

    let sources: Vec<&str> = clusters.edges.iter().map(|(s, _)| s.as_str()).collect();
    let targets: Vec<&str> = clusters.edges.iter().map(|(_, t)| t.as_str()).collect();
    let edges = DataFrame::new(vec![
        Column::new("source".into(), sources),
        Column::new("target".into(), targets),
    ])
    .map_err(|e| anyhow!("Failed to create edges DataFrame: {}", e))?;

    Ok(TablePair { dir, nodes, edges })
}

/// Run `produce` while a writer thread stores every table pair it sends.
///
/// Returns the producer's value and the number of pairs written. A writer
/// error takes precedence over the producer's result.
pub fn write_partitioned<R, F>(
    out: &mut StagedOutput,
    format: TableFormat,
    capacity: usize,
    produce: F,
) -> Result<(R, usize)>
where
    F: FnOnce(&Sender<TablePair>) -> Result<R>,
{
    let (sender, receiver) = bounded::<TablePair>(capacity.max(1));

    thread::scope(|scope| {
        let writer = scope.spawn(move || -> Result<usize> {
            let mut written = 0;
            for pair in receiver {
                pair.write(out, format)?;
                written += 1;
            }
            Ok(written)
        });

        let produced = produce(&sender);
        drop(sender);

        let written = writer
            .join()
            .map_err(|_| anyhow!("Table writer thread panicked"))??;
        Ok((produced?, written))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subfield::{SubfieldEdge, SubfieldNode};
    use tempfile::tempdir;

    fn field_graph() -> FieldGraph {
        FieldGraph {
            field: "Physics".to_string(),
            nodes: vec![SubfieldNode {
                id: "High Energy".to_string(),
                paper_count: 3,
                pagerank: 0.123456789,
            }],
            edges: vec![SubfieldEdge {
                source: "High Energy".to_string(),
                target: "High Energy".to_string(),
                weight: 1.0 / 3.0,
                raw_count: 3,
            }],
        }
    }

    #[test]
    fn test_field_tables_round_floats() {
        let pair = field_tables(&field_graph(), PathBuf::from("graphdata/Physics")).unwrap();
        assert_eq!(pair.nodes.height(), 1);
        let ranks = pair.nodes.column("pagerank").unwrap().f64().unwrap().get(0);
        assert_eq!(ranks, Some(0.123457));
        assert_eq!(pair.edges.width(), 4);
    }

    #[test]
    fn test_write_partitioned_csv() {
        let dir = tempdir().unwrap();
        let mut out = StagedOutput::new(dir.path()).unwrap();

        let (produced, written) = write_partitioned(&mut out, TableFormat::Csv, 4, |sender| {
            let pair = field_tables(&field_graph(), PathBuf::from("graphdata/Physics"))?;
            sender.send(pair).map_err(|e| anyhow!("{}", e))?;
            Ok("done")
        })
        .unwrap();
        assert_eq!((produced, written), ("done", 1));

        out.commit().unwrap();
        let nodes = std::fs::read_to_string(dir.path().join("graphdata/Physics/nodes.csv")).unwrap();
        assert!(nodes.starts_with("id,paper_count,pagerank"));
        assert!(nodes.contains("High Energy,3,0.123457"));
        assert!(dir.path().join("graphdata/Physics/edges.csv").exists());
    }

    #[test]
    fn test_write_partitioned_propagates_producer_error() {
        let dir = tempdir().unwrap();
        let mut out = StagedOutput::new(dir.path()).unwrap();
        let result: Result<((), usize)> =
            write_partitioned(&mut out, TableFormat::Parquet, 1, |_| Err(anyhow!("boom")));
        assert!(result.is_err());
    }
}
