use anyhow::{Context, Result};
use log::{info, warn};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;
use uuid::Uuid;

use crate::artifact::{read_graph_document, sample_document};
use crate::cli::SampleArgs;
use crate::common::{format_elapsed, setup_logging, GraphStats};

/// Write beside `output` and rename into place. A failed write keeps the old
/// file and leaves no temporary file behind.
fn write_atomically<F>(output: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let temp = output.with_extension(format!("tmp-{}", &Uuid::new_v4().to_string()[..8]));

    let result = (|| {
        let file = File::create(&temp)
            .with_context(|| format!("Failed to create output file: {}", temp.display()))?;
        let mut writer = BufWriter::new(file);
        write(&mut writer)?;
        writer.flush()?;
        drop(writer);
        fs::rename(&temp, output)
            .with_context(|| format!("Failed to move {} to {}", temp.display(), output.display()))
    })();

    if result.is_err() && temp.exists() {
        if let Err(e) = fs::remove_file(&temp) {
            warn!("Failed to remove {}: {}", temp.display(), e);
        }
    }
    result
}

/// Run the sample command with the given arguments
pub fn run_sample(args: SampleArgs) -> Result<GraphStats> {
    let start_time = Instant::now();

    setup_logging(&args.log_level)?;

    info!("Sampling top {} nodes by PageRank", args.top);
    info!("Input: {}", args.input);
    info!("Output: {}", args.output);

    let doc = read_graph_document(Path::new(&args.input))?;
    let sample = sample_document(&doc, args.top);

    write_atomically(Path::new(&args.output), |writer| {
        serde_json::to_writer(writer, &sample).context("Failed to serialize sample")
    })?;

    let stats = GraphStats {
        nodes: sample.nodes.len(),
        edges: sample.links.len(),
    };

    info!("==================== FINAL SUMMARY ====================");
    info!("Total execution time: {}", format_elapsed(start_time.elapsed()));
    info!("Input nodes: {}", doc.nodes.len());
    info!("Input links: {}", doc.links.len());
    info!("Sampled nodes: {}", stats.nodes);
    info!("Sampled links: {}", stats.edges);
    info!("Output file: {}", args.output);
    info!("========================================================");

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_write_atomically_replaces_target() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("sample.json");
        fs::write(&output, "old").unwrap();

        write_atomically(&output, |w| Ok(w.write_all(b"new")?)).unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), "new");
        assert_eq!(entries(dir.path()), vec!["sample.json"]);
    }

    #[test]
    fn test_failed_write_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("sample.json");
        fs::write(&output, "old").unwrap();

        let result = write_atomically(&output, |_| Err(anyhow::anyhow!("serialization failed")));
        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&output).unwrap(), "old");
        assert_eq!(entries(dir.path()), vec!["sample.json"]);

        // Renaming onto a directory fails after the temp file is complete
        let taken = dir.path().join("taken");
        fs::create_dir(&taken).unwrap();
        assert!(write_atomically(&taken, |w| Ok(w.write_all(b"x")?)).is_err());
        assert_eq!(entries(dir.path()), vec!["sample.json", "taken"]);
    }
}
