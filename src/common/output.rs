use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Replace characters that cannot appear in a single path component
pub fn sanitize_component(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        "_".to_string()
    } else {
        cleaned
    }
}

/// Sanitize each name into a path component, suffixing `_2`, `_3`, ... when
/// two names would share a component
pub fn unique_components<'a, I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut used: HashSet<String> = HashSet::new();
    let mut components = Vec::new();

    for name in names {
        let base = sanitize_component(name);
        let mut candidate = base.clone();
        let mut suffix = 2;
        while !used.insert(candidate.clone()) {
            candidate = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        if candidate != base {
            warn!("Output directory for '{}' renamed to '{}' to avoid a collision", name, candidate);
        }
        components.push(candidate);
    }

    components
}

/// Output directory whose files are written to a private staging directory
/// and only moved into place on [`StagedOutput::commit`].
///
/// Dropping an uncommitted `StagedOutput` removes the staging directory, so a
/// failed run never touches artifacts from a previous run.
pub struct StagedOutput {
    root: PathBuf,
    staging: PathBuf,
    files: Vec<PathBuf>,
    committed: bool,
}

impl StagedOutput {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let run_id = &Uuid::new_v4().to_string()[..8];
        let staging = root.join(format!(".staging-{}", run_id));

        fs::create_dir_all(&staging)
            .with_context(|| format!("Failed to create staging directory: {}", staging.display()))?;
        debug!("Staging artifacts in {}", staging.display());

        Ok(Self {
            root,
            staging,
            files: Vec::new(),
            committed: false,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reserve a staged file for `relative` and return the path to write to
    pub fn staged_path<P: AsRef<Path>>(&mut self, relative: P) -> Result<PathBuf> {
        let relative = relative.as_ref().to_path_buf();
        let path = self.staging.join(&relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        if !self.files.contains(&relative) {
            self.files.push(relative);
        }
        Ok(path)
    }

    /// Number of files staged so far
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Move every staged file to its final location and return the final paths
    pub fn commit(mut self) -> Result<Vec<PathBuf>> {
        let mut committed = Vec::with_capacity(self.files.len());

        for relative in &self.files {
            let from = self.staging.join(relative);
            let to = self.root.join(relative);
            if let Some(parent) = to.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            fs::rename(&from, &to).with_context(|| {
                format!("Failed to move {} to {}", from.display(), to.display())
            })?;
            committed.push(to);
        }

        self.committed = true;
        fs::remove_dir_all(&self.staging)
            .with_context(|| format!("Failed to remove staging directory: {}", self.staging.display()))?;

        info!("Committed {} artifacts to {}", committed.len(), self.root.display());
        Ok(committed)
    }
}

impl Drop for StagedOutput {
    fn drop(&mut self) {
        if !self.committed && self.staging.exists() {
            if let Err(e) = fs::remove_dir_all(&self.staging) {
                warn!("Failed to clean up staging directory {}: {}", self.staging.display(), e);
            }
        }
    }
}
