use anyhow::{Context, Result};
use log::{debug, info};
use std::collections::HashMap;
use std::path::Path;

use crate::ingest::reader::{read_csv_strings, required_str_column};

/// Category code → (field, subfield) mapping
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    entries: HashMap<String, (String, String)>,
}

impl Taxonomy {
    /// Build from (code, field, subfield) triples. Blank values are skipped and
    /// the first mapping of a code wins.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, S, S)>,
        S: AsRef<str>,
    {
        let mut map = HashMap::new();
        for (code, field, subfield) in entries {
            let (code, field, subfield) = (code.as_ref().trim(), field.as_ref().trim(), subfield.as_ref().trim());
            if code.is_empty() || field.is_empty() || subfield.is_empty() {
                continue;
            }
            if map.contains_key(code) {
                debug!("Duplicate taxonomy entry for '{}' ignored", code);
                continue;
            }
            map.insert(code.to_string(), (field.to_string(), subfield.to_string()));
        }
        Self { entries: map }
    }

    /// Load a CSV with `category`, `field` and `subfield` columns
    pub fn load(path: &Path) -> Result<Self> {
        let df = read_csv_strings(path)
            .with_context(|| format!("Failed to read taxonomy: {}", path.display()))?;
        let codes = required_str_column(&df, "category")?;
        let fields = required_str_column(&df, "field")?;
        let subfields = required_str_column(&df, "subfield")?;

        let rows = (0..df.height()).filter_map(|row| {
            Some((codes.get(row)?, fields.get(row)?, subfields.get(row)?))
        });
        let taxonomy = Self::from_entries(rows);

        info!("Loaded {} taxonomy entries from {}", taxonomy.len(), path.display());
        Ok(taxonomy)
    }

    pub fn lookup(&self, code: &str) -> Option<(&str, &str)> {
        self.entries
            .get(code)
            .map(|(field, subfield)| (field.as_str(), subfield.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_from_entries_first_mapping_wins() {
        let taxonomy = Taxonomy::from_entries(vec![
            ("cs.LG", "Computer Science", "Machine Learning"),
            ("cs.LG", "Other", "Other"),
            ("", "Physics", "Nothing"),
        ]);
        assert_eq!(taxonomy.len(), 1);
        assert_eq!(taxonomy.lookup("cs.LG"), Some(("Computer Science", "Machine Learning")));
        assert_eq!(taxonomy.lookup("cs.AI"), None);
    }

    #[test]
    fn test_load_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("taxonomy.csv");
        std::fs::write(
            &path,
            "category,field,subfield\nhep-th,Physics,High Energy\nmath.CO,Mathematics,Combinatorics\n",
        )
        .unwrap();

        let taxonomy = Taxonomy::load(&path).unwrap();
        assert_eq!(taxonomy.len(), 2);
        assert_eq!(taxonomy.lookup("math.CO"), Some(("Mathematics", "Combinatorics")));
    }

    #[test]
    fn test_load_requires_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("taxonomy.csv");
        std::fs::write(&path, "code,field\nhep-th,Physics\n").unwrap();
        assert!(Taxonomy::load(&path).is_err());
    }
}
