use serde::{Deserialize, Serialize};

/// Top-level subject area derived from the prefix of a category code
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopLevel {
    Physics,
    Mathematics,
    ComputerScience,
    QuantitativeBiology,
    QuantitativeFinance,
    Statistics,
    ElectricalEngineering,
    Economics,
}

impl TopLevel {
    pub const ALL: [TopLevel; 8] = [
        TopLevel::Physics,
        TopLevel::Mathematics,
        TopLevel::ComputerScience,
        TopLevel::QuantitativeBiology,
        TopLevel::QuantitativeFinance,
        TopLevel::Statistics,
        TopLevel::ElectricalEngineering,
        TopLevel::Economics,
    ];

    /// Map a category code such as "hep-th" or "cs.LG" to its top-level area
    pub fn from_code(code: &str) -> Option<Self> {
        let prefix = code.split('.').next().unwrap_or("");
        match prefix {
            "astro-ph" | "cond-mat" | "gr-qc" | "hep-ex" | "hep-lat" | "hep-ph" | "hep-th"
            | "math-ph" | "nlin" | "nucl-ex" | "nucl-th" | "physics" | "quant-ph" => {
                Some(TopLevel::Physics)
            }
            "math" => Some(TopLevel::Mathematics),
            "cs" => Some(TopLevel::ComputerScience),
            "q-bio" => Some(TopLevel::QuantitativeBiology),
            "q-fin" => Some(TopLevel::QuantitativeFinance),
            "stat" => Some(TopLevel::Statistics),
            "eess" => Some(TopLevel::ElectricalEngineering),
            "econ" => Some(TopLevel::Economics),
            _ => None,
        }
    }

    /// Stable identifier used for file names and JSON keys
    pub fn slug(&self) -> &'static str {
        match self {
            TopLevel::Physics => "physics",
            TopLevel::Mathematics => "mathematics",
            TopLevel::ComputerScience => "computer_science",
            TopLevel::QuantitativeBiology => "quantitative_biology",
            TopLevel::QuantitativeFinance => "quantitative_finance",
            TopLevel::Statistics => "statistics",
            TopLevel::ElectricalEngineering => "electrical_engineering",
            TopLevel::Economics => "economics",
        }
    }

    /// Human-readable name shown on graph nodes
    pub fn display_name(&self) -> &'static str {
        match self {
            TopLevel::Physics => "Physics",
            TopLevel::Mathematics => "Mathematics",
            TopLevel::ComputerScience => "Computer Science",
            TopLevel::QuantitativeBiology => "Quantitative Biology",
            TopLevel::QuantitativeFinance => "Quantitative Finance",
            TopLevel::Statistics => "Statistics",
            TopLevel::ElectricalEngineering => "Electrical Engineering",
            TopLevel::Economics => "Economics",
        }
    }
}

impl std::fmt::Display for TopLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}

/// Display name used when no category code is recognized
pub const OTHER_CATEGORY: &str = "Other";

/// Distinct top-level areas of a list of codes, in order of first appearance
pub fn top_levels<S: AsRef<str>>(codes: &[S]) -> Vec<TopLevel> {
    let mut found = Vec::new();
    for code in codes {
        if let Some(top) = TopLevel::from_code(code.as_ref()) {
            if !found.contains(&top) {
                found.push(top);
            }
        }
    }
    found
}

/// Display category of a paper: its first recognized top-level area, or "Other"
pub fn display_category<S: AsRef<str>>(codes: &[S]) -> &'static str {
    codes
        .iter()
        .find_map(|code| TopLevel::from_code(code.as_ref()))
        .map(|top| top.display_name())
        .unwrap_or(OTHER_CATEGORY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(TopLevel::from_code("hep-th"), Some(TopLevel::Physics));
        assert_eq!(TopLevel::from_code("cond-mat.str-el"), Some(TopLevel::Physics));
        assert_eq!(TopLevel::from_code("math-ph"), Some(TopLevel::Physics));
        assert_eq!(TopLevel::from_code("math.CO"), Some(TopLevel::Mathematics));
        assert_eq!(TopLevel::from_code("cs.LG"), Some(TopLevel::ComputerScience));
        assert_eq!(TopLevel::from_code("q-bio.NC"), Some(TopLevel::QuantitativeBiology));
        assert_eq!(TopLevel::from_code("unknown.XX"), None);
    }

    #[test]
    fn test_top_levels_deduplicates_in_order() {
        let codes = ["cs.LG", "stat.ML", "cs.AI", "bogus"];
        assert_eq!(
            top_levels(&codes),
            vec![TopLevel::ComputerScience, TopLevel::Statistics]
        );
    }

    #[test]
    fn test_display_category() {
        assert_eq!(display_category(&["bogus", "math.AG"]), "Mathematics");
        assert_eq!(display_category(&["bogus"]), OTHER_CATEGORY);
        let empty: [&str; 0] = [];
        assert_eq!(display_category(&empty), OTHER_CATEGORY);
    }

    #[test]
    fn test_slug_serialization_matches_serde() {
        for top in TopLevel::ALL {
            let json = serde_json::to_string(&top).unwrap();
            assert_eq!(json, format!("\"{}\"", top.slug()));
        }
    }
}
