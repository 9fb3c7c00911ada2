use super::patterns::{AUTHOR_SEPARATOR, WHITESPACE_RUN};

/// Substrings marking an author token as an affiliation or a place rather than a person
pub const INVALID_AUTHOR_KEYWORDS: &[&str] = &[
    "University", "Institute", "Laboratory", "Dept", "Department",
    "Collaboration", "College", "Group", "Center", "School",
    "Russia", "Germany", "France", "China", "Japan", "USA",
    "Poland", "Italy", "Turkey", "Argentina", "Korea", "India",
    "UK", "Netherlands", "Mexico",
];

/// Minimum length, in characters, of a plausible author name
pub const MIN_AUTHOR_CHARS: usize = 3;

/// Prefix that turns an author name into a graph node id
pub const AUTHOR_ID_PREFIX: &str = "author:";

/// Graph node id for an author name
pub fn author_id(name: &str) -> String {
    format!("{}{}", AUTHOR_ID_PREFIX, name)
}

/// Collapse internal whitespace runs and trim
pub fn normalize_name(name: &str) -> String {
    WHITESPACE_RUN.replace_all(name.trim(), " ").into_owned()
}

/// An author token is kept only if it is long enough and names no institution or country
pub fn is_valid_author(name: &str) -> bool {
    name.chars().count() >= MIN_AUTHOR_CHARS
        && !INVALID_AUTHOR_KEYWORDS.iter().any(|kw| name.contains(kw))
}

/// Split a raw author string ("A. Smith, B. Jones and C. Lee") into name candidates
pub fn split_author_string(raw: &str) -> Vec<String> {
    let flattened = raw.replace(['\n', '\r'], " ");
    AUTHOR_SEPARATOR
        .split(&flattened)
        .map(normalize_name)
        .filter(|name| !name.is_empty())
        .collect()
}

/// Build names from `[last, first, suffix]` parts as "last first"
pub fn names_from_parsed(parsed: &[Vec<String>]) -> Vec<String> {
    parsed
        .iter()
        .filter(|parts| parts.len() >= 2)
        .map(|parts| normalize_name(&parts[..2].join(" ")))
        .filter(|name| !name.is_empty())
        .collect()
}

/// Keep valid names, drop duplicates (first occurrence wins).
/// Returns the kept names and the number of rejected tokens.
pub fn clean_authors<I>(candidates: I) -> (Vec<String>, usize)
where
    I: IntoIterator<Item = String>,
{
    let mut kept: Vec<String> = Vec::new();
    let mut rejected = 0;

    for name in candidates {
        if !is_valid_author(&name) {
            rejected += 1;
            continue;
        }
        if !kept.contains(&name) {
            kept.push(name);
        }
    }

    (kept, rejected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_author_string() {
        assert_eq!(
            split_author_string("A. Smith, B. Jones and C. Lee"),
            vec!["A. Smith", "B. Jones", "C. Lee"]
        );
    }

    #[test]
    fn test_split_handles_newlines_and_spacing() {
        assert_eq!(
            split_author_string("Jane   Doe,\n  John\nRoe"),
            vec!["Jane Doe", "John Roe"]
        );
    }

    #[test]
    fn test_split_does_not_break_names_containing_and() {
        assert_eq!(
            split_author_string("Alexander Anand, Sandra Andersen"),
            vec!["Alexander Anand", "Sandra Andersen"]
        );
    }

    #[test]
    fn test_is_valid_author() {
        assert!(is_valid_author("Jane Doe"));
        assert!(is_valid_author("Wu Li"));
        assert!(!is_valid_author("Li"));
        assert!(!is_valid_author("Stanford University"));
        assert!(!is_valid_author("Moscow, Russia"));
        assert!(!is_valid_author("ATLAS Collaboration"));
    }

    #[test]
    fn test_names_from_parsed() {
        let parsed = vec![
            vec!["Smith".to_string(), "John".to_string(), "".to_string()],
            vec!["Solo".to_string()],
            vec!["Doe".to_string(), "J.".to_string(), "Jr".to_string()],
        ];
        assert_eq!(names_from_parsed(&parsed), vec!["Smith John", "Doe J."]);
    }

    #[test]
    fn test_clean_authors_dedupes_and_counts_rejections() {
        let (kept, rejected) = clean_authors(vec![
            "Jane Doe".to_string(),
            "Li".to_string(),
            "Jane Doe".to_string(),
            "Oxford University".to_string(),
            "John Roe".to_string(),
        ]);
        assert_eq!(kept, vec!["Jane Doe", "John Roe"]);
        assert_eq!(rejected, 2);
    }

    #[test]
    fn test_author_id() {
        assert_eq!(author_id("Jane Doe"), "author:Jane Doe");
    }
}
