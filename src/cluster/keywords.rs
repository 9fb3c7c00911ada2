//! TF-IDF keyword extraction over a small document set.

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;

use crate::ingest::patterns::tokenize;

/// Common English function words excluded from keywords and hashed embeddings
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst", "an",
    "and", "another", "any", "anyhow", "anyone", "anything", "anyway", "anywhere", "are",
    "around", "as", "at", "back", "be", "became", "because", "become", "becomes", "becoming",
    "been", "before", "beforehand", "behind", "being", "below", "beside", "besides", "between",
    "beyond", "both", "but", "by", "can", "cannot", "could", "do", "done", "down", "due",
    "during", "each", "eg", "either", "else", "elsewhere", "enough", "etc", "even", "ever",
    "every", "everyone", "everything", "everywhere", "except", "few", "for", "former",
    "formerly", "from", "further", "had", "has", "have", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hers", "herself", "him", "himself", "his", "how",
    "however", "ie", "if", "in", "indeed", "into", "is", "it", "its", "itself", "last",
    "latter", "least", "less", "many", "may", "me", "meanwhile", "might", "more", "moreover",
    "most", "mostly", "much", "must", "my", "myself", "namely", "neither", "never",
    "nevertheless", "next", "no", "nobody", "none", "nor", "not", "nothing", "now", "nowhere",
    "of", "off", "often", "on", "once", "one", "only", "onto", "or", "other", "others",
    "otherwise", "our", "ours", "ourselves", "out", "over", "own", "per", "perhaps", "please",
    "rather", "re", "same", "see", "seem", "seemed", "seeming", "seems", "several", "she",
    "should", "since", "so", "some", "somehow", "someone", "something", "sometime",
    "sometimes", "somewhere", "still", "such", "than", "that", "the", "their", "them",
    "themselves", "then", "thence", "there", "thereafter", "thereby", "therefore", "therein",
    "thereupon", "these", "they", "this", "those", "though", "through", "throughout", "thru",
    "thus", "to", "together", "too", "toward", "towards", "under", "until", "up", "upon", "us",
    "very", "via", "was", "we", "well", "were", "what", "whatever", "when", "whence",
    "whenever", "where", "whereafter", "whereas", "whereby", "wherein", "whereupon",
    "wherever", "whether", "which", "while", "whither", "who", "whoever", "whole", "whom",
    "whose", "why", "will", "with", "within", "without", "would", "yet", "you", "your",
    "yours", "yourself", "yourselves",
];

lazy_static! {
    static ref STOP_WORDS: HashSet<&'static str> = ENGLISH_STOP_WORDS.iter().copied().collect();
}

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(token)
}

fn content_tokens(text: &str) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter(|t| !is_stop_word(t))
        .collect()
}

/// Rank the terms of `texts` by summed TF-IDF and return the `top_k` best.
///
/// The vocabulary is limited to the `max_features` terms with the highest
/// corpus frequency. IDF is smoothed (`ln((1 + n) / (1 + df)) + 1`) and each
/// document row is L2-normalized before scores are summed. Ties break on the
/// term itself so the result is stable.
pub fn extract_keywords<S: AsRef<str>>(texts: &[S], top_k: usize, max_features: usize) -> Vec<String> {
    let docs: Vec<Vec<String>> = texts.iter().map(|t| content_tokens(t.as_ref())).collect();
    if docs.is_empty() || top_k == 0 {
        return Vec::new();
    }

    let mut corpus_freq: HashMap<&str, usize> = HashMap::new();
    let mut doc_freq: HashMap<&str, usize> = HashMap::new();
    for doc in &docs {
        let mut seen: HashSet<&str> = HashSet::new();
        for token in doc {
            *corpus_freq.entry(token.as_str()).or_insert(0) += 1;
            if seen.insert(token.as_str()) {
                *doc_freq.entry(token.as_str()).or_insert(0) += 1;
            }
        }
    }

    let mut vocabulary: Vec<(&str, usize)> = corpus_freq.into_iter().collect();
    vocabulary.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    vocabulary.truncate(max_features);
    let vocabulary: HashSet<&str> = vocabulary.into_iter().map(|(term, _)| term).collect();

    let n = docs.len() as f64;
    let idf = |term: &str| {
        let df = doc_freq.get(term).copied().unwrap_or(0) as f64;
        ((1.0 + n) / (1.0 + df)).ln() + 1.0
    };

    let mut totals: HashMap<&str, f64> = HashMap::new();
    for doc in &docs {
        let mut tf: HashMap<&str, f64> = HashMap::new();
        for token in doc {
            if vocabulary.contains(token.as_str()) {
                *tf.entry(token.as_str()).or_insert(0.0) += 1.0;
            }
        }

        let row: Vec<(&str, f64)> = tf.into_iter().map(|(term, count)| (term, count * idf(term))).collect();
        let norm = row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm == 0.0 {
            continue;
        }
        for (term, value) in row {
            *totals.entry(term).or_insert(0.0) += value / norm;
        }
    }

    let mut ranked: Vec<(&str, f64)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(top_k)
        .map(|(term, _)| term.to_string())
        .collect()
}

/// Keyword label stored on cluster nodes
pub fn keyword_label(keywords: &[String]) -> String {
    keywords.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_words() {
        assert!(is_stop_word("the"));
        assert!(is_stop_word("whereas"));
        assert!(!is_stop_word("graph"));
    }

    #[test]
    fn test_frequent_distinctive_terms_rank_first() {
        let texts = [
            "Quantum entanglement in spin chains",
            "Entanglement entropy of quantum spin systems",
            "Spin chains and quantum entanglement dynamics",
        ];
        let keywords = extract_keywords(&texts, 3, 100);
        assert_eq!(keywords.len(), 3);
        for expected in ["entanglement", "quantum", "spin"] {
            assert!(keywords.iter().any(|k| k == expected), "missing {}", expected);
        }
    }

    #[test]
    fn test_ties_break_alphabetically() {
        let keywords = extract_keywords(&["zeta alpha mu"], 3, 100);
        assert_eq!(keywords, vec!["alpha", "mu", "zeta"]);
    }

    #[test]
    fn test_max_features_limits_vocabulary() {
        let keywords = extract_keywords(&["lattice lattice gauge", "lattice boson"], 5, 1);
        assert_eq!(keywords, vec!["lattice"]);
    }

    #[test]
    fn test_empty_input() {
        let empty: [&str; 0] = [];
        assert!(extract_keywords(&empty, 3, 100).is_empty());
        assert!(extract_keywords(&["the of and"], 3, 100).is_empty());
        assert_eq!(keyword_label(&["a".to_string(), "b".to_string()]), "a, b");
    }
}
