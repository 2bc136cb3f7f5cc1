//! Interest-based elective ranking.
//!
//! Candidate descriptions and the student's stated interest are embedded as
//! TF-IDF vectors over a shared vocabulary, then candidates are ranked by
//! cosine similarity to the interest vector. Everything is deterministic:
//! the vocabulary is an ordered map and ties keep catalog order.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::catalog::UnitCode;

/// How many electives a recommendation query returns by default.
pub const DEFAULT_RECOMMENDATIONS: usize = 5;

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[a-z0-9]+").unwrap_or_else(|_| unreachable!()))
}

// Common English function words carry no topical signal.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "cannot", "could", "did", "do", "does", "doing", "down", "during", "each",
    "few", "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "him", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just", "more",
    "most", "my", "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other",
    "our", "out", "over", "own", "same", "she", "should", "so", "some", "such", "than", "that",
    "the", "their", "theirs", "them", "then", "there", "these", "they", "this", "those",
    "through", "to", "too", "under", "until", "up", "very", "was", "we", "were", "what", "when",
    "where", "which", "while", "who", "whom", "why", "will", "with", "would", "you", "your",
    "yours",
];

fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.binary_search(&token).is_ok()
}

fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    token_pattern()
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .filter(|t| !is_stop_word(t))
        .collect()
}

/// Rank `candidates` by similarity between their descriptions and the
/// student's interest, best first. Ties keep catalog order; an empty pool
/// ranks to an empty list.
pub fn rank_by_interest(
    candidates: &[(UnitCode, String)],
    interest: &str,
    limit: usize,
) -> Vec<UnitCode> {
    if candidates.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut documents: Vec<Vec<String>> = candidates
        .iter()
        .map(|(_, description)| tokenize(description))
        .collect();
    documents.push(tokenize(interest));

    // Ordered vocabulary keeps vector layout deterministic: terms are
    // indexed in sorted order, so equal corpora produce equal vectors.
    let mut vocabulary: BTreeMap<&str, usize> = BTreeMap::new();
    for doc in &documents {
        for token in doc {
            vocabulary.entry(token.as_str()).or_insert(0);
        }
    }
    for (index, (_, slot)) in vocabulary.iter_mut().enumerate() {
        *slot = index;
    }

    let n_docs = documents.len();
    let mut document_frequency = vec![0usize; vocabulary.len()];
    for doc in &documents {
        let mut seen = vec![false; vocabulary.len()];
        for token in doc {
            if let Some(&i) = vocabulary.get(token.as_str()) {
                if !seen[i] {
                    seen[i] = true;
                    document_frequency[i] += 1;
                }
            }
        }
    }

    // Smoothed inverse document frequency.
    let idf: Vec<f64> = document_frequency
        .iter()
        .map(|&df| ((1.0 + n_docs as f64) / (1.0 + df as f64)).ln() + 1.0)
        .collect();

    let vectors: Vec<Vec<f64>> = documents
        .iter()
        .map(|doc| {
            let mut vector = vec![0.0; vocabulary.len()];
            for token in doc {
                if let Some(&i) = vocabulary.get(token.as_str()) {
                    vector[i] += idf[i];
                }
            }
            let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                for v in &mut vector {
                    *v /= norm;
                }
            }
            vector
        })
        .collect();

    let interest_vector = &vectors[n_docs - 1];
    let mut scored: Vec<(usize, f64)> = vectors[..n_docs - 1]
        .iter()
        .enumerate()
        .map(|(i, vector)| {
            let similarity = vector
                .iter()
                .zip(interest_vector)
                .map(|(a, b)| a * b)
                .sum::<f64>();
            (i, similarity)
        })
        .collect();

    // Stable sort: equal similarities stay in catalog order.
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    scored
        .into_iter()
        .take(limit)
        .map(|(i, _)| candidates[i].0.clone())
        .collect()
}
