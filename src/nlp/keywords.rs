//! RAKE-style keyphrase extraction.

use std::collections::HashMap;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

/// Ranked keyphrase extractor.
pub trait KeywordExtractor: Send + Sync {
    /// Phrases with scores, highest score first.
    fn find_keywords(&self, text: &str) -> Vec<(String, f64)>;
}

const STOP_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been",
    "before", "being", "but", "by", "can", "did", "do", "does", "during", "for", "from", "had",
    "has", "have", "he", "her", "him", "his", "i", "if", "in", "into", "is", "it", "its", "may",
    "mg", "more", "no", "not", "of", "on", "or", "other", "over", "patient", "per", "pt", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "under", "up", "was", "we", "were", "which", "while", "who", "will",
    "with", "without", "would", "you",
];

static PHRASE_DELIMITER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.,;:!?()\[\]{}\n\r\t/]+").expect("valid regex"));
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z][A-Za-z0-9\-']*").expect("valid regex"));

/// Rapid automatic keyword extraction over stop-word delimited candidates.
#[derive(Debug, Clone)]
pub struct RakeExtractor {
    /// Maximum number of phrases returned.
    pub top_n: usize,
    /// Candidates longer than this many words are discarded.
    pub max_words: usize,
}

impl Default for RakeExtractor {
    fn default() -> Self {
        Self {
            top_n: 10,
            max_words: 3,
        }
    }
}

impl RakeExtractor {
    fn candidates(&self, text: &str) -> Vec<Vec<String>> {
        let mut phrases = Vec::new();
        for chunk in PHRASE_DELIMITER.split(text) {
            let mut current: Vec<String> = Vec::new();
            for m in WORD.find_iter(chunk) {
                let word = m.as_str().to_lowercase();
                if STOP_WORDS.contains(&word.as_str()) {
                    if !current.is_empty() {
                        phrases.push(std::mem::take(&mut current));
                    }
                } else {
                    current.push(word);
                }
            }
            if !current.is_empty() {
                phrases.push(current);
            }
        }
        phrases.retain(|p| p.len() <= self.max_words);
        phrases
    }
}

impl KeywordExtractor for RakeExtractor {
    fn find_keywords(&self, text: &str) -> Vec<(String, f64)> {
        let phrases = self.candidates(text);
        let mut frequency: HashMap<&str, f64> = HashMap::new();
        let mut degree: HashMap<&str, f64> = HashMap::new();
        for phrase in &phrases {
            let co_degree = (phrase.len() - 1) as f64;
            for word in phrase {
                *frequency.entry(word).or_default() += 1.0;
                *degree.entry(word).or_default() += co_degree;
            }
        }

        let mut scored: IndexMap<String, f64> = IndexMap::new();
        for phrase in &phrases {
            let score = phrase
                .iter()
                .map(|w| {
                    let freq = frequency[w.as_str()];
                    (degree[w.as_str()] + freq) / freq
                })
                .sum::<f64>();
            scored.entry(phrase.join(" ")).or_insert(score);
        }

        let mut ranked: Vec<(String, f64)> = scored.into_iter().collect();
        // Stable sort keeps first-appearance order among equal scores.
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(self.top_n);
        ranked
    }
}
