//! Focus sets: the union of keyphrases and clinical entity mentions for one note.

use indexmap::IndexMap;
use serde::Serialize;

use super::{keywords::KeywordExtractor, ner::Ner, ner::Span, tokens};

/// Keyphrases and entities extracted from one note.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FocusSet {
    pub keywords: Vec<(String, f64)>,
    pub entities: Vec<Span>,
}

impl FocusSet {
    /// Run both extractors over `text`.
    pub fn extract(text: &str, keywords: &dyn KeywordExtractor, ner: &dyn Ner) -> Self {
        Self {
            keywords: keywords.find_keywords(text),
            entities: ner.extract(text),
        }
    }

    /// Deduplicated union, keyphrases first, compared case-insensitively.
    pub fn phrases(&self) -> Vec<(String, f64)> {
        let mut union: IndexMap<String, (String, f64)> = IndexMap::new();
        let entities = self.entities.iter().map(|s| (s.text.clone(), s.score));
        for (phrase, score) in self.keywords.iter().cloned().chain(entities) {
            union
                .entry(phrase.to_lowercase())
                .or_insert((phrase, score));
        }
        union.into_values().collect()
    }

    /// Semicolon-joined rendering used in tabular exports and prompts.
    pub fn render(&self) -> String {
        self.phrases()
            .into_iter()
            .map(|(p, _)| p)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Flatten focus phrases into the note's own words, in focus order.
///
/// Phrase words are matched case-insensitively against the note so the
/// returned tokens use the note's exact spelling and can be deleted verbatim.
pub fn focus_tokens(text: &str, focus: &FocusSet) -> Vec<(String, f64)> {
    let note_words = tokens::unique_words(text);
    let mut out: IndexMap<String, f64> = IndexMap::new();
    for (phrase, score) in focus.phrases() {
        for word in tokens::words(&phrase) {
            for candidate in note_words.iter().filter(|w| w.eq_ignore_ascii_case(word)) {
                out.entry(candidate.clone()).or_insert(score);
            }
        }
    }
    out.into_iter().collect()
}
