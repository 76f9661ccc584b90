//! Text processing: tokenisation, keyphrases, clinical entities and focus sets.

pub mod focus;
pub mod keywords;
pub mod ner;
pub mod tokens;

use serde::Serialize;
use tracing::info;

use crate::data::Note;

use self::{focus::FocusSet, keywords::KeywordExtractor, ner::Ner};

/// Focus set of one note, ready for export.
#[derive(Debug, Clone, Serialize)]
pub struct FocusRow {
    pub id: String,
    pub keywords: String,
    pub entities: String,
    pub focus_set: String,
}

/// Extract focus sets for every note, preserving input order.
pub fn extract_focus_sets(
    notes: &[Note],
    keywords: &dyn KeywordExtractor,
    ner: &dyn Ner,
) -> Vec<FocusSet> {
    let sets: Vec<FocusSet> = notes
        .iter()
        .map(|note| FocusSet::extract(&note.text, keywords, ner))
        .collect();
    let mentions: usize = sets.iter().map(|s| s.entities.len()).sum();
    info!(notes = notes.len(), mentions, "extracted focus sets");
    sets
}

impl FocusRow {
    pub fn new(note: &Note, focus: &FocusSet) -> Self {
        Self {
            id: note.id.clone(),
            keywords: focus
                .keywords
                .iter()
                .map(|(p, _)| p.as_str())
                .collect::<Vec<_>>()
                .join("; "),
            entities: focus
                .entities
                .iter()
                .map(|s| format!("{}|{}", s.text, s.label))
                .collect::<Vec<_>>()
                .join("; "),
            focus_set: focus.render(),
        }
    }
}
