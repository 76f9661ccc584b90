//! Dictionary-based clinical entity recogniser. Swap with a neural tagger behind the same trait.

use once_cell::sync::Lazy;
use serde::Serialize;

/// Extracted entity span with byte offsets relative to the source text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub label: String,
    pub text: String,
    pub score: f64,
}

/// Trait for NER implementations.
pub trait Ner: Send + Sync {
    fn extract(&self, text: &str) -> Vec<Span>;
}

static PROBLEM_TERMS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "sepsis",
        "septic shock",
        "pneumonia",
        "respiratory failure",
        "acute kidney injury",
        "renal failure",
        "heart failure",
        "congestive heart failure",
        "atrial fibrillation",
        "myocardial infarction",
        "stroke",
        "delirium",
        "hematuria",
        "flank pain",
        "pain",
        "fever",
        "hypotension",
        "hypoxia",
        "anemia",
        "gi bleed",
        "pulmonary embolism",
        "deep vein thrombosis",
        "cellulitis",
        "urinary tract infection",
        "copd exacerbation",
        "diabetic ketoacidosis",
        "pressure ulcer",
        "fracture",
        "malnutrition",
    ]
});

static TEST_TERMS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "ct scan",
        "ct",
        "mri",
        "chest x-ray",
        "echocardiogram",
        "blood cultures",
        "urinalysis",
        "lactate",
        "creatinine",
        "troponin",
        "cbc",
        "ekg",
        "biopsy",
    ]
});

static TREATMENT_TERMS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "intubation",
        "mechanical ventilation",
        "dialysis",
        "vancomycin",
        "piperacillin",
        "antibiotics",
        "heparin",
        "insulin",
        "vasopressors",
        "norepinephrine",
        "transfusion",
        "surgery",
        "physical therapy",
        "tube feeds",
        "diuresis",
    ]
});

/// Lexicon matcher labelling `PROBLEM`, `TEST` and `TREATMENT` mentions.
#[derive(Debug, Default, Clone, Copy)]
pub struct DictionaryNer;

impl Ner for DictionaryNer {
    fn extract(&self, text: &str) -> Vec<Span> {
        let mut spans = Vec::new();
        spans.extend(find_terms(text, &PROBLEM_TERMS, "PROBLEM"));
        spans.extend(find_terms(text, &TEST_TERMS, "TEST"));
        spans.extend(find_terms(text, &TREATMENT_TERMS, "TREATMENT"));
        resolve_overlaps(spans)
    }
}

fn is_word_boundary(text: &str, idx: usize) -> bool {
    let before = text[..idx].chars().next_back();
    let after = text[idx..].chars().next();
    let is_word = |c: Option<char>| c.map_or(false, |c| c.is_alphanumeric() || c == '_');
    !(is_word(before) && is_word(after))
}

fn find_terms(text: &str, terms: &[&str], label: &str) -> Vec<Span> {
    // ASCII lowering keeps byte offsets aligned with the source text.
    let lower = text.to_ascii_lowercase();
    let mut spans = Vec::new();
    for term in terms {
        let mut start_pos = 0;
        while let Some(pos) = lower[start_pos..].find(term) {
            let start = start_pos + pos;
            let end = start + term.len();
            if is_word_boundary(text, start) && is_word_boundary(text, end) {
                spans.push(Span {
                    start,
                    end,
                    label: label.to_string(),
                    text: text[start..end].to_string(),
                    score: 0.8,
                });
            }
            start_pos = end;
        }
    }
    spans
}

/// Keep the longest span among overlapping matches, earliest first on ties.
fn resolve_overlaps(mut spans: Vec<Span>) -> Vec<Span> {
    spans.sort_by(|a, b| {
        (b.end - b.start)
            .cmp(&(a.end - a.start))
            .then(a.start.cmp(&b.start))
    });
    let mut kept: Vec<Span> = Vec::new();
    for span in spans {
        if kept
            .iter()
            .all(|k| span.end <= k.start || span.start >= k.end)
        {
            kept.push(span);
        }
    }
    kept.sort_by_key(|s| s.start);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_match_wins() {
        let spans = DictionaryNer.extract("Patient presented with severe flank pain and hematuria");
        let texts: Vec<_> = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["flank pain", "hematuria"]);
        assert!(spans.iter().all(|s| s.label == "PROBLEM"));
    }

    #[test]
    fn matches_are_whole_word() {
        let spans = DictionaryNer.extract("Painless swelling, no CTA done");
        assert!(spans.is_empty());
    }

    #[test]
    fn labels_tests_and_treatments() {
        let spans = DictionaryNer.extract("CT scan negative; started Vancomycin.");
        let labels: Vec<_> = spans
            .iter()
            .map(|s| (s.text.as_str(), s.label.as_str()))
            .collect();
        assert_eq!(labels, vec![("CT scan", "TEST"), ("Vancomycin", "TREATMENT")]);
    }
}
