//! Word-level tokenisation shared by the explainer and the deletion curves.

use std::collections::HashSet;

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("valid regex"));

/// Word tokens in reading order.
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    WORD.find_iter(text).map(|m| m.as_str())
}

/// Distinct words in order of first appearance (case-sensitive).
pub fn unique_words(text: &str) -> Vec<String> {
    words(text)
        .collect::<IndexSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Drop every whole-word occurrence of `removed`, keeping the remaining words in order.
///
/// Matching is exact and case-sensitive. Punctuation attached to surviving
/// words is kept; whitespace is collapsed to single spaces.
pub fn remove_words(text: &str, removed: &HashSet<&str>) -> String {
    if removed.is_empty() {
        return text.split_whitespace().collect::<Vec<_>>().join(" ");
    }
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in WORD.find_iter(text) {
        out.push_str(&text[last..m.start()]);
        if !removed.contains(m.as_str()) {
            out.push_str(m.as_str());
        }
        last = m.end();
    }
    out.push_str(&text[last..]);
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
