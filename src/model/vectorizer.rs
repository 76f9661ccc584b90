//! Lower-cased bag-of-words features.

use std::collections::HashSet;

use indexmap::IndexMap;
use ndarray::Array2;

use crate::nlp::tokens;

/// Vocabulary of the most document-frequent words in the training notes.
#[derive(Debug, Clone)]
pub struct BowVectorizer {
    vocabulary: IndexMap<String, usize>,
}

impl BowVectorizer {
    /// Keep the `max_features` words with the highest document frequency.
    pub fn fit(texts: &[String], max_features: usize) -> Self {
        let mut doc_freq: IndexMap<String, usize> = IndexMap::new();
        for text in texts {
            let seen: HashSet<String> = tokens::words(text).map(str::to_lowercase).collect();
            let mut seen: Vec<String> = seen.into_iter().collect();
            seen.sort();
            for word in seen {
                *doc_freq.entry(word).or_insert(0) += 1;
            }
        }
        let mut ranked: Vec<(String, usize)> = doc_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(max_features);
        let vocabulary = ranked
            .into_iter()
            .enumerate()
            .map(|(idx, (word, _))| (word, idx))
            .collect();
        Self { vocabulary }
    }

    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    /// `log(1 + count)` per vocabulary word; out-of-vocabulary words are ignored.
    pub fn transform(&self, texts: &[String]) -> Array2<f64> {
        let mut x = Array2::<f64>::zeros((texts.len(), self.vocabulary.len()));
        for (row, text) in texts.iter().enumerate() {
            for word in tokens::words(text) {
                if let Some(&col) = self.vocabulary.get(word.to_lowercase().as_str()) {
                    x[[row, col]] += 1.0;
                }
            }
        }
        x.mapv_inplace(f64::ln_1p);
        x
    }
}
