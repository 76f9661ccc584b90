//! Token rankings for the three deletion strategies.

use std::fmt;

use rand::{seq::index, RngCore};
use serde::{Deserialize, Serialize};

use crate::nlp::tokens;

/// Token-selection strategy compared by the deletion curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Perturbation-based attribution from the local explainer.
    Attribution,
    /// Externally supplied keyphrase/entity tokens.
    Focus,
    /// Uniform sample of the note's words.
    Random,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Attribution, Strategy::Focus, Strategy::Random];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attribution => "attribution",
            Self::Focus => "focus",
            Self::Random => "random",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token and its influence score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedToken {
    pub token: String,
    pub score: f64,
}

/// Most-to-least influential tokens with a fixed width.
///
/// `width` is the shared feature count; slots past `tokens.len()` are padding
/// and remove nothing, so every strategy deletes `floor(fraction * width)`
/// slots at the same fraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenRanking {
    pub tokens: Vec<RankedToken>,
    pub width: usize,
}

impl TokenRanking {
    /// Truncate `tokens` to `width`.
    pub fn new(mut tokens: Vec<RankedToken>, width: usize) -> Self {
        tokens.truncate(width);
        Self { tokens, width }
    }

    /// Build from bare tokens scored by descending position.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Self {
        let n = tokens.len();
        let ranked = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| RankedToken {
                token: t.as_ref().to_string(),
                score: (n - i) as f64,
            })
            .collect();
        Self::new(ranked, n)
    }

    /// Number of slots removed at `fraction`.
    pub fn removal_count(&self, fraction: f64) -> usize {
        ((fraction * self.width as f64).floor() as usize).min(self.width)
    }

    /// Real tokens among the top `k` slots.
    pub fn top(&self, k: usize) -> &[RankedToken] {
        &self.tokens[..k.min(self.tokens.len())]
    }

    pub fn is_padded(&self) -> bool {
        self.tokens.len() < self.width
    }

    /// Tokens joined with `|` for tabular output.
    pub fn render(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.token.as_str())
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// Feature count shared by all strategies for one note.
pub fn common_width(text: &str, num_features: usize) -> usize {
    num_features.min(tokens::unique_words(text).len())
}

/// Ranking from precomputed focus tokens that occur in the note.
pub fn focus_ranking(text: &str, focus_tokens: &[(String, f64)], width: usize) -> TokenRanking {
    let present = tokens::unique_words(text);
    let ranked = focus_tokens
        .iter()
        .filter(|(token, _)| present.iter().any(|w| w == token))
        .map(|(token, score)| RankedToken {
            token: token.clone(),
            score: *score,
        })
        .collect();
    TokenRanking::new(ranked, width)
}

/// Uniform sample without replacement from the note's unique words.
pub fn random_ranking(text: &str, width: usize, rng: &mut dyn RngCore) -> TokenRanking {
    let words = tokens::unique_words(text);
    let amount = width.min(words.len());
    let ranked = index::sample(rng, words.len(), amount)
        .into_iter()
        .map(|idx| RankedToken {
            token: words[idx].clone(),
            score: 0.0,
        })
        .collect();
    TokenRanking::new(ranked, width)
}
