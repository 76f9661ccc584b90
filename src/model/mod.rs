//! Sequence classifier seam plus a bag-of-words logistic implementation.

pub mod logistic;
pub mod metrics;
pub mod vectorizer;

use rand::RngCore;

use crate::error::Result;

pub use logistic::BowLogistic;

/// Deterministic inference: positive-class probability per text.
pub trait Classifier {
    fn predict_proba(&self, texts: &[String]) -> Result<Vec<f64>>;
}

/// Inference with regularisation noise active; weights stay fixed between passes.
pub trait StochasticClassifier: Classifier {
    /// One stochastic forward pass. Texts are re-tokenised on every call.
    fn sample_proba(&self, texts: &[String], rng: &mut dyn RngCore) -> Result<Vec<f64>>;
}

/// Probability assigned to `class` given the positive-class probability.
pub fn class_probability(positive: f64, class: u8) -> f64 {
    if class == 1 {
        positive
    } else {
        1.0 - positive
    }
}
