//! Monte Carlo dropout estimates of predictive mean and variance.

use rand::RngCore;
use serde::Serialize;
use tracing::debug;

use crate::{
    error::{LosError, Result},
    model::StochasticClassifier,
};

/// Mean and population variance of the positive-class probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Uncertainty {
    pub mean: f64,
    pub variance: f64,
}

/// Run `samples` stochastic passes over `texts` and summarise each text.
///
/// Any failing pass aborts the whole estimate.
pub fn estimate_uncertainty(
    texts: &[String],
    model: &dyn StochasticClassifier,
    samples: usize,
    rng: &mut dyn RngCore,
) -> Result<Vec<Uncertainty>> {
    if samples == 0 {
        return Err(LosError::InvalidConfig(
            "Monte Carlo sample count must be at least 1".into(),
        ));
    }
    let mut sum = vec![0.0; texts.len()];
    let mut sum_sq = vec![0.0; texts.len()];
    for pass in 0..samples {
        let probs = model.sample_proba(texts, rng)?;
        if probs.len() != texts.len() {
            return Err(LosError::Inference(format!(
                "pass {pass} returned {} scores for {} texts",
                probs.len(),
                texts.len()
            )));
        }
        for (idx, p) in probs.into_iter().enumerate() {
            sum[idx] += p;
            sum_sq[idx] += p * p;
        }
    }
    let n = samples as f64;
    debug!(texts = texts.len(), samples, "estimated predictive uncertainty");
    Ok(sum
        .into_iter()
        .zip(sum_sq)
        .map(|(s, sq)| {
            let mean = s / n;
            Uncertainty {
                mean,
                variance: (sq / n - mean * mean).max(0.0),
            }
        })
        .collect())
}
