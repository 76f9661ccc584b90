//! Deletion curves: model confidence as the top-ranked tokens are removed.

use std::collections::HashSet;

use serde::Serialize;

use super::ranking::TokenRanking;
use crate::{
    error::{LosError, Result},
    model::{class_probability, Classifier},
    nlp::tokens,
};

/// One sampled point of a deletion curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub fraction: f64,
    pub probability: f64,
}

/// Target-class probability per fraction removed, fractions non-decreasing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeletionCurve {
    pub points: Vec<CurvePoint>,
}

impl DeletionCurve {
    pub fn fractions(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.fraction).collect()
    }

    pub fn probabilities(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.probability).collect()
    }

    /// Faithfulness score: lower means the ranking found influential tokens.
    pub fn auc(&self) -> f64 {
        trapezoid(&self.fractions(), &self.probabilities())
    }
}

/// Fractions must lie in [0, 1] and never decrease.
pub fn validate_fractions(fractions: &[f64]) -> Result<()> {
    if fractions.is_empty() {
        return Err(LosError::InvalidConfig("no deletion fractions given".into()));
    }
    if let Some(bad) = fractions.iter().find(|f| !(0.0..=1.0).contains(*f)) {
        return Err(LosError::InvalidConfig(format!(
            "deletion fraction {bad} outside [0, 1]"
        )));
    }
    if fractions.windows(2).any(|w| w[1] < w[0]) {
        return Err(LosError::InvalidConfig(
            "deletion fractions must be non-decreasing".into(),
        ));
    }
    Ok(())
}

/// Trapezoidal area under `ys` sampled at `xs`.
pub fn trapezoid(xs: &[f64], ys: &[f64]) -> f64 {
    xs.windows(2)
        .zip(ys.windows(2))
        .map(|(x, y)| (x[1] - x[0]) * (y[0] + y[1]) / 2.0)
        .sum()
}

/// Text with the top `floor(fraction * width)` ranked tokens removed.
pub fn mask_text(text: &str, ranking: &TokenRanking, fraction: f64) -> String {
    let removed: HashSet<&str> = ranking
        .top(ranking.removal_count(fraction))
        .iter()
        .map(|t| t.token.as_str())
        .collect();
    tokens::remove_words(text, &removed)
}

/// Query the classifier on every masked variant of `text`.
pub fn deletion_curve(
    text: &str,
    ranking: &TokenRanking,
    fractions: &[f64],
    target_class: u8,
    model: &dyn Classifier,
) -> Result<DeletionCurve> {
    validate_fractions(fractions)?;
    let masked: Vec<String> = fractions
        .iter()
        .map(|&f| mask_text(text, ranking, f))
        .collect();
    let probs = model.predict_proba(&masked)?;
    if probs.len() != masked.len() {
        return Err(LosError::Inference(format!(
            "expected {} scores, got {}",
            masked.len(),
            probs.len()
        )));
    }
    let points = fractions
        .iter()
        .zip(probs)
        .map(|(&fraction, p)| CurvePoint {
            fraction,
            probability: class_probability(p, target_class),
        })
        .collect();
    Ok(DeletionCurve { points })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trapezoid_of_constant_is_height() {
        assert!((trapezoid(&[0.0, 0.5, 1.0], &[0.4, 0.4, 0.4]) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn rejects_decreasing_fractions() {
        assert!(validate_fractions(&[0.0, 0.6, 0.5]).is_err());
        assert!(validate_fractions(&[0.0, 1.2]).is_err());
        assert!(validate_fractions(&[0.0, 0.0, 1.0]).is_ok());
    }
}
