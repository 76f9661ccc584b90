//! Held-out evaluation metrics for binary predictions.

use linfa::{dataset::Pr, metrics::BinaryClassification};
use ndarray::Array1;
use serde::Serialize;

/// Threshold metrics at 0.5 plus ranking quality.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryMetrics {
    pub n: usize,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// `None` when only one class is present.
    pub roc_auc: Option<f64>,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Score positive-class probabilities against true labels.
pub fn evaluate(labels: &[u8], probs: &[f64]) -> BinaryMetrics {
    // linfa's ConfusionMatrix lists classes in hash order; positive-class counts are tallied here.
    let (mut tp, mut fp, mut tn, mut fn_) = (0, 0, 0, 0);
    for (&label, &p) in labels.iter().zip(probs) {
        match (label == 1, p >= 0.5) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (false, false) => tn += 1,
            (true, false) => fn_ += 1,
        }
    }
    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };
    BinaryMetrics {
        n: labels.len(),
        accuracy: ratio(tp + tn, labels.len()),
        precision,
        recall,
        f1,
        roc_auc: roc_auc(labels, probs),
    }
}

/// Area under the ROC curve; `None` when only one class is present.
pub fn roc_auc(labels: &[u8], probs: &[f64]) -> Option<f64> {
    let truth: Vec<bool> = labels.iter().map(|&l| l == 1).collect();
    if truth.iter().all(|&t| t) || truth.iter().all(|&t| !t) {
        return None;
    }
    let scores = probs
        .iter()
        .map(|&p| Pr::try_from(p as f32))
        .collect::<Result<Array1<Pr>, _>>()
        .ok()?;
    let roc = scores.roc(truth.as_slice()).ok()?;
    Some(f64::from(roc.area_under_curve()))
}
