//! Local surrogate attributions for text (LIME).
//!
//! Perturbations drop random subsets of the note's distinct words; a weighted
//! ridge regression on word-presence indicators approximates the classifier
//! near the original note. The surrogate coefficients are the attributions.

use std::collections::HashSet;

use ndarray::{Array1, Array2, Axis};
use rand::{seq::index, Rng, RngCore};
use tracing::debug;

use super::ranking::{RankedToken, TokenRanking};
use crate::{
    error::{LosError, Result},
    model::{class_probability, Classifier},
    nlp::tokens,
};

/// Surrogate-model settings.
#[derive(Debug, Clone, Copy)]
pub struct LimeConfig {
    /// Perturbed samples, including the unperturbed note.
    pub num_samples: usize,
    /// Width of the exponential kernel over cosine distance ×100.
    pub kernel_width: f64,
    /// Ridge penalty.
    pub alpha: f64,
}

impl Default for LimeConfig {
    fn default() -> Self {
        Self {
            num_samples: 5000,
            kernel_width: 25.0,
            alpha: 1.0,
        }
    }
}

impl LimeConfig {
    pub fn with_samples(num_samples: usize) -> Self {
        Self {
            num_samples,
            ..Self::default()
        }
    }
}

/// Attribution weights toward `target_class`, strongest first, at most `num_features`.
pub fn explain_instance(
    text: &str,
    target_class: u8,
    num_features: usize,
    model: &dyn Classifier,
    config: &LimeConfig,
    rng: &mut dyn RngCore,
) -> Result<Vec<RankedToken>> {
    if config.num_samples < 2 {
        return Err(LosError::InvalidConfig(
            "LIME needs at least two samples".into(),
        ));
    }
    let words = tokens::unique_words(text);
    let d = words.len();
    if d == 0 || num_features == 0 {
        return Ok(Vec::new());
    }

    let mut presence = Array2::<f64>::ones((config.num_samples, d));
    let mut texts = Vec::with_capacity(config.num_samples);
    texts.push(text.to_string());
    for row in 1..config.num_samples {
        let size = rng.gen_range(1..d.max(2));
        let dropped = index::sample(rng, d, size.min(d));
        let mut removed = HashSet::with_capacity(size);
        for idx in dropped.iter() {
            presence[[row, idx]] = 0.0;
            removed.insert(words[idx].as_str());
        }
        texts.push(tokens::remove_words(text, &removed));
    }

    let probs = model.predict_proba(&texts)?;
    if probs.len() != texts.len() {
        return Err(LosError::Inference(format!(
            "expected {} scores, got {}",
            texts.len(),
            probs.len()
        )));
    }
    let y = Array1::from_iter(probs.into_iter().map(|p| class_probability(p, target_class)));
    let weights = kernel_weights(&presence, config.kernel_width);

    let all: Vec<usize> = (0..d).collect();
    let coef = weighted_ridge(&presence, &y, &weights, &all, config.alpha)?;
    let mut selected: Vec<usize> = all;
    selected.sort_by(|&a, &b| coef[b].abs().total_cmp(&coef[a].abs()));
    selected.truncate(num_features);

    let refit = weighted_ridge(&presence, &y, &weights, &selected, config.alpha)?;
    let mut ranked: Vec<RankedToken> = selected
        .iter()
        .zip(refit.iter())
        .map(|(&idx, &w)| RankedToken {
            token: words[idx].clone(),
            score: w,
        })
        .collect();
    ranked.sort_by(|a, b| b.score.abs().total_cmp(&a.score.abs()));
    debug!(words = d, kept = ranked.len(), "lime explanation");
    Ok(ranked)
}

/// Attribution ranking padded to `width` slots.
pub fn lime_ranking(
    text: &str,
    target_class: u8,
    width: usize,
    model: &dyn Classifier,
    config: &LimeConfig,
    rng: &mut dyn RngCore,
) -> Result<TokenRanking> {
    let ranked = explain_instance(text, target_class, width, model, config, rng)?;
    Ok(TokenRanking::new(ranked, width))
}

/// `sqrt(exp(-d^2 / width^2))` with `d` the cosine distance to the full note, ×100.
fn kernel_weights(presence: &Array2<f64>, width: f64) -> Array1<f64> {
    let d = presence.ncols() as f64;
    presence.map_axis(Axis(1), |row| {
        let active = row.sum();
        let distance = if active == 0.0 {
            100.0
        } else {
            (1.0 - active / (active.sqrt() * d.sqrt())) * 100.0
        };
        (-(distance * distance) / (width * width)).exp().sqrt()
    })
}

/// Ridge regression with intercept on the `columns` subset; returns one coefficient per column.
fn weighted_ridge(
    x: &Array2<f64>,
    y: &Array1<f64>,
    w: &Array1<f64>,
    columns: &[usize],
    alpha: f64,
) -> Result<Array1<f64>> {
    let k = columns.len();
    let sub = x.select(Axis(1), columns);
    let total = w.sum();
    if total <= 0.0 {
        return Err(LosError::Inference("all kernel weights are zero".into()));
    }
    let x_mean = sub.t().dot(w) / total;
    let y_mean = y.dot(w) / total;
    let xc = &sub - &x_mean.view().insert_axis(Axis(0));
    let yc = y - y_mean;
    let xw = &xc * &w.view().insert_axis(Axis(1));

    let mut gram = xw.t().dot(&xc);
    for i in 0..k {
        gram[[i, i]] += alpha;
    }
    let rhs = xw.t().dot(&yc);
    solve(gram, rhs)
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Result<Array1<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))
            .unwrap_or(col);
        if a[[pivot, col]].abs() < 1e-12 {
            return Err(LosError::Inference("singular surrogate system".into()));
        }
        if pivot != col {
            for c in 0..n {
                a.swap([col, c], [pivot, c]);
            }
            b.swap(col, pivot);
        }
        for row in col + 1..n {
            let factor = a[[row, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for c in col..n {
                a[[row, c]] -= factor * a[[col, c]];
            }
            b[row] -= factor * b[col];
        }
    }
    let mut x = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|c| a[[row, c]] * x[c]).sum();
        x[row] = (b[row] - tail) / a[[row, row]];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn solves_small_system() {
        let a = array![[2.0, 1.0], [1.0, 3.0]];
        let b = array![3.0, 5.0];
        let x = solve(a, b).unwrap();
        assert!((x[0] - 0.8).abs() < 1e-12);
        assert!((x[1] - 1.4).abs() < 1e-12);
    }

    #[test]
    fn unperturbed_row_has_full_weight() {
        let presence = array![[1.0, 1.0, 1.0, 1.0], [1.0, 0.0, 0.0, 0.0]];
        let w = kernel_weights(&presence, 25.0);
        assert!((w[0] - 1.0).abs() < 1e-12);
        assert!(w[1] < w[0]);
    }
}
