//! L2-regularised logistic regression over bag-of-words features.

use linfa::{dataset::DatasetBase, prelude::Fit};
use linfa_logistic::{FittedLogisticRegression, LogisticRegression};
use ndarray::{Array1, Array2};
use rand::{Rng, RngCore};
use tracing::info;

use super::{vectorizer::BowVectorizer, Classifier, StochasticClassifier};
use crate::{
    config::ExperimentConfig,
    data::Note,
    error::{LosError, Result},
};

/// Fitted classifier with input dropout for Monte Carlo sampling.
pub struct BowLogistic {
    vectorizer: BowVectorizer,
    model: FittedLogisticRegression<f64, i32>,
    dropout_rate: f64,
}

impl BowLogistic {
    /// Fit on labelled notes using the vocabulary and solver settings of `config`.
    pub fn fit(notes: &[Note], config: &ExperimentConfig) -> Result<Self> {
        if notes.is_empty() {
            return Err(LosError::EmptyDataset);
        }
        let positives = notes.iter().filter(|n| n.label == 1).count();
        if positives == 0 {
            return Err(LosError::SingleClass(0));
        }
        if positives == notes.len() {
            return Err(LosError::SingleClass(1));
        }

        let texts: Vec<String> = notes.iter().map(|n| n.text.clone()).collect();
        let vectorizer = BowVectorizer::fit(&texts, config.max_vocabulary);
        let x = vectorizer.transform(&texts);
        let y = Array1::from(notes.iter().map(|n| n.label as i32).collect::<Vec<_>>());
        let dataset: DatasetBase<_, _> = DatasetBase::new(x, y);

        let model = LogisticRegression::default()
            .alpha(config.l2_penalty)
            .max_iterations(config.max_iterations)
            .fit(&dataset)
            .map_err(|err| LosError::ModelFit(err.to_string()))?;
        info!(
            rows = notes.len(),
            positives,
            vocabulary = vectorizer.len(),
            "fitted logistic classifier"
        );
        Ok(Self {
            vectorizer,
            model,
            dropout_rate: config.dropout_rate,
        })
    }

    fn probabilities(&self, x: &Array2<f64>) -> Vec<f64> {
        // Probability of the larger class label, i.e. 1.
        self.model.predict_probabilities(x).to_vec()
    }
}

impl Classifier for BowLogistic {
    fn predict_proba(&self, texts: &[String]) -> Result<Vec<f64>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let x = self.vectorizer.transform(texts);
        Ok(self.probabilities(&x))
    }
}

impl StochasticClassifier for BowLogistic {
    fn sample_proba(&self, texts: &[String], rng: &mut dyn RngCore) -> Result<Vec<f64>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let mut x = self.vectorizer.transform(texts);
        let p = self.dropout_rate;
        if p > 0.0 {
            let keep_scale = 1.0 / (1.0 - p);
            x.mapv_inplace(|v| {
                if rng.gen::<f64>() < p {
                    0.0
                } else {
                    v * keep_scale
                }
            });
        }
        Ok(self.probabilities(&x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use rand::{rngs::StdRng, SeedableRng};

    fn note(text: &str, label: u8) -> Note {
        Note {
            id: text.into(),
            text: text.into(),
            label,
            extra: IndexMap::new(),
        }
    }

    fn corpus() -> Vec<Note> {
        vec![
            note("sepsis intubation dialysis", 1),
            note("sepsis vasopressors icu", 1),
            note("dialysis icu transfusion", 1),
            note("routine discharge home", 0),
            note("elective procedure discharge", 0),
            note("stable home routine", 0),
        ]
    }

    #[test]
    fn separates_training_classes() {
        let model = BowLogistic::fit(&corpus(), &ExperimentConfig::default()).unwrap();
        let probs = model
            .predict_proba(&["sepsis dialysis".into(), "routine home".into()])
            .unwrap();
        assert!(probs[0] > 0.5, "{probs:?}");
        assert!(probs[1] < 0.5, "{probs:?}");
    }

    #[test]
    fn single_class_is_rejected() {
        let notes = vec![note("a", 1), note("b", 1)];
        let err = BowLogistic::fit(&notes, &ExperimentConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, LosError::SingleClass(1)));
    }

    #[test]
    fn dropout_passes_vary_with_noise() {
        let config = ExperimentConfig {
            dropout_rate: 0.5,
            ..ExperimentConfig::default()
        };
        let model = BowLogistic::fit(&corpus(), &config).unwrap();
        let texts = vec!["sepsis intubation dialysis icu".to_string()];
        let mut rng = StdRng::seed_from_u64(3);
        let passes: Vec<f64> = (0..8)
            .map(|_| model.sample_proba(&texts, &mut rng).unwrap()[0])
            .collect();
        assert!(passes.iter().any(|p| (p - passes[0]).abs() > 1e-9));
    }

    #[test]
    fn zero_dropout_matches_deterministic_pass() {
        let config = ExperimentConfig {
            dropout_rate: 0.0,
            ..ExperimentConfig::default()
        };
        let model = BowLogistic::fit(&corpus(), &config).unwrap();
        let texts = vec!["sepsis dialysis".to_string(), "routine home".to_string()];
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(
            model.sample_proba(&texts, &mut rng).unwrap(),
            model.predict_proba(&texts).unwrap()
        );
    }
}
