use std::cell::Cell;

use los_explain::{
    explain::estimate_uncertainty,
    model::{Classifier, StochasticClassifier},
    LosError, Result,
};
use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};

/// Base probability from text length, jittered on every stochastic pass.
struct Jitter {
    calls: Cell<usize>,
    fail_on: Option<usize>,
}

impl Jitter {
    fn new() -> Self {
        Self {
            calls: Cell::new(0),
            fail_on: None,
        }
    }
}

impl Classifier for Jitter {
    fn predict_proba(&self, texts: &[String]) -> Result<Vec<f64>> {
        Ok(texts.iter().map(|t| (t.len() % 10) as f64 / 10.0).collect())
    }
}

impl StochasticClassifier for Jitter {
    fn sample_proba(&self, texts: &[String], rng: &mut dyn RngCore) -> Result<Vec<f64>> {
        let call = self.calls.get();
        self.calls.set(call + 1);
        if Some(call) == self.fail_on {
            return Err(LosError::Inference("device lost".into()));
        }
        let base = self.predict_proba(texts)?;
        Ok(base
            .into_iter()
            .map(|p| (p + rng.gen_range(-0.05..0.05)).clamp(0.0, 1.0))
            .collect())
    }
}

fn texts() -> Vec<String> {
    vec!["sepsis on pressors".into(), "routine".into()]
}

#[test]
fn same_seed_same_estimate() {
    let a = estimate_uncertainty(&texts(), &Jitter::new(), 30, &mut StdRng::seed_from_u64(5)).unwrap();
    let b = estimate_uncertainty(&texts(), &Jitter::new(), 30, &mut StdRng::seed_from_u64(5)).unwrap();
    assert_eq!(a, b);
    assert!(a.iter().all(|u| u.variance > 0.0));
}

#[test]
fn single_sample_has_zero_variance() {
    let est = estimate_uncertainty(&texts(), &Jitter::new(), 1, &mut StdRng::seed_from_u64(1)).unwrap();
    assert!(est.iter().all(|u| u.variance == 0.0));
}

#[test]
fn zero_samples_is_a_config_error() {
    let err = estimate_uncertainty(&texts(), &Jitter::new(), 0, &mut StdRng::seed_from_u64(1))
        .unwrap_err();
    assert!(matches!(err, LosError::InvalidConfig(_)));
}

#[test]
fn failed_pass_aborts_estimate() {
    let model = Jitter {
        calls: Cell::new(0),
        fail_on: Some(3),
    };
    let err = estimate_uncertainty(&texts(), &model, 10, &mut StdRng::seed_from_u64(1)).unwrap_err();
    assert!(matches!(err, LosError::Inference(_)));
    assert_eq!(model.calls.get(), 4);
}
