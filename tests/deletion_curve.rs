use std::collections::HashSet;

use los_explain::{
    explain::{
        deletion::{deletion_curve, mask_text, trapezoid},
        TokenRanking,
    },
    model::Classifier,
    nlp::tokens,
    Result,
};
use proptest::prelude::*;

const NOTE: &str = "Patient presented with severe flank pain and hematuria";

/// Probability rises with each trigger word still present.
struct TriggerModel;

impl Classifier for TriggerModel {
    fn predict_proba(&self, texts: &[String]) -> Result<Vec<f64>> {
        Ok(texts
            .iter()
            .map(|t| {
                let present: HashSet<&str> = tokens::words(t).collect();
                let hits = ["flank", "pain", "hematuria"]
                    .iter()
                    .filter(|w| present.contains(*w))
                    .count();
                0.2 + 0.25 * hits as f64
            })
            .collect())
    }
}

#[test]
fn flank_pain_scenario() {
    let ranking = TokenRanking::from_tokens(&["flank", "pain", "hematuria"]);
    assert_eq!(mask_text(NOTE, &ranking, 0.0), NOTE);
    assert_eq!(
        mask_text(NOTE, &ranking, 0.5),
        "Patient presented with severe pain and hematuria"
    );
    assert_eq!(
        mask_text(NOTE, &ranking, 1.0),
        "Patient presented with severe and"
    );

    let curve = deletion_curve(NOTE, &ranking, &[0.0, 0.5, 1.0], 1, &TriggerModel).unwrap();
    let probs = curve.probabilities();
    assert!((probs[0] - 0.95).abs() < 1e-12);
    assert!((probs[1] - 0.70).abs() < 1e-12);
    assert!((probs[2] - 0.20).abs() < 1e-12);
}

#[test]
fn endpoints_match_unperturbed_and_fully_masked() {
    let forward = TokenRanking::from_tokens(&["hematuria", "flank", "pain"]);
    let backward = TokenRanking::from_tokens(&["pain", "flank", "hematuria"]);
    let model = TriggerModel;
    let base = model.predict_proba(&[NOTE.to_string()]).unwrap()[0];

    let a = deletion_curve(NOTE, &forward, &[0.0, 1.0], 1, &model).unwrap();
    let b = deletion_curve(NOTE, &backward, &[0.0, 1.0], 1, &model).unwrap();
    assert_eq!(a.points[0].probability, base);
    assert_eq!(a.points[1].probability, b.points[1].probability);
}

#[test]
fn negative_target_uses_complement() {
    let ranking = TokenRanking::from_tokens(&["flank"]);
    let curve = deletion_curve(NOTE, &ranking, &[0.0], 0, &TriggerModel).unwrap();
    assert!((curve.points[0].probability - 0.05).abs() < 1e-12);
}

#[test]
fn invalid_fractions_rejected() {
    let ranking = TokenRanking::from_tokens(&["flank"]);
    assert!(deletion_curve(NOTE, &ranking, &[0.5, 0.2], 1, &TriggerModel).is_err());
}

proptest! {
    #[test]
    fn auc_of_probability_curve_is_bounded(
        mut xs in prop::collection::vec(0.0f64..=1.0, 2..20),
        ys in prop::collection::vec(0.0f64..=1.0, 20),
    ) {
        xs.sort_by(f64::total_cmp);
        let auc = trapezoid(&xs, &ys[..xs.len()]);
        prop_assert!(auc >= 0.0 && auc <= 1.0 + 1e-12, "auc {auc}");
    }
}
