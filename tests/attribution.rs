use los_explain::{
    config::ExperimentConfig,
    explain::{
        deletion::deletion_curve,
        lime::{explain_instance, lime_ranking, LimeConfig},
        ranking::{common_width, focus_ranking, random_ranking},
    },
    model::Classifier,
    nlp::{
        focus::{focus_tokens, FocusSet},
        keywords::RakeExtractor,
        ner::DictionaryNer,
        tokens,
    },
    Result,
};
use rand::{rngs::StdRng, SeedableRng};

const NOTE: &str = "Patient presented with severe flank pain and hematuria";

/// Positive only while "hematuria" survives; "flank" adds a little.
struct HematuriaModel;

impl Classifier for HematuriaModel {
    fn predict_proba(&self, texts: &[String]) -> Result<Vec<f64>> {
        Ok(texts
            .iter()
            .map(|t| {
                let words: Vec<&str> = tokens::words(t).collect();
                let mut p = 0.1;
                if words.contains(&"hematuria") {
                    p += 0.7;
                }
                if words.contains(&"flank") {
                    p += 0.1;
                }
                p
            })
            .collect())
    }
}

#[test]
fn lime_ranks_decisive_word_first() {
    let mut rng = StdRng::seed_from_u64(42);
    let ranked = explain_instance(
        NOTE,
        1,
        3,
        &HematuriaModel,
        &LimeConfig::with_samples(500),
        &mut rng,
    )
    .unwrap();
    assert_eq!(ranked.len(), 3);
    assert_eq!(ranked[0].token, "hematuria");
    assert!(ranked[0].score > 0.0);
    assert_eq!(ranked[1].token, "flank");
}

#[test]
fn lime_for_negative_class_flips_sign() {
    let mut rng = StdRng::seed_from_u64(42);
    let ranked = explain_instance(
        NOTE,
        0,
        1,
        &HematuriaModel,
        &LimeConfig::with_samples(500),
        &mut rng,
    )
    .unwrap();
    assert_eq!(ranked[0].token, "hematuria");
    assert!(ranked[0].score < 0.0);
}

#[test]
fn lime_is_seeded() {
    let config = LimeConfig::with_samples(100);
    let a = lime_ranking(NOTE, 1, 4, &HematuriaModel, &config, &mut StdRng::seed_from_u64(9)).unwrap();
    let b = lime_ranking(NOTE, 1, 4, &HematuriaModel, &config, &mut StdRng::seed_from_u64(9)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn rankings_share_width() {
    let width = common_width(NOTE, 5);
    let focus = FocusSet::extract(NOTE, &RakeExtractor::default(), &DictionaryNer);
    let toks = focus_tokens(NOTE, &focus);
    let focus = focus_ranking(NOTE, &toks, width);
    let random = random_ranking(NOTE, width, &mut StdRng::seed_from_u64(1));
    let lime = lime_ranking(
        NOTE,
        1,
        width,
        &HematuriaModel,
        &LimeConfig::with_samples(50),
        &mut StdRng::seed_from_u64(1),
    )
    .unwrap();
    assert_eq!(focus.width, 5);
    assert_eq!(random.width, 5);
    assert_eq!(lime.width, 5);
    assert_eq!(focus.render(), "severe|flank|pain|presented|hematuria");
}

#[test]
fn attribution_deletes_faster_than_random() {
    let fractions = ExperimentConfig::even_fractions(10);
    let width = common_width(NOTE, 5);
    let attribution = lime_ranking(
        NOTE,
        1,
        width,
        &HematuriaModel,
        &LimeConfig::with_samples(500),
        &mut StdRng::seed_from_u64(42),
    )
    .unwrap();
    let attribution_auc = deletion_curve(NOTE, &attribution, &fractions, 1, &HematuriaModel)
        .unwrap()
        .auc();

    let runs = 50;
    let random_auc: f64 = (0..runs)
        .map(|seed| {
            let ranking = random_ranking(NOTE, width, &mut StdRng::seed_from_u64(seed));
            deletion_curve(NOTE, &ranking, &fractions, 1, &HematuriaModel)
                .unwrap()
                .auc()
        })
        .sum::<f64>()
        / runs as f64;

    assert!(
        attribution_auc <= random_auc,
        "attribution {attribution_auc} vs random {random_auc}"
    );
}
