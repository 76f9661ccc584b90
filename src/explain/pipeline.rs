//! Score → select → rank → mask → aggregate, as pure functions over explicit config.

use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use rand::{rngs::StdRng, RngCore, SeedableRng};
use serde::Serialize;
use tracing::{info, warn};

use super::{
    aggregate::{aggregate, AggregateCurve, AggregateRow},
    deletion::{deletion_curve, DeletionCurve},
    lime::{lime_ranking, LimeConfig},
    plot::plot_curves,
    ranking::{common_width, focus_ranking, random_ranking, Strategy, TokenRanking},
    uncertainty::estimate_uncertainty,
};
use crate::{
    config::{ExperimentConfig, SelectionPolicy},
    data::{export, Note},
    error::{LosError, Result},
    model::StochasticClassifier,
};

/// A note with its Monte Carlo prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredInstance {
    pub id: String,
    pub text: String,
    pub label: u8,
    pub probability: f64,
    pub variance: f64,
}

impl ScoredInstance {
    pub fn predicted_label(&self) -> u8 {
        u8::from(self.probability >= 0.5)
    }
}

/// The three rankings of one note, sharing a width.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyRankings {
    pub attribution: TokenRanking,
    pub focus: TokenRanking,
    pub random: TokenRanking,
}

impl StrategyRankings {
    pub fn get(&self, strategy: Strategy) -> &TokenRanking {
        match strategy {
            Strategy::Attribution => &self.attribution,
            Strategy::Focus => &self.focus,
            Strategy::Random => &self.random,
        }
    }
}

/// Everything computed for one explained note.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceExplanation {
    pub instance: ScoredInstance,
    pub target_class: u8,
    pub rankings: StrategyRankings,
    pub curves: HashMap<Strategy, DeletionCurve>,
}

impl InstanceExplanation {
    pub fn auc(&self, strategy: Strategy) -> f64 {
        self.curves.get(&strategy).map_or(f64::NAN, DeletionCurve::auc)
    }
}

/// Output of a full explanation run.
#[derive(Debug, Clone, Serialize)]
pub struct ExplanationReport {
    pub instances: Vec<InstanceExplanation>,
    pub aggregates: Vec<AggregateCurve>,
}

/// Independent generators per stochastic stage, derived from one seed.
pub struct StageRngs {
    pub uncertainty: StdRng,
    pub attribution: StdRng,
    pub random: StdRng,
}

impl StageRngs {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            uncertainty: StdRng::seed_from_u64(seed),
            attribution: StdRng::seed_from_u64(seed.wrapping_add(1)),
            random: StdRng::seed_from_u64(seed.wrapping_add(2)),
        }
    }
}

/// Monte Carlo mean and variance for every note.
pub fn score_instances<M: StochasticClassifier>(
    notes: &[Note],
    model: &M,
    samples: usize,
    rng: &mut dyn RngCore,
) -> Result<Vec<ScoredInstance>> {
    let texts: Vec<String> = notes.iter().map(|n| n.text.clone()).collect();
    let estimates = estimate_uncertainty(&texts, model, samples, rng)?;
    Ok(notes
        .iter()
        .zip(estimates)
        .map(|(note, u)| ScoredInstance {
            id: note.id.clone(),
            text: note.text.clone(),
            label: note.label,
            probability: u.mean,
            variance: u.variance,
        })
        .collect())
}

/// Pick `count` instances by variance; ties broken by id, numeric ids in numeric order.
pub fn select_instances(
    scored: &[ScoredInstance],
    policy: SelectionPolicy,
    count: usize,
) -> Vec<ScoredInstance> {
    let mut pool: Vec<&ScoredInstance> = scored.iter().collect();
    pool.sort_by(|a, b| {
        let by_variance = match policy {
            SelectionPolicy::Confident => a.variance.total_cmp(&b.variance),
            SelectionPolicy::Uncertain => b.variance.total_cmp(&a.variance),
        };
        by_variance.then_with(|| id_key(&a.id).cmp(&id_key(&b.id)))
    });
    pool.into_iter().take(count).cloned().collect()
}

/// Integer ids sort before other ids and compare numerically.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum IdKey<'a> {
    Numeric(i64, &'a str),
    Text(&'a str),
}

fn id_key(id: &str) -> IdKey<'_> {
    match id.parse::<i64>() {
        Ok(n) => IdKey::Numeric(n, id),
        Err(_) => IdKey::Text(id),
    }
}

/// Rank tokens three ways and trace their deletion curves for one instance.
pub fn explain_one<M: StochasticClassifier>(
    instance: &ScoredInstance,
    focus_tokens: &[(String, f64)],
    model: &M,
    config: &ExperimentConfig,
    rngs: &mut StageRngs,
) -> Result<InstanceExplanation> {
    let target_class = instance.predicted_label();
    let width = common_width(&instance.text, config.num_features);
    let lime = LimeConfig::with_samples(config.lime_samples);

    let rankings = StrategyRankings {
        attribution: lime_ranking(
            &instance.text,
            target_class,
            width,
            model,
            &lime,
            &mut rngs.attribution,
        )?,
        focus: focus_ranking(&instance.text, focus_tokens, width),
        random: random_ranking(&instance.text, width, &mut rngs.random),
    };

    let mut curves = HashMap::new();
    for strategy in Strategy::ALL {
        let curve = deletion_curve(
            &instance.text,
            rankings.get(strategy),
            &config.fractions,
            target_class,
            model,
        )?;
        curves.insert(strategy, curve);
    }
    Ok(InstanceExplanation {
        instance: instance.clone(),
        target_class,
        rankings,
        curves,
    })
}

/// Full pipeline over `notes`; `focus` maps note ids to precomputed focus tokens.
pub fn run_explanation<M: StochasticClassifier>(
    notes: &[Note],
    focus: &HashMap<String, Vec<(String, f64)>>,
    model: &M,
    config: &ExperimentConfig,
) -> Result<ExplanationReport> {
    config.validate()?;
    if notes.is_empty() {
        return Err(LosError::EmptyDataset);
    }
    let mut rngs = StageRngs::from_seed(config.seed);
    let scored = score_instances(notes, model, config.mc_samples, &mut rngs.uncertainty)?;
    let selected = select_instances(&scored, config.selection, config.instances);
    info!(
        candidates = scored.len(),
        selected = selected.len(),
        policy = ?config.selection,
        "selected instances to explain"
    );

    let mut instances = Vec::with_capacity(selected.len());
    for instance in &selected {
        let tokens = focus.get(&instance.id).map(Vec::as_slice).unwrap_or(&[]);
        let explanation = explain_one(instance, tokens, model, config, &mut rngs)?;
        info!(
            id = %instance.id,
            attribution_auc = explanation.auc(Strategy::Attribution),
            focus_auc = explanation.auc(Strategy::Focus),
            random_auc = explanation.auc(Strategy::Random),
            "explained instance"
        );
        instances.push(explanation);
    }

    let mut aggregates = Vec::new();
    for strategy in Strategy::ALL {
        let curves: Vec<DeletionCurve> = instances
            .iter()
            .filter_map(|e| e.curves.get(&strategy).cloned())
            .collect();
        let agg = aggregate(strategy, &curves)?;
        info!(%strategy, auc = agg.auc, "aggregate deletion curve");
        aggregates.push(agg);
    }
    Ok(ExplanationReport {
        instances,
        aggregates,
    })
}

const EXPLANATION_HEADERS: &[&str] = &[
    "id",
    "true_label",
    "predicted_label",
    "probability",
    "variance",
    "attribution_tokens",
    "focus_tokens",
    "random_tokens",
    "auc_attribution",
    "auc_focus",
    "auc_random",
];

impl ExplanationReport {
    /// Summary table, aggregate curves and plots under `dir`.
    ///
    /// Plot failures are logged; the tables are the primary artefacts.
    pub fn write(&self, dir: &Path, notes: &[Note]) -> Result<()> {
        let by_id: HashMap<&str, &Note> = notes.iter().map(|n| (n.id.as_str(), n)).collect();
        let empty = indexmap::IndexMap::new();
        let passthrough: Vec<_> = self
            .instances
            .iter()
            .map(|e| by_id.get(e.instance.id.as_str()).map_or(&empty, |n| &n.extra))
            .collect();
        let rows: Vec<Vec<String>> = self
            .instances
            .iter()
            .map(|e| {
                vec![
                    e.instance.id.clone(),
                    e.instance.label.to_string(),
                    e.target_class.to_string(),
                    format!("{:.6}", e.instance.probability),
                    format!("{:.6}", e.instance.variance),
                    e.rankings.attribution.render(),
                    e.rankings.focus.render(),
                    e.rankings.random.render(),
                    format!("{:.6}", e.auc(Strategy::Attribution)),
                    format!("{:.6}", e.auc(Strategy::Focus)),
                    format!("{:.6}", e.auc(Strategy::Random)),
                ]
            })
            .collect();
        export::write_with_passthrough(
            &dir.join("explanations.csv"),
            &passthrough,
            EXPLANATION_HEADERS,
            &rows,
        )?;

        let agg_rows: Vec<AggregateRow> = self.aggregates.iter().flat_map(|a| a.rows()).collect();
        export::write_records(&dir.join("deletion_aggregate.csv"), &agg_rows)?;

        let files = plot_file_names(self.instances.iter().map(|e| e.instance.id.as_str()));
        for (e, file) in self.instances.iter().zip(files) {
            let curves: Vec<(Strategy, &DeletionCurve)> = Strategy::ALL
                .iter()
                .filter_map(|s| e.curves.get(s).map(|c| (*s, c)))
                .collect();
            let title = format!("Deletion curves, note {}", e.instance.id);
            if let Err(err) = plot_curves(&dir.join(file), &title, &curves) {
                warn!(id = %e.instance.id, %err, "skipping instance plot");
            }
        }
        let curves: Vec<(Strategy, &DeletionCurve)> =
            self.aggregates.iter().map(|a| (a.strategy, &a.curve)).collect();
        let title = format!("Mean deletion curves ({} notes)", self.instances.len());
        if let Err(err) = plot_curves(&dir.join("deletion_aggregate.svg"), &title, &curves) {
            warn!(%err, "skipping aggregate plot");
        }
        Ok(())
    }
}

fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// One `deletion_<id>.svg` name per id; ids that sanitise alike get a numeric suffix.
fn plot_file_names<'a>(ids: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut used = HashSet::new();
    ids.into_iter()
        .map(|id| {
            let stem = sanitize(id);
            let mut name = format!("deletion_{stem}.svg");
            let mut n = 2;
            while !used.insert(name.clone()) {
                name = format!("deletion_{stem}_{n}.svg");
                n += 1;
            }
            name
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(id: &str, variance: f64) -> ScoredInstance {
        ScoredInstance {
            id: id.into(),
            text: "fever".into(),
            label: 1,
            probability: 0.8,
            variance,
        }
    }

    fn ids(selected: &[ScoredInstance]) -> Vec<&str> {
        selected.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn confident_takes_lowest_variance() {
        let pool = [scored("a", 0.3), scored("b", 0.1), scored("c", 0.2)];
        let picked = select_instances(&pool, SelectionPolicy::Confident, 2);
        assert_eq!(ids(&picked), ["b", "c"]);
    }

    #[test]
    fn uncertain_takes_highest_variance() {
        let pool = [scored("a", 0.3), scored("b", 0.1), scored("c", 0.2)];
        let picked = select_instances(&pool, SelectionPolicy::Uncertain, 2);
        assert_eq!(ids(&picked), ["a", "c"]);
    }

    #[test]
    fn variance_ties_use_numeric_id_order() {
        let pool = [scored("10", 0.05), scored("9", 0.05), scored("x1", 0.05)];
        let picked = select_instances(&pool, SelectionPolicy::Confident, 3);
        assert_eq!(ids(&picked), ["9", "10", "x1"]);
        let picked = select_instances(&pool, SelectionPolicy::Uncertain, 1);
        assert_eq!(ids(&picked), ["9"]);
    }

    #[test]
    fn colliding_ids_get_distinct_plot_files() {
        let names = plot_file_names(["a/b", "a_b", "a b", "c"]);
        assert_eq!(
            names,
            [
                "deletion_a_b.svg",
                "deletion_a_b_2.svg",
                "deletion_a_b_3.svg",
                "deletion_c.svg"
            ]
        );
    }
}
