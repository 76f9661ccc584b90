//! CLI entry-point for fitting and evaluating the classifier.

use anyhow::Result;
use clap::Args as ClapArgs;
use rand::{rngs::StdRng, SeedableRng};
use tracing::{info, instrument};

use super::{InputArgs, ModelArgs};
use crate::{
    config::{ExperimentConfig, Settings},
    data::export,
    explain::pipeline::score_instances,
    model::metrics,
};

/// Args for the `train` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub model: ModelArgs,
}

const PREDICTION_HEADERS: &[&str] = &[
    "id",
    "true_label",
    "predicted_label",
    "probability",
    "variance",
];

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let mut config = ExperimentConfig::default();
    args.model.apply(&settings, &mut config);
    let prepared = super::prepare(&args.input, &config)?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let scored = score_instances(&prepared.test, &prepared.model, config.mc_samples, &mut rng)?;

    let labels: Vec<u8> = scored.iter().map(|s| s.label).collect();
    let probs: Vec<f64> = scored.iter().map(|s| s.probability).collect();
    let metrics = metrics::evaluate(&labels, &probs);
    info!(
        accuracy = metrics.accuracy,
        f1 = metrics.f1,
        roc_auc = ?metrics.roc_auc,
        "held-out evaluation"
    );

    let passthrough: Vec<_> = prepared.test.iter().map(|n| &n.extra).collect();
    let rows: Vec<Vec<String>> = scored
        .iter()
        .map(|s| {
            vec![
                s.id.clone(),
                s.label.to_string(),
                s.predicted_label().to_string(),
                format!("{:.6}", s.probability),
                format!("{:.6}", s.variance),
            ]
        })
        .collect();
    export::write_with_passthrough(
        &settings.join_output("predictions.csv"),
        &passthrough,
        PREDICTION_HEADERS,
        &rows,
    )?;
    export::write_json(&settings.join_output("metrics.json"), &metrics)?;
    export::write_json(&settings.join_output("config.json"), &config)?;
    Ok(())
}
