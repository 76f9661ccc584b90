//! CLI entry-point for the deletion-curve faithfulness study.

use std::collections::HashMap;

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use super::{InputArgs, ModelArgs};
use crate::{
    config::{ExperimentConfig, SelectionPolicy, Settings},
    data::export,
    explain::run_explanation,
    nlp::{self, focus::focus_tokens, keywords::RakeExtractor, ner::DictionaryNer},
};

/// Args for the `explain` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub model: ModelArgs,
    /// Held-out notes to explain.
    #[arg(long, default_value_t = 10)]
    pub instances: usize,
    /// Which held-out notes to explain.
    #[arg(long, value_enum, default_value = "confident")]
    pub selection: SelectionPolicy,
    /// Tokens per ranking.
    #[arg(long, default_value_t = 10)]
    pub num_features: usize,
    /// Perturbed samples per local explanation.
    #[arg(long, default_value_t = 1000)]
    pub lime_samples: usize,
    /// Evenly spaced deletion steps between 0 and 1.
    #[arg(long, default_value_t = 10, conflicts_with = "fractions")]
    pub steps: usize,
    /// Explicit comma-separated deletion fractions.
    #[arg(long, value_delimiter = ',')]
    pub fractions: Option<Vec<f64>>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let mut config = ExperimentConfig::default();
    args.model.apply(&settings, &mut config);
    config.instances = args.instances;
    config.selection = args.selection;
    config.num_features = args.num_features;
    config.lime_samples = args.lime_samples;
    config.fractions = args
        .fractions
        .clone()
        .unwrap_or_else(|| ExperimentConfig::even_fractions(args.steps));

    let prepared = super::prepare(&args.input, &config)?;

    let sets = nlp::extract_focus_sets(&prepared.test, &RakeExtractor::default(), &DictionaryNer);
    let focus: HashMap<String, Vec<(String, f64)>> = prepared
        .test
        .iter()
        .zip(&sets)
        .map(|(note, set)| (note.id.clone(), focus_tokens(&note.text, set)))
        .collect();

    let report = run_explanation(&prepared.test, &focus, &prepared.model, &config)?;
    for agg in &report.aggregates {
        info!(strategy = %agg.strategy, auc = agg.auc, instances = agg.instances, "faithfulness");
    }
    report.write(&settings.outputs_dir, &prepared.test)?;
    export::write_json(&settings.join_output("config.json"), &config)?;
    Ok(())
}
