//! CLI entry-point for generating reasoning traces.

use anyhow::Result;
use clap::Args as ClapArgs;
use rand::{rngs::StdRng, SeedableRng};
use tracing::instrument;

use super::{InputArgs, ModelArgs};
use crate::{
    config::{ExperimentConfig, SelectionPolicy, Settings},
    data::export,
    explain::pipeline::{score_instances, select_instances},
    llm::{reasoning, ChatClient},
    nlp::{focus::FocusSet, keywords::RakeExtractor, ner::DictionaryNer},
};

/// Args for the `reason` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub model: ModelArgs,
    /// Held-out notes to reason about.
    #[arg(long, default_value_t = 10)]
    pub instances: usize,
    /// Which held-out notes to reason about.
    #[arg(long, value_enum, default_value = "confident")]
    pub selection: SelectionPolicy,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let mut config = ExperimentConfig::default();
    args.model.apply(&settings, &mut config);
    config.instances = args.instances;
    config.selection = args.selection;
    let prepared = super::prepare(&args.input, &config)?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let scored = score_instances(&prepared.test, &prepared.model, config.mc_samples, &mut rng)?;
    let selected = select_instances(&scored, config.selection, config.instances);

    let rake = RakeExtractor::default();
    let focus_sets: Vec<String> = selected
        .iter()
        .map(|s| FocusSet::extract(&s.text, &rake, &DictionaryNer).render())
        .collect();

    let client = ChatClient::new(&settings, &settings.reasoning_model)?;
    let rows = reasoning::generate_all(&client, &selected, &focus_sets).await;
    export::write_records(&settings.join_output("reasoning.csv"), &rows)?;
    Ok(())
}
