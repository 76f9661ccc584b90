//! Command-line interface wiring for los-explain.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use rand::{rngs::StdRng, SeedableRng};
use tracing::info;

use crate::{
    config::{ExperimentConfig, Settings},
    data::{self, Note, NoteColumns},
    model::BowLogistic,
};

pub mod explain;
pub mod focus;
pub mod judge;
pub mod reason;
pub mod train;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "Length-of-stay explanation study", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Train(args) => train::run(args, settings).await,
            Commands::Focus(args) => focus::run(args, settings).await,
            Commands::Explain(args) => explain::run(args, settings).await,
            Commands::Reason(args) => reason::run(args, settings).await,
            Commands::Judge(args) => judge::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fit the classifier and score the held-out split with Monte Carlo dropout.
    Train(train::Args),
    /// Extract keyphrase and entity focus sets.
    Focus(focus::Args),
    /// Evaluate explanation faithfulness with deletion curves.
    Explain(explain::Args),
    /// Generate reasoning traces with a chat model.
    Reason(reason::Args),
    /// Score reasoning traces with a judge model.
    Judge(judge::Args),
}

/// Location and schema of the notes table.
#[derive(Debug, Clone, ClapArgs)]
pub struct InputArgs {
    /// CSV file with one note per row.
    #[arg(long)]
    pub input: PathBuf,
    /// Column holding the note text.
    #[arg(long, default_value = "text")]
    pub text_column: String,
    /// Column holding the binary outcome.
    #[arg(long, default_value = "long_los")]
    pub label_column: String,
    /// Identifier column passed through to outputs; row index when absent.
    #[arg(long, default_value = "hadm_id")]
    pub id_column: String,
}

impl InputArgs {
    pub fn columns(&self) -> NoteColumns {
        NoteColumns {
            text: self.text_column.clone(),
            label: self.label_column.clone(),
            id: Some(self.id_column.clone()),
        }
    }

    pub fn load(&self) -> Result<Vec<Note>> {
        data::load_notes(&self.input, &self.columns())
            .with_context(|| format!("load notes from {}", self.input.display()))
    }
}

/// Overrides for classifier and sampling tunables.
#[derive(Debug, Clone, ClapArgs)]
pub struct ModelArgs {
    /// Seed for every stochastic step; defaults to `SEED`.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Share of notes held out for evaluation.
    #[arg(long, default_value_t = 0.2)]
    pub test_fraction: f64,
    /// Stochastic forward passes per note.
    #[arg(long, default_value_t = 20)]
    pub mc_samples: usize,
    /// Input dropout rate used during sampling.
    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,
    /// Vocabulary size of the bag-of-words features.
    #[arg(long, default_value_t = 5000)]
    pub max_vocabulary: usize,
}

impl ModelArgs {
    pub fn apply(&self, settings: &Settings, config: &mut ExperimentConfig) {
        config.seed = self.seed.unwrap_or(settings.seed);
        config.test_fraction = self.test_fraction;
        config.mc_samples = self.mc_samples;
        config.dropout_rate = self.dropout;
        config.max_vocabulary = self.max_vocabulary;
    }
}

/// Held-out notes plus a classifier fitted on the remaining split.
pub struct Prepared {
    pub test: Vec<Note>,
    pub model: BowLogistic,
}

/// Load, split and fit according to `config`.
pub fn prepare(input: &InputArgs, config: &ExperimentConfig) -> Result<Prepared> {
    config.validate()?;
    let notes = input.load()?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let (train, test) = data::notes::train_test_split(&notes, config.test_fraction, &mut rng);
    info!(train = train.len(), test = test.len(), "split notes");
    let model = BowLogistic::fit(&train, config).context("fit classifier")?;
    Ok(Prepared { test, model })
}
