//! CLI entry-point for judging reasoning traces.

use std::{collections::HashMap, path::PathBuf};

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use super::InputArgs;
use crate::{
    config::Settings,
    data::export,
    llm::{self, ChatClient, ReasoningRow},
};

/// Args for the `judge` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[command(flatten)]
    pub input: InputArgs,
    /// Traces written by `reason`; defaults to `<outputs>/reasoning.csv`.
    #[arg(long)]
    pub reasoning: Option<PathBuf>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let notes = args.input.load()?;
    let texts: HashMap<String, String> = notes.into_iter().map(|n| (n.id, n.text)).collect();

    let path = args
        .reasoning
        .clone()
        .unwrap_or_else(|| settings.join_output("reasoning.csv"));
    let mut reader =
        csv::Reader::from_path(&path).with_context(|| format!("open {}", path.display()))?;
    let traces = reader
        .deserialize()
        .collect::<Result<Vec<ReasoningRow>, _>>()
        .with_context(|| format!("parse {}", path.display()))?;

    let client = ChatClient::new(&settings, &settings.judge_model)?;
    let rows = llm::judge_all(&client, &traces, |id| texts.get(id).cloned()).await;
    export::write_records(&settings.join_output("judgements.csv"), &rows)?;
    Ok(())
}
