//! CLI entry-point for focus-set extraction.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use super::InputArgs;
use crate::{
    config::Settings,
    data::export,
    nlp::{self, keywords::RakeExtractor, ner::DictionaryNer, FocusRow},
};

/// Args for the `focus` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[command(flatten)]
    pub input: InputArgs,
    /// Keyphrases kept per note.
    #[arg(long, default_value_t = 10)]
    pub top_keywords: usize,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let notes = args.input.load()?;
    let rake = RakeExtractor {
        top_n: args.top_keywords,
        ..RakeExtractor::default()
    };
    let sets = nlp::extract_focus_sets(&notes, &rake, &DictionaryNer);
    let rows: Vec<FocusRow> = notes
        .iter()
        .zip(&sets)
        .map(|(note, focus)| FocusRow::new(note, focus))
        .collect();
    export::write_records(&settings.join_output("focus_sets.csv"), &rows)?;
    Ok(())
}
