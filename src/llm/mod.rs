//! Remote language-model collaborators: reasoning generation and judging.

pub mod client;
pub mod judge;
pub mod reasoning;

use serde::Serialize;
use tracing::info;

pub use client::{ChatClient, ChatMessage, Completion};
pub use judge::{parse_judgement, Judgement};
pub use reasoning::ReasoningRow;

/// One judged trace, as written to `judgements.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JudgementRow {
    pub id: String,
    pub score: Option<i64>,
    pub comment: String,
    pub parsed: bool,
}

impl JudgementRow {
    pub fn new(id: &str, judgement: &Judgement) -> Self {
        Self {
            id: id.to_string(),
            score: judgement.score(),
            comment: judgement.comment().to_string(),
            parsed: judgement.score().is_some(),
        }
    }
}

/// Judge every trace against its note; `note_text` looks up note text by id.
pub async fn judge_all<C, F>(client: &C, traces: &[ReasoningRow], note_text: F) -> Vec<JudgementRow>
where
    C: Completion,
    F: Fn(&str) -> Option<String>,
{
    let mut rows = Vec::with_capacity(traces.len());
    for trace in traces {
        let note = note_text(&trace.id).unwrap_or_default();
        let judgement = judge::judge(client, &note, trace.predicted_label, &trace.reasoning).await;
        rows.push(JudgementRow::new(&trace.id, &judgement));
    }
    let parsed = rows.iter().filter(|r| r.parsed).count();
    info!(rows = rows.len(), parsed, "judged reasoning traces");
    rows
}
