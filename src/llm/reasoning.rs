//! Natural-language reasoning traces for model predictions.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::client::{ChatMessage, Completion};
use crate::explain::ScoredInstance;

/// One generated trace, as written to `reasoning.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningRow {
    pub id: String,
    pub predicted_label: u8,
    pub probability: f64,
    pub focus_set: String,
    pub reasoning: String,
}

/// Conversation asking for a short clinical rationale grounded in the focus set.
pub fn reasoning_prompt(note: &str, probability: f64, focus_set: &str) -> Vec<ChatMessage> {
    let outcome = if probability >= 0.5 {
        "a prolonged hospital stay"
    } else {
        "a normal-length hospital stay"
    };
    vec![
        ChatMessage::system(
            "You are a clinical reasoning assistant. Explain step by step, in at most five \
             short sentences, which findings in a discharge note support a predicted \
             length-of-stay outcome. Cite only information present in the note.",
        ),
        ChatMessage::user(format!(
            "Discharge note:\n{note}\n\nKey findings: {focus_set}\n\n\
             A classifier predicts {outcome} (probability {probability:.2}). \
             Explain the reasoning."
        )),
    ]
}

/// One trace; a failed call is logged and yields an empty string.
pub async fn generate_reasoning<C: Completion>(
    client: &C,
    instance: &ScoredInstance,
    focus_set: &str,
) -> String {
    let prompt = reasoning_prompt(&instance.text, instance.probability, focus_set);
    match client.complete(&prompt).await {
        Ok(text) => text.trim().to_string(),
        Err(err) => {
            warn!(id = %instance.id, %err, "reasoning call failed");
            String::new()
        }
    }
}

/// Traces for each instance in order, one call at a time.
pub async fn generate_all<C: Completion>(
    client: &C,
    instances: &[ScoredInstance],
    focus_sets: &[String],
) -> Vec<ReasoningRow> {
    let mut rows = Vec::with_capacity(instances.len());
    for (instance, focus_set) in instances.iter().zip(focus_sets) {
        let reasoning = generate_reasoning(client, instance, focus_set).await;
        rows.push(ReasoningRow {
            id: instance.id.clone(),
            predicted_label: instance.predicted_label(),
            probability: instance.probability,
            focus_set: focus_set.clone(),
            reasoning,
        });
    }
    let empty = rows.iter().filter(|r| r.reasoning.is_empty()).count();
    info!(rows = rows.len(), empty, "generated reasoning traces");
    rows
}
