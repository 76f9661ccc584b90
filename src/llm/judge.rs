//! Model-as-judge scoring of reasoning traces.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::client::{ChatMessage, Completion};

/// Outcome of parsing a judge reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Judgement {
    /// The reply held a valid `{"score", "comment"}` object.
    Parsed { score: i64, comment: String },
    /// Anything else; the raw reply is kept verbatim.
    Unparsed { raw: String },
}

impl Judgement {
    pub fn score(&self) -> Option<i64> {
        match self {
            Self::Parsed { score, .. } => Some(*score),
            Self::Unparsed { .. } => None,
        }
    }

    /// Parsed comment, or the raw reply when parsing failed.
    pub fn comment(&self) -> &str {
        match self {
            Self::Parsed { comment, .. } => comment,
            Self::Unparsed { raw } => raw,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct JudgeReply {
    score: i64,
    comment: String,
}

pub const SCORE_RANGE: std::ops::RangeInclusive<i64> = 1..=5;

static OBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));
static FIRST_OBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*?\}").expect("valid regex"));

/// Pull the JSON object out of a judge reply; fall back to the raw text.
pub fn parse_judgement(raw: &str) -> Judgement {
    let candidates = [OBJECT.find(raw), FIRST_OBJECT.find(raw)];
    for m in candidates.into_iter().flatten() {
        if let Ok(reply) = serde_json::from_str::<JudgeReply>(m.as_str()) {
            if SCORE_RANGE.contains(&reply.score) {
                return Judgement::Parsed {
                    score: reply.score,
                    comment: reply.comment,
                };
            }
        }
    }
    Judgement::Unparsed {
        raw: raw.to_string(),
    }
}

/// Conversation asking the judge to rate a reasoning trace.
pub fn judge_prompt(note: &str, predicted_label: u8, reasoning: &str) -> Vec<ChatMessage> {
    let outcome = if predicted_label == 1 {
        "prolonged length of stay"
    } else {
        "normal length of stay"
    };
    vec![
        ChatMessage::system(
            "You are an attending physician auditing explanations of a length-of-stay \
             prediction model. Rate how well the explanation is supported by the note, \
             clinically plausible and specific. Reply with only a JSON object: \
             {\"score\": <integer 1-5>, \"comment\": \"<one sentence>\"}.",
        ),
        ChatMessage::user(format!(
            "Discharge note:\n{note}\n\nModel prediction: {outcome}\n\nExplanation:\n{reasoning}"
        )),
    ]
}

/// Ask the judge once. Call failures are logged and recorded as an empty unparsed reply.
pub async fn judge<C: Completion>(
    client: &C,
    note: &str,
    predicted_label: u8,
    reasoning: &str,
) -> Judgement {
    match client
        .complete(&judge_prompt(note, predicted_label, reasoning))
        .await
    {
        Ok(reply) => parse_judgement(&reply),
        Err(err) => {
            warn!(%err, "judge call failed");
            Judgement::Unparsed { raw: String::new() }
        }
    }
}
