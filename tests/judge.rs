use los_explain::{
    llm::{judge, judge_all, parse_judgement, ChatMessage, Completion, Judgement, ReasoningRow},
    LosError, Result,
};

#[test]
fn parses_well_formed_reply() {
    let j = parse_judgement(r#"{"score":4,"comment":"clear"}"#);
    assert_eq!(j.score(), Some(4));
    assert_eq!(j.comment(), "clear");
}

#[test]
fn falls_back_to_raw_text() {
    let j = parse_judgement("not json");
    assert_eq!(
        j,
        Judgement::Unparsed {
            raw: "not json".into()
        }
    );
    assert_eq!(j.score(), None);
    assert_eq!(j.comment(), "not json");
}

struct Canned(&'static str);

impl Completion for Canned {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        assert_eq!(messages[0].role, "system");
        Ok(self.0.to_string())
    }
}

struct Offline;

impl Completion for Offline {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String> {
        Err(LosError::Inference("connection refused".into()))
    }
}

#[tokio::test]
async fn judge_parses_remote_reply() {
    let j = judge::judge(
        &Canned("```json\n{\"score\": 5, \"comment\": \"well grounded\"}\n```"),
        "note",
        1,
        "because of sepsis",
    )
    .await;
    assert_eq!(j.score(), Some(5));
}

#[tokio::test]
async fn failed_call_degrades_to_empty_unparsed() {
    let trace = ReasoningRow {
        id: "7".into(),
        predicted_label: 1,
        probability: 0.9,
        focus_set: "sepsis".into(),
        reasoning: "sepsis requiring pressors".into(),
    };
    let rows = judge_all(&Offline, &[trace], |_| Some("note".into())).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].score, None);
    assert_eq!(rows[0].comment, "");
    assert!(!rows[0].parsed);
}
