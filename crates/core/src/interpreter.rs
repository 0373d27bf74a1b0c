//! Response Interpreter
//!
//! Turns the raw text of a model reply into a [`Decision`]. Models wrap JSON in
//! prose or code fences, drop fields, and invent labels, so interpretation is
//! layered:
//!
//! 1. parse the whole reply as a JSON object;
//! 2. parse the first balanced `{...}` span found in the reply (falling back
//!    to the span from the first `{` to the last `}`);
//! 3. give up and treat the reply text as a plain question in the current
//!    stage.
//!
//! Interpretation never fails. When the fallback was taken the reason is
//! reported alongside the decision so the caller can log it.

use serde_json::{Map, Value};

use crate::decision::{AnswerEvaluation, Decision, DecisionAction, EMPTY_RESPONSE_MESSAGE};
use crate::error::CoreError;
use crate::question::QuestionCategory;
use crate::session::InterviewStage;

/// Outcome of interpreting one reply
#[derive(Debug)]
pub struct Interpretation {
    pub decision: Decision,
    /// Set when the reply did not match the decision schema and the fallback
    /// decision was produced instead.
    pub error: Option<CoreError>,
}

impl Interpretation {
    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }
}

/// Interpret `raw` as a decision made during `current_stage`.
pub fn interpret(raw: &str, current_stage: InterviewStage) -> Interpretation {
    let text = raw.trim();
    if text.is_empty() {
        return Interpretation {
            decision: Decision::fallback(EMPTY_RESPONSE_MESSAGE, current_stage),
            error: Some(CoreError::malformed("empty response")),
        };
    }

    match structured_decision(text, current_stage) {
        Ok(decision) => Interpretation {
            decision,
            error: None,
        },
        Err(err) => Interpretation {
            decision: Decision::fallback(text, current_stage),
            error: Some(err),
        },
    }
}

fn structured_decision(text: &str, current_stage: InterviewStage) -> Result<Decision, CoreError> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text) {
        return decision_from_object(&map, current_stage);
    }

    for candidate in json_object_candidates(text) {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(candidate) {
            return decision_from_object(&map, current_stage);
        }
    }

    Err(CoreError::malformed("no JSON object found in response"))
}

/// Candidate spans for step 2, most specific first.
fn json_object_candidates(text: &str) -> Vec<&str> {
    let mut candidates = Vec::new();
    let Some(start) = text.find('{') else {
        return candidates;
    };

    if let Some(end) = balanced_object_end(text, start) {
        candidates.push(&text[start..=end]);
    }
    if let Some(last) = text.rfind('}') {
        if last > start {
            let span = &text[start..=last];
            if !candidates.contains(&span) {
                candidates.push(span);
            }
        }
    }
    candidates
}

/// Byte index of the `}` closing the object opened at `start`. Braces inside
/// JSON strings are ignored.
fn balanced_object_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}

fn decision_from_object(
    map: &Map<String, Value>,
    current_stage: InterviewStage,
) -> Result<Decision, CoreError> {
    let message = map
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| CoreError::malformed("decision has no message"))?;

    let action = label(map, "action")
        .and_then(|s| s.parse::<DecisionAction>().ok())
        .unwrap_or_default();

    Ok(Decision {
        message: message.to_string(),
        stage: label(map, "stage")
            .and_then(|s| s.parse().ok())
            .unwrap_or(current_stage),
        action,
        question_category: label(map, "question_category")
            .and_then(|s| s.parse::<QuestionCategory>().ok()),
        evaluation: map.get("evaluation").and_then(evaluation_from_value),
        next_stage: label(map, "next_stage").and_then(|s| s.parse().ok()),
    })
}

fn label<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn evaluation_from_value(value: &Value) -> Option<AnswerEvaluation> {
    let obj = value.as_object()?;
    let score = obj.get("score").and_then(|s| match s {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    });
    let feedback = obj
        .get("feedback")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string);

    if score.is_none() && feedback.is_none() {
        return None;
    }

    Some(AnswerEvaluation {
        score: score.filter(|s| s.is_finite()).map(|s| s.clamp(0.0, 10.0)),
        feedback,
    })
}
