//! Parsing untrusted oracle replies into a [`Decision`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use marchlands_protocol::ProposedAction;

use crate::OracleError;

/// What the oracle wants to do: a stated intention and an ordered plan.
///
/// Actions stay loosely typed; each is parsed and validated only when it
/// reaches the front of the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub intention: String,
    pub actions: Vec<ProposedAction>,
}

impl Decision {
    pub fn new(intention: impl Into<String>, actions: Vec<ProposedAction>) -> Self {
        Self {
            intention: intention.into(),
            actions,
        }
    }

    pub fn end_turn(intention: impl Into<String>) -> Self {
        Self::new(intention, vec![ProposedAction::end_turn()])
    }
}

/// Body of a fenced code block (```json first, then any fence), else the
/// whole reply.
pub fn strip_fence(reply: &str) -> &str {
    for opener in ["```json", "```"] {
        if let Some(start) = reply.find(opener) {
            let body = &reply[start + opener.len()..];
            if let Some(end) = body.find("```") {
                return body[..end].trim();
            }
        }
    }
    reply.trim()
}

/// Accepts `{intention, actions: [..]}` with a non-empty plan, or the older
/// single-action `{intention, action, parameters}` shape.
pub fn parse_reply(reply: &str) -> Result<Decision, OracleError> {
    let body = strip_fence(reply);
    let value: Value =
        serde_json::from_str(body).map_err(|err| OracleError::Malformed(err.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(OracleError::Malformed("reply is not a JSON object".into()));
    };

    let intention = fields
        .get("intention")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| OracleError::Malformed("missing intention".into()))?
        .to_string();

    if let Some(actions) = fields.get("actions") {
        let actions: Vec<ProposedAction> = serde_json::from_value(actions.clone())
            .map_err(|err| OracleError::Malformed(format!("bad actions list: {err}")))?;
        if actions.is_empty() {
            return Err(OracleError::Malformed("empty actions list".into()));
        }
        return Ok(Decision { intention, actions });
    }

    let action = fields
        .get("action")
        .and_then(Value::as_str)
        .ok_or_else(|| OracleError::Malformed("neither actions nor action present".into()))?;
    let parameters = fields
        .get("parameters")
        .cloned()
        .unwrap_or_else(|| serde_json::json!({}));
    Ok(Decision {
        intention,
        actions: vec![ProposedAction::new(action, parameters)],
    })
}
