//! Decoding decision service replies
//!
//! A reply is a JSON object with optional `actions` (a list of wire
//! directives) and `speech` (a string). An `actions` value that is not a
//! list is ignored; `speech` of any type other than string or null makes
//! the whole reply invalid.

use crate::core::error::DecisionError;
use crate::entity::Directive;
use serde::Deserialize;
use serde_json::Value;

/// Decoded reply
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecisionResponse {
    pub actions: Vec<Directive>,
    pub speech: Option<String>,
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    actions: Value,
    #[serde(default)]
    speech: Option<String>,
}

pub fn parse_response(body: &str) -> Result<DecisionResponse, DecisionError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| DecisionError::InvalidResponse(e.to_string()))?;
    if !value.is_object() {
        return Err(DecisionError::InvalidResponse(
            "reply is not a JSON object".into(),
        ));
    }

    let wire: WireResponse = serde_json::from_value(value)
        .map_err(|e| DecisionError::InvalidResponse(e.to_string()))?;

    let actions = match &wire.actions {
        Value::Array(items) => Directive::from_wire_list(items),
        Value::Null => Vec::new(),
        other => {
            tracing::warn!(actions = %other, "ignoring non-list actions");
            Vec::new()
        }
    };

    Ok(DecisionResponse {
        actions,
        speech: wire.speech,
    })
}
