//! Directives: queued units of NPC behavior
//!
//! The decision service sends directives as `{"type": ..., "parameters": {...}}`.
//! Decoding never fails: anything that cannot be understood becomes
//! [`Directive::Unknown`], which the executor logs and drops.

use crate::core::types::Vec2;
use serde_json::{Map, Value};
use std::fmt;

/// How a switch directive changes the switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchMode {
    Toggle,
    On,
    Off,
}

impl SwitchMode {
    /// Unrecognized or missing modes fall back to `Toggle`
    pub fn parse(mode: Option<&str>) -> Self {
        match mode {
            Some("on") => SwitchMode::On,
            Some("off") => SwitchMode::Off,
            _ => SwitchMode::Toggle,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    MoveTo(Vec2),
    ToggleSwitch { name: String, mode: SwitchMode },
    Wait { duration_ms: u64 },
    Say { text: String },
    MessageEntity { target: String, text: String },
    Unknown { tag: String, reason: String },
}

const DEFAULT_WAIT_MS: u64 = 1_000;

impl Directive {
    /// Decode one wire action
    pub fn from_wire(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::unknown("", "action is not an object");
        };
        let tag = object.get("type").and_then(Value::as_str).unwrap_or_default();
        let empty = Map::new();
        let params = object
            .get("parameters")
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        match tag {
            "move_to_coordinates" => match (number(params, "x"), number(params, "y")) {
                (Some(x), Some(y)) => Directive::MoveTo(Vec2::new(x as f32, y as f32)),
                _ => Self::unknown(tag, "missing x or y"),
            },
            "toggle_switch" => match string(params, "name") {
                Some(name) => Directive::ToggleSwitch {
                    name: name.to_string(),
                    mode: SwitchMode::parse(string(params, "state")),
                },
                None => Self::unknown(tag, "missing switch name"),
            },
            "wait" => Directive::Wait {
                duration_ms: number(params, "duration_ms")
                    .map(|ms| ms.max(0.0) as u64)
                    .unwrap_or(DEFAULT_WAIT_MS),
            },
            "say" => Directive::Say {
                text: string(params, "text").unwrap_or_default().to_string(),
            },
            "talk_to_npc" => {
                let target = string(params, "target_npc_name").filter(|s| !s.is_empty());
                let text = string(params, "message").filter(|s| !s.is_empty());
                match (target, text) {
                    (Some(target), Some(text)) => Directive::MessageEntity {
                        target: target.to_string(),
                        text: text.to_string(),
                    },
                    _ => Self::unknown(tag, "missing target_npc_name or message"),
                }
            }
            // Per-switch shorthand, e.g. "toggle_game_end_button"
            other => match other.strip_prefix("toggle_").filter(|n| !n.is_empty()) {
                Some(name) => Directive::ToggleSwitch {
                    name: name.to_string(),
                    mode: SwitchMode::parse(string(params, "state")),
                },
                None => Self::unknown(other, "unknown action type"),
            },
        }
    }

    /// Decode a list of wire actions, keeping their order
    pub fn from_wire_list(values: &[Value]) -> Vec<Directive> {
        values.iter().map(Directive::from_wire).collect()
    }

    fn unknown(tag: &str, reason: &str) -> Self {
        Directive::Unknown {
            tag: tag.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Wire tag for logging
    pub fn tag(&self) -> &str {
        match self {
            Directive::MoveTo(_) => "move_to_coordinates",
            Directive::ToggleSwitch { .. } => "toggle_switch",
            Directive::Wait { .. } => "wait",
            Directive::Say { .. } => "say",
            Directive::MessageEntity { .. } => "talk_to_npc",
            Directive::Unknown { tag, .. } => tag,
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::MoveTo(p) => write!(f, "move to ({},{})", p.x, p.y),
            Directive::ToggleSwitch { name, mode } => write!(f, "switch {} {:?}", name, mode),
            Directive::Wait { duration_ms } => write!(f, "wait {}ms", duration_ms),
            Directive::Say { text } => write!(f, "say {:?}", text),
            Directive::MessageEntity { target, text } => write!(f, "tell {} {:?}", target, text),
            Directive::Unknown { tag, reason } => write!(f, "unknown {:?} ({})", tag, reason),
        }
    }
}

fn number(params: &Map<String, Value>, key: &str) -> Option<f64> {
    match params.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn string<'a>(params: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    params.get(key).and_then(Value::as_str)
}
