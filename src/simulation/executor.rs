//! Directive execution for a single NPC
//!
//! Directives that only touch the NPC itself (move, wait) are applied here.
//! Anything that reaches outside the NPC is returned as a
//! [`DirectiveEffect`] for the world to carry out, so an NPC never holds a
//! reference to another entity or to shared switch state.

use crate::core::types::{Vec2, WallMillis};
use crate::entity::{Directive, Goal, Npc, SwitchMode};

/// Work the world must do on behalf of an executed directive
#[derive(Debug, Clone, PartialEq)]
pub enum DirectiveEffect {
    Say { text: String },
    Switch { name: String, mode: SwitchMode },
    Message { target: String, text: String },
}

/// Label shown while walking to an externally chosen point
pub fn external_move_label(point: Vec2) -> String {
    format!("Moving to ({},{}) via AI", point.x, point.y)
}

/// The queue may drain: no timed wait is running and the NPC is not moving
pub fn is_ready(npc: &Npc, now_ms: WallMillis) -> bool {
    now_ms >= npc.busy_until_ms && npc.target.is_none()
}

/// Pop and execute at most one directive
///
/// Returns the executed directive (for reporting) and any outside effect.
pub fn execute_next(npc: &mut Npc, now_ms: WallMillis) -> Option<(Directive, Option<DirectiveEffect>)> {
    if !is_ready(npc, now_ms) {
        return None;
    }
    let directive = npc.queue.pop()?;
    tracing::debug!(npc = %npc.name, directive = %directive, "executing directive");

    let effect = match &directive {
        Directive::MoveTo(point) => {
            npc.target = Some(*point);
            npc.goal = Goal::MovingExternal(external_move_label(*point));
            tracing::info!(npc = %npc.name, x = point.x, y = point.y, "moving by decision");
            None
        }
        Directive::Wait { duration_ms } => {
            npc.busy_until_ms = now_ms.saturating_add(*duration_ms);
            tracing::info!(npc = %npc.name, duration_ms, "waiting");
            None
        }
        Directive::Say { text } => Some(DirectiveEffect::Say { text: text.clone() }),
        Directive::ToggleSwitch { name, mode } => Some(DirectiveEffect::Switch {
            name: name.clone(),
            mode: *mode,
        }),
        Directive::MessageEntity { target, text } => Some(DirectiveEffect::Message {
            target: target.clone(),
            text: text.clone(),
        }),
        Directive::Unknown { tag, reason } => {
            tracing::warn!(npc = %npc.name, %tag, %reason, "dropping unknown directive");
            None
        }
    };
    Some((directive, effect))
}
