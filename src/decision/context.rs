//! Context snapshot sent with every decision request
//!
//! Field names are the service's wire names. Positions are entity centers
//! rounded to whole units; energy is truncated to an integer.

use crate::core::clock::GameClock;
use crate::entity::Npc;
use crate::world::{EntityRegistry, Player, SwitchBoard};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// What caused a decision request
#[derive(Debug, Clone, PartialEq)]
pub enum DecisionEvent {
    Periodic,
    Attacked {
        attacker_name: String,
        damage_taken: f64,
        new_hp: f64,
    },
    PlayerInteraction {
        message: String,
    },
    NpcInteraction {
        speaker_name: String,
        message: String,
    },
}

impl DecisionEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            DecisionEvent::Periodic => "periodic_update",
            DecisionEvent::Attacked { .. } => "attacked",
            DecisionEvent::PlayerInteraction { .. } => "player_interaction",
            DecisionEvent::NpcInteraction { .. } => "npc_interaction",
        }
    }

    pub fn to_trigger(&self) -> EventTrigger {
        let data = match self {
            DecisionEvent::Periodic => Value::Null,
            DecisionEvent::Attacked {
                attacker_name,
                damage_taken,
                new_hp,
            } => json!({
                "attacker_name": attacker_name,
                "damage_taken": damage_taken,
                "new_hp": new_hp,
            }),
            DecisionEvent::PlayerInteraction { message } => json!({
                "interaction_type": "talk",
                "initiator_name": "Player",
                "message": message,
            }),
            DecisionEvent::NpcInteraction {
                speaker_name,
                message,
            } => json!({
                "interaction_type": "talk",
                "speaker_name": speaker_name,
                "message": message,
            }),
        };
        EventTrigger {
            kind: self.kind().to_string(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventTrigger {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelfState {
    pub x: i64,
    pub y: i64,
    pub hp: f64,
    pub energy: i64,
    pub current_goal: String,
    pub last_damage_source: Option<String>,
    pub action_queue_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerState {
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OtherNpcState {
    pub name: String,
    pub x: i64,
    pub y: i64,
    pub hp: f64,
    pub energy: i64,
    pub current_goal: String,
}

/// Full request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionRequest {
    pub session_id: String,
    pub npc_name: String,
    pub current_game_time: String,
    pub is_night: bool,
    pub self_state: SelfState,
    pub player_state: PlayerState,
    pub other_npcs_state: Vec<OtherNpcState>,
    pub game_world_state: BTreeMap<String, bool>,
    pub event_trigger: EventTrigger,
}

/// Read-only view of everything a snapshot is built from
pub struct SnapshotSources<'a> {
    pub session_id: &'a str,
    pub clock: &'a GameClock,
    pub registry: &'a EntityRegistry,
    pub player: &'a Player,
    pub switches: &'a SwitchBoard,
}

impl DecisionRequest {
    /// Capture the world as seen by `npc` at the moment `event` happened
    pub fn build(npc: &Npc, sources: &SnapshotSources<'_>, event: &DecisionEvent) -> Self {
        let center = npc.center();
        let player = sources.player.center();

        let other_npcs_state = sources
            .registry
            .iter_active()
            .filter(|other| other.id != npc.id)
            .map(|other| {
                let c = other.center();
                OtherNpcState {
                    name: other.name.clone(),
                    x: c.x.round() as i64,
                    y: c.y.round() as i64,
                    hp: other.health,
                    energy: other.energy.trunc() as i64,
                    current_goal: other.goal.to_string(),
                }
            })
            .collect();

        let game_world_state = sources
            .switches
            .iter()
            .map(|s| (format!("{}_on", s.name), s.on))
            .collect();

        Self {
            session_id: sources.session_id.to_string(),
            npc_name: npc.name.clone(),
            current_game_time: sources.clock.formatted(),
            is_night: sources.clock.is_night(),
            self_state: SelfState {
                x: center.x.round() as i64,
                y: center.y.round() as i64,
                hp: npc.health,
                energy: npc.energy.trunc() as i64,
                current_goal: npc.goal.to_string(),
                last_damage_source: npc.last_damage_source.clone(),
                action_queue_size: npc.queue.len(),
            },
            player_state: PlayerState {
                x: player.x.round() as i64,
                y: player.y.round() as i64,
            },
            other_npcs_state,
            game_world_state,
            event_trigger: event.to_trigger(),
        }
    }
}
