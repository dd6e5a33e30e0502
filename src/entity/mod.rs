//! NPC entity state
//!
//! One `Npc` value covers every villager. What differs between them (decision
//! endpoint, whether a switch gates their existence) is configuration, held
//! in [`EntityKind`] and the optional endpoint.

pub mod directive;
pub mod goals;
pub mod needs;
pub mod queue;

pub use directive::{Directive, SwitchMode};
pub use needs::{NeedsClock, Vitality};
pub use queue::DirectiveQueue;

use crate::core::config::{MotionConfig, NeedsConfig, NpcConfig};
use crate::core::error::ErrorLabel;
use crate::core::types::{EntityId, Rect, Rgb, Vec2, WallMillis};
use std::fmt;

/// How an NPC's existence is controlled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKind {
    /// Present for the whole session
    Resident,
    /// Exists only while the named switch is on (plus a grace period)
    Gated { switch: String },
}

/// High-level intent label
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Goal {
    #[default]
    Idle,
    SeekingFood,
    SeekingHealing,
    /// Moving because the decision service said so
    MovingExternal(String),
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Goal::Idle => f.write_str("Idle"),
            Goal::SeekingFood => f.write_str("Seeking Food"),
            Goal::SeekingHealing => f.write_str("Seeking Healing"),
            Goal::MovingExternal(label) => f.write_str(label),
        }
    }
}

/// A simulated villager
#[derive(Debug, Clone)]
pub struct Npc {
    pub id: EntityId,
    pub name: String,
    pub kind: EntityKind,
    pub color: Rgb,
    /// Collision shape; its origin is the NPC's position
    pub rect: Rect,
    pub health: f64,
    pub energy: f64,
    pub goal: Goal,
    pub target: Option<Vec2>,
    pub queue: DirectiveQueue,
    /// Queue draining is suspended until this wall time
    pub busy_until_ms: WallMillis,
    pub last_decision_ms: WallMillis,
    pub needs_clock: NeedsClock,
    pub active: bool,
    pub error_label: Option<ErrorLabel>,
    pub last_damage_source: Option<String>,
    pub endpoint: Option<String>,
    /// Armed despawn timer of a gated NPC
    pub despawn_deadline_ms: Option<WallMillis>,
    /// Background mode only: a request for this NPC has not completed yet
    pub decision_in_flight: bool,
}

impl Npc {
    pub fn new(name: impl Into<String>, spawn: Vec2, size: f32, needs: &NeedsConfig) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            kind: EntityKind::Resident,
            color: Rgb::WHITE,
            rect: Rect::square(spawn, size),
            health: needs.max_health,
            energy: needs.max_energy,
            goal: Goal::Idle,
            target: None,
            queue: DirectiveQueue::new(),
            busy_until_ms: 0,
            last_decision_ms: 0,
            needs_clock: NeedsClock::default(),
            active: true,
            error_label: None,
            last_damage_source: None,
            endpoint: None,
            despawn_deadline_ms: None,
            decision_in_flight: false,
        }
    }

    /// Build a fresh instance from the roster, with all timers starting now
    pub fn from_config(
        config: &NpcConfig,
        motion: &MotionConfig,
        needs: &NeedsConfig,
        now_ms: WallMillis,
        now_game_seconds: f64,
    ) -> Self {
        let kind = match &config.gated_by {
            Some(switch) => EntityKind::Gated {
                switch: switch.clone(),
            },
            None => EntityKind::Resident,
        };
        Self::new(config.name.clone(), config.spawn, motion.npc_size, needs)
            .with_kind(kind)
            .with_color(config.color)
            .with_endpoint(config.endpoint.clone())
            .started_at(now_ms, now_game_seconds)
    }

    pub fn with_kind(mut self, kind: EntityKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Reset every elapsed-time reference to the given instant
    pub fn started_at(mut self, now_ms: WallMillis, now_game_seconds: f64) -> Self {
        self.last_decision_ms = now_ms;
        self.needs_clock = NeedsClock::starting_at(now_ms, now_game_seconds);
        self
    }

    pub fn position(&self) -> Vec2 {
        self.rect.origin()
    }

    pub fn center(&self) -> Vec2 {
        self.rect.center()
    }

    pub fn gate_switch(&self) -> Option<&str> {
        match &self.kind {
            EntityKind::Gated { switch } => Some(switch),
            EntityKind::Resident => None,
        }
    }

    /// Apply damage from a named source; returns true if this was fatal
    pub fn take_damage(&mut self, amount: f64, source: &str) -> bool {
        self.health = (self.health - amount).max(0.0);
        self.last_damage_source = Some(source.to_string());
        if self.health <= 0.0 {
            self.active = false;
            true
        } else {
            false
        }
    }

    /// Stop all further updates for this instance
    pub fn deactivate(&mut self) {
        self.active = false;
        self.target = None;
        self.despawn_deadline_ms = None;
    }
}
