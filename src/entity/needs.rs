//! Hunger and health over time
//!
//! Decay and starvation are measured in game seconds, regeneration in wall
//! seconds. Every update works from elapsed-since-last-update on clocks that
//! never wrap, so the result does not depend on the tick rate.

use crate::core::config::NeedsConfig;
use crate::core::types::WallMillis;
use crate::entity::{Goal, Npc};
use crate::world::map::WorldMap;
use serde::{Deserialize, Serialize};

/// Reference points for elapsed-time need updates
///
/// Game-time fields hold [`GameClock::elapsed_game_seconds`] readings.
///
/// [`GameClock::elapsed_game_seconds`]: crate::core::clock::GameClock::elapsed_game_seconds
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NeedsClock {
    pub last_decay_game_seconds: f64,
    pub last_starvation_game_seconds: f64,
    pub last_regen_ms: WallMillis,
}

impl NeedsClock {
    pub fn starting_at(now_ms: WallMillis, now_game_seconds: f64) -> Self {
        Self {
            last_decay_game_seconds: now_game_seconds,
            last_starvation_game_seconds: now_game_seconds,
            last_regen_ms: now_ms,
        }
    }
}

/// Whether the entity survived a needs update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vitality {
    Alive,
    Perished,
}

/// Drain energy for the game time since the last decay
///
/// Sub-second drift is coalesced: nothing happens until at least one game
/// second has passed. Returns true if energy was updated.
pub fn apply_decay(npc: &mut Npc, now_game_seconds: f64, config: &NeedsConfig) -> bool {
    let elapsed = now_game_seconds - npc.needs_clock.last_decay_game_seconds;
    if elapsed < 1.0 {
        return false;
    }
    npc.energy = (npc.energy - config.energy_decay_per_game_second * elapsed).max(0.0);
    npc.needs_clock.last_decay_game_seconds = now_game_seconds;
    true
}

/// Deal starvation damage at zero energy, at most once per interval
///
/// The interval runs from the last starvation hit (or from spawn), so an NPC
/// whose last hit is long past takes damage on the first empty tick.
pub fn apply_starvation(npc: &mut Npc, now_game_seconds: f64, config: &NeedsConfig) -> Vitality {
    if npc.energy > 0.0 {
        return Vitality::Alive;
    }

    let elapsed = now_game_seconds - npc.needs_clock.last_starvation_game_seconds;
    if elapsed < config.starvation_interval_game_seconds {
        return Vitality::Alive;
    }

    npc.needs_clock.last_starvation_game_seconds = now_game_seconds;
    let fatal = npc.take_damage(config.starvation_damage, "starvation");
    tracing::info!(npc = %npc.name, hp = npc.health, "took starvation damage");
    if fatal {
        tracing::warn!(npc = %npc.name, "perished from starvation");
        npc.deactivate();
        Vitality::Perished
    } else {
        Vitality::Alive
    }
}

/// Regenerate inside the zone matching the current survival goal
///
/// Returns the goal that was completed, if the need was filled this update.
pub fn apply_regen(
    npc: &mut Npc,
    now_ms: WallMillis,
    map: &WorldMap,
    config: &NeedsConfig,
) -> Option<Goal> {
    let elapsed_s = now_ms.saturating_sub(npc.needs_clock.last_regen_ms) as f64 / 1000.0;
    npc.needs_clock.last_regen_ms = now_ms;

    match npc.goal {
        Goal::SeekingHealing if npc.rect.overlaps(&map.healing_zone.rect) => {
            npc.health = (npc.health + config.heal_per_wall_second * elapsed_s).min(config.max_health);
            if npc.health >= config.max_health {
                tracing::info!(npc = %npc.name, "fully healed");
                npc.goal = Goal::Idle;
                return Some(Goal::SeekingHealing);
            }
        }
        Goal::SeekingFood if npc.rect.overlaps(&map.feeding_zone.rect) => {
            npc.energy = (npc.energy + config.feed_per_wall_second * elapsed_s).min(config.max_energy);
            if npc.energy >= config.max_energy {
                tracing::info!(npc = %npc.name, "full of energy");
                npc.goal = Goal::Idle;
                return Some(Goal::SeekingFood);
            }
        }
        _ => {}
    }
    None
}

/// Run decay, starvation and regeneration for one tick
pub fn update_needs(
    npc: &mut Npc,
    now_game_seconds: f64,
    now_ms: WallMillis,
    map: &WorldMap,
    config: &NeedsConfig,
) -> Vitality {
    apply_decay(npc, now_game_seconds, config);
    if apply_starvation(npc, now_game_seconds, config) == Vitality::Perished {
        return Vitality::Perished;
    }
    apply_regen(npc, now_ms, map, config);
    Vitality::Alive
}
