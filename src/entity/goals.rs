//! Survival goal selection
//!
//! Goals are only (re)derived on a tick that starts without a movement
//! target. An externally issued move keeps its goal until arrival, and
//! arrival reverts to `Idle`; a survival goal is picked up on a later tick.

use crate::core::config::NeedsConfig;
use crate::entity::{Goal, Npc};
use crate::world::map::WorldMap;

/// Pick a survival goal for an idle NPC. Returns the new goal if one was set.
pub fn maybe_assign_goal(npc: &mut Npc, map: &WorldMap, config: &NeedsConfig) -> Option<Goal> {
    if npc.target.is_some() {
        return None;
    }

    if npc.energy < config.low_energy_threshold && npc.goal != Goal::SeekingFood {
        npc.goal = Goal::SeekingFood;
        npc.target = Some(map.feeding_zone.center());
        tracing::info!(npc = %npc.name, zone = %map.feeding_zone.label, "seeking food");
        return Some(Goal::SeekingFood);
    }

    if npc.health < config.low_health_threshold && npc.goal != Goal::SeekingHealing {
        npc.goal = Goal::SeekingHealing;
        npc.target = Some(map.healing_zone.center());
        tracing::info!(npc = %npc.name, zone = %map.healing_zone.label, "seeking healing");
        return Some(Goal::SeekingHealing);
    }

    None
}
