//! Player actions against the world
//!
//! The player moves, uses switch panels, attacks and talks. Attacks and
//! talk are event triggers for the NPC decision service.

use crate::core::types::Vec2;
use crate::decision::DecisionEvent;
use crate::entity::SwitchMode;
use crate::simulation::tick::SimulationEvent;
use crate::simulation::world::World;
use crate::world::player::PLAYER_NAME;
use crate::world::SwitchFlip;

/// Collision-checked player step; `dx`/`dy` are step directions
pub fn player_move(world: &mut World, dx: f32, dy: f32) {
    let World { player, map, .. } = &mut *world;
    player.step(dx, dy, map);
}

/// Put the player just left of `point`, ignoring obstacles on the way
///
/// Used by the console front end in place of walking there.
pub fn player_teleport_beside(world: &mut World, point: Vec2) {
    let size = world.player.rect.w;
    let origin = Vec2::new(point.x - size * 1.5, point.y - size / 2.0);
    let bounds = world.map.bounds;
    world.player.rect = world.player.rect.with_origin(origin).clamp_within(&bounds);
}

/// Toggle the first switch panel within reach
pub fn player_use(world: &mut World) -> Option<SwitchFlip> {
    let area = world.player.use_area();
    let name = world.switches.find_overlapping(&area)?.name.clone();
    match world.toggle_switch(&name, SwitchMode::Toggle, PLAYER_NAME) {
        Ok(flip) => {
            let color = world.player.color;
            let state = if flip.now_on { "ON" } else { "OFF" };
            world.log(format!("Player turned {} {}", name, state), color);
            Some(flip)
        }
        Err(e) => {
            tracing::warn!(switch = %name, error = %e, "player use failed");
            None
        }
    }
}

/// Hit the first NPC in range. Returns the name of the NPC hit.
pub fn player_attack(world: &mut World) -> Option<String> {
    let slot = (0..world.registry.len()).find(|&slot| {
        world
            .registry
            .get(slot)
            .is_some_and(|npc| world.player.can_hit(npc))
    });
    let Some(slot) = slot else {
        tracing::debug!("player attack: no target in range");
        return None;
    };

    let damage = world.config.motion.player_attack_damage;
    let npc = world.registry.get_mut(slot)?;
    let defeated = npc.take_damage(damage, "player");
    let (name, new_hp) = (npc.name.clone(), npc.health);
    if defeated {
        npc.deactivate();
    }

    let color = world.player.color;
    tracing::info!(npc = %name, new_hp, "player attack");
    world.log(format!("Player attacked {}. HP: {}", name, new_hp), color);
    world.emit(SimulationEvent::Attacked {
        npc: name.clone(),
        damage,
        new_hp,
    });
    if defeated {
        tracing::info!(npc = %name, "defeated by the player");
        world.log(format!("{} has been defeated by the player.", name), color);
        world.emit(SimulationEvent::Defeated { npc: name.clone() });
    }

    world.request_decision(
        slot,
        DecisionEvent::Attacked {
            attacker_name: PLAYER_NAME.to_string(),
            damage_taken: damage,
            new_hp,
        },
    );
    Some(name)
}

/// Address the closest NPC within talking range. Returns its name.
pub fn player_talk(world: &mut World, message: &str) -> Option<String> {
    let center = world.player.center();
    let slot = (0..world.registry.len())
        .filter_map(|slot| {
            let npc = world.registry.get(slot)?;
            world
                .player
                .can_talk_to(npc)
                .then(|| (slot, center.distance_squared(&npc.center())))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(slot, _)| slot);
    let Some(slot) = slot else {
        tracing::debug!("player talk: nobody in range");
        return None;
    };

    let name = world.registry.get(slot)?.name.clone();
    let color = world.player.color;
    tracing::info!(npc = %name, %message, "player talks");
    world.log(format!("Player attempts to talk to {}", name), color);
    world.request_decision(
        slot,
        DecisionEvent::PlayerInteraction {
            message: message.to_string(),
        },
    );
    Some(name)
}
