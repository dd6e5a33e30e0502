//! Existence of switch-gated NPCs
//!
//! A gated NPC's live instance is its active registry record, and carries
//! the switch it is gated by. Reconciliation compares that switch with the
//! instance:
//!
//! - despawn deadline passed: deactivate
//! - ON, live instance with an armed deadline: disarm
//! - OFF, live instance with no deadline: arm one
//! - ON, no live instance: construct a fresh one (replacing any stale record)

use crate::core::config::SimulationConfig;
use crate::core::types::WallMillis;
use crate::entity::Npc;
use crate::world::{EntityRegistry, SwitchBoard};

#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleChange {
    Spawned { name: String },
    DespawnArmed { name: String, deadline_ms: WallMillis },
    DespawnDisarmed { name: String },
    Despawned { name: String },
}

pub fn reconcile(
    registry: &mut EntityRegistry,
    switches: &SwitchBoard,
    config: &SimulationConfig,
    now_ms: WallMillis,
    now_game_seconds: f64,
) -> Vec<LifecycleChange> {
    let mut changes = Vec::new();
    let grace_ms = (config.lifecycle.despawn_grace_seconds * 1000.0).round() as WallMillis;

    // Live instances follow the switch they were spawned under
    for npc in registry.iter_mut().filter(|n| n.active) {
        let Some(switch_on) = npc.gate_switch().map(|gate| switches.is_on(gate)) else {
            continue;
        };

        if npc.despawn_deadline_ms.is_some_and(|deadline| now_ms >= deadline) {
            tracing::info!(npc = %npc.name, "despawned");
            npc.deactivate();
            changes.push(LifecycleChange::Despawned {
                name: npc.name.clone(),
            });
        } else if switch_on {
            if npc.despawn_deadline_ms.take().is_some() {
                tracing::info!(npc = %npc.name, "despawn timer disarmed");
                changes.push(LifecycleChange::DespawnDisarmed {
                    name: npc.name.clone(),
                });
            }
        } else if npc.despawn_deadline_ms.is_none() {
            let deadline_ms = now_ms.saturating_add(grace_ms);
            npc.despawn_deadline_ms = Some(deadline_ms);
            tracing::info!(npc = %npc.name, deadline_ms, "despawn timer armed");
            changes.push(LifecycleChange::DespawnArmed {
                name: npc.name.clone(),
                deadline_ms,
            });
        }
    }

    // Gated roster entries with the switch ON and no live instance
    for entry in &config.world.npcs {
        let Some(gate) = entry.gated_by.as_deref() else {
            continue;
        };
        if !switches.is_on(gate) || registry.active_by_name(&entry.name).is_some() {
            continue;
        }
        let npc = Npc::from_config(
            entry,
            &config.motion,
            &config.needs,
            now_ms,
            now_game_seconds,
        );
        tracing::info!(npc = %entry.name, switch = gate, "spawned");
        registry.insert(npc);
        changes.push(LifecycleChange::Spawned {
            name: entry.name.clone(),
        });
    }
    changes
}
