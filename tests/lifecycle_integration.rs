//! Integration tests for switch-gated NPCs and the end-game switch

mod common;

use common::{quiet_config, world_with, Scripted};
use village_sim::entity::SwitchMode;
use village_sim::simulation::{
    player_attack, player_teleport_beside, run_simulation_tick, LifecycleChange, SimulationEvent,
    World,
};

const LEVER: &str = "bob_spawn_lever";

fn world() -> World {
    world_with(quiet_config(), Scripted::answering("{}"))
}

fn lever(world: &mut World, mode: SwitchMode) {
    world.toggle_switch(LEVER, mode, "Player").unwrap();
}

fn spawned(events: &[SimulationEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, SimulationEvent::Lifecycle(LifecycleChange::Spawned { .. })))
        .count()
}

#[test]
fn test_switch_on_creates_exactly_one_instance() {
    let mut world = world();
    assert!(world.npc("Bob").is_none());

    lever(&mut world, SwitchMode::On);
    let mut events = world.take_events();
    for _ in 0..100 {
        events.extend(run_simulation_tick(&mut world, 1.0));
    }
    assert_eq!(spawned(&events), 1);
    assert_eq!(world.registry.active_count(), 2);
}

#[test]
fn test_reenable_within_grace_keeps_instance() {
    let mut world = world();
    lever(&mut world, SwitchMode::On);
    let id = world.npc("Bob").unwrap().id;

    run_simulation_tick(&mut world, 10.0);
    lever(&mut world, SwitchMode::Off);
    assert_eq!(world.npc("Bob").unwrap().despawn_deadline_ms, Some(190_000));

    run_simulation_tick(&mut world, 179.0);
    assert!(world.npc("Bob").unwrap().active);
    lever(&mut world, SwitchMode::On);

    // Long past the old deadline
    for _ in 0..4 {
        run_simulation_tick(&mut world, 60.0);
    }
    let bob = world.npc("Bob").unwrap();
    assert!(bob.active);
    assert_eq!(bob.id, id);
    assert!(bob.despawn_deadline_ms.is_none());
}

#[test]
fn test_grace_expiry_despawns_and_next_on_respawns_fresh() {
    let mut world = world();
    lever(&mut world, SwitchMode::On);
    let old_id = world.npc("Bob").unwrap().id;
    world.npc_mut("Bob").unwrap().health = 6.0;

    lever(&mut world, SwitchMode::Off);
    run_simulation_tick(&mut world, 179.0);
    assert!(world.npc("Bob").unwrap().active);

    let events = run_simulation_tick(&mut world, 1.0);
    assert!(events.contains(&SimulationEvent::Lifecycle(LifecycleChange::Despawned {
        name: "Bob".into()
    })));
    assert!(!world.npc("Bob").unwrap().active);

    // Stays gone while the lever is off
    run_simulation_tick(&mut world, 500.0);
    assert!(!world.npc("Bob").unwrap().active);

    lever(&mut world, SwitchMode::On);
    let bob = world.npc("Bob").unwrap();
    assert!(bob.active);
    assert_ne!(bob.id, old_id);
    assert_eq!(bob.health, 10.0);
    assert_eq!(bob.position(), world.config.world.npcs[1].spawn);
    assert_eq!(world.registry.len(), 2);
}

#[test]
fn test_defeated_gated_npc_respawns_while_on() {
    let mut world = world();
    lever(&mut world, SwitchMode::On);
    let old_id = world.npc("Bob").unwrap().id;
    world.npc_mut("Bob").unwrap().health = 1.0;

    let bob_center = world.npc("Bob").unwrap().center();
    player_teleport_beside(&mut world, bob_center);
    assert_eq!(player_attack(&mut world).as_deref(), Some("Bob"));
    assert!(!world.npc("Bob").unwrap().active);

    let events = run_simulation_tick(&mut world, 0.1);
    assert_eq!(spawned(&events), 1);
    assert_ne!(world.npc("Bob").unwrap().id, old_id);
}

#[test]
fn test_end_game_cancel_and_rearm() {
    let mut world = world();
    world
        .toggle_switch("game_end_button", SwitchMode::On, "Alice")
        .unwrap();
    run_simulation_tick(&mut world, 30.0);
    world
        .toggle_switch("game_end_button", SwitchMode::Toggle, "Player")
        .unwrap();
    assert!(world.end_game_deadline_ms.is_none());

    run_simulation_tick(&mut world, 60.0);
    assert!(!world.game_over);

    // Re-arming starts a fresh 60 second countdown
    world
        .toggle_switch("game_end_button", SwitchMode::On, "Player")
        .unwrap();
    assert_eq!(world.end_game_deadline_ms, Some(150_000));
    run_simulation_tick(&mut world, 59.0);
    assert!(!world.game_over);
    let events = run_simulation_tick(&mut world, 1.0);
    assert!(world.game_over);
    assert!(events.contains(&SimulationEvent::GameOver { wall_ms: 150_000 }));

    // Nothing moves after the end
    let tick = world.current_tick;
    run_simulation_tick(&mut world, 1.0);
    assert_eq!(world.current_tick, tick);
}
