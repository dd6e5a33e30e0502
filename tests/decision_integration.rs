//! Integration tests for decision requests, retries and the action queue

mod common;

use common::{quiet_config, world_with, Scripted};
use std::time::Duration;
use tokio::runtime::Runtime;
use village_sim::core::error::{DecisionError, ErrorLabel};
use village_sim::decision::{DecisionClient, DecisionEvent, Dispatcher, TransportReply};
use village_sim::entity::{Directive, SwitchMode};
use village_sim::simulation::{run_simulation_tick, SimulationEvent, World};

fn alice_slot(world: &World) -> usize {
    world.registry.slot_of("Alice").unwrap()
}

#[test]
fn test_timeouts_retry_three_times_then_label() {
    let transport = Scripted::always(Err(DecisionError::Timeout));
    let mut world = world_with(quiet_config(), transport.clone());
    world
        .npc_mut("Alice")
        .unwrap()
        .queue
        .push(Directive::Say { text: "kept".into() });

    let slot = alice_slot(&world);
    world.request_decision(slot, DecisionEvent::Periodic);

    let calls = transport.calls();
    assert_eq!(calls.len(), 3);
    for pair in calls.windows(2) {
        let gap = pair[1].at.duration_since(pair[0].at);
        assert!(gap >= Duration::from_millis(950), "retry gap was {:?}", gap);
    }

    let alice = world.npc("Alice").unwrap();
    assert_eq!(alice.error_label, Some(ErrorLabel::Timeout));
    assert_eq!(alice.queue.len(), 1);
    assert!(world.take_events().contains(&SimulationEvent::DecisionFailed {
        npc: "Alice".into(),
        label: ErrorLabel::Timeout,
        attempts: 3,
    }));
}

#[test]
fn test_client_error_is_not_retried() {
    let transport = Scripted::always(Ok(TransportReply {
        status: 404,
        body: "not found".into(),
    }));
    let mut world = world_with(quiet_config(), transport.clone());
    let slot = alice_slot(&world);
    world.request_decision(slot, DecisionEvent::Periodic);

    assert_eq!(transport.calls().len(), 1);
    assert_eq!(
        world.npc("Alice").unwrap().error_label,
        Some(ErrorLabel::ConnectionError)
    );
}

#[test]
fn test_recovery_after_server_error_clears_label() {
    let mut config = quiet_config();
    config.decision.retry_delay_ms = 10;
    let transport = Scripted::sequence(
        vec![Ok(TransportReply {
            status: 503,
            body: String::new(),
        })],
        Ok(TransportReply::ok(r#"{"speech": "Back again."}"#)),
    );
    let mut world = world_with(config, transport.clone());
    world.npc_mut("Alice").unwrap().error_label = Some(ErrorLabel::Timeout);

    let slot = alice_slot(&world);
    world.request_decision(slot, DecisionEvent::Periodic);
    assert_eq!(transport.calls().len(), 2);
    assert!(world.npc("Alice").unwrap().error_label.is_none());
    // Decision speech is a bubble, not a log line
    assert_eq!(world.ui.bubbles.len(), 1);
    assert!(world.ui.comm_log.is_empty());
}

#[test]
fn test_wait_then_say_executes_once_after_delay() {
    let mut config = quiet_config();
    config.world.npcs[0].endpoint = Some("http://decisions.test/alice".into());
    let transport = Scripted::sequence(
        vec![Ok(TransportReply::ok(
            r#"{"actions": [
                {"type": "wait", "parameters": {"duration_ms": 2000}},
                {"type": "say", "parameters": {"text": "Done waiting."}}
            ]}"#,
        ))],
        Ok(TransportReply::ok("{}")),
    );
    let mut world = world_with(config, transport.clone());
    let slot = alice_slot(&world);
    world.request_decision(slot, DecisionEvent::Periodic);
    assert_eq!(world.npc("Alice").unwrap().queue.len(), 2);
    assert_eq!(transport.calls()[0].endpoint, "http://decisions.test/alice");

    let mut spoke_at = Vec::new();
    let mut wait_started = None;
    for _ in 0..50 {
        for event in run_simulation_tick(&mut world, 0.1) {
            match event {
                SimulationEvent::DirectiveExecuted { ref directive, .. }
                    if directive.starts_with("wait") =>
                {
                    wait_started = Some(world.wall_ms)
                }
                SimulationEvent::Spoke { ref text, .. } if text == "Done waiting." => {
                    spoke_at.push(world.wall_ms)
                }
                _ => {}
            }
        }
    }
    let wait_started = wait_started.unwrap();
    assert_eq!(spoke_at.len(), 1);
    assert!(spoke_at[0] >= wait_started + 2_000);
    assert!(world
        .ui
        .comm_log
        .iter()
        .any(|e| e.text == "Alice: Done waiting."));
}

#[test]
fn test_toggle_directive_runs_switch_hook() {
    let transport = Scripted::sequence(
        vec![Ok(TransportReply::ok(
            r#"{"actions": [{"type": "toggle_bob_spawn_lever", "parameters": {"state": "on"}}]}"#,
        ))],
        Ok(TransportReply::ok("{}")),
    );
    let mut world = world_with(quiet_config(), transport);
    let slot = alice_slot(&world);
    world.request_decision(slot, DecisionEvent::Periodic);

    let events = run_simulation_tick(&mut world, 0.1);
    assert!(events.contains(&SimulationEvent::SwitchFlipped {
        name: "bob_spawn_lever".into(),
        on: true,
        by: "Alice".into(),
    }));
    assert!(world.npc("Bob").unwrap().active);
}

#[test]
fn test_snapshot_describes_world() {
    let transport = Scripted::answering("{}");
    let mut world = world_with(quiet_config(), transport.clone());
    world
        .toggle_switch("bob_spawn_lever", SwitchMode::On, "Player")
        .unwrap();
    let slot = alice_slot(&world);
    world.request_decision(slot, DecisionEvent::Periodic);

    let body = &transport.bodies_for("Alice")[0];
    assert_eq!(body["session_id"], world.session_id.as_str());
    assert_eq!(body["current_game_time"], "00:00");
    assert_eq!(body["is_night"], true);
    assert_eq!(body["self_state"]["x"], 115);
    assert_eq!(body["self_state"]["energy"], 10);
    assert_eq!(body["self_state"]["current_goal"], "Idle");
    assert_eq!(body["game_world_state"]["bob_spawn_lever_on"], true);
    assert_eq!(body["game_world_state"]["game_end_button_on"], false);
    assert_eq!(body["other_npcs_state"][0]["name"], "Bob");
    assert_eq!(body["event_trigger"]["type"], "periodic_update");
}

#[test]
fn test_background_dispatch_applies_on_later_tick() {
    let rt = Runtime::new().unwrap();
    let config = quiet_config();
    let transport = Scripted::slow(
        r#"{"actions": [{"type": "say", "parameters": {"text": "Hi."}}]}"#,
        Duration::from_millis(50),
    );
    let client = DecisionClient::new(transport.clone(), &config.decision);
    let mut world = World::new(config, client, Dispatcher::background(rt.handle().clone())).unwrap();

    let slot = alice_slot(&world);
    world.request_decision(slot, DecisionEvent::Periodic);
    assert_eq!(world.decisions_in_flight(), 1);
    assert!(world.npc("Alice").unwrap().queue.is_empty());

    // A second trigger while the first is in flight is coalesced
    world.request_decision(slot, DecisionEvent::Periodic);
    assert!(world.take_events().contains(&SimulationEvent::DecisionCoalesced {
        npc: "Alice".into()
    }));

    let mut events = Vec::new();
    for _ in 0..200 {
        std::thread::sleep(Duration::from_millis(10));
        events.extend(run_simulation_tick(&mut world, 0.01));
        if world.decisions_in_flight() == 0 {
            break;
        }
    }
    assert!(events
        .iter()
        .any(|e| matches!(e, SimulationEvent::DecisionApplied { actions: 1, .. })));
    assert_eq!(transport.calls().len(), 1);
    assert!(!world.npc("Alice").unwrap().decision_in_flight);

    // Applied at the start of the tick, so the say runs in that same tick
    assert!(events.contains(&SimulationEvent::Spoke {
        npc: "Alice".into(),
        text: "Hi.".into()
    }));
}

#[test]
fn test_background_result_for_replaced_instance_is_discarded() {
    let rt = Runtime::new().unwrap();
    let config = quiet_config();
    let transport = Scripted::slow(
        r#"{"actions": [{"type": "say", "parameters": {"text": "Stale."}}]}"#,
        Duration::from_millis(50),
    );
    let client = DecisionClient::new(transport, &config.decision);
    let mut world = World::new(config, client, Dispatcher::background(rt.handle().clone())).unwrap();

    world
        .toggle_switch("bob_spawn_lever", SwitchMode::On, "Player")
        .unwrap();
    let bob_slot = world.registry.slot_of("Bob").unwrap();
    world.request_decision(bob_slot, DecisionEvent::Periodic);

    // Kill the instance; the next tick spawns a replacement while the lever is on
    world.npc_mut("Bob").unwrap().take_damage(100.0, "test");
    run_simulation_tick(&mut world, 0.01);
    let new_id = world.npc("Bob").unwrap().id;

    for _ in 0..30 {
        std::thread::sleep(Duration::from_millis(10));
        let events = run_simulation_tick(&mut world, 0.01);
        assert!(!events.iter().any(
            |e| matches!(e, SimulationEvent::DecisionApplied { npc, .. } if npc == "Bob")
        ));
    }
    let bob = world.npc("Bob").unwrap();
    assert_eq!(bob.id, new_id);
    assert!(bob.queue.is_empty());
    assert_eq!(world.decisions_in_flight(), 0);
}
