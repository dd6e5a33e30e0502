//! Integration tests for the HTTP transport against a local socket
//!
//! The "service" is a bare tokio TcpListener that reads one request per
//! connection and writes back a canned HTTP response.

use serde_json::Value;
use std::sync::mpsc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::runtime::Runtime;
use village_sim::core::config::SimulationConfig;
use village_sim::core::error::ErrorLabel;
use village_sim::decision::{DecisionClient, DecisionEvent, Dispatcher};
use village_sim::entity::Directive;
use village_sim::simulation::World;

/// Read one HTTP request and return its body
async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(split) = text.find("\r\n\r\n") {
            let length = text[..split]
                .lines()
                .find_map(|l| {
                    let (name, value) = l.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= split + 4 + length {
                return String::from_utf8_lossy(&buf[split + 4..split + 4 + length]).to_string();
            }
        }
    }
    String::new()
}

/// Serve `replies` in order, one connection each, reporting request bodies
async fn serve(listener: TcpListener, replies: Vec<(u16, String)>, seen: mpsc::Sender<String>) {
    for (status, body) in replies {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;
        let _ = seen.send(request);
        let response = format!(
            "HTTP/1.1 {} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();
    }
}

fn world_for(rt: &Runtime, port: u16, tweak: impl FnOnce(&mut SimulationConfig)) -> World {
    let mut config = SimulationConfig::default();
    config.world.npcs[0].endpoint = Some(format!("http://127.0.0.1:{}/webhook/abc", port));
    config.decision.retry_delay_ms = 10;
    tweak(&mut config);
    let client = DecisionClient::http(rt.handle().clone(), &config.decision);
    World::new(config, client, Dispatcher::blocking()).unwrap()
}

#[test]
fn test_http_round_trip_fills_queue() {
    let rt = Runtime::new().unwrap();
    let listener = rt.block_on(TcpListener::bind("127.0.0.1:0")).unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = mpsc::channel();
    let reply = r#"{"actions": [{"type": "move_to_coordinates", "parameters": {"x": 400, "y": 300}}], "speech": "On my way."}"#;
    rt.spawn(serve(listener, vec![(200, reply.to_string())], tx));

    let mut world = world_for(&rt, port, |_| {});
    let slot = world.registry.slot_of("Alice").unwrap();
    world.request_decision(
        slot,
        DecisionEvent::PlayerInteraction {
            message: "hello".into(),
        },
    );

    let alice = world.npc("Alice").unwrap();
    assert!(alice.error_label.is_none());
    assert_eq!(alice.queue.len(), 1);
    assert!(matches!(alice.queue.peek(), Some(Directive::MoveTo(_))));

    let sent: Value = serde_json::from_str(&rx.recv_timeout(Duration::from_secs(5)).unwrap()).unwrap();
    assert_eq!(sent["npc_name"], "Alice");
    assert_eq!(sent["event_trigger"]["type"], "player_interaction");
    assert_eq!(sent["event_trigger"]["data"]["message"], "hello");
}

#[test]
fn test_http_server_error_then_success() {
    let rt = Runtime::new().unwrap();
    let listener = rt.block_on(TcpListener::bind("127.0.0.1:0")).unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = mpsc::channel();
    rt.spawn(serve(
        listener,
        vec![(500, "{}".to_string()), (200, r#"{"speech": "Fine."}"#.to_string())],
        tx,
    ));

    let mut world = world_for(&rt, port, |_| {});
    let slot = world.registry.slot_of("Alice").unwrap();
    world.request_decision(slot, DecisionEvent::Periodic);

    assert!(world.npc("Alice").unwrap().error_label.is_none());
    assert_eq!(rx.try_iter().count(), 2);
    assert_eq!(world.ui.bubbles.len(), 1);
}

#[test]
fn test_http_not_found_is_final() {
    let rt = Runtime::new().unwrap();
    let listener = rt.block_on(TcpListener::bind("127.0.0.1:0")).unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = mpsc::channel();
    rt.spawn(serve(listener, vec![(404, "{}".to_string())], tx));

    let mut world = world_for(&rt, port, |_| {});
    let slot = world.registry.slot_of("Alice").unwrap();
    world.request_decision(slot, DecisionEvent::Periodic);

    assert_eq!(
        world.npc("Alice").unwrap().error_label,
        Some(ErrorLabel::ConnectionError)
    );
    assert_eq!(rx.try_iter().count(), 1);
}

#[test]
fn test_http_unresponsive_service_times_out() {
    let rt = Runtime::new().unwrap();
    let listener = rt.block_on(TcpListener::bind("127.0.0.1:0")).unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = mpsc::channel();
    rt.spawn(async move {
        // Accept and hold connections without ever answering
        let mut held = Vec::new();
        loop {
            let (stream, _) = listener.accept().await.unwrap();
            let _ = tx.send(());
            held.push(stream);
        }
    });

    let mut world = world_for(&rt, port, |config| config.decision.timeout_ms = 200);
    let slot = world.registry.slot_of("Alice").unwrap();
    world.request_decision(slot, DecisionEvent::Periodic);

    assert_eq!(
        world.npc("Alice").unwrap().error_label,
        Some(ErrorLabel::Timeout)
    );
    assert_eq!(rx.try_iter().count(), 3);
}

#[test]
fn test_http_invalid_body() {
    let rt = Runtime::new().unwrap();
    let listener = rt.block_on(TcpListener::bind("127.0.0.1:0")).unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, _rx) = mpsc::channel();
    rt.spawn(serve(listener, vec![(200, "[1, 2, 3]".to_string())], tx));

    let mut world = world_for(&rt, port, |_| {});
    let slot = world.registry.slot_of("Alice").unwrap();
    world.request_decision(slot, DecisionEvent::Periodic);

    let alice = world.npc("Alice").unwrap();
    assert_eq!(alice.error_label, Some(ErrorLabel::InvalidResponse));
    assert!(alice.queue.is_empty());
}
