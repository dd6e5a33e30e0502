//! Village Sim - Entry Point
//!
//! Loads the village configuration, sets up the async runtime used by the
//! decision client, and either runs an interactive console or a fixed-rate
//! real-time loop.

use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use village_sim::core::config::SimulationConfig;
use village_sim::core::error::Result;
use village_sim::decision::{DecisionClient, Dispatcher};
use village_sim::simulation::{
    player_attack, player_move, player_talk, player_teleport_beside, player_use,
    run_simulation_tick, SimulationEvent, World,
};

#[derive(Parser, Debug)]
#[command(name = "village-sim")]
#[command(about = "Village NPC simulation with webhook-driven decisions")]
struct Args {
    /// TOML configuration file (defaults are used when omitted)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Mode>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Interactive console (default)
    Repl,
    /// Real-time loop at the configured tick rate
    Live {
        /// Stop after this many wall seconds
        #[arg(long)]
        seconds: Option<f64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("village_sim=info")),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };

    // Decision requests run on this runtime; the tick loop stays on the main thread
    let rt = Runtime::new()?;
    let client = DecisionClient::http(rt.handle().clone(), &config.decision);
    let dispatcher = Dispatcher::for_mode(config.decision.dispatch, Some(rt.handle().clone()));
    let mut world = World::new(config, client, dispatcher)?;

    tracing::info!(session = %world.session_id, "Village Sim starting...");

    match args.command.unwrap_or(Mode::Repl) {
        Mode::Repl => repl(&mut world)?,
        Mode::Live { seconds } => live(&mut world, seconds),
    }

    tracing::info!(tick = world.current_tick, "Village Sim stopped");
    Ok(())
}

fn tick_seconds(world: &World) -> f64 {
    1.0 / world.config.game_loop.ticks_per_second as f64
}

/// -1, 0 or 1; `f32::signum` maps 0.0 to 1.0
fn direction(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

fn print_events(events: &[SimulationEvent]) {
    for event in events {
        println!("  * {}", event);
    }
}

fn live(world: &mut World, seconds: Option<f64>) {
    let period = Duration::from_secs_f64(tick_seconds(world));
    let started = Instant::now();
    let mut last = started;

    while !world.game_over {
        if seconds.is_some_and(|limit| started.elapsed().as_secs_f64() >= limit) {
            break;
        }
        let now = Instant::now();
        let delta = now.duration_since(last).as_secs_f64();
        last = now;

        let events = run_simulation_tick(world, delta);
        print_events(&events);

        if let Some(rest) = period.checked_sub(now.elapsed()) {
            std::thread::sleep(rest);
        }
    }
    if world.game_over {
        println!("Game over at {} ({} ticks).", world.timestamp(), world.current_tick);
    }
}

fn repl(world: &mut World) -> Result<()> {
    println!("\n=== VILLAGE SIM ===");
    println!("Session {}", world.session_id);
    println!();
    println!("Commands:");
    println!("  tick / t              - Advance simulation by one tick");
    println!("  run <n>               - Run n simulation ticks");
    println!("  status / s            - Show detailed status");
    println!("  goto <npc|switch>     - Stand next to an NPC or switch panel");
    println!("  move <dx> <dy>        - Step the player");
    println!("  talk [message]        - Talk to the closest NPC");
    println!("  attack                - Attack an NPC in reach");
    println!("  use                   - Use a switch panel in reach");
    println!("  log                   - Show or hide the communication log");
    println!("  quit / q              - Exit");
    println!();

    let dt = tick_seconds(world);
    loop {
        if world.game_over {
            println!("Game over at {}.", world.timestamp());
            break;
        }
        display_status(world);

        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let (command, rest) = input.split_once(' ').unwrap_or((input, ""));
        let rest = rest.trim();
        match command {
            "quit" | "q" => break,
            "tick" | "t" => {
                let events = run_simulation_tick(world, dt);
                print_events(&events);
                println!("Tick {} complete.", world.current_tick);
            }
            "run" => match rest.parse::<u32>() {
                Ok(n) => {
                    println!("Running {} ticks...", n);
                    for _ in 0..n {
                        let events = run_simulation_tick(world, dt);
                        print_events(&events);
                        if world.game_over {
                            break;
                        }
                    }
                    println!("Now at tick {}.", world.current_tick);
                }
                Err(_) => println!("Usage: run <number>"),
            },
            "status" | "s" => display_detailed_status(world),
            "goto" => {
                let target = world
                    .npc(rest)
                    .filter(|n| n.active)
                    .map(|n| n.center())
                    .or_else(|| world.switches.get(rest).map(|s| s.rect.center()));
                match target {
                    Some(point) => {
                        player_teleport_beside(world, point);
                        let at = world.player.rect.origin();
                        println!("Player now at ({:.0}, {:.0}).", at.x, at.y);
                    }
                    None => println!("Nothing called '{}' here.", rest),
                }
            }
            "move" => {
                let mut parts = rest.split_whitespace().map(str::parse::<f32>);
                match (parts.next(), parts.next()) {
                    (Some(Ok(dx)), Some(Ok(dy))) => {
                        player_move(world, direction(dx), direction(dy));
                        let at = world.player.rect.origin();
                        println!("Player now at ({:.0}, {:.0}).", at.x, at.y);
                    }
                    _ => println!("Usage: move <dx> <dy>"),
                }
            }
            "talk" => match player_talk(world, rest) {
                Some(name) => println!("Talking to {}.", name),
                None => println!("No one in range to talk to."),
            },
            "attack" => match player_attack(world) {
                Some(name) => println!("Hit {}.", name),
                None => println!("No target in range."),
            },
            "use" => match player_use(world) {
                Some(flip) => println!(
                    "Switch is now {}.",
                    if flip.now_on { "ON" } else { "OFF" }
                ),
                None => println!("No switch in reach."),
            },
            "log" => {
                world.ui.toggle_comm_log();
                println!(
                    "Communication log {}.",
                    if world.ui.show_comm_log { "shown" } else { "hidden" }
                );
            }
            _ => println!("Unknown command: {}", command),
        }
        print_events(&world.take_events());
    }
    Ok(())
}

fn display_status(world: &World) {
    let phase = if world.clock.is_night() { "night" } else { "day" };
    println!(
        "\n[{} {}] tick {} | {} active NPC(s)",
        world.timestamp(),
        phase,
        world.current_tick,
        world.registry.active_count()
    );
    if world.ui.show_comm_log {
        for entry in world.ui.comm_log.iter() {
            println!("  [{}] {}", entry.timestamp, entry.text);
        }
    }
}

fn display_detailed_status(world: &World) {
    println!("\n=== STATUS ===");
    println!("Session: {}", world.session_id);
    println!("Game time: {}", world.timestamp());
    if let Some(deadline) = world.end_game_deadline_ms {
        let left = deadline.saturating_sub(world.wall_ms) as f64 / 1000.0;
        println!("Game ends in {:.1}s", left);
    }
    let p = world.player.center();
    println!("Player at ({:.0}, {:.0})", p.x, p.y);

    println!("\nSwitches:");
    for switch in world.switches.iter() {
        println!("  {:<18} {}", switch.name, if switch.on { "ON" } else { "OFF" });
    }

    println!("\nNPCs:");
    for npc in world.registry.iter() {
        let c = npc.center();
        let state = if npc.active { "" } else { " (inactive)" };
        println!(
            "  {}{}: HP {:.1} | energy {:.1} | {} | at ({:.0}, {:.0}) | queue {}",
            npc.name, state, npc.health, npc.energy, npc.goal, c.x, c.y, npc.queue.len()
        );
        if let Some(next) = npc.queue.peek() {
            println!("    next: {}", next);
        }
        if let Some(label) = npc.error_label {
            println!("    last error: {}", label);
        }
    }

    let visible: Vec<_> = world
        .ui
        .bubbles
        .visible(world.wall_ms, |id| {
            world.registry.iter().any(|n| n.id == id && n.active)
        })
        .collect();
    if !visible.is_empty() {
        println!("\nSpeech:");
        for bubble in visible {
            println!("  {}: \"{}\"", bubble.speaker_name, bubble.text);
        }
    }
    if world.decisions_in_flight() > 0 {
        println!("\n{} decision request(s) in flight", world.decisions_in_flight());
    }
}
