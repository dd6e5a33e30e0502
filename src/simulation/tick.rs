//! Tick system - orchestrates simulation updates
//!
//! One tick:
//! advance clock -> apply finished decisions -> reconcile gated NPCs ->
//! per NPC (registry order): needs -> goal -> motion -> periodic decision ->
//! one queued directive -> end-game check
//!
//! Every NPC update runs to completion before the next one starts.

use crate::core::error::ErrorLabel;
use crate::core::types::WallMillis;
use crate::decision::DecisionEvent;
use crate::entity::goals::maybe_assign_goal;
use crate::entity::needs::update_needs;
use crate::entity::{Goal, Vitality};
use crate::simulation::executor::execute_next;
use crate::simulation::lifecycle::LifecycleChange;
use crate::simulation::motion::step_toward;
use crate::simulation::world::World;
use std::fmt;

/// Events generated during a simulation tick
///
/// Returned by `run_simulation_tick` for display and for tests.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationEvent {
    GoalChanged {
        npc: String,
        goal: String,
    },
    Arrived {
        npc: String,
    },
    /// Regeneration filled the need the NPC was seeking
    NeedFilled {
        npc: String,
        goal: String,
    },
    Perished {
        npc: String,
    },
    Attacked {
        npc: String,
        damage: f64,
        new_hp: f64,
    },
    Defeated {
        npc: String,
    },
    DirectiveExecuted {
        npc: String,
        directive: String,
    },
    Spoke {
        npc: String,
        text: String,
    },
    MessageFailed {
        npc: String,
        target: String,
    },
    DecisionApplied {
        npc: String,
        actions: usize,
        attempts: u32,
    },
    DecisionFailed {
        npc: String,
        label: ErrorLabel,
        attempts: u32,
    },
    /// A trigger arrived while a request was still in flight
    DecisionCoalesced {
        npc: String,
    },
    SwitchFlipped {
        name: String,
        on: bool,
        by: String,
    },
    Lifecycle(LifecycleChange),
    EndGameArmed {
        deadline_ms: WallMillis,
    },
    EndGameDisarmed,
    GameOver {
        wall_ms: WallMillis,
    },
}

impl fmt::Display for SimulationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use SimulationEvent::*;
        match self {
            GoalChanged { npc, goal } => write!(f, "{} is now {}", npc, goal),
            Arrived { npc } => write!(f, "{} reached its target", npc),
            NeedFilled { npc, goal } => write!(f, "{} finished {}", npc, goal),
            Perished { npc } => write!(f, "{} perished from starvation", npc),
            Attacked {
                npc,
                damage,
                new_hp,
            } => write!(f, "{} took {} damage (HP {})", npc, damage, new_hp),
            Defeated { npc } => write!(f, "{} was defeated", npc),
            DirectiveExecuted { npc, directive } => write!(f, "{}: {}", npc, directive),
            Spoke { npc, text } => write!(f, "{} says \"{}\"", npc, text),
            MessageFailed { npc, target } => write!(f, "{} could not reach {}", npc, target),
            DecisionApplied {
                npc,
                actions,
                attempts,
            } => write!(
                f,
                "{} got {} action(s) after {} attempt(s)",
                npc, actions, attempts
            ),
            DecisionFailed {
                npc,
                label,
                attempts,
            } => write!(f, "{} decision failed: {} ({} attempt(s))", npc, label, attempts),
            DecisionCoalesced { npc } => write!(f, "{} is still thinking", npc),
            SwitchFlipped { name, on, by } => write!(
                f,
                "{} turned {} {}",
                by,
                name,
                if *on { "on" } else { "off" }
            ),
            Lifecycle(LifecycleChange::Spawned { name }) => write!(f, "{} spawned", name),
            Lifecycle(LifecycleChange::DespawnArmed { name, deadline_ms }) => {
                write!(f, "{} will leave at {}ms", name, deadline_ms)
            }
            Lifecycle(LifecycleChange::DespawnDisarmed { name }) => {
                write!(f, "{} is staying", name)
            }
            Lifecycle(LifecycleChange::Despawned { name }) => write!(f, "{} despawned", name),
            EndGameArmed { deadline_ms } => write!(f, "game ends at {}ms", deadline_ms),
            EndGameDisarmed => write!(f, "end of game cancelled"),
            GameOver { wall_ms } => write!(f, "game over at {}ms", wall_ms),
        }
    }
}

/// Run one simulation tick of `wall_delta_seconds`
pub fn run_simulation_tick(world: &mut World, wall_delta_seconds: f64) -> Vec<SimulationEvent> {
    if world.game_over {
        return world.take_events();
    }
    world.current_tick += 1;

    world.advance_wall_time(wall_delta_seconds);
    world.drain_completions();
    world.reconcile_lifecycle();
    world.ui.bubbles.expire(world.wall_ms);

    for slot in 0..world.registry.len() {
        update_npc(world, slot);
    }

    if let Some(deadline) = world.end_game_deadline_ms {
        if world.wall_ms >= deadline {
            tracing::info!(wall_ms = world.wall_ms, "end-game timer elapsed");
            world.game_over = true;
            let wall_ms = world.wall_ms;
            world.emit(SimulationEvent::GameOver { wall_ms });
        }
    }

    world.take_events()
}

fn update_npc(world: &mut World, slot: usize) {
    let now_ms = world.wall_ms;
    let now_game = world.clock.elapsed_game_seconds();
    let mut events = Vec::new();

    let think = {
        let World {
            registry,
            map,
            config,
            ..
        } = &mut *world;
        let Some(npc) = registry.get_mut(slot) else {
            return;
        };
        if !npc.active {
            return;
        }

        // Needs
        let goal_before = npc.goal.clone();
        if update_needs(npc, now_game, now_ms, map, &config.needs) == Vitality::Perished {
            let name = npc.name.clone();
            let color = npc.color;
            world.log(format!("{} has perished from starvation.", name), color);
            world.emit(SimulationEvent::Perished { npc: name });
            return;
        }
        if goal_before != npc.goal && npc.goal == Goal::Idle {
            events.push(SimulationEvent::NeedFilled {
                npc: npc.name.clone(),
                goal: goal_before.to_string(),
            });
        }

        // Goal
        if let Some(goal) = maybe_assign_goal(npc, map, &config.needs) {
            events.push(SimulationEvent::GoalChanged {
                npc: npc.name.clone(),
                goal: goal.to_string(),
            });
        }

        // Motion
        if step_toward(npc, map, &config.motion) {
            if matches!(npc.goal, Goal::MovingExternal(_)) {
                npc.goal = Goal::Idle;
            }
            events.push(SimulationEvent::Arrived {
                npc: npc.name.clone(),
            });
        }

        // Periodic decision
        let due = npc.endpoint.is_some()
            && now_ms.saturating_sub(npc.last_decision_ms) > config.decision.think_interval_ms;
        if due {
            tracing::debug!(npc = %npc.name, "thinking (periodic)");
            npc.last_decision_ms = now_ms;
        }
        due
    };
    for event in events {
        world.emit(event);
    }

    if think {
        world.request_decision(slot, DecisionEvent::Periodic);
    }

    // Action queue
    let executed = world.registry.get_mut(slot).and_then(|npc| {
        if !npc.active {
            return None;
        }
        execute_next(npc, now_ms).map(|(directive, effect)| (npc.name.clone(), directive, effect))
    });
    if let Some((name, directive, effect)) = executed {
        world.emit(SimulationEvent::DirectiveExecuted {
            npc: name,
            directive: directive.to_string(),
        });
        if let Some(effect) = effect {
            world.apply_effect(slot, effect);
        }
    }
}
