//! The simulation world: everything one session owns
//!
//! `World` is the single owner of the clock, the switch table, the entity
//! registry and the presentation state. Cross-entity effects (messages,
//! switch hooks, decision outcomes) are applied here, one at a time, so no
//! entity ever mutates another directly.

use crate::core::clock::GameClock;
use crate::core::config::{SimulationConfig, SwitchEffect};
use crate::core::error::{Result, SimError};
use crate::core::types::{Rgb, WallMillis};
use crate::decision::{
    Completion, DecisionClient, DecisionEvent, DecisionJob, DecisionRequest, Dispatcher,
    SnapshotSources,
};
use crate::entity::{Npc, SwitchMode};
use crate::simulation::executor::DirectiveEffect;
use crate::simulation::lifecycle;
use crate::simulation::session::generate_session_id;
use crate::simulation::tick::SimulationEvent;
use crate::ui::GameUi;
use crate::world::{EntityRegistry, Player, SwitchBoard, SwitchFlip, WorldMap};

pub struct World {
    pub config: SimulationConfig,
    pub clock: GameClock,
    pub map: WorldMap,
    pub switches: SwitchBoard,
    pub registry: EntityRegistry,
    pub player: Player,
    pub ui: GameUi,
    pub session_id: String,
    /// Simulated wall time since the session started
    pub wall_ms: WallMillis,
    pub end_game_deadline_ms: Option<WallMillis>,
    pub game_over: bool,
    pub current_tick: u64,
    wall_seconds: f64,
    client: DecisionClient,
    dispatcher: Dispatcher,
    events: Vec<SimulationEvent>,
}

impl World {
    pub fn new(
        config: SimulationConfig,
        client: DecisionClient,
        dispatcher: Dispatcher,
    ) -> Result<Self> {
        config.validate()?;

        let clock = GameClock::new(config.clock.rate)
            .with_night_hours(config.clock.night_start_hour, config.clock.night_end_hour)
            .starting_at(config.clock.start_seconds_of_day);
        let start_game = clock.elapsed_game_seconds();

        let mut registry = EntityRegistry::new();
        for entry in config.world.npcs.iter().filter(|n| n.gated_by.is_none()) {
            registry.insert(Npc::from_config(
                entry,
                &config.motion,
                &config.needs,
                0,
                start_game,
            ));
        }

        let session_id = generate_session_id();
        tracing::info!(session = %session_id, npcs = registry.len(), "session started");

        let mut world = Self {
            clock,
            map: WorldMap::from_config(&config.world),
            switches: SwitchBoard::from_config(&config.world.switches),
            registry,
            player: Player::new(config.world.player_spawn, &config.motion),
            ui: GameUi::new(&config.ui),
            session_id,
            wall_ms: 0,
            end_game_deadline_ms: None,
            game_over: false,
            current_tick: 0,
            wall_seconds: 0.0,
            client,
            dispatcher,
            events: Vec::new(),
            config,
        };

        // Switches that start on still run their hooks
        let initially_on: Vec<String> = world
            .switches
            .iter()
            .filter(|s| s.on && s.effect == SwitchEffect::EndGameTimer)
            .map(|s| s.name.clone())
            .collect();
        for name in initially_on {
            world.arm_end_game(&name);
        }
        world.reconcile_lifecycle();
        Ok(world)
    }

    /// Advance wall time and the game clock; negative deltas count as zero
    pub fn advance_wall_time(&mut self, wall_delta_seconds: f64) {
        let delta = wall_delta_seconds.max(0.0);
        self.wall_seconds += delta;
        self.wall_ms = (self.wall_seconds * 1000.0).round() as WallMillis;
        self.clock.advance(delta);
    }

    pub fn timestamp(&self) -> String {
        self.clock.formatted()
    }

    pub fn emit(&mut self, event: SimulationEvent) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<SimulationEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn npc(&self, name: &str) -> Option<&Npc> {
        self.registry.by_name(name)
    }

    pub fn npc_mut(&mut self, name: &str) -> Option<&mut Npc> {
        self.registry.by_name_mut(name)
    }

    pub fn get_switch(&self, name: &str) -> bool {
        self.switches.is_on(name)
    }

    pub fn decisions_in_flight(&self) -> usize {
        self.dispatcher.in_flight()
    }

    // === SWITCHES ===

    /// Change a switch and run its side-effect hook
    pub fn toggle_switch(&mut self, name: &str, mode: SwitchMode, by: &str) -> Result<SwitchFlip> {
        let flip = self.switches.apply(name, mode)?;
        tracing::info!(switch = name, on = flip.now_on, changed = flip.changed(), by, "switch used");
        self.emit(SimulationEvent::SwitchFlipped {
            name: name.to_string(),
            on: flip.now_on,
            by: by.to_string(),
        });

        match flip.effect {
            SwitchEffect::EndGameTimer if flip.now_on => self.arm_end_game(name),
            SwitchEffect::EndGameTimer => {
                if self.end_game_deadline_ms.take().is_some() {
                    tracing::info!(switch = name, "end-game timer cancelled");
                    self.emit(SimulationEvent::EndGameDisarmed);
                }
            }
            SwitchEffect::SpawnGate => self.reconcile_lifecycle(),
            SwitchEffect::None => {}
        }
        Ok(flip)
    }

    fn arm_end_game(&mut self, switch: &str) {
        let delay_ms = (self.config.end_game.delay_seconds * 1000.0).round() as WallMillis;
        let deadline_ms = self.wall_ms.saturating_add(delay_ms);
        self.end_game_deadline_ms = Some(deadline_ms);
        tracing::info!(switch, deadline_ms, "end-game timer armed");
        self.emit(SimulationEvent::EndGameArmed { deadline_ms });
    }

    pub fn reconcile_lifecycle(&mut self) {
        let changes = lifecycle::reconcile(
            &mut self.registry,
            &self.switches,
            &self.config,
            self.wall_ms,
            self.clock.elapsed_game_seconds(),
        );
        for change in changes {
            self.emit(SimulationEvent::Lifecycle(change));
        }
    }

    // === SPEECH AND LOG ===

    /// Show an utterance above an NPC and record it in the log
    pub fn say(&mut self, slot: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let Some(npc) = self.registry.get(slot) else {
            return;
        };
        let (id, name, color) = (npc.id, npc.name.clone(), npc.color);
        tracing::info!(npc = %name, %text, "says");
        self.ui.add_speech_bubble(id, &name, text, self.wall_ms);
        let stamp = self.timestamp();
        self.ui.add_to_comm_log(&stamp, format!("{}: {}", name, text), color);
        self.emit(SimulationEvent::Spoke {
            npc: name,
            text: text.to_string(),
        });
    }

    pub fn log(&mut self, text: impl Into<String>, color: Rgb) {
        let stamp = self.timestamp();
        self.ui.add_to_comm_log(&stamp, text, color);
    }

    // === DIRECTIVE EFFECTS ===

    pub fn apply_effect(&mut self, slot: usize, effect: DirectiveEffect) {
        let Some(speaker) = self.registry.get(slot) else {
            return;
        };
        let (speaker_id, speaker_name, speaker_color) =
            (speaker.id, speaker.name.clone(), speaker.color);

        match effect {
            DirectiveEffect::Say { text } => self.say(slot, &text),
            DirectiveEffect::Switch { name, mode } => {
                if let Err(SimError::SwitchNotFound(name)) =
                    self.toggle_switch(&name, mode, &speaker_name)
                {
                    tracing::warn!(npc = %speaker_name, switch = %name, "no such switch");
                }
            }
            DirectiveEffect::Message { target, text } => {
                let Some(target_slot) = self
                    .registry
                    .slot_of(&target)
                    .filter(|&s| self.registry.get(s).is_some_and(|n| n.active))
                else {
                    tracing::warn!(npc = %speaker_name, %target, "message target not found or inactive");
                    self.log(
                        format!("{} tried to talk to {} (failed).", speaker_name, target),
                        speaker_color,
                    );
                    self.emit(SimulationEvent::MessageFailed {
                        npc: speaker_name,
                        target,
                    });
                    return;
                };

                tracing::info!(npc = %speaker_name, %target, %text, "sends message");
                self.ui.add_speech_bubble(
                    speaker_id,
                    &speaker_name,
                    &format!("@{}: {}", target, text),
                    self.wall_ms,
                );
                self.log(
                    format!("{} to {}: {}", speaker_name, target, text),
                    speaker_color,
                );
                self.request_decision(
                    target_slot,
                    DecisionEvent::NpcInteraction {
                        speaker_name,
                        message: text,
                    },
                );
            }
        }
    }

    // === DECISIONS ===

    /// Ask the NPC's decision service what to do about `event`
    ///
    /// In blocking mode the outcome is applied before this returns. In
    /// background mode at most one request per NPC is in flight; further
    /// triggers are dropped until it completes.
    pub fn request_decision(&mut self, slot: usize, event: DecisionEvent) {
        let background = matches!(self.dispatcher, Dispatcher::Background { .. });
        let Some(npc) = self.registry.get(slot) else {
            return;
        };
        if background && npc.decision_in_flight {
            tracing::debug!(npc = %npc.name, event = event.kind(), "decision already in flight");
            let name = npc.name.clone();
            self.emit(SimulationEvent::DecisionCoalesced { npc: name });
            return;
        }

        let sources = SnapshotSources {
            session_id: &self.session_id,
            clock: &self.clock,
            registry: &self.registry,
            player: &self.player,
            switches: &self.switches,
        };
        let job = DecisionJob {
            npc_name: npc.name.clone(),
            npc_id: npc.id,
            endpoint: npc.endpoint.clone(),
            request: DecisionRequest::build(npc, &sources, &event),
        };

        if background {
            if let Some(npc) = self.registry.get_mut(slot) {
                npc.decision_in_flight = true;
            }
        }
        if let Some(completion) = self.dispatcher.submit(&self.client, job) {
            self.apply_completion(completion);
        }
    }

    /// Fold background outcomes that finished since the last tick
    pub fn drain_completions(&mut self) {
        for completion in self.dispatcher.drain() {
            self.apply_completion(completion);
        }
    }

    /// Apply a finished request to the instance that issued it
    ///
    /// Outcomes for a replaced or inactive instance are discarded.
    pub fn apply_completion(&mut self, completion: Completion) {
        let Some(slot) = self.registry.slot_of(&completion.npc_name) else {
            return;
        };
        let now_ms = self.wall_ms;
        let Some(npc) = self
            .registry
            .get_instance_mut(&completion.npc_name, completion.npc_id)
        else {
            tracing::debug!(npc = %completion.npc_name, "discarding decision for replaced instance");
            return;
        };
        npc.decision_in_flight = false;
        if !npc.active {
            tracing::debug!(npc = %npc.name, "discarding decision for inactive npc");
            return;
        }

        let attempts = completion.outcome.attempts;
        match completion.outcome.result {
            Ok(response) => {
                npc.error_label = None;
                let actions = response.actions.len();
                npc.queue.extend(response.actions);
                let name = npc.name.clone();
                self.emit(SimulationEvent::DecisionApplied {
                    npc: name,
                    actions,
                    attempts,
                });
                if let Some(speech) = response.speech.filter(|s| !s.is_empty()) {
                    self.speak_bubble_only(slot, &speech, now_ms);
                }
            }
            Err(error) => {
                let label = error.category();
                npc.error_label = Some(label);
                let name = npc.name.clone();
                self.emit(SimulationEvent::DecisionFailed {
                    npc: name,
                    label,
                    attempts,
                });
            }
        }
    }

    /// Decision speech shows as a bubble without a log line
    fn speak_bubble_only(&mut self, slot: usize, text: &str, now_ms: WallMillis) {
        let Some(npc) = self.registry.get(slot) else {
            return;
        };
        let (id, name) = (npc.id, npc.name.clone());
        tracing::info!(npc = %name, %text, "says");
        self.ui.add_speech_bubble(id, &name, text, now_ms);
        self.emit(SimulationEvent::Spoke {
            npc: name,
            text: text.to_string(),
        });
    }
}
