//! Simulation configuration with documented constants
//!
//! All magic numbers are collected here. `SimulationConfig::default()`
//! reproduces the reference village; `village.toml` at the repository root
//! spells the same values out and can be edited without recompiling.

use crate::core::error::{Result, SimError};
use crate::core::types::{Rect, Rgb, Vec2};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for the whole simulation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub clock: ClockConfig,
    pub needs: NeedsConfig,
    pub motion: MotionConfig,
    pub decision: DecisionConfig,
    pub lifecycle: LifecycleConfig,
    pub end_game: EndGameConfig,
    pub ui: UiConfig,
    #[serde(rename = "loop")]
    pub game_loop: LoopConfig,
    pub world: WorldConfig,
}

// === CLOCK ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Game seconds per wall second
    ///
    /// At 24.0 one wall-clock hour is one full game day.
    pub rate: f64,
    /// Time of day the session starts at, in game seconds
    pub start_seconds_of_day: f64,
    /// First hour of night (inclusive)
    pub night_start_hour: u32,
    /// First hour of day (night ends here, exclusive)
    pub night_end_hour: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            rate: 24.0,
            start_seconds_of_day: 0.0,
            night_start_hour: 20,
            night_end_hour: 6,
        }
    }
}

// === NEEDS ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NeedsConfig {
    pub max_health: f64,
    pub max_energy: f64,
    /// Energy lost per game second
    ///
    /// At 0.01 a full bar empties in 1000 game seconds (about 42 wall
    /// seconds at the default clock rate).
    pub energy_decay_per_game_second: f64,
    /// Health lost per starvation interval while energy is empty
    pub starvation_damage: f64,
    /// Game seconds between starvation hits (30 game minutes)
    pub starvation_interval_game_seconds: f64,
    /// Below this energy an idle NPC heads for the feeding zone
    pub low_energy_threshold: f64,
    /// Below this health an idle NPC heads for the healing zone
    pub low_health_threshold: f64,
    /// Health regained per wall second inside the healing zone
    pub heal_per_wall_second: f64,
    /// Energy regained per wall second inside the feeding zone
    pub feed_per_wall_second: f64,
}

impl Default for NeedsConfig {
    fn default() -> Self {
        Self {
            max_health: 10.0,
            max_energy: 10.0,
            energy_decay_per_game_second: 0.01,
            starvation_damage: 1.0,
            starvation_interval_game_seconds: 30.0 * 60.0,
            low_energy_threshold: 2.0,
            low_health_threshold: 5.0,
            heal_per_wall_second: 0.1,
            feed_per_wall_second: 0.1,
        }
    }
}

// === MOTION ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// World units an NPC moves per tick along each active axis
    pub npc_speed: f32,
    pub player_speed: f32,
    /// An axis counts as reached once within this many units of the target
    pub reach_threshold: f32,
    pub npc_size: f32,
    pub player_size: f32,
    pub player_attack_damage: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            npc_speed: 2.0,
            player_speed: 5.0,
            reach_threshold: 10.0,
            npc_size: 30.0,
            player_size: 30.0,
            player_attack_damage: 1.0,
        }
    }
}

// === DECISION SERVICE ===

/// How decision requests are scheduled relative to the tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// Request and retries run inside the tick that issued them
    #[default]
    Blocking,
    /// Request runs on a worker; the result is applied on a later tick
    Background,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Wall milliseconds between periodic decision requests
    pub think_interval_ms: u64,
    /// Per-attempt request timeout
    pub timeout_ms: u64,
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Fixed delay between attempts
    pub retry_delay_ms: u64,
    pub dispatch: DispatchMode,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            think_interval_ms: 30_000,
            timeout_ms: 10_000,
            max_attempts: 3,
            retry_delay_ms: 1_000,
            dispatch: DispatchMode::Blocking,
        }
    }
}

// === LIFECYCLE / END GAME / UI / LOOP ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Wall seconds a gated NPC lingers after its switch is turned off
    pub despawn_grace_seconds: f64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            despawn_grace_seconds: 180.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndGameConfig {
    /// Wall seconds between arming the end-game switch and the session ending
    pub delay_seconds: f64,
}

impl Default for EndGameConfig {
    fn default() -> Self {
        Self { delay_seconds: 60.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub speech_bubble_ms: u64,
    pub comm_log_capacity: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            speech_bubble_ms: 10_000,
            comm_log_capacity: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    pub ticks_per_second: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 60,
        }
    }
}

// === WORLD LAYOUT ===

/// Side effect attached to a switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchEffect {
    #[default]
    None,
    /// ON arms the end-game timer, OFF disarms it
    EndGameTimer,
    /// Gates the existence of NPCs whose `gated_by` names this switch
    SpawnGate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchConfig {
    pub name: String,
    #[serde(default)]
    pub label: String,
    pub rect: Rect,
    #[serde(default)]
    pub effect: SwitchEffect,
    #[serde(default)]
    pub initially_on: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneConfig {
    pub label: String,
    pub rect: Rect,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcConfig {
    pub name: String,
    pub spawn: Vec2,
    #[serde(default)]
    pub color: Rgb,
    /// Decision service URL; NPCs without one never think periodically
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Switch controlling this NPC's existence
    #[serde(default)]
    pub gated_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
    pub player_spawn: Vec2,
    pub feeding_zone: ZoneConfig,
    pub healing_zone: ZoneConfig,
    pub obstacles: Vec<Rect>,
    pub switches: Vec<SwitchConfig>,
    pub npcs: Vec<NpcConfig>,
}

const TREE: f32 = 40.0;

impl Default for WorldConfig {
    fn default() -> Self {
        let (width, height) = (1280.0, 720.0);
        Self {
            width,
            height,
            player_spawn: Vec2::new(width / 2.0, height / 2.0),
            feeding_zone: ZoneConfig {
                label: "Cantina".into(),
                rect: Rect::new(width - 200.0, height - 150.0, 150.0, 100.0),
            },
            healing_zone: ZoneConfig {
                label: "Hospital".into(),
                rect: Rect::new(50.0, height - 150.0, 150.0, 100.0),
            },
            obstacles: vec![
                Rect::new(width - 150.0, 100.0, TREE, TREE),
                Rect::new(width - 100.0, 80.0, TREE, TREE),
                Rect::new(width - 130.0, 150.0, TREE, TREE),
                Rect::new(width - 80.0, 140.0, TREE, TREE),
                Rect::new(width - 180.0, 120.0, TREE, TREE),
            ],
            switches: vec![
                SwitchConfig {
                    name: "game_end_button".into(),
                    label: "End Game".into(),
                    rect: Rect::new(width / 2.0 - 50.0, 20.0, 100.0, 40.0),
                    effect: SwitchEffect::EndGameTimer,
                    initially_on: false,
                },
                SwitchConfig {
                    name: "bob_spawn_lever".into(),
                    label: "Spawn Bob".into(),
                    rect: Rect::new(width / 2.0 - 50.0, 70.0, 100.0, 40.0),
                    effect: SwitchEffect::SpawnGate,
                    initially_on: false,
                },
            ],
            npcs: vec![
                NpcConfig {
                    name: "Alice".into(),
                    spawn: Vec2::new(100.0, 100.0),
                    color: Rgb(255, 105, 180),
                    endpoint: Some("http://localhost:5678/webhook/abc".into()),
                    gated_by: None,
                },
                NpcConfig {
                    name: "Bob".into(),
                    spawn: Vec2::new(width - 100.0, height / 2.0),
                    color: Rgb(0, 128, 128),
                    endpoint: Some("http://localhost:5678/webhook/def".into()),
                    gated_by: Some("bob_spawn_lever".into()),
                },
            ],
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let needs = &self.needs;
        if needs.max_health <= 0.0 || needs.max_energy <= 0.0 {
            return Err(SimError::InvalidConfig("needs maxima must be positive".into()));
        }
        if needs.low_energy_threshold > needs.max_energy {
            return Err(SimError::InvalidConfig(format!(
                "low_energy_threshold ({}) exceeds max_energy ({})",
                needs.low_energy_threshold, needs.max_energy
            )));
        }
        if needs.low_health_threshold > needs.max_health {
            return Err(SimError::InvalidConfig(format!(
                "low_health_threshold ({}) exceeds max_health ({})",
                needs.low_health_threshold, needs.max_health
            )));
        }
        if needs.energy_decay_per_game_second < 0.0
            || needs.heal_per_wall_second < 0.0
            || needs.feed_per_wall_second < 0.0
        {
            return Err(SimError::InvalidConfig("rates must not be negative".into()));
        }
        if needs.starvation_interval_game_seconds <= 0.0 {
            return Err(SimError::InvalidConfig(
                "starvation interval must be positive".into(),
            ));
        }
        if self.clock.rate <= 0.0 {
            return Err(SimError::InvalidConfig("clock rate must be positive".into()));
        }
        if self.clock.night_start_hour > 23 || self.clock.night_end_hour > 23 {
            return Err(SimError::InvalidConfig("night hours must be 0..=23".into()));
        }
        if self.decision.max_attempts == 0 {
            return Err(SimError::InvalidConfig("max_attempts must be at least 1".into()));
        }
        if self.game_loop.ticks_per_second == 0 {
            return Err(SimError::InvalidConfig("ticks_per_second must be positive".into()));
        }
        if self.ui.comm_log_capacity == 0 {
            return Err(SimError::InvalidConfig("comm_log_capacity must be positive".into()));
        }

        let mut names = ahash::AHashSet::new();
        for npc in &self.world.npcs {
            if !names.insert(npc.name.as_str()) {
                return Err(SimError::InvalidConfig(format!(
                    "duplicate NPC name: {}",
                    npc.name
                )));
            }
            if let Some(gate) = &npc.gated_by {
                let gate_switch = self.world.switches.iter().find(|s| &s.name == gate);
                match gate_switch {
                    Some(s) if s.effect == SwitchEffect::SpawnGate => {}
                    Some(_) => {
                        return Err(SimError::InvalidConfig(format!(
                            "{} is gated by {}, which is not a spawn_gate switch",
                            npc.name, gate
                        )))
                    }
                    None => {
                        return Err(SimError::InvalidConfig(format!(
                            "{} is gated by unknown switch {}",
                            npc.name, gate
                        )))
                    }
                }
            }
        }
        Ok(())
    }
}
