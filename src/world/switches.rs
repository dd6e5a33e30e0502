//! Named world switches (buttons and levers)
//!
//! The board owns switch state only. Side effects (the end-game timer and
//! spawn gating) are applied by the simulation, which reads the returned
//! [`SwitchFlip`] and the switch's [`SwitchEffect`].

use crate::core::config::{SwitchConfig, SwitchEffect};
use crate::core::error::{Result, SimError};
use crate::core::types::Rect;
use crate::entity::SwitchMode;
use ahash::AHashMap;

#[derive(Debug, Clone)]
pub struct Switch {
    pub name: String,
    pub label: String,
    /// Panel the player must stand near to use the switch
    pub rect: Rect,
    pub on: bool,
    pub effect: SwitchEffect,
}

/// Result of applying a mode to a switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchFlip {
    pub was_on: bool,
    pub now_on: bool,
    pub effect: SwitchEffect,
}

impl SwitchFlip {
    pub fn changed(&self) -> bool {
        self.was_on != self.now_on
    }
}

/// Mutable switch table owned by the simulation loop
#[derive(Debug, Clone, Default)]
pub struct SwitchBoard {
    switches: Vec<Switch>,
    index: AHashMap<String, usize>,
}

impl SwitchBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(configs: &[SwitchConfig]) -> Self {
        let mut board = Self::new();
        for config in configs {
            board.add(Switch {
                name: config.name.clone(),
                label: config.label.clone(),
                rect: config.rect,
                on: config.initially_on,
                effect: config.effect,
            });
        }
        board
    }

    /// Add a switch; a switch with the same name is replaced
    pub fn add(&mut self, switch: Switch) {
        match self.index.get(&switch.name) {
            Some(&slot) => self.switches[slot] = switch,
            None => {
                self.index.insert(switch.name.clone(), self.switches.len());
                self.switches.push(switch);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Switch> {
        self.index.get(name).map(|&slot| &self.switches[slot])
    }

    /// Current state; unknown switches read as off
    pub fn is_on(&self, name: &str) -> bool {
        self.get(name).map(|s| s.on).unwrap_or(false)
    }

    /// Set, clear, or flip a switch
    pub fn apply(&mut self, name: &str, mode: SwitchMode) -> Result<SwitchFlip> {
        let slot = *self
            .index
            .get(name)
            .ok_or_else(|| SimError::SwitchNotFound(name.to_string()))?;
        let switch = &mut self.switches[slot];
        let was_on = switch.on;
        switch.on = match mode {
            SwitchMode::Toggle => !was_on,
            SwitchMode::On => true,
            SwitchMode::Off => false,
        };
        tracing::info!(switch = %switch.name, on = switch.on, "switch set");
        Ok(SwitchFlip {
            was_on,
            now_on: switch.on,
            effect: switch.effect,
        })
    }

    /// First switch whose panel overlaps `area`
    pub fn find_overlapping(&self, area: &Rect) -> Option<&Switch> {
        self.switches.iter().find(|s| s.rect.overlaps(area))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Switch> {
        self.switches.iter()
    }

    pub fn len(&self) -> usize {
        self.switches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.switches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::WorldConfig;

    fn board() -> SwitchBoard {
        SwitchBoard::from_config(&WorldConfig::default().switches)
    }

    #[test]
    fn test_modes() {
        let mut board = board();
        assert!(!board.is_on("bob_spawn_lever"));

        let flip = board.apply("bob_spawn_lever", SwitchMode::Toggle).unwrap();
        assert!(flip.changed());
        assert_eq!(flip.effect, SwitchEffect::SpawnGate);
        assert!(board.is_on("bob_spawn_lever"));

        let flip = board.apply("bob_spawn_lever", SwitchMode::On).unwrap();
        assert!(!flip.changed());
        assert!(flip.now_on);

        board.apply("bob_spawn_lever", SwitchMode::Off).unwrap();
        assert!(!board.is_on("bob_spawn_lever"));
    }

    #[test]
    fn test_unknown_switch() {
        let mut board = board();
        assert!(matches!(
            board.apply("trapdoor", SwitchMode::Toggle),
            Err(SimError::SwitchNotFound(name)) if name == "trapdoor"
        ));
        assert!(!board.is_on("trapdoor"));
    }

    #[test]
    fn test_find_overlapping_panel() {
        let board = board();
        let button = board.get("game_end_button").unwrap().rect;
        let area = Rect::new(button.x + 5.0, button.y + 5.0, 10.0, 10.0);
        assert_eq!(board.find_overlapping(&area).unwrap().name, "game_end_button");
        assert!(board
            .find_overlapping(&Rect::new(0.0, 600.0, 10.0, 10.0))
            .is_none());
    }
}
