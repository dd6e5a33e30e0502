//! Immutable world descriptor
//!
//! Built once from [`WorldConfig`] and shared by reference with every system
//! that needs geometry. Zones are walkable; trees and switch panels block.

use crate::core::config::WorldConfig;
use crate::core::types::{Rect, Vec2};
use crate::world::blocking::{try_move, Obstacles};

/// A labelled walkable area
#[derive(Debug, Clone)]
pub struct Zone {
    pub label: String,
    pub rect: Rect,
}

impl Zone {
    pub fn center(&self) -> Vec2 {
        self.rect.center()
    }
}

#[derive(Debug, Clone)]
pub struct WorldMap {
    pub bounds: Rect,
    pub feeding_zone: Zone,
    pub healing_zone: Zone,
    pub obstacles: Obstacles,
}

impl WorldMap {
    pub fn from_config(config: &WorldConfig) -> Self {
        let mut obstacles = Obstacles::from_rects(config.obstacles.iter().copied());
        for switch in &config.switches {
            obstacles.add(switch.rect);
        }
        Self {
            bounds: Rect::new(0.0, 0.0, config.width, config.height),
            feeding_zone: Zone {
                label: config.feeding_zone.label.clone(),
                rect: config.feeding_zone.rect,
            },
            healing_zone: Zone {
                label: config.healing_zone.label.clone(),
                rect: config.healing_zone.rect,
            },
            obstacles,
        }
    }

    /// Collision-checked movement for a shape in this world
    pub fn try_move(&self, shape: &Rect, dx: f32, dy: f32) -> Vec2 {
        try_move(shape, dx, dy, &self.obstacles, &self.bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_panels_block_movement() {
        let config = WorldConfig::default();
        let map = WorldMap::from_config(&config);
        assert_eq!(map.obstacles.len(), config.obstacles.len() + config.switches.len());

        let lever = config.switches[1].rect;
        let below = Rect::new(lever.x + 10.0, lever.bottom() + 1.0, 30.0, 30.0);
        let pos = map.try_move(&below, 0.0, -5.0);
        assert_eq!(pos, below.origin(), "panel should stop upward motion");
    }

    #[test]
    fn test_zones_are_walkable() {
        let map = WorldMap::from_config(&WorldConfig::default());
        let inside = Rect::square(map.feeding_zone.rect.origin(), 30.0);
        assert!(!map.obstacles.is_blocked(&inside));
        assert_eq!(map.feeding_zone.center(), Vec2::new(1155.0, 620.0));
    }
}
