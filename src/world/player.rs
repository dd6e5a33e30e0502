//! The player avatar and its interaction areas

use crate::core::config::MotionConfig;
use crate::core::types::{Rect, Rgb, Vec2};
use crate::entity::Npc;
use crate::world::map::WorldMap;

/// Growth of the player rect when looking for a switch panel
pub const USE_REACH: f32 = 20.0;
/// Growth of the player rect when looking for an NPC to hit
pub const ATTACK_REACH: f32 = 40.0;

pub const PLAYER_NAME: &str = "Player";

#[derive(Debug, Clone)]
pub struct Player {
    pub rect: Rect,
    pub speed: f32,
    pub color: Rgb,
}

impl Player {
    pub fn new(spawn: Vec2, motion: &MotionConfig) -> Self {
        Self {
            rect: Rect::square(spawn, motion.player_size),
            speed: motion.player_speed,
            color: Rgb::BLUE,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.rect.center()
    }

    /// Collision-checked move by one step along each of `dx`, `dy`
    pub fn step(&mut self, dx: f32, dy: f32, map: &WorldMap) {
        let origin = map.try_move(&self.rect, dx * self.speed, dy * self.speed);
        self.rect = self.rect.with_origin(origin);
    }

    pub fn use_area(&self) -> Rect {
        self.rect.inflate(USE_REACH, USE_REACH)
    }

    /// Talking reaches one and a half player widths further
    pub fn talk_area(&self) -> Rect {
        let reach = self.rect.w * 1.5;
        self.rect.inflate(reach, reach)
    }

    /// True if `npc` is close enough and roughly level with the player
    pub fn can_hit(&self, npc: &Npc) -> bool {
        let area = self.rect.inflate(ATTACK_REACH, ATTACK_REACH);
        npc.active
            && area.overlaps(&npc.rect)
            && (self.center().y - npc.center().y).abs() < self.rect.h
    }

    pub fn can_talk_to(&self, npc: &Npc) -> bool {
        npc.active && self.talk_area().overlaps(&npc.rect)
    }
}
