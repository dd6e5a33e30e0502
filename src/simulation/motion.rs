//! Movement toward a target point
//!
//! Each axis moves one unit step (scaled by speed) toward the target until
//! the entity center is within the reach threshold on that axis. When both
//! axes are within reach the target is cleared and arrival is reported.

use crate::core::config::MotionConfig;
use crate::core::types::Vec2;
use crate::entity::Npc;
use crate::world::WorldMap;

/// Unit step toward `target`; each component is -1, 0 or 1
pub fn step_vector(from: Vec2, target: Vec2, reach: f32) -> (f32, f32) {
    let axis = |from: f32, to: f32| {
        if (from - to).abs() > reach {
            if to > from {
                1.0
            } else {
                -1.0
            }
        } else {
            0.0
        }
    };
    (axis(from.x, target.x), axis(from.y, target.y))
}

/// Advance `npc` one tick toward its target. Returns true on arrival.
///
/// Goal bookkeeping on arrival is left to the caller.
pub fn step_toward(npc: &mut Npc, map: &WorldMap, motion: &MotionConfig) -> bool {
    let Some(target) = npc.target else {
        return false;
    };

    let (dx, dy) = step_vector(npc.center(), target, motion.reach_threshold);
    if dx == 0.0 && dy == 0.0 {
        npc.target = None;
        tracing::info!(npc = %npc.name, goal = %npc.goal, x = target.x, y = target.y, "reached target");
        return true;
    }

    let origin = map.try_move(&npc.rect, dx * motion.npc_speed, dy * motion.npc_speed);
    npc.rect = npc.rect.with_origin(origin);
    false
}
