//! World geometry, switches, the player and the entity registry

pub mod blocking;
pub mod map;
pub mod player;
pub mod registry;
pub mod switches;

pub use blocking::{try_move, Obstacles};
pub use map::{WorldMap, Zone};
pub use player::Player;
pub use registry::EntityRegistry;
pub use switches::{Switch, SwitchBoard, SwitchFlip};
