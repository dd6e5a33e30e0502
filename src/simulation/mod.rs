pub mod executor;
pub mod interaction;
pub mod lifecycle;
pub mod motion;
pub mod session;
pub mod tick;
pub mod world;

pub use executor::{execute_next, DirectiveEffect};
pub use interaction::{player_attack, player_move, player_talk, player_teleport_beside, player_use};
pub use lifecycle::{reconcile, LifecycleChange};
pub use tick::{run_simulation_tick, SimulationEvent};
pub use world::World;
