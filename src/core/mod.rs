pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use clock::GameClock;
pub use config::SimulationConfig;
