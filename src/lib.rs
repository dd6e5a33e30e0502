//! Village Sim - NPC survival simulation with externally driven decisions

pub mod core;
pub mod decision;
pub mod entity;
pub mod simulation;
pub mod ui;
pub mod world;
