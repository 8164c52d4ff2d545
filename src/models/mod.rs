//! Core data models for the player stats service.

mod player;

pub use player::*;
