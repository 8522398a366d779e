//! Core data models for the matchmaker.

mod assignment;
mod balance;
mod monitoring;
mod player;

pub use assignment::*;
pub use balance::*;
pub use monitoring::*;
pub use player::*;
