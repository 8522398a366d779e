pub mod monitoring;
pub mod players;
pub mod simulate;
