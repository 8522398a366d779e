//! # Matchmaker
//!
//! Splits a selection of players into two teams of near-equal strength and
//! estimates the resulting win probability.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (players, assignments, assessments, log entries)
//! - **calculate**: Player scores, win probability and balance classification
//! - **balance**: Team balancing over a roster selection
//! - **roster**: Read-only player lookup table
//! - **storage**: JSONL files under the data directory
//! - **monitoring**: Rolling log of balancing outcomes and dashboard summary
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod balance;
pub mod calculate;
pub mod config;
pub mod models;
pub mod monitoring;
pub mod roster;
pub mod storage;

pub use models::*;
