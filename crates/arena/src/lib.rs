//! Authoritative simulation core for a real-time cell-eating arena.
//!
//! Players steer one or more circular cells, eat food and smaller
//! opponents, split, merge and eject mass. Bots drive the same pipeline.

pub mod ai;
pub mod animation;
pub mod collision;
pub mod config;
pub mod entity;
pub mod error;
pub mod math;
pub mod server;
pub mod stats;
pub mod world;

/// Milliseconds since the game started.
pub type Timestamp = u64;

// Re-export commonly used types
pub use config::Config;
pub use error::GameError;
pub use server::{ArenaHandle, GameState, Snapshot, TickKind, TickReport, run, start};
pub use stats::{AccountStats, PlayerStats};
pub use world::WorldBounds;
