//! Shared payload types for the cell arena.
//!
//! This crate contains:
//! - Shared types (Color, PlayerId)
//! - Client intents and their compact binary encoding
//!
//! Transport and framing live outside the simulation core; this crate only
//! describes what crosses that boundary.

mod codec;
mod error;
mod intent;

pub use codec::{IntentReader, IntentWriter};
pub use error::ProtocolError;
pub use intent::{Intent, IntentOpcode};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a connected player or bot, assigned by the session layer.
pub type PlayerId = u32;

/// RGB color used for cells, food and ejected mass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}
