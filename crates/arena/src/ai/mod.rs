//! Bot AI.
//!
//! Bots are ordinary players whose intents come from here instead of a
//! client connection.

mod bot_manager;
mod bot_player;

pub use bot_manager::{BOT_ID_BASE, BotAction, BotManager, is_reserved_id};
pub use bot_player::{Bot, BotDecision, BotPersonality, DecisionReason};
