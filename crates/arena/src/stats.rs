//! Per-life player statistics and the cumulative account record they feed.

use serde::{Deserialize, Serialize};

// One score point per this much area.
const AREA_PER_POINT: f32 = 10.0;

/// Statistics for one life of a player. Reset on every connect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub score: u64,
    /// Best score reached during this life. Never decreases.
    pub high_score: u64,
    /// Whole seconds since spawn.
    pub time_alive: u64,
    pub players_eaten: u32,
    pub food_eaten: u32,
}

impl PlayerStats {
    /// Recompute the score from the player's total area.
    pub fn set_area(&mut self, total_area: f32) {
        self.score = (total_area / AREA_PER_POINT).floor().max(0.0) as u64;
        self.high_score = self.high_score.max(self.score);
    }
}

/// Cumulative statistics for an authenticated account.
///
/// Persisting this is the session layer's job; the core only folds
/// finished lives into it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStats {
    pub high_score: u64,
    pub total_score: u64,
    pub games_played: u32,
    pub total_time_alive: u64,
    pub total_players_eaten: u64,
    pub total_food_eaten: u64,
    pub longest_time_alive: u64,
}

impl AccountStats {
    /// Fold one finished life into the account.
    pub fn record_game(&mut self, game: &PlayerStats) {
        self.high_score = self.high_score.max(game.high_score);
        self.total_score += game.score;
        self.games_played += 1;
        self.total_time_alive += game.time_alive;
        self.total_players_eaten += u64::from(game.players_eaten);
        self.total_food_eaten += u64::from(game.food_eaten);
        self.longest_time_alive = self.longest_time_alive.max(game.time_alive);
    }
}
