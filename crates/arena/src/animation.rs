//! Consumption animations.
//!
//! Food animations drive the actual growth of the eating cell over their
//! duration. Player-eat animations carry no state change of their own;
//! the mass moved at collision time and they only time the visual.

use crate::Timestamp;
use crate::entity::{CellId, Food, FoodId, Player, PlayerCell};
use crate::stats::PlayerStats;
use crate::world::World;
use glam::Vec2;
use protocol::PlayerId;
use serde::Serialize;

/// A pellet flying into the cell that ate it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodAnimation {
    pub food_id: FoodId,
    pub player_id: PlayerId,
    pub cell_id: CellId,
    pub start_time: Timestamp,
    pub duration: u64,
    pub start_position: Vec2,
    /// Follows the target cell while the animation runs.
    pub target_position: Vec2,
    pub initial_food_radius: f32,
    pub initial_cell_radius: f32,
    pub target_cell_radius: f32,
    /// Share of the growth already added to the cell.
    pub applied_progress: f32,
    pub completed: bool,
}

impl FoodAnimation {
    /// Animate `food` into the cell of `player` nearest to it.
    /// Returns `None` if the player has no cells.
    pub fn new(food: &Food, player: &Player, now: Timestamp, duration: u64, growth_factor: f32) -> Option<Self> {
        let cell = player.nearest_cell(food.position)?;
        Some(Self {
            food_id: food.id,
            player_id: player.id,
            cell_id: cell.id,
            start_time: now,
            duration,
            start_position: food.position,
            target_position: cell.position,
            initial_food_radius: food.radius,
            initial_cell_radius: cell.radius,
            target_cell_radius: cell.radius * growth_factor,
            applied_progress: 0.0,
            completed: false,
        })
    }

    /// Add the growth between the last applied progress and `progress`.
    ///
    /// Growth is added on top of the cell's current radius so that eats,
    /// splits and merges landing mid-animation are kept.
    fn grow(&mut self, cell: &mut PlayerCell, progress: f32) {
        let step = progress - self.applied_progress;
        if step <= 0.0 {
            return;
        }
        cell.radius += (self.target_cell_radius - self.initial_cell_radius) * step;
        self.applied_progress = progress;
    }
}

/// A whole player being swallowed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerEatAnimation {
    /// The predator.
    pub player_id: PlayerId,
    pub eaten_player_id: PlayerId,
    pub start_time: Timestamp,
    pub duration: u64,
    pub start_position: Vec2,
    pub target_position: Vec2,
    pub initial_eaten_radius: f32,
    /// Final stats of the eaten life, for the game-over screen.
    pub eaten_player_stats: PlayerStats,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConsumingAnimation {
    Food(FoodAnimation),
    PlayerEat(PlayerEatAnimation),
}

impl ConsumingAnimation {
    #[inline]
    fn timing(&self) -> (Timestamp, u64) {
        match self {
            Self::Food(a) => (a.start_time, a.duration),
            Self::PlayerEat(a) => (a.start_time, a.duration),
        }
    }

    /// Fraction of the duration elapsed at `now`, in `[0, 1]`.
    pub fn progress(&self, now: Timestamp) -> f32 {
        let (start, duration) = self.timing();
        if duration == 0 {
            return 1.0;
        }
        (now.saturating_sub(start) as f32 / duration as f32).min(1.0)
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        match self {
            Self::Food(a) => a.completed,
            Self::PlayerEat(a) => a.completed,
        }
    }

    /// Whether `id` takes part in this animation on either side.
    pub fn involves(&self, id: PlayerId) -> bool {
        match self {
            Self::Food(a) => a.player_id == id,
            Self::PlayerEat(a) => a.player_id == id || a.eaten_player_id == id,
        }
    }

    pub fn food_id(&self) -> Option<FoodId> {
        match self {
            Self::Food(a) => Some(a.food_id),
            Self::PlayerEat(_) => None,
        }
    }
}

/// What one animation pass changed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AnimationReport {
    /// Pellets removed from the world.
    pub eaten_food: Vec<FoodId>,
    /// Finished player-eat animations as `(predator, prey)`.
    pub finished_kills: Vec<(PlayerId, PlayerId)>,
    /// Players whose cells grew this pass.
    pub grown_players: Vec<PlayerId>,
}

impl AnimationReport {
    pub fn is_empty(&self) -> bool {
        self.eaten_food.is_empty() && self.finished_kills.is_empty() && self.grown_players.is_empty()
    }
}

/// Advance every active animation to `now`.
///
/// Completed animations are removed in the same pass, along with the food
/// they were consuming.
pub fn update_animations(world: &mut World, now: Timestamp) -> AnimationReport {
    let mut report = AnimationReport::default();
    let World {
        players,
        food,
        animations,
        ..
    } = world;

    for animation in animations.iter_mut() {
        let progress = animation.progress(now);
        match animation {
            ConsumingAnimation::PlayerEat(anim) => {
                if progress >= 1.0 || !players.contains_key(&anim.player_id) {
                    anim.completed = true;
                    report.finished_kills.push((anim.player_id, anim.eaten_player_id));
                }
            }
            ConsumingAnimation::Food(anim) => {
                let Some(player) = players.get_mut(&anim.player_id) else {
                    anim.completed = true;
                    continue;
                };

                if progress >= 1.0 {
                    if let Some(cell) = player.cell_mut(anim.cell_id) {
                        anim.grow(cell, 1.0);
                    }
                    player.update_radius();
                    player.update_score();
                    anim.completed = true;
                    report.grown_players.push(player.id);
                    continue;
                }

                let (Some(pellet), Some(cell)) = (food.get_mut(&anim.food_id), player.cell_mut(anim.cell_id)) else {
                    anim.completed = true;
                    continue;
                };

                anim.target_position = cell.position;
                pellet.position = anim.start_position.lerp(cell.position, progress);
                pellet.radius = anim.initial_food_radius * (1.0 - progress);
                anim.grow(cell, progress);
                player.update_radius();
                report.grown_players.push(player.id);
            }
        }
    }

    animations.retain(|animation| {
        if !animation.is_completed() {
            return true;
        }
        if let Some(id) = animation.food_id() {
            if food.remove(&id).is_some() {
                report.eaten_food.push(id);
            }
        }
        false
    });

    report.grown_players.sort_unstable();
    report.grown_players.dedup();
    report
}
