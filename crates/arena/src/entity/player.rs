//! Player aggregate: one or more cells steered toward a shared target.

use super::cell::{CellId, PlayerCell};
use crate::Timestamp;
use crate::config::PlayerConfig;
use crate::math::radius_from_area;
use crate::stats::PlayerStats;
use crate::world::WorldBounds;
use glam::Vec2;
use protocol::{Color, PlayerId};
use rand::Rng;
use serde::Serialize;
use std::f32::consts::{SQRT_2, TAU};

// Separation strength for overlapping siblings that can't merge yet.
const SPLIT_PUSH_FORCE: f32 = 0.8;
const PUSH_FORCE: f32 = 0.5;

/// A connected player or bot.
#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub username: String,
    pub color: Color,
    pub speed: f32,
    /// Never empty while the player is in the world.
    pub cells: Vec<PlayerCell>,
    /// Radius of the single circle with the same total area as all cells.
    pub radius: f32,
    pub stats: PlayerStats,
    pub created_at: Timestamp,
    pub is_bot: bool,
    /// Last point the player steered toward; aims splits and ejects.
    pub target: Option<Vec2>,
    #[serde(skip)]
    next_cell_id: CellId,
}

impl Player {
    /// Create a player with a single cell.
    pub fn new(
        id: PlayerId,
        username: impl Into<String>,
        color: Color,
        position: Vec2,
        radius: f32,
        speed: f32,
        now: Timestamp,
    ) -> Self {
        let mut player = Self {
            id,
            username: username.into(),
            color,
            speed,
            cells: vec![PlayerCell::new(0, position, radius)],
            radius,
            stats: PlayerStats::default(),
            created_at: now,
            is_bot: false,
            target: None,
            next_cell_id: 1,
        };
        player.update_score();
        player
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.cells.is_empty()
    }

    /// Position of the first cell.
    #[inline]
    pub fn position(&self) -> Vec2 {
        self.cells.first().map_or(Vec2::ZERO, |c| c.position)
    }

    /// Mean of all cell centers.
    pub fn center(&self) -> Vec2 {
        if self.cells.is_empty() {
            return Vec2::ZERO;
        }
        let sum: Vec2 = self.cells.iter().map(|c| c.position).sum();
        sum / self.cells.len() as f32
    }

    #[inline]
    pub fn total_area(&self) -> f32 {
        self.cells.iter().map(PlayerCell::area).sum()
    }

    pub fn cell_mut(&mut self, id: CellId) -> Option<&mut PlayerCell> {
        self.cells.iter_mut().find(|c| c.id == id)
    }

    /// Cell whose center is closest to `point`.
    pub fn nearest_cell(&self, point: Vec2) -> Option<&PlayerCell> {
        self.cells
            .iter()
            .min_by(|a, b| {
                a.position
                    .distance_squared(point)
                    .total_cmp(&b.position.distance_squared(point))
            })
    }

    pub fn largest_cell(&self) -> Option<&PlayerCell> {
        self.cells.iter().max_by(|a, b| a.radius.total_cmp(&b.radius))
    }

    /// Recompute the aggregate radius from the cell areas.
    pub fn update_radius(&mut self) {
        self.radius = radius_from_area(self.total_area());
    }

    pub fn update_score(&mut self) {
        let area = self.total_area();
        self.stats.set_area(area);
    }

    /// Refresh score and time alive.
    pub fn update_stats(&mut self, now: Timestamp) {
        self.update_score();
        self.stats.time_alive = now.saturating_sub(self.created_at) / 1000;
    }

    /// Full movement pipeline for one intent: step every cell toward
    /// `target`, settle sibling overlaps, merge eligible cells, then clamp.
    pub fn move_towards(&mut self, target: Vec2, now: Timestamp, bounds: &WorldBounds, config: &PlayerConfig) {
        self.target = Some(target);

        let speed = self.speed;
        for cell in &mut self.cells {
            cell.step_towards(target, speed);
        }

        self.resolve_cell_collisions(false, now, config);
        self.merge_check(now, config.merge_time_ms);
        self.clamp_to(bounds);
        self.update_radius();
    }

    /// Handle overlaps between this player's own cells.
    ///
    /// Freshly split cells coast on their split velocity instead of being
    /// pushed. Older overlapping cells are pushed apart in proportion to the
    /// other cell's radius, unless both may merge. `initial_split` skips the
    /// coasting phase and pushes harder.
    pub fn resolve_cell_collisions(&mut self, initial_split: bool, now: Timestamp, config: &PlayerConfig) {
        let coast_ms = config.split_coast_ms;
        let merge_ms = config.merge_time_ms;
        let force = if initial_split { SPLIT_PUSH_FORCE } else { PUSH_FORCE };

        for i in 0..self.cells.len() {
            if !initial_split && self.cells[i].is_coasting(now, coast_ms) {
                self.cells[i].coast();
                continue;
            }

            for j in (i + 1)..self.cells.len() {
                let (a, b) = (&self.cells[i], &self.cells[j]);
                if !initial_split && b.is_coasting(now, coast_ms) {
                    continue;
                }

                let delta = b.position - a.position;
                let distance = delta.length();
                let min_distance = a.radius + b.radius;
                let can_merge = a.can_merge(now, merge_ms) && b.can_merge(now, merge_ms);
                if distance >= min_distance || can_merge {
                    continue;
                }

                let overlap = min_distance - distance;
                let direction = if distance > 0.0 { delta / distance } else { Vec2::X };
                let push_a = overlap * (b.radius / min_distance) * force;
                let push_b = overlap * (a.radius / min_distance) * force;

                self.cells[i].position -= direction * push_a;
                self.cells[j].position += direction * push_b;
            }
        }

        self.update_radius();
    }

    /// Split every cell large enough, aiming at the last target.
    ///
    /// Each split halves the parent's area and places a sibling just ahead
    /// of it with outward velocity. The cell count never exceeds
    /// `max_cells`. Returns whether anything split.
    pub fn split(&mut self, now: Timestamp, bounds: &WorldBounds, rng: &mut impl Rng, config: &PlayerConfig) -> bool {
        if self.cells.len() >= config.max_cells {
            return false;
        }

        let mut new_cells = Vec::new();
        for idx in 0..self.cells.len() {
            if self.cells.len() + new_cells.len() >= config.max_cells {
                break;
            }
            if self.cells[idx].radius < config.min_split_radius {
                continue;
            }

            let angle = match self.target {
                Some(target) => {
                    let aim = target - self.cells[idx].position;
                    aim.y.atan2(aim.x)
                }
                None => rng.random_range(0.0..TAU),
            };
            let direction = Vec2::from_angle(angle);
            let id = self.next_cell_id;
            self.next_cell_id += 1;

            let parent = &mut self.cells[idx];
            let new_radius = parent.radius / SQRT_2;
            parent.radius = new_radius;
            parent.split_time = Some(now);

            new_cells.push(PlayerCell {
                id,
                position: parent.position + direction * (new_radius * config.split_offset),
                radius: new_radius,
                velocity: direction * config.split_speed,
                split_time: Some(now),
            });
        }

        if new_cells.is_empty() {
            return false;
        }

        self.cells.extend(new_cells);
        self.resolve_cell_collisions(true, now, config);
        self.clamp_to(bounds);
        true
    }

    /// Merge sibling pairs whose cooldown has elapsed and that overlap
    /// deeply enough. The survivor takes the area-weighted centroid.
    pub fn merge_check(&mut self, now: Timestamp, merge_ms: u64) -> bool {
        let mut absorbed = vec![false; self.cells.len()];

        for i in 0..self.cells.len() {
            if absorbed[i] || !self.cells[i].can_merge(now, merge_ms) {
                continue;
            }
            for j in (i + 1)..self.cells.len() {
                if absorbed[j] || !self.cells[j].can_merge(now, merge_ms) {
                    continue;
                }

                let (a, b) = (&self.cells[i], &self.cells[j]);
                if a.position.distance(b.position) >= a.radius + b.radius * 0.5 {
                    continue;
                }

                let (area_a, area_b) = (a.area(), b.area());
                let total = area_a + area_b;
                let centroid = (a.position * area_a + b.position * area_b) / total;

                let survivor = &mut self.cells[i];
                survivor.radius = radius_from_area(total);
                survivor.position = centroid;
                absorbed[j] = true;
            }
        }

        if !absorbed.contains(&true) {
            return false;
        }

        let mut flags = absorbed.into_iter();
        self.cells.retain(|_| !flags.next().unwrap_or(false));
        self.update_radius();
        true
    }

    /// Keep every cell fully inside the world.
    pub fn clamp_to(&mut self, bounds: &WorldBounds) {
        for cell in &mut self.cells {
            cell.clamp_to(bounds);
        }
    }
}
