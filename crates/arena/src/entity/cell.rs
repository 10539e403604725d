//! A single circular body belonging to a player.

use crate::Timestamp;
use crate::math::{circle_area, radius_from_area};
use crate::world::WorldBounds;
use glam::Vec2;
use serde::Serialize;

/// Cell id, unique within its owning player.
pub type CellId = u32;

// Cells move more slowly as they grow, down to this fraction of base speed.
const MIN_SPEED_FACTOR: f32 = 0.3;
const SPEED_REFERENCE_RADIUS: f32 = 50.0;

// Coasting velocity decay per collision pass.
const COAST_DECAY: f32 = 0.9;
const COAST_STOP: f32 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerCell {
    pub id: CellId,
    pub position: Vec2,
    pub radius: f32,
    /// Outward velocity given by a split, decays while coasting.
    pub velocity: Vec2,
    /// When this cell last took part in a split. `None` for cells that never split.
    pub split_time: Option<Timestamp>,
}

impl PlayerCell {
    pub fn new(id: CellId, position: Vec2, radius: f32) -> Self {
        Self {
            id,
            position,
            radius,
            velocity: Vec2::ZERO,
            split_time: None,
        }
    }

    #[inline]
    pub fn area(&self) -> f32 {
        circle_area(self.radius)
    }

    /// Grow by `area`.
    #[inline]
    pub fn on_eat(&mut self, area: f32) {
        self.radius = radius_from_area(self.area() + area);
    }

    /// Milliseconds since the last split, if the cell ever split.
    #[inline]
    pub fn since_split(&self, now: Timestamp) -> Option<u64> {
        self.split_time.map(|t| now.saturating_sub(t))
    }

    /// Whether the cell is still riding its split velocity.
    #[inline]
    pub fn is_coasting(&self, now: Timestamp, coast_ms: u64) -> bool {
        self.since_split(now).is_some_and(|age| age < coast_ms)
    }

    /// Whether the merge cooldown has elapsed.
    #[inline]
    pub fn can_merge(&self, now: Timestamp, merge_ms: u64) -> bool {
        self.since_split(now).is_none_or(|age| age >= merge_ms)
    }

    /// Larger cells move proportionally slower.
    #[inline]
    pub fn speed_factor(&self) -> f32 {
        if self.radius <= 0.0 {
            return 1.0;
        }
        MIN_SPEED_FACTOR.max(SPEED_REFERENCE_RADIUS / self.radius)
    }

    /// Advance toward `target` by `speed * speed_factor`, snapping onto the
    /// target when it is closer than one step.
    pub fn step_towards(&mut self, target: Vec2, speed: f32) {
        let delta = target - self.position;
        let distance = delta.length();
        if distance <= 0.0 {
            return;
        }

        let step = speed * self.speed_factor();
        if distance > step {
            self.position += delta / distance * step;
        } else {
            self.position = target;
        }
    }

    /// Drift along the split velocity and let it decay.
    pub fn coast(&mut self) {
        self.position += self.velocity;
        self.velocity *= COAST_DECAY;
        if self.velocity.x.abs() < COAST_STOP {
            self.velocity.x = 0.0;
        }
        if self.velocity.y.abs() < COAST_STOP {
            self.velocity.y = 0.0;
        }
    }

    /// Keep the whole circle inside the world.
    #[inline]
    pub fn clamp_to(&mut self, bounds: &WorldBounds) {
        self.position = bounds.clamp_circle(self.position, self.radius);
    }
}
