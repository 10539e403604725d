//! World state management.
//!
//! Owns every live entity, keyed by stable id, plus the rectangular bounds
//! they live in.

use crate::animation::ConsumingAnimation;
use crate::entity::{EjectedMass, Food, FoodId, MassId, Player};
use crate::error::GameError;
use crate::math::random_coordinates;
use glam::Vec2;
use protocol::{Color, PlayerId};
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;

/// Colors handed out to players on connect.
pub const PLAYER_PALETTE: [Color; 9] = [
    Color::new(0xFF, 0x00, 0x00),
    Color::new(0x00, 0xFF, 0x00),
    Color::new(0x00, 0x00, 0xFF),
    Color::new(0xFF, 0xFF, 0x00),
    Color::new(0xFF, 0x00, 0xFF),
    Color::new(0x00, 0xFF, 0xFF),
    Color::new(0xFF, 0x80, 0x00),
    Color::new(0x80, 0x00, 0xFF),
    Color::new(0x00, 0xFF, 0x80),
];

/// Rectangular play area with its origin in the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
}

impl WorldBounds {
    pub fn new(width: f32, height: f32) -> Result<Self, GameError> {
        // Written negated so NaN is rejected too.
        if !(width > 0.0 && height > 0.0) {
            return Err(GameError::InvalidWorldDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    /// Clamp a circle's center so the circle stays inside the bounds.
    /// A circle wider than the world is centered on that axis.
    pub fn clamp_circle(&self, position: Vec2, radius: f32) -> Vec2 {
        Vec2::new(
            clamp_axis(position.x, radius, self.width),
            clamp_axis(position.y, radius, self.height),
        )
    }

    #[inline]
    pub fn clamp_point(&self, position: Vec2) -> Vec2 {
        position.clamp(Vec2::ZERO, Vec2::new(self.width, self.height))
    }

    #[inline]
    pub fn contains(&self, position: Vec2) -> bool {
        (0.0..=self.width).contains(&position.x) && (0.0..=self.height).contains(&position.y)
    }

    /// Uniform random point at least `padding` away from every edge.
    #[inline]
    pub fn random_point(&self, rng: &mut impl Rng, padding: f32) -> Vec2 {
        random_coordinates(rng, self.width, self.height, padding)
    }
}

fn clamp_axis(value: f32, radius: f32, extent: f32) -> f32 {
    if 2.0 * radius >= extent {
        extent / 2.0
    } else {
        value.clamp(radius, extent - radius)
    }
}

/// The game world containing all entities.
#[derive(Debug)]
pub struct World {
    pub bounds: WorldBounds,
    pub players: HashMap<PlayerId, Player>,
    pub food: HashMap<FoodId, Food>,
    pub ejected: HashMap<MassId, EjectedMass>,
    /// Active consumption animations. Completed ones are dropped in the
    /// same pass that completes them.
    pub animations: Vec<ConsumingAnimation>,
    /// Shared id counter for food and ejected mass.
    next_id: u32,
}

impl World {
    pub fn new(bounds: WorldBounds) -> Self {
        Self {
            bounds,
            players: HashMap::with_capacity(64),
            food: HashMap::with_capacity(1024),
            ejected: HashMap::with_capacity(128),
            animations: Vec::new(),
            next_id: 1,
        }
    }

    /// Get the next entity id.
    pub fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    /// Generate a random pellet color.
    #[inline]
    pub fn random_color(rng: &mut impl Rng) -> Color {
        Color::new(
            rng.random_range(50..=255),
            rng.random_range(50..=255),
            rng.random_range(50..=255),
        )
    }

    /// Pick a player color from the palette.
    #[inline]
    pub fn random_player_color(rng: &mut impl Rng) -> Color {
        PLAYER_PALETTE[rng.random_range(0..PLAYER_PALETTE.len())]
    }

    /// Seed the world with its starting food.
    pub fn initialize_food(&mut self, count: usize, radius: f32, rng: &mut impl Rng) {
        self.food.clear();
        self.spawn_food(count, radius, rng);
    }

    /// Spawn `count` pellets at least two food radii from every edge.
    /// Returns how many were spawned.
    pub fn spawn_food(&mut self, count: usize, radius: f32, rng: &mut impl Rng) -> usize {
        for _ in 0..count {
            let position = self.bounds.random_point(rng, radius * 2.0);
            let id = self.next_id();
            let food = Food::new(id, position, radius, Self::random_color(rng));
            self.food.insert(id, food);
        }
        count
    }

    /// Find a spawn point for a cell of `radius`.
    ///
    /// Samples up to `attempts` points and takes the first one farther than
    /// two radii from every existing cell. If none qualifies, the sample
    /// with the most clearance wins.
    pub fn find_spawn_position(&self, radius: f32, attempts: usize, rng: &mut impl Rng) -> Vec2 {
        let min_clearance = radius * 2.0;
        let mut best = self.bounds.random_point(rng, radius);
        let mut best_clearance = self.clearance(best);

        for _ in 1..attempts.max(1) {
            if best_clearance >= min_clearance {
                break;
            }
            let candidate = self.bounds.random_point(rng, radius);
            let clearance = self.clearance(candidate);
            if clearance > best_clearance {
                best = candidate;
                best_clearance = clearance;
            }
        }

        best
    }

    /// Distance from `point` to the nearest player cell center.
    fn clearance(&self, point: Vec2) -> f32 {
        self.players
            .values()
            .flat_map(|p| p.cells.iter())
            .map(|c| c.position.distance(point))
            .fold(f32::INFINITY, f32::min)
    }
}
