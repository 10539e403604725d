//! Food pellet.

use crate::math::circle_area;
use glam::Vec2;
use protocol::{Color, PlayerId};
use serde::Serialize;

pub type FoodId = u32;

/// A food pellet that can be eaten by players.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Food {
    pub id: FoodId,
    pub position: Vec2,
    pub radius: f32,
    pub color: Color,
    /// Player currently consuming this pellet. At most one at a time.
    pub consuming_player: Option<PlayerId>,
}

impl Food {
    pub fn new(id: FoodId, position: Vec2, radius: f32, color: Color) -> Self {
        Self {
            id,
            position,
            radius,
            color,
            consuming_player: None,
        }
    }

    /// Pellets mid-animation are invisible to collision detection.
    #[inline]
    pub fn is_being_consumed(&self) -> bool {
        self.consuming_player.is_some()
    }

    #[inline]
    pub fn area(&self) -> f32 {
        circle_area(self.radius)
    }

    /// Return the pellet to the pool after its consumer vanished.
    pub fn release(&mut self) {
        self.consuming_player = None;
    }
}
