//! Mass ejected by a player.

use crate::Timestamp;
use crate::world::WorldBounds;
use glam::Vec2;
use protocol::{Color, PlayerId};
use serde::Serialize;

pub type MassId = u32;

// Below this a velocity component is considered at rest.
const REST_SPEED: f32 = 0.01;

/// A friction-damped projectile that larger cells can absorb.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EjectedMass {
    pub id: MassId,
    pub position: Vec2,
    pub radius: f32,
    pub velocity: Vec2,
    /// Emitting player.
    pub player_id: PlayerId,
    pub created_at: Timestamp,
    pub color: Color,
    /// Area taken from the emitting cell.
    pub original_area: f32,
}

impl EjectedMass {
    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    #[inline]
    pub fn is_expired(&self, now: Timestamp, lifetime_ms: u64) -> bool {
        now.saturating_sub(self.created_at) >= lifetime_ms
    }

    /// Whether the emitter is still barred from re-absorbing this mass.
    #[inline]
    pub fn in_grace(&self, now: Timestamp, grace_ms: u64) -> bool {
        now.saturating_sub(self.created_at) < grace_ms
    }

    /// One physics step: friction, advance, then bounce off the walls.
    pub fn step(&mut self, bounds: &WorldBounds, friction: f32, bounce: f32) {
        self.velocity *= friction;
        if self.velocity.x.abs() < REST_SPEED {
            self.velocity.x = 0.0;
        }
        if self.velocity.y.abs() < REST_SPEED {
            self.velocity.y = 0.0;
        }
        self.position += self.velocity;

        let clamped = bounds.clamp_circle(self.position, self.radius);
        if clamped.x != self.position.x {
            self.velocity.x *= bounce;
        }
        if clamped.y != self.position.y {
            self.velocity.y *= bounce;
        }
        self.position = clamped;
    }
}
