//! Circle geometry helpers shared by collision, spawning and the bots.

use glam::Vec2;
use rand::Rng;
use std::f32::consts::PI;

/// Area of a circle with the given radius.
#[inline]
pub fn circle_area(radius: f32) -> f32 {
    PI * radius * radius
}

/// Radius of the circle with the given area.
#[inline]
pub fn radius_from_area(area: f32) -> f32 {
    (area.max(0.0) / PI).sqrt()
}

#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Fraction of `reference_area` covered by the lens where two circles
/// intersect.
///
/// Disjoint circles give 0. When one circle contains the other the result
/// is 1 if `radius_a` is the larger one, otherwise 0. `reference_area` is
/// the food area for pellets and the smaller player's area in combat.
pub fn overlap_percentage(radius_a: f32, radius_b: f32, center_distance: f32, reference_area: f32) -> f32 {
    if center_distance >= radius_a + radius_b {
        return 0.0;
    }
    if center_distance <= (radius_a - radius_b).abs() {
        return if radius_a >= radius_b { 1.0 } else { 0.0 };
    }
    if reference_area <= 0.0 {
        return 0.0;
    }

    let (r, s, d) = (radius_a, radius_b, center_distance);

    // Distance from A's center to the chord, then the half chord length.
    let a = (r * r - s * s + d * d) / (2.0 * d);
    let h = (r * r - a * a).max(0.0).sqrt();

    let segment_a = r * r * (a / r).clamp(-1.0, 1.0).acos() - a * h;
    let segment_b = s * s * ((d - a) / s).clamp(-1.0, 1.0).acos() - (d - a) * h;

    ((segment_a + segment_b) / reference_area).max(0.0)
}

/// Uniform random point inside `[padding, width - padding] x [padding, height - padding]`.
pub fn random_coordinates(rng: &mut impl Rng, width: f32, height: f32, padding: f32) -> Vec2 {
    let span_x = (width - 2.0 * padding).max(0.0);
    let span_y = (height - 2.0 * padding).max(0.0);
    Vec2::new(
        padding + rng.random::<f32>() * span_x,
        padding + rng.random::<f32>() * span_y,
    )
}
