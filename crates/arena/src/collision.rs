//! Collision detection and resolution.
//!
//! Food is eaten by true overlap area against the pellet. Player cells use
//! a cheaper size-ratio plus containment test, since every cell of every
//! player has to be checked pairwise.

use crate::Timestamp;
use crate::animation::{ConsumingAnimation, FoodAnimation, PlayerEatAnimation};
use crate::config::EjectConfig;
use crate::entity::{Food, FoodId, MassId, Player, PlayerCell};
use crate::math::{distance, overlap_percentage};
use crate::stats::PlayerStats;
use crate::world::World;
use protocol::PlayerId;
use std::collections::HashMap;

/// Whether cell `a` is large enough to eat cell `b`.
#[inline]
pub fn outsizes(a: &PlayerCell, b: &PlayerCell, size_ratio: f32) -> bool {
    a.radius >= b.radius * size_ratio
}

/// Whether cell `a` may eat cell `b` at the given center distance.
#[inline]
pub fn can_eat(a: &PlayerCell, b: &PlayerCell, distance: f32, size_ratio: f32) -> bool {
    outsizes(a, b, size_ratio) && distance < a.radius
}

/// Pellets overlapped by any of `player`'s cells by at least `threshold`
/// of their own area. Pellets already being consumed are skipped.
pub fn detect_food_collisions(player: &Player, food: &HashMap<FoodId, Food>, threshold: f32) -> Vec<FoodId> {
    let mut hits: Vec<FoodId> = food
        .values()
        .filter(|pellet| !pellet.is_being_consumed())
        .filter(|pellet| {
            let reference = pellet.area();
            player.cells.iter().any(|cell| {
                let d = distance(cell.position, pellet.position);
                overlap_percentage(cell.radius, pellet.radius, d, reference) >= threshold
            })
        })
        .map(|pellet| pellet.id)
        .collect();
    hits.sort_unstable();
    hits
}

/// Claim a pellet for `player_id` and start animating it into the nearest cell.
/// Returns false if either side is gone or the pellet is already claimed.
pub fn handle_food_collision(
    world: &mut World,
    player_id: PlayerId,
    food_id: FoodId,
    now: Timestamp,
    duration: u64,
    growth_factor: f32,
) -> bool {
    let (Some(player), Some(pellet)) = (world.players.get_mut(&player_id), world.food.get_mut(&food_id)) else {
        return false;
    };
    if pellet.is_being_consumed() {
        return false;
    }
    let Some(animation) = FoodAnimation::new(pellet, player, now, duration, growth_factor) else {
        return false;
    };

    pellet.consuming_player = Some(player_id);
    player.stats.food_eaten += 1;
    world.animations.push(ConsumingAnimation::Food(animation));
    true
}

/// Other players with at least one cell pair where either side can eat the other.
pub fn detect_player_collisions(world: &World, player_id: PlayerId, size_ratio: f32) -> Vec<PlayerId> {
    let Some(player) = world.players.get(&player_id) else {
        return Vec::new();
    };

    let mut hits: Vec<PlayerId> = world
        .players
        .values()
        .filter(|other| other.id != player_id)
        .filter(|other| {
            player.cells.iter().any(|a| {
                other.cells.iter().any(|b| {
                    let distance = a.position.distance(b.position);
                    can_eat(a, b, distance, size_ratio) || can_eat(b, a, distance, size_ratio)
                })
            })
        })
        .map(|other| other.id)
        .collect();
    hits.sort_unstable();
    hits
}

/// A player fully consumed by another.
#[derive(Debug, Clone, PartialEq)]
pub struct Kill {
    pub predator: PlayerId,
    pub prey: PlayerId,
    /// Final stats of the prey's life.
    pub stats: PlayerStats,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CollisionOutcome {
    /// Whether any cell was eaten.
    pub consumed: bool,
    pub kill: Option<Kill>,
}

/// Resolve every cross pair of cells between players `a` and `b`.
///
/// The larger cell of each qualifying pair absorbs the smaller one's area.
/// A player left with no cells is removed from the world and a player-eat
/// animation is started toward the survivor.
pub fn handle_player_collision(
    world: &mut World,
    a: PlayerId,
    b: PlayerId,
    now: Timestamp,
    size_ratio: f32,
    duration: u64,
) -> CollisionOutcome {
    if a == b {
        return CollisionOutcome::default();
    }
    let Some(mut first) = world.players.remove(&a) else {
        return CollisionOutcome::default();
    };
    let Some(mut second) = world.players.remove(&b) else {
        world.players.insert(a, first);
        return CollisionOutcome::default();
    };

    let before = [(first.center(), first.radius), (second.center(), second.radius)];
    let consumed = exchange_cells(&mut first, &mut second, size_ratio);

    let mut outcome = CollisionOutcome { consumed, kill: None };
    for player in [&mut first, &mut second] {
        player.update_radius();
        player.update_score();
    }

    let kill = match (first.is_dead(), second.is_dead()) {
        (false, true) => Some((first, second, before[1])),
        (true, false) => Some((second, first, before[0])),
        _ => {
            world.players.insert(a, first);
            world.players.insert(b, second);
            None
        }
    };

    if let Some((mut predator, mut prey, (prey_position, prey_radius))) = kill {
        predator.stats.players_eaten += 1;
        prey.stats.time_alive = now.saturating_sub(prey.created_at) / 1000;

        world.animations.push(ConsumingAnimation::PlayerEat(PlayerEatAnimation {
            player_id: predator.id,
            eaten_player_id: prey.id,
            start_time: now,
            duration,
            start_position: prey_position,
            target_position: predator.center(),
            initial_eaten_radius: prey_radius,
            eaten_player_stats: prey.stats,
            completed: false,
        }));
        outcome.kill = Some(Kill {
            predator: predator.id,
            prey: prey.id,
            stats: prey.stats,
        });
        world.players.insert(predator.id, predator);
    }

    outcome
}

fn exchange_cells(first: &mut Player, second: &mut Player, size_ratio: f32) -> bool {
    let mut consumed = false;
    let mut i = 0;
    while i < first.cells.len() {
        let mut first_cell_eaten = false;
        let mut j = 0;
        while j < second.cells.len() {
            let (ca, cb) = (&first.cells[i], &second.cells[j]);
            let distance = ca.position.distance(cb.position);

            if can_eat(ca, cb, distance, size_ratio) {
                let eaten = second.cells.remove(j);
                first.cells[i].on_eat(eaten.area());
                consumed = true;
                continue;
            }
            if can_eat(cb, ca, distance, size_ratio) {
                let eaten = first.cells.remove(i);
                second.cells[j].on_eat(eaten.area());
                consumed = true;
                first_cell_eaten = true;
                break;
            }
            j += 1;
        }
        if !first_cell_eaten {
            i += 1;
        }
    }
    consumed
}

/// Let cells absorb ejected mass.
///
/// Each mass goes to the nearest cell at least as large as it that
/// contains its center. The emitter is skipped while the mass is in its
/// grace period. Returns `(mass, absorber)` pairs.
pub fn resolve_mass_absorption(world: &mut World, now: Timestamp, config: &EjectConfig) -> Vec<(MassId, PlayerId)> {
    let mut mass_ids: Vec<MassId> = world.ejected.keys().copied().collect();
    mass_ids.sort_unstable();

    let mut absorbed = Vec::new();
    for mass_id in mass_ids {
        let Some(mass) = world.ejected.get(&mass_id) else {
            continue;
        };
        let grace = mass.in_grace(now, config.grace_ms);

        let mut best: Option<(PlayerId, usize, f32)> = None;
        for player in world.players.values() {
            if grace && player.id == mass.player_id {
                continue;
            }
            for (idx, cell) in player.cells.iter().enumerate() {
                let distance = cell.position.distance(mass.position);
                if cell.radius < mass.radius || distance >= cell.radius {
                    continue;
                }
                if best.is_none_or(|(_, _, d)| distance < d) {
                    best = Some((player.id, idx, distance));
                }
            }
        }

        let Some((player_id, idx, _)) = best else {
            continue;
        };
        let gain = mass.original_area * config.value_ratio;
        if let Some(player) = world.players.get_mut(&player_id) {
            player.cells[idx].on_eat(gain);
            player.update_radius();
            player.update_score();
        }
        world.ejected.remove(&mass_id);
        absorbed.push((mass_id, player_id));
    }
    absorbed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::update_animations;
    use crate::entity::EjectedMass;
    use crate::math::{circle_area, radius_from_area};
    use crate::world::WorldBounds;
    use glam::Vec2;
    use protocol::Color;

    fn world() -> World {
        World::new(WorldBounds::new(2000.0, 2000.0).unwrap())
    }

    fn add_player(world: &mut World, id: PlayerId, position: Vec2, radius: f32) {
        world
            .players
            .insert(id, Player::new(id, format!("p{id}"), Color::default(), position, radius, 5.0, 0));
    }

    #[test]
    fn test_food_scenario_detected_and_eaten() {
        let mut world = world();
        add_player(&mut world, 1, Vec2::new(100.0, 100.0), 30.0);
        world
            .food
            .insert(4, Food::new(4, Vec2::new(105.0, 105.0), 10.0, Color::default()));

        let hits = detect_food_collisions(&world.players[&1], &world.food, 0.7);
        assert_eq!(hits, vec![4]);
        assert!(handle_food_collision(&mut world, 1, 4, 0, 300, 1.05));
        assert_eq!(world.players[&1].stats.food_eaten, 1);

        // Claimed pellets are invisible to everyone.
        assert!(detect_food_collisions(&world.players[&1], &world.food, 0.7).is_empty());
        add_player(&mut world, 2, Vec2::new(104.0, 104.0), 30.0);
        assert!(detect_food_collisions(&world.players[&2], &world.food, 0.7).is_empty());
        assert!(!handle_food_collision(&mut world, 2, 4, 0, 300, 1.05));

        update_animations(&mut world, 300);
        assert!(world.food.is_empty());
        assert!(world.players[&1].radius > 30.0);
    }

    #[test]
    fn test_food_far_away_not_detected() {
        let mut world = world();
        add_player(&mut world, 1, Vec2::new(100.0, 100.0), 30.0);
        world
            .food
            .insert(4, Food::new(4, Vec2::new(135.0, 100.0), 10.0, Color::default()));
        assert!(detect_food_collisions(&world.players[&1], &world.food, 0.7).is_empty());
    }

    #[test]
    fn test_food_detected_once_across_cells() {
        let mut world = world();
        add_player(&mut world, 1, Vec2::new(100.0, 100.0), 30.0);
        if let Some(player) = world.players.get_mut(&1) {
            player.cells.push(PlayerCell::new(5, Vec2::new(110.0, 100.0), 30.0));
        }
        world
            .food
            .insert(4, Food::new(4, Vec2::new(105.0, 100.0), 10.0, Color::default()));
        assert_eq!(detect_food_collisions(&world.players[&1], &world.food, 0.7), vec![4]);
    }

    #[test]
    fn test_larger_player_consumes_smaller() {
        let mut world = world();
        add_player(&mut world, 1, Vec2::new(500.0, 500.0), 50.0);
        add_player(&mut world, 2, Vec2::new(520.0, 500.0), 35.0);
        let expected = radius_from_area(circle_area(50.0) + circle_area(35.0));

        assert_eq!(detect_player_collisions(&world, 2, 1.25), vec![1]);
        let outcome = handle_player_collision(&mut world, 2, 1, 1_000, 1.25, 300);

        assert!(outcome.consumed);
        let kill = outcome.kill.unwrap();
        assert_eq!((kill.predator, kill.prey), (1, 2));
        assert!(!world.players.contains_key(&2));
        let winner = &world.players[&1];
        assert!((winner.radius - expected).abs() < 1e-3);
        assert_eq!(winner.stats.players_eaten, 1);
        assert!(matches!(
            world.animations.as_slice(),
            [ConsumingAnimation::PlayerEat(anim)] if anim.eaten_player_id == 2 && anim.initial_eaten_radius == 35.0
        ));
    }

    #[test]
    fn test_exact_size_ratio_eats() {
        let mut world = world();
        add_player(&mut world, 1, Vec2::new(500.0, 500.0), 50.0);
        add_player(&mut world, 2, Vec2::new(510.0, 500.0), 40.0);
        let (a, b) = (&world.players[&1].cells[0], &world.players[&2].cells[0]);
        assert!(outsizes(a, b, 1.25));
        assert!(!outsizes(b, a, 1.25));
        assert_eq!(detect_player_collisions(&world, 2, 1.25), vec![1]);
    }

    #[test]
    fn test_similar_sizes_pass() {
        let mut world = world();
        add_player(&mut world, 1, Vec2::new(500.0, 500.0), 40.0);
        add_player(&mut world, 2, Vec2::new(510.0, 500.0), 35.0);
        assert!(detect_player_collisions(&world, 1, 1.25).is_empty());
        let outcome = handle_player_collision(&mut world, 1, 2, 0, 1.25, 300);
        assert_eq!(outcome, CollisionOutcome::default());
        assert_eq!(world.players.len(), 2);
    }

    #[test]
    fn test_partial_consumption_keeps_prey_alive() {
        let mut world = world();
        add_player(&mut world, 1, Vec2::new(500.0, 500.0), 50.0);
        add_player(&mut world, 2, Vec2::new(520.0, 500.0), 20.0);
        if let Some(prey) = world.players.get_mut(&2) {
            prey.cells.push(PlayerCell::new(9, Vec2::new(900.0, 900.0), 20.0));
            prey.update_radius();
        }

        let outcome = handle_player_collision(&mut world, 1, 2, 0, 1.25, 300);
        assert!(outcome.consumed);
        assert!(outcome.kill.is_none());
        let prey = &world.players[&2];
        assert_eq!(prey.cells.len(), 1);
        assert!((prey.radius - 20.0).abs() < 1e-4);
        assert!(world.animations.is_empty());
    }

    #[test]
    fn test_missing_player_is_noop() {
        let mut world = world();
        add_player(&mut world, 1, Vec2::new(500.0, 500.0), 50.0);
        assert_eq!(handle_player_collision(&mut world, 1, 42, 0, 1.25, 300), CollisionOutcome::default());
        assert!(world.players.contains_key(&1));
    }

    fn mass(id: MassId, owner: PlayerId, position: Vec2, created_at: Timestamp) -> EjectedMass {
        EjectedMass {
            id,
            position,
            radius: 8.0,
            velocity: Vec2::ZERO,
            player_id: owner,
            created_at,
            color: Color::default(),
            original_area: 200.0,
        }
    }

    #[test]
    fn test_emitter_waits_out_grace() {
        let config = EjectConfig::default();
        let mut world = world();
        add_player(&mut world, 1, Vec2::new(500.0, 500.0), 50.0);
        world.ejected.insert(3, mass(3, 1, Vec2::new(510.0, 500.0), 0));

        assert!(resolve_mass_absorption(&mut world, 2_999, &config).is_empty());
        let area = world.players[&1].total_area();

        assert_eq!(resolve_mass_absorption(&mut world, 3_000, &config), vec![(3, 1)]);
        assert!(world.ejected.is_empty());
        let gained = world.players[&1].total_area() - area;
        assert!((gained - 170.0).abs() < 0.5);
    }

    #[test]
    fn test_nearest_other_cell_absorbs() {
        let config = EjectConfig::default();
        let mut world = world();
        add_player(&mut world, 1, Vec2::new(500.0, 500.0), 50.0);
        add_player(&mut world, 2, Vec2::new(540.0, 500.0), 50.0);
        add_player(&mut world, 3, Vec2::new(530.0, 500.0), 5.0);
        world.ejected.insert(3, mass(3, 9, Vec2::new(530.0, 500.0), 0));

        assert_eq!(resolve_mass_absorption(&mut world, 0, &config), vec![(3, 2)]);
    }
}
