//! Game state and the operations applied to it.
//!
//! Every operation takes the current `Timestamp` explicitly. The host reads
//! the clock once per job so all cooldowns within one pass agree.

use crate::Timestamp;
use crate::ai::{BotAction, BotManager, is_reserved_id};
use crate::animation::{AnimationReport, ConsumingAnimation, update_animations};
use crate::collision::{
    Kill, detect_food_collisions, detect_player_collisions, handle_food_collision, handle_player_collision,
    resolve_mass_absorption,
};
use crate::config::{Config, ServerConfig};
use crate::entity::{EjectedMass, Food, MassId, Player};
use crate::error::GameError;
use crate::math::radius_from_area;
use crate::stats::PlayerStats;
use crate::world::{World, WorldBounds};
use glam::Vec2;
use protocol::{Intent, PlayerId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::f32::consts::TAU;
use std::time::Instant;
use tracing::{debug, info, warn};

const DEFAULT_USERNAME: &str = "Anonymous";

/// The periodic jobs the host schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickKind {
    FoodSpawn,
    Animations,
    MassPhysics,
    BotThink,
    Stats,
}

impl TickKind {
    pub const ALL: [TickKind; 5] = [
        TickKind::FoodSpawn,
        TickKind::Animations,
        TickKind::MassPhysics,
        TickKind::BotThink,
        TickKind::Stats,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TickKind::FoodSpawn => "food",
            TickKind::Animations => "animation",
            TickKind::MassPhysics => "mass",
            TickKind::BotThink => "bot",
            TickKind::Stats => "stats",
        }
    }

    /// Scheduling interval for this job.
    pub fn interval_ms(self, config: &ServerConfig) -> u64 {
        match self {
            TickKind::FoodSpawn => config.food_spawn_interval_ms,
            TickKind::Animations => config.animation_interval_ms,
            TickKind::MassPhysics => config.mass_interval_ms,
            TickKind::BotThink => config.bot_interval_ms,
            TickKind::Stats => config.stats_interval_ms,
        }
    }
}

/// What one periodic job touched.
#[derive(Debug, Clone, PartialEq)]
pub enum TickReport {
    FoodSpawn {
        spawned: usize,
    },
    Animations(AnimationReport),
    MassPhysics {
        moving: usize,
        expired: Vec<MassId>,
        absorbed: Vec<(MassId, PlayerId)>,
    },
    BotThink {
        actions: usize,
        spawned: Vec<PlayerId>,
        kills: Vec<Kill>,
    },
    Stats {
        players: usize,
    },
}

/// Result of one move intent.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MoveReport {
    /// Pellets claimed by the mover.
    pub food_claimed: usize,
    /// Whole players eaten, on either side.
    pub kills: Vec<Kill>,
}

/// Full world state for broadcast. Entities are ordered by id.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub time: Timestamp,
    pub players: Vec<Player>,
    pub food: Vec<Food>,
    pub ejected: Vec<EjectedMass>,
    pub animations: Vec<ConsumingAnimation>,
    pub bounds: WorldBounds,
}

/// Main game state.
pub struct GameState {
    pub config: Config,
    pub world: World,
    pub bots: BotManager,
    start_time: Instant,
    rng: StdRng,
}

impl GameState {
    /// Create the world and seed its initial food.
    pub fn new(config: Config) -> Result<Self, GameError> {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Like `new`, with reproducible randomness.
    pub fn with_seed(config: Config, seed: u64) -> Result<Self, GameError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: Config, mut rng: StdRng) -> Result<Self, GameError> {
        let bounds = WorldBounds::new(config.world.width, config.world.height)?;
        let mut world = World::new(bounds);
        world.initialize_food(config.food.initial_count, config.food.radius, &mut rng);

        Ok(Self {
            config,
            world,
            bots: BotManager::new(),
            start_time: Instant::now(),
            rng,
        })
    }

    /// Milliseconds since the game was created.
    pub fn clock(&self) -> Timestamp {
        self.start_time.elapsed().as_millis() as Timestamp
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.world.players.get(&id)
    }

    /// Spawn a fresh player for `id`, replacing any life it already has.
    ///
    /// Ids from [`BOT_ID_BASE`](crate::ai::BOT_ID_BASE) up belong to bots;
    /// connecting with one is refused and returns `None`.
    pub fn connect(&mut self, id: PlayerId, username: Option<String>, now: Timestamp) -> Option<&Player> {
        if is_reserved_id(id) {
            warn!("Refusing client connect with reserved bot id {}", id);
            return None;
        }
        if self.world.players.contains_key(&id) {
            self.disconnect(id, now);
        }

        let username = username.unwrap_or_else(|| DEFAULT_USERNAME.to_string());
        let player = self.new_player(id, username, now);
        info!("Player {} ({}) joined at {:?}", id, player.username, player.position());
        Some(self.world.players.entry(id).or_insert(player))
    }

    /// Spawn a bot and register it.
    pub fn spawn_bot(&mut self, now: Timestamp) -> PlayerId {
        let bot = self.bots.add_bot(&mut self.rng);
        let (id, name) = (bot.id, bot.name.clone());

        let mut player = self.new_player(id, name, now);
        player.is_bot = true;
        debug!("Bot {} ({}) spawned", id, player.username);
        self.world.players.insert(id, player);
        id
    }

    /// Bring the bot population up to its configured size.
    pub fn spawn_initial_bots(&mut self, now: Timestamp) -> usize {
        let target = self.config.bot.count.min(self.config.bot.max_bots);
        let missing = target.saturating_sub(self.bots.len());
        for _ in 0..missing {
            self.spawn_bot(now);
        }
        missing
    }

    fn new_player(&mut self, id: PlayerId, username: String, now: Timestamp) -> Player {
        let cfg = &self.config.player;
        let position = self
            .world
            .find_spawn_position(cfg.start_radius, cfg.spawn_attempts, &mut self.rng);
        let color = World::random_player_color(&mut self.rng);
        Player::new(id, username, color, position, cfg.start_radius, cfg.speed, now)
    }

    /// Remove a player and everything that references it.
    ///
    /// Pellets the player was still swallowing go back to the pool.
    /// Returns the final stats of the life, if the player existed.
    pub fn disconnect(&mut self, id: PlayerId, now: Timestamp) -> Option<PlayerStats> {
        let mut player = self.world.players.remove(&id)?;
        player.update_stats(now);

        let food = &mut self.world.food;
        self.world.animations.retain(|animation| match animation {
            ConsumingAnimation::Food(anim) if anim.player_id == id => {
                if let Some(pellet) = food.get_mut(&anim.food_id) {
                    pellet.release();
                    pellet.radius = anim.initial_food_radius;
                    pellet.position = anim.start_position;
                }
                false
            }
            other => !other.involves(id),
        });
        self.bots.remove(id);

        info!("Player {} ({}) left with score {}", id, player.username, player.stats.score);
        Some(player.stats)
    }

    /// Steer `id` toward `target`, then resolve food and player collisions.
    pub fn move_player(&mut self, id: PlayerId, target: Vec2, now: Timestamp) -> MoveReport {
        let mut report = MoveReport::default();
        let Some(player) = self.world.players.get_mut(&id) else {
            return report;
        };
        player.move_towards(target, now, &self.world.bounds, &self.config.player);

        let hits = detect_food_collisions(player, &self.world.food, self.config.food.eat_threshold);
        for food_id in hits {
            if handle_food_collision(
                &mut self.world,
                id,
                food_id,
                now,
                self.config.animation.consume_ms,
                self.config.player.growth_factor,
            ) {
                report.food_claimed += 1;
            }
        }

        let ratio = self.config.combat.size_ratio;
        for other in detect_player_collisions(&self.world, id, ratio) {
            let outcome = handle_player_collision(&mut self.world, id, other, now, ratio, self.config.animation.consume_ms);
            if let Some(kill) = outcome.kill {
                self.on_kill(&kill, now);
                let mover_died = kill.prey == id;
                report.kills.push(kill);
                if mover_died {
                    break;
                }
            }
        }

        report
    }

    fn on_kill(&mut self, kill: &Kill, now: Timestamp) {
        if self.bots.is_bot(kill.prey) {
            self.bots.on_bot_consumed(kill.prey, now, self.config.bot.respawn_delay_ms);
        } else {
            info!("Player {} was eaten by {} (score {})", kill.prey, kill.predator, kill.stats.score);
        }
    }

    /// Split every eligible cell of `id`.
    pub fn split(&mut self, id: PlayerId, now: Timestamp) -> bool {
        let Some(player) = self.world.players.get_mut(&id) else {
            return false;
        };
        let split = player.split(now, &self.world.bounds, &mut self.rng, &self.config.player);
        if split {
            debug!("Player {} split into {} cells", id, player.cells.len());
        }
        split
    }

    /// Eject mass from the cell of `id` nearest its aim point.
    pub fn eject_mass(&mut self, id: PlayerId, now: Timestamp) -> Option<MassId> {
        let cfg = &self.config.eject;
        let player = self.world.players.get_mut(&id)?;

        let aim = player.target.unwrap_or_else(|| player.center());
        let cell_id = player.nearest_cell(aim)?.id;
        let color = player.color;
        let cell = player.cell_mut(cell_id)?;
        if cell.radius < cfg.min_cell_radius {
            return None;
        }

        let delta = aim - cell.position;
        let direction = if delta.length_squared() > f32::EPSILON {
            delta.normalize()
        } else {
            Vec2::from_angle(self.rng.random_range(0.0..TAU))
        };

        let area = cell.area() * cfg.area_fraction;
        cell.radius = radius_from_area(cell.area() - area);
        let radius = radius_from_area(area);
        let position = self
            .world
            .bounds
            .clamp_circle(cell.position + direction * (cell.radius + radius), radius);
        player.update_radius();
        player.update_score();

        let mass_id = self.world.next_id();
        self.world.ejected.insert(
            mass_id,
            EjectedMass {
                id: mass_id,
                position,
                radius,
                velocity: direction * cfg.speed,
                player_id: id,
                created_at: now,
                color,
                original_area: area,
            },
        );
        Some(mass_id)
    }

    /// Apply a decoded client intent. Intents naming a bot id are dropped.
    pub fn apply_intent(&mut self, id: PlayerId, intent: Intent, now: Timestamp) {
        if is_reserved_id(id) {
            warn!("Dropping {:?} from reserved bot id {}", intent, id);
            return;
        }
        match intent {
            Intent::Join { username } => {
                self.connect(id, username, now);
            }
            Intent::Leave => {
                self.disconnect(id, now);
            }
            Intent::Move { x, y } => {
                self.move_player(id, Vec2::new(x, y), now);
            }
            Intent::Split => {
                self.split(id, now);
            }
            Intent::Eject => {
                self.eject_mass(id, now);
            }
        }
    }

    /// Run one periodic job.
    pub fn tick(&mut self, kind: TickKind, now: Timestamp) -> TickReport {
        match kind {
            TickKind::FoodSpawn => TickReport::FoodSpawn {
                spawned: self.spawn_food(),
            },
            TickKind::Animations => TickReport::Animations(update_animations(&mut self.world, now)),
            TickKind::MassPhysics => self.update_masses(now),
            TickKind::BotThink => self.update_bots(now),
            TickKind::Stats => {
                for player in self.world.players.values_mut() {
                    player.update_stats(now);
                }
                TickReport::Stats {
                    players: self.world.players.len(),
                }
            }
        }
    }

    fn spawn_food(&mut self) -> usize {
        let cfg = &self.config.food;
        let room = cfg.max_count.saturating_sub(self.world.food.len());
        self.world.spawn_food(cfg.spawn_count.min(room), cfg.radius, &mut self.rng)
    }

    fn update_masses(&mut self, now: Timestamp) -> TickReport {
        let cfg = &self.config.eject;
        let bounds = self.world.bounds;

        let mut expired = Vec::new();
        self.world.ejected.retain(|&id, mass| {
            if mass.is_expired(now, cfg.lifetime_ms) {
                expired.push(id);
                return false;
            }
            mass.step(&bounds, cfg.friction, cfg.bounce);
            true
        });
        expired.sort_unstable();

        let absorbed = resolve_mass_absorption(&mut self.world, now, cfg);
        let moving = self.world.ejected.values().filter(|m| m.speed() > 0.0).count();
        TickReport::MassPhysics {
            moving,
            expired,
            absorbed,
        }
    }

    fn update_bots(&mut self, now: Timestamp) -> TickReport {
        let mut spawned = Vec::new();
        for _ in 0..self.bots.due_respawns(now, self.config.bot.max_bots) {
            spawned.push(self.spawn_bot(now));
        }

        let actions = self.bots.think(
            &self.world,
            now,
            &mut self.rng,
            &self.config.bot,
            self.config.combat.size_ratio,
        );

        let mut kills = Vec::new();
        for &(id, action) in &actions {
            match action {
                BotAction::Split(aim) => {
                    if let Some(player) = self.world.players.get_mut(&id) {
                        player.target = Some(aim);
                    }
                    self.split(id, now);
                }
                BotAction::Move(target) => kills.extend(self.move_player(id, target, now).kills),
            }
        }

        TickReport::BotThink {
            actions: actions.len(),
            spawned,
            kills,
        }
    }

    /// Copy of the whole world for broadcast.
    pub fn snapshot(&self, now: Timestamp) -> Snapshot {
        let mut players: Vec<Player> = self.world.players.values().cloned().collect();
        players.sort_unstable_by_key(|p| p.id);
        let mut food: Vec<Food> = self.world.food.values().cloned().collect();
        food.sort_unstable_by_key(|f| f.id);
        let mut ejected: Vec<EjectedMass> = self.world.ejected.values().cloned().collect();
        ejected.sort_unstable_by_key(|m| m.id);

        Snapshot {
            time: now,
            players,
            food,
            ejected,
            animations: self.world.animations.clone(),
            bounds: self.world.bounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::BOT_ID_BASE;
    use crate::math::circle_area;
    use protocol::Color;

    fn config() -> Config {
        let mut config = Config::default();
        config.food.initial_count = 0;
        config
    }

    fn game() -> GameState {
        GameState::with_seed(config(), 42).unwrap()
    }

    fn place(game: &mut GameState, id: PlayerId, position: Vec2, radius: f32) {
        let mut player = Player::new(id, format!("p{id}"), Color::default(), position, radius, 5.0, 0);
        player.update_radius();
        game.world.players.insert(id, player);
    }

    #[test]
    fn test_invalid_world_rejected() {
        let mut config = config();
        config.world.width = 0.0;
        assert!(matches!(
            GameState::with_seed(config, 1),
            Err(GameError::InvalidWorldDimensions { .. })
        ));
    }

    #[test]
    fn test_initial_food() {
        let game = GameState::with_seed(Config::default(), 1).unwrap();
        assert_eq!(game.world.food.len(), 20);
    }

    #[test]
    fn test_connect_spawns_single_cell() {
        let mut game = game();
        let player = game.connect(1, None, 0).unwrap();
        assert_eq!(player.username, "Anonymous");
        assert_eq!(player.cells.len(), 1);
        assert_eq!(player.radius, 30.0);
        let position = player.position();
        assert!(game.world.bounds.contains(position));

        let named = game.connect(2, Some("neo".into()), 0).unwrap();
        assert_eq!(named.username, "neo");
        assert_eq!(game.world.players.len(), 2);
    }

    #[test]
    fn test_client_cannot_take_bot_id() {
        let mut config = config();
        config.bot.count = 1;
        let mut game = GameState::with_seed(config, 9).unwrap();
        game.spawn_initial_bots(0);
        let bot = *game.world.players.keys().next().unwrap();
        let name = game.player(bot).unwrap().username.clone();

        assert!(game.connect(bot, Some("mallory".into()), 10).is_none());
        assert!(game.connect(bot + 5, None, 10).is_none());
        game.apply_intent(bot, Intent::Join { username: None }, 10);
        game.apply_intent(bot, Intent::Leave, 10);

        assert_eq!(game.world.players.len(), 1);
        assert_eq!(game.player(bot).unwrap().username, name);
        assert!(game.bots.is_bot(bot));
        assert!(game.connect(BOT_ID_BASE - 1, None, 10).is_some());
    }

    #[test]
    fn test_actions_on_unknown_ids_are_noops() {
        let mut game = game();
        assert_eq!(game.move_player(9, Vec2::ZERO, 0), MoveReport::default());
        assert!(!game.split(9, 0));
        assert!(game.eject_mass(9, 0).is_none());
        assert!(game.disconnect(9, 0).is_none());
    }

    #[test]
    fn test_kill_during_food_animation_keeps_prey_mass() {
        let mut game = game();
        place(&mut game, 1, Vec2::new(500.0, 500.0), 50.0);
        game.world
            .food
            .insert(500, Food::new(500, Vec2::new(505.0, 505.0), 10.0, Color::default()));
        assert_eq!(game.move_player(1, Vec2::new(500.0, 500.0), 0).food_claimed, 1);

        place(&mut game, 2, Vec2::new(530.0, 500.0), 35.0);
        let report = game.move_player(2, Vec2::new(530.0, 500.0), 10);
        assert_eq!(report.kills.len(), 1);
        let after_kill = game.player(1).unwrap().cells[0].radius;
        let expected = radius_from_area(circle_area(50.0) + circle_area(35.0));
        assert!((after_kill - expected).abs() < 1e-3);

        game.tick(TickKind::Animations, 300);
        let cell = &game.player(1).unwrap().cells[0];
        // The pellet adds its full growth on top of the swallowed player.
        assert!((cell.radius - (after_kill + 2.5)).abs() < 1e-3);
        assert!(game.world.food.is_empty());
    }

    #[test]
    fn test_split_during_food_animation_keeps_halves() {
        let mut game = game();
        place(&mut game, 1, Vec2::new(1000.0, 1000.0), 60.0);
        game.world
            .food
            .insert(500, Food::new(500, Vec2::new(1005.0, 1005.0), 10.0, Color::default()));
        assert_eq!(game.move_player(1, Vec2::new(1200.0, 1000.0), 0).food_claimed, 1);

        assert!(game.split(1, 10));
        let before = game.player(1).unwrap().total_area();
        assert!((before - circle_area(60.0)).abs() / circle_area(60.0) < 1e-4);

        game.tick(TickKind::Animations, 150);
        let player = game.player(1).unwrap();
        assert_eq!(player.cells.len(), 2);
        let half = radius_from_area(circle_area(60.0) / 2.0);
        assert!((player.cells[0].radius - (half + 1.5)).abs() < 1e-3);
        assert!((player.cells[1].radius - half).abs() < 1e-3);
        assert!(player.total_area() < before * 1.05);
    }

    #[test]
    fn test_move_eats_food_then_animation_finishes() {
        let mut game = game();
        place(&mut game, 1, Vec2::new(100.0, 100.0), 30.0);
        game.world
            .food
            .insert(500, Food::new(500, Vec2::new(105.0, 105.0), 10.0, Color::default()));

        let report = game.move_player(1, Vec2::new(100.0, 100.0), 0);
        assert_eq!(report.food_claimed, 1);
        assert!(game.world.food[&500].is_being_consumed());

        let TickReport::Animations(anim) = game.tick(TickKind::Animations, 300) else {
            panic!("wrong report");
        };
        assert_eq!(anim.eaten_food, vec![500]);
        assert!(game.world.food.is_empty());
        assert!(game.player(1).unwrap().radius > 30.0);
        assert_eq!(game.player(1).unwrap().stats.food_eaten, 1);
    }

    #[test]
    fn test_move_resolves_kill() {
        let mut game = game();
        place(&mut game, 1, Vec2::new(500.0, 500.0), 50.0);
        place(&mut game, 2, Vec2::new(530.0, 500.0), 35.0);

        let report = game.move_player(2, Vec2::new(530.0, 500.0), 1_000);
        assert_eq!(report.kills.len(), 1);
        assert_eq!(report.kills[0].prey, 2);
        assert!(game.player(2).is_none());
        let winner = game.player(1).unwrap();
        let expected = radius_from_area(circle_area(50.0) + circle_area(35.0));
        assert!((winner.radius - expected).abs() < 1e-3);
    }

    #[test]
    fn test_eaten_bot_respawns_after_delay() {
        let mut config = config();
        config.bot.count = 1;
        let mut game = GameState::with_seed(config, 7).unwrap();
        assert_eq!(game.spawn_initial_bots(0), 1);
        let bot = *game.world.players.keys().next().unwrap();

        let bot_position = game.player(bot).unwrap().position();
        place(&mut game, 1, bot_position, 80.0);
        let report = game.move_player(1, bot_position, 1_000);
        assert_eq!(report.kills[0].prey, bot);
        assert!(game.bots.is_empty());

        let TickReport::BotThink { spawned, .. } = game.tick(TickKind::BotThink, 5_999) else {
            panic!("wrong report");
        };
        assert!(spawned.is_empty());
        let TickReport::BotThink { spawned, .. } = game.tick(TickKind::BotThink, 6_000) else {
            panic!("wrong report");
        };
        assert_eq!(spawned.len(), 1);
        assert!(game.player(spawned[0]).is_some_and(|p| p.is_bot));
    }

    #[test]
    fn test_disconnect_restores_claimed_food() {
        let mut game = game();
        place(&mut game, 1, Vec2::new(100.0, 100.0), 30.0);
        game.world
            .food
            .insert(500, Food::new(500, Vec2::new(105.0, 105.0), 10.0, Color::default()));
        game.move_player(1, Vec2::new(100.0, 100.0), 0);
        game.tick(TickKind::Animations, 150);

        let stats = game.disconnect(1, 2_000).unwrap();
        assert_eq!(stats.food_eaten, 1);
        assert_eq!(stats.time_alive, 2);
        assert!(game.world.animations.is_empty());
        let pellet = &game.world.food[&500];
        assert!(!pellet.is_being_consumed());
        assert_eq!(pellet.radius, 10.0);
        assert_eq!(pellet.position, Vec2::new(105.0, 105.0));
    }

    #[test]
    fn test_split_and_merge_through_moves() {
        let mut game = game();
        place(&mut game, 1, Vec2::new(1000.0, 1000.0), 60.0);
        game.move_player(1, Vec2::new(1200.0, 1000.0), 0);
        assert!(game.split(1, 100));
        assert_eq!(game.player(1).unwrap().cells.len(), 2);

        // Steer both halves onto the same point until they merge.
        let mut now = 100;
        while now < 20_000 && game.player(1).unwrap().cells.len() > 1 {
            now += 50;
            game.move_player(1, Vec2::new(1000.0, 1000.0), now);
            assert!(now >= 15_100 || game.player(1).unwrap().cells.len() == 2);
        }
        let player = game.player(1).unwrap();
        assert_eq!(player.cells.len(), 1);
        assert!((player.total_area() - circle_area(60.0)).abs() / circle_area(60.0) < 1e-4);
    }

    #[test]
    fn test_eject_and_physics() {
        let mut game = game();
        place(&mut game, 1, Vec2::new(1000.0, 1000.0), 50.0);
        game.move_player(1, Vec2::new(1400.0, 1000.0), 0);
        let before = game.player(1).unwrap().total_area();

        let mass_id = game.eject_mass(1, 0).unwrap();
        let after = game.player(1).unwrap().total_area();
        let mass = &game.world.ejected[&mass_id];
        assert!((before - after - mass.original_area).abs() < 0.5);
        assert!(mass.velocity.x > 0.0);
        assert!(mass.position.x > game.player(1).unwrap().position().x);

        let speed = mass.speed();
        game.tick(TickKind::MassPhysics, 16);
        assert!(game.world.ejected[&mass_id].speed() < speed);

        let TickReport::MassPhysics { expired, .. } = game.tick(TickKind::MassPhysics, 30_000) else {
            panic!("wrong report");
        };
        assert_eq!(expired, vec![mass_id]);
        assert!(game.world.ejected.is_empty());
    }

    #[test]
    fn test_small_cells_cannot_eject() {
        let mut game = game();
        place(&mut game, 1, Vec2::new(1000.0, 1000.0), 30.0);
        assert!(game.eject_mass(1, 0).is_none());
    }

    #[test]
    fn test_food_spawn_respects_ceiling() {
        let mut config = config();
        config.food.max_count = 30;
        let mut game = GameState::with_seed(config, 3).unwrap();
        assert_eq!(game.tick(TickKind::FoodSpawn, 0), TickReport::FoodSpawn { spawned: 20 });
        assert_eq!(game.tick(TickKind::FoodSpawn, 0), TickReport::FoodSpawn { spawned: 10 });
        assert_eq!(game.tick(TickKind::FoodSpawn, 0), TickReport::FoodSpawn { spawned: 0 });
    }

    #[test]
    fn test_stats_tick_refreshes_time_alive() {
        let mut game = game();
        game.connect(1, None, 0);
        game.tick(TickKind::Stats, 4_500);
        let stats = game.player(1).unwrap().stats;
        assert_eq!(stats.time_alive, 4);
        assert_eq!(stats.score, (circle_area(30.0) / 10.0).floor() as u64);
    }

    #[test]
    fn test_intents_drive_the_same_operations() {
        let mut game = game();
        game.apply_intent(1, Intent::Join { username: Some("ivy".into()) }, 0);
        game.apply_intent(1, Intent::Move { x: 10.0, y: 10.0 }, 16);
        assert_eq!(game.player(1).unwrap().target, Some(Vec2::new(10.0, 10.0)));
        game.apply_intent(1, Intent::Leave, 32);
        assert!(game.player(1).is_none());
    }

    #[test]
    fn test_snapshot_is_ordered() {
        let mut game = GameState::with_seed(Config::default(), 5).unwrap();
        game.connect(3, None, 0);
        game.connect(1, None, 0);
        let snapshot = game.snapshot(10);
        assert_eq!(snapshot.players.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 3]);
        assert!(snapshot.food.windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(snapshot.bounds, game.world.bounds);
    }

    #[test]
    fn test_bot_split_fires_at_prey() {
        let mut config = config();
        config.bot.count = 1;
        let mut game = GameState::with_seed(config, 13).unwrap();
        game.spawn_initial_bots(0);
        let bot = *game.world.players.keys().next().unwrap();
        if let Some(player) = game.world.players.get_mut(&bot) {
            player.cells[0].position = Vec2::new(1000.0, 1000.0);
            player.cells[0].radius = 80.0;
            player.target = Some(Vec2::new(200.0, 1000.0));
            player.update_radius();
        }
        place(&mut game, 1, Vec2::new(1200.0, 1000.0), 20.0);
        if let Some(record) = game.bots.get_mut(bot) {
            record.personality.aggressiveness = 1.0;
            record.personality.split_chance = 1.0;
        }

        game.tick(TickKind::BotThink, 0);
        let player = game.player(bot).unwrap();
        assert_eq!(player.cells.len(), 2);
        assert!(player.cells[1].velocity.x > 0.0);
        assert!(player.cells[1].velocity.y.abs() < 1e-3);
    }

    #[test]
    fn test_bot_think_moves_bots() {
        let mut config = config();
        config.bot.count = 3;
        let mut game = GameState::with_seed(config, 11).unwrap();
        game.spawn_initial_bots(0);
        let before: Vec<Vec2> = {
            let mut ids: Vec<_> = game.world.players.keys().copied().collect();
            ids.sort_unstable();
            ids.iter().map(|id| game.player(*id).unwrap().position()).collect()
        };
        let TickReport::BotThink { actions, .. } = game.tick(TickKind::BotThink, 0) else {
            panic!("wrong report");
        };
        assert!(actions >= 3);
        let mut ids: Vec<_> = game.world.players.keys().copied().collect();
        ids.sort_unstable();
        let after: Vec<Vec2> = ids.iter().map(|id| game.player(*id).unwrap().position()).collect();
        assert_ne!(before, after);
    }
}
