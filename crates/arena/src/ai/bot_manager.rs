use super::bot_player::{Bot, DecisionReason};
use crate::Timestamp;
use crate::config::BotConfig;
use crate::world::World;
use glam::Vec2;
use protocol::PlayerId;
use rand::Rng;
use std::collections::HashMap;
use tracing::debug;

/// First id handed to a bot. Ids from here up are reserved for bots and
/// client sessions using them are refused.
pub const BOT_ID_BASE: PlayerId = 1_000_000;

/// Whether `id` falls in the range handed out to bots.
#[inline]
pub fn is_reserved_id(id: PlayerId) -> bool {
    id >= BOT_ID_BASE
}

/// An intent a bot wants applied through the regular player pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BotAction {
    /// Split toward the given point.
    Split(Vec2),
    Move(Vec2),
}

/// Owns one record per bot and the pending respawns.
#[derive(Debug)]
pub struct BotManager {
    bots: HashMap<PlayerId, Bot>,
    next_id: PlayerId,
    /// Times at which a consumed bot may be replaced.
    respawn_queue: Vec<Timestamp>,
}

impl Default for BotManager {
    fn default() -> Self {
        Self::new()
    }
}

impl BotManager {
    pub fn new() -> Self {
        Self {
            bots: HashMap::new(),
            next_id: BOT_ID_BASE,
            respawn_queue: Vec::new(),
        }
    }

    /// Create and register a new bot.
    pub fn add_bot(&mut self, rng: &mut impl Rng) -> &Bot {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(BOT_ID_BASE);
        self.bots.entry(id).or_insert_with(|| Bot::new(id, rng))
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Bot> {
        self.bots.get_mut(&id)
    }

    /// Remove a bot by ID.
    pub fn remove(&mut self, id: PlayerId) -> Option<Bot> {
        self.bots.remove(&id)
    }

    #[inline]
    pub fn is_bot(&self, id: PlayerId) -> bool {
        self.bots.contains_key(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bots.is_empty()
    }

    pub fn pending_respawns(&self) -> usize {
        self.respawn_queue.len()
    }

    /// Forget an eaten bot and schedule its replacement.
    pub fn on_bot_consumed(&mut self, id: PlayerId, now: Timestamp, delay_ms: u64) {
        if self.bots.remove(&id).is_some() {
            debug!("Bot {} consumed, respawning in {}ms", id, delay_ms);
            self.respawn_queue.push(now + delay_ms);
        }
    }

    /// Number of bots to spawn now. Due entries beyond `max_bots` are dropped.
    pub fn due_respawns(&mut self, now: Timestamp, max_bots: usize) -> usize {
        let before = self.respawn_queue.len();
        self.respawn_queue.retain(|&at| at > now);
        let due = before - self.respawn_queue.len();
        due.min(max_bots.saturating_sub(self.bots.len()))
    }

    /// Run decisions and moves that are due at `now`.
    ///
    /// Bots whose player has left the world are dropped.
    pub fn think(&mut self, world: &World, now: Timestamp, rng: &mut impl Rng, config: &BotConfig, size_ratio: f32) -> Vec<(PlayerId, BotAction)> {
        self.bots.retain(|id, _| world.players.contains_key(id));

        let mut ids: Vec<PlayerId> = self.bots.keys().copied().collect();
        ids.sort_unstable();

        let mut actions = Vec::new();
        for id in ids {
            let (Some(bot), Some(me)) = (self.bots.get_mut(&id), world.players.get(&id)) else {
                continue;
            };
            if me.is_dead() {
                continue;
            }

            if bot.decision_due(now, config.decision_interval_ms) {
                let decision = bot.decide(me, world, rng, config, size_ratio);
                if decision.reason != DecisionReason::Pursue {
                    debug!("Bot {} -> {:?} at {:?}", id, decision.reason, decision.target);
                }
                bot.target = Some(decision.target);
                bot.last_decision = Some(now);
                if decision.split {
                    actions.push((id, BotAction::Split(decision.target)));
                }
            }

            if bot.move_due(now, config.move_interval_ms) {
                if let Some(target) = bot.target {
                    actions.push((id, BotAction::Move(target)));
                    bot.last_move = Some(now);
                }
            }
        }
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Player;
    use crate::world::WorldBounds;
    use protocol::Color;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn world_with_bot(manager: &mut BotManager, rng: &mut StdRng) -> (World, PlayerId) {
        let mut world = World::new(WorldBounds::new(2000.0, 2000.0).unwrap());
        let bot = manager.add_bot(rng);
        let (id, name) = (bot.id, bot.name.clone());
        let mut player = Player::new(id, name, Color::default(), Vec2::new(1000.0, 1000.0), 30.0, 5.0, 0);
        player.is_bot = true;
        world.players.insert(id, player);
        (world, id)
    }

    #[test]
    fn test_ids_start_high() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut manager = BotManager::new();
        assert_eq!(manager.add_bot(&mut rng).id, BOT_ID_BASE);
        assert_eq!(manager.add_bot(&mut rng).id, BOT_ID_BASE + 1);
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_reserved_range() {
        assert!(!is_reserved_id(0));
        assert!(!is_reserved_id(BOT_ID_BASE - 1));
        assert!(is_reserved_id(BOT_ID_BASE));
        assert!(is_reserved_id(PlayerId::MAX));
    }

    #[test]
    fn test_split_carries_hunt_target() {
        let config = BotConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        let mut manager = BotManager::new();
        let (mut world, id) = world_with_bot(&mut manager, &mut rng);
        if let Some(me) = world.players.get_mut(&id) {
            me.cells[0].radius = 80.0;
            me.target = Some(Vec2::new(200.0, 1000.0));
        }
        world
            .players
            .insert(1, Player::new(1, "prey", Color::default(), Vec2::new(1200.0, 1000.0), 20.0, 5.0, 0));
        if let Some(bot) = manager.get_mut(id) {
            bot.personality.aggressiveness = 1.0;
            bot.personality.split_chance = 1.0;
        }

        let actions = manager.think(&world, 0, &mut rng, &config, 1.25);
        let prey = Vec2::new(1200.0, 1000.0);
        assert_eq!(actions, vec![(id, BotAction::Split(prey)), (id, BotAction::Move(prey))]);
    }

    #[test]
    fn test_respawn_after_delay() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut manager = BotManager::new();
        let id = manager.add_bot(&mut rng).id;

        manager.on_bot_consumed(id, 1_000, 5_000);
        assert!(manager.is_empty());
        assert_eq!(manager.due_respawns(5_999, 25), 0);
        assert_eq!(manager.due_respawns(6_000, 25), 1);
        assert_eq!(manager.pending_respawns(), 0);

        // Unknown ids schedule nothing.
        manager.on_bot_consumed(42, 1_000, 5_000);
        assert_eq!(manager.pending_respawns(), 0);
    }

    #[test]
    fn test_respawn_capped_by_population() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut manager = BotManager::new();
        let eaten: Vec<_> = (0..3).map(|_| manager.add_bot(&mut rng).id).collect();
        manager.add_bot(&mut rng);
        for id in eaten {
            manager.on_bot_consumed(id, 0, 10);
        }
        assert_eq!(manager.due_respawns(10, 2), 1);
    }

    #[test]
    fn test_think_moves_and_throttles() {
        let config = BotConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        let mut manager = BotManager::new();
        let (world, id) = world_with_bot(&mut manager, &mut rng);

        let actions = manager.think(&world, 0, &mut rng, &config, 1.25);
        assert!(matches!(actions.as_slice(), [(bot, BotAction::Move(_))] if *bot == id));

        // Moves run at their own interval.
        assert!(manager.think(&world, 10, &mut rng, &config, 1.25).is_empty());
        assert_eq!(manager.think(&world, 16, &mut rng, &config, 1.25).len(), 1);
    }

    #[test]
    fn test_think_drops_departed_bots() {
        let config = BotConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        let mut manager = BotManager::new();
        let (mut world, id) = world_with_bot(&mut manager, &mut rng);
        world.players.remove(&id);

        assert!(manager.think(&world, 0, &mut rng, &config, 1.25).is_empty());
        assert!(!manager.is_bot(id));
    }
}
