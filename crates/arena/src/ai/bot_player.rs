use crate::Timestamp;
use crate::collision::outsizes;
use crate::config::BotConfig;
use crate::entity::Player;
use crate::world::World;
use glam::Vec2;
use protocol::PlayerId;
use rand::Rng;
use tracing::trace;

const BOT_PREFIX: &str = "Bot_";

/// Bot names to use.
const BOT_NAMES: &[&str] = &[
    "Gobbler", "Muncher", "Dasher", "Sly", "Hunter", "Glutton", "Ravenous", "Cunning", "Clever", "Starving",
];

/// Per-bot weights that bias the shared decision logic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BotPersonality {
    /// Chance to chase visible prey.
    pub aggressiveness: f32,
    /// Above 0.7 the bot prefers dense food clusters.
    pub food_focus: f32,
    /// Chance to split when it commits to prey.
    pub split_chance: f32,
    /// Stretches the decision interval.
    pub movement_smoothing: f32,
}

impl BotPersonality {
    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            aggressiveness: rng.random_range(0.0..1.0),
            food_focus: rng.random_range(0.5..1.0),
            split_chance: rng.random_range(0.0..0.5),
            movement_smoothing: rng.random_range(0.1..0.4),
        }
    }
}

/// Why a bot picked its current target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionReason {
    /// Still far from the previous target.
    Pursue,
    Hunt,
    Cluster,
    Graze,
    Wander,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BotDecision {
    pub target: Vec2,
    pub split: bool,
    pub reason: DecisionReason,
}

/// A bot player controlled by AI.
#[derive(Debug, Clone)]
pub struct Bot {
    /// Bot ID (same as its player id).
    pub id: PlayerId,
    pub name: String,
    pub personality: BotPersonality,
    /// Current target position.
    pub target: Option<Vec2>,
    pub last_decision: Option<Timestamp>,
    pub last_move: Option<Timestamp>,
}

impl Bot {
    /// Create a new bot with a random name and personality.
    pub fn new(id: PlayerId, rng: &mut impl Rng) -> Self {
        let name = format!("{BOT_PREFIX}{}", BOT_NAMES[rng.random_range(0..BOT_NAMES.len())]);
        Self {
            id,
            name,
            personality: BotPersonality::random(rng),
            target: None,
            last_decision: None,
            last_move: None,
        }
    }

    /// Decision interval stretched by this bot's smoothing.
    pub fn decision_interval(&self, base_ms: u64) -> u64 {
        (base_ms as f32 * (1.0 + self.personality.movement_smoothing)) as u64
    }

    pub fn decision_due(&self, now: Timestamp, base_ms: u64) -> bool {
        self.target.is_none()
            || self
                .last_decision
                .is_none_or(|t| now.saturating_sub(t) >= self.decision_interval(base_ms))
    }

    pub fn move_due(&self, now: Timestamp, move_ms: u64) -> bool {
        self.target.is_some() && self.last_move.is_none_or(|t| now.saturating_sub(t) >= move_ms)
    }

    /// Pick the next target for `me`.
    ///
    /// In order: keep chasing a far target, hunt the nearest edible cell,
    /// head for food (the densest cluster for food-focused bots), or wander.
    pub fn decide(&self, me: &Player, world: &World, rng: &mut impl Rng, config: &BotConfig, size_ratio: f32) -> BotDecision {
        let center = me.center();

        if let Some(target) = self.target {
            if center.distance(target) > config.inertia_distance {
                return BotDecision {
                    target,
                    split: false,
                    reason: DecisionReason::Pursue,
                };
            }
        }

        if let Some(prey) = self.nearest_prey(me, world, config, size_ratio) {
            let big_enough = me.largest_cell().is_some_and(|c| c.radius > config.min_hunt_radius);
            if big_enough && rng.random::<f32>() < self.personality.aggressiveness {
                let split = me.cells.len() < config.max_split_cells && rng.random::<f32>() < self.personality.split_chance;
                trace!(bot = self.id, ?prey, split, "Bot hunting");
                return BotDecision {
                    target: prey,
                    split,
                    reason: DecisionReason::Hunt,
                };
            }
        }

        let nearby: Vec<(Vec2, f32)> = world
            .food
            .values()
            .filter(|f| !f.is_being_consumed())
            .map(|f| (f.position, f.position.distance(center)))
            .filter(|&(_, d)| d < config.food_radius)
            .take(config.food_sample)
            .collect();

        if !nearby.is_empty() {
            if self.personality.food_focus > 0.7 && nearby.len() > 3 {
                let best = find_food_clusters(&nearby, config.cluster_radius)
                    .into_iter()
                    .max_by(|a, b| a.rank().total_cmp(&b.rank()));
                if let Some(cluster) = best.filter(|c| c.count >= config.cluster_min) {
                    return BotDecision {
                        target: cluster.center,
                        split: false,
                        reason: DecisionReason::Cluster,
                    };
                }
            }

            if let Some(&(target, _)) = nearby.iter().min_by(|a, b| a.1.total_cmp(&b.1)) {
                return BotDecision {
                    target,
                    split: false,
                    reason: DecisionReason::Graze,
                };
            }
        }

        let range = config.wander_range;
        let offset = Vec2::new(rng.random_range(-range..=range), rng.random_range(-range..=range));
        BotDecision {
            target: world.bounds.clamp_point(center + offset),
            split: false,
            reason: DecisionReason::Wander,
        }
    }

    /// Closest foreign cell that one of `me`'s cells could eat.
    fn nearest_prey(&self, me: &Player, world: &World, config: &BotConfig, size_ratio: f32) -> Option<Vec2> {
        let mut best: Option<(Vec2, f32)> = None;
        for other in world.players.values().filter(|p| p.id != me.id) {
            for cell in &other.cells {
                for own in &me.cells {
                    if !outsizes(own, cell, size_ratio) {
                        continue;
                    }
                    let distance = own.position.distance(cell.position);
                    if distance < config.prey_radius && best.is_none_or(|(_, d)| distance < d) {
                        best = Some((cell.position, distance));
                    }
                }
            }
        }
        best.map(|(position, _)| position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct FoodCluster {
    center: Vec2,
    count: usize,
    /// Distance from the bot to the cluster's closest member.
    distance: f32,
}

impl FoodCluster {
    fn rank(&self) -> f32 {
        let distance = if self.distance > 0.0 { self.distance } else { 1.0 };
        self.count as f32 / distance
    }
}

/// Greedy single pass: each unclaimed pellet seeds a cluster and claims
/// every unclaimed pellet within `radius` of it.
fn find_food_clusters(food: &[(Vec2, f32)], radius: f32) -> Vec<FoodCluster> {
    let mut claimed = vec![false; food.len()];
    let mut clusters = Vec::new();

    for (i, &(seed, seed_distance)) in food.iter().enumerate() {
        if claimed[i] {
            continue;
        }
        claimed[i] = true;

        let mut sum = seed;
        let mut count = 1;
        let mut distance = seed_distance;
        for (j, &(other, other_distance)) in food.iter().enumerate().skip(i + 1) {
            if claimed[j] || seed.distance(other) >= radius {
                continue;
            }
            claimed[j] = true;
            sum += other;
            count += 1;
            distance = distance.min(other_distance);
        }

        clusters.push(FoodCluster {
            center: sum / count as f32,
            count,
            distance,
        });
    }

    clusters
}
