//! Arena configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub food: FoodConfig,
    #[serde(default)]
    pub combat: CombatConfig,
    #[serde(default)]
    pub eject: EjectConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub bot: BotConfig,
}

impl Config {
    /// Load configuration from `config.toml` or use defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    /// Load configuration from `path`, writing the defaults there if it is missing.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            info!("No {} found, creating default config", path.display());
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            Ok(default_config)
        }
    }
}

/// Scheduler intervals for the periodic jobs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_food_spawn_interval")]
    pub food_spawn_interval_ms: u64,
    #[serde(default = "default_fast_interval")]
    pub animation_interval_ms: u64,
    #[serde(default = "default_fast_interval")]
    pub mass_interval_ms: u64,
    #[serde(default = "default_fast_interval")]
    pub bot_interval_ms: u64,
    #[serde(default = "default_stats_interval")]
    pub stats_interval_ms: u64,
    #[serde(default = "default_snapshot_interval")]
    pub snapshot_interval_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            food_spawn_interval_ms: default_food_spawn_interval(),
            animation_interval_ms: default_fast_interval(),
            mass_interval_ms: default_fast_interval(),
            bot_interval_ms: default_fast_interval(),
            stats_interval_ms: default_stats_interval(),
            snapshot_interval_ms: default_snapshot_interval(),
        }
    }
}

fn default_food_spawn_interval() -> u64 {
    2000
}
fn default_fast_interval() -> u64 {
    16
}
fn default_stats_interval() -> u64 {
    1000
}
fn default_snapshot_interval() -> u64 {
    50
}

/// Play area size.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorldConfig {
    #[serde(default = "default_world_size")]
    pub width: f32,
    #[serde(default = "default_world_size")]
    pub height: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: default_world_size(),
            height: default_world_size(),
        }
    }
}

fn default_world_size() -> f32 {
    2000.0
}

/// Player movement, split and merge tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerConfig {
    #[serde(default = "default_start_radius")]
    pub start_radius: f32,
    #[serde(default = "default_player_speed")]
    pub speed: f32,
    #[serde(default = "default_min_split_radius")]
    pub min_split_radius: f32,
    #[serde(default = "default_max_cells")]
    pub max_cells: usize,
    #[serde(default = "default_split_speed")]
    pub split_speed: f32,
    /// Sibling offset along the aim, as a fraction of the new radius.
    #[serde(default = "default_split_offset")]
    pub split_offset: f32,
    /// How long a freshly split cell coasts before it starts pushing siblings.
    #[serde(default = "default_split_coast")]
    pub split_coast_ms: u64,
    #[serde(default = "default_merge_time")]
    pub merge_time_ms: u64,
    #[serde(default = "default_spawn_attempts")]
    pub spawn_attempts: usize,
    /// Radius multiplier applied to a cell by each food pellet.
    #[serde(default = "default_growth_factor")]
    pub growth_factor: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            start_radius: default_start_radius(),
            speed: default_player_speed(),
            min_split_radius: default_min_split_radius(),
            max_cells: default_max_cells(),
            split_speed: default_split_speed(),
            split_offset: default_split_offset(),
            split_coast_ms: default_split_coast(),
            merge_time_ms: default_merge_time(),
            spawn_attempts: default_spawn_attempts(),
            growth_factor: default_growth_factor(),
        }
    }
}

fn default_start_radius() -> f32 {
    30.0
}
fn default_player_speed() -> f32 {
    5.0
}
fn default_min_split_radius() -> f32 {
    40.0
}
fn default_max_cells() -> usize {
    8
}
fn default_split_speed() -> f32 {
    12.0
}
fn default_split_offset() -> f32 {
    0.1
}
fn default_split_coast() -> u64 {
    1000
}
fn default_merge_time() -> u64 {
    15_000
}
fn default_spawn_attempts() -> usize {
    64
}
fn default_growth_factor() -> f32 {
    1.05
}

/// Food pellet configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FoodConfig {
    #[serde(default = "default_food_radius")]
    pub radius: f32,
    #[serde(default = "default_food_initial")]
    pub initial_count: usize,
    #[serde(default = "default_food_max")]
    pub max_count: usize,
    #[serde(default = "default_food_spawn")]
    pub spawn_count: usize,
    /// Fraction of the pellet that must be covered before it is eaten.
    #[serde(default = "default_food_eat_threshold")]
    pub eat_threshold: f32,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            radius: default_food_radius(),
            initial_count: default_food_initial(),
            max_count: default_food_max(),
            spawn_count: default_food_spawn(),
            eat_threshold: default_food_eat_threshold(),
        }
    }
}

fn default_food_radius() -> f32 {
    10.0
}
fn default_food_initial() -> usize {
    20
}
fn default_food_max() -> usize {
    1000
}
fn default_food_spawn() -> usize {
    20
}
fn default_food_eat_threshold() -> f32 {
    0.7
}

/// Player-vs-player rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CombatConfig {
    /// A cell must be this many times larger (by radius) to eat another.
    #[serde(default = "default_size_ratio")]
    pub size_ratio: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            size_ratio: default_size_ratio(),
        }
    }
}

fn default_size_ratio() -> f32 {
    1.25
}

/// Ejected mass configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EjectConfig {
    #[serde(default = "default_eject_speed")]
    pub speed: f32,
    #[serde(default = "default_eject_friction")]
    pub friction: f32,
    /// Share of the ejecting cell's area that leaves as a projectile.
    #[serde(default = "default_eject_fraction")]
    pub area_fraction: f32,
    #[serde(default = "default_eject_min_radius")]
    pub min_cell_radius: f32,
    #[serde(default = "default_eject_lifetime")]
    pub lifetime_ms: u64,
    /// Window during which the emitter cannot re-absorb its own mass.
    #[serde(default = "default_eject_grace")]
    pub grace_ms: u64,
    /// Share of the original area gained when the mass is absorbed.
    #[serde(default = "default_eject_value")]
    pub value_ratio: f32,
    /// Velocity multiplier applied on a wall hit.
    #[serde(default = "default_eject_bounce")]
    pub bounce: f32,
}

impl Default for EjectConfig {
    fn default() -> Self {
        Self {
            speed: default_eject_speed(),
            friction: default_eject_friction(),
            area_fraction: default_eject_fraction(),
            min_cell_radius: default_eject_min_radius(),
            lifetime_ms: default_eject_lifetime(),
            grace_ms: default_eject_grace(),
            value_ratio: default_eject_value(),
            bounce: default_eject_bounce(),
        }
    }
}

fn default_eject_speed() -> f32 {
    10.0
}
fn default_eject_friction() -> f32 {
    0.975
}
fn default_eject_fraction() -> f32 {
    0.1
}
fn default_eject_min_radius() -> f32 {
    35.0
}
fn default_eject_lifetime() -> u64 {
    30_000
}
fn default_eject_grace() -> u64 {
    3_000
}
fn default_eject_value() -> f32 {
    0.85
}
fn default_eject_bounce() -> f32 {
    -0.5
}

/// Consumption animation timing.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnimationConfig {
    #[serde(default = "default_consume_duration")]
    pub consume_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            consume_ms: default_consume_duration(),
        }
    }
}

fn default_consume_duration() -> u64 {
    300
}

/// Bot population and decision tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    /// Bots spawned at startup.
    #[serde(default = "default_bot_count")]
    pub count: usize,
    /// Respawns never push the bot population above this.
    #[serde(default = "default_bot_count")]
    pub max_bots: usize,
    #[serde(default = "default_bot_decision")]
    pub decision_interval_ms: u64,
    #[serde(default = "default_bot_move")]
    pub move_interval_ms: u64,
    #[serde(default = "default_bot_respawn")]
    pub respawn_delay_ms: u64,
    /// A bot keeps its current target while it is farther than this.
    #[serde(default = "default_bot_inertia")]
    pub inertia_distance: f32,
    #[serde(default = "default_bot_prey_radius")]
    pub prey_radius: f32,
    #[serde(default = "default_bot_min_hunt")]
    pub min_hunt_radius: f32,
    #[serde(default = "default_bot_food_radius")]
    pub food_radius: f32,
    #[serde(default = "default_bot_food_sample")]
    pub food_sample: usize,
    #[serde(default = "default_bot_cluster_radius")]
    pub cluster_radius: f32,
    #[serde(default = "default_bot_cluster_min")]
    pub cluster_min: usize,
    #[serde(default = "default_bot_wander")]
    pub wander_range: f32,
    /// Bots only split while they have fewer cells than this.
    #[serde(default = "default_bot_split_cells")]
    pub max_split_cells: usize,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            count: default_bot_count(),
            max_bots: default_bot_count(),
            decision_interval_ms: default_bot_decision(),
            move_interval_ms: default_bot_move(),
            respawn_delay_ms: default_bot_respawn(),
            inertia_distance: default_bot_inertia(),
            prey_radius: default_bot_prey_radius(),
            min_hunt_radius: default_bot_min_hunt(),
            food_radius: default_bot_food_radius(),
            food_sample: default_bot_food_sample(),
            cluster_radius: default_bot_cluster_radius(),
            cluster_min: default_bot_cluster_min(),
            wander_range: default_bot_wander(),
            max_split_cells: default_bot_split_cells(),
        }
    }
}

fn default_bot_count() -> usize {
    25
}
fn default_bot_decision() -> u64 {
    300
}
fn default_bot_move() -> u64 {
    16
}
fn default_bot_respawn() -> u64 {
    5_000
}
fn default_bot_inertia() -> f32 {
    50.0
}
fn default_bot_prey_radius() -> f32 {
    300.0
}
fn default_bot_min_hunt() -> f32 {
    40.0
}
fn default_bot_food_radius() -> f32 {
    500.0
}
fn default_bot_food_sample() -> usize {
    50
}
fn default_bot_cluster_radius() -> f32 {
    100.0
}
fn default_bot_cluster_min() -> usize {
    3
}
fn default_bot_wander() -> f32 {
    150.0
}
fn default_bot_split_cells() -> usize {
    4
}
