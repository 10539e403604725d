//! Host scheduler.
//!
//! Runs each periodic job on its own interval against one shared
//! `GameState`, publishes snapshots, and accepts decoded client intents.

use crate::config::Config;
use protocol::{Intent, PlayerId, ProtocolError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, broadcast};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

pub mod game;

pub use game::{GameState, MoveReport, Snapshot, TickKind, TickReport};

/// Snapshots buffered per subscriber before old ones are dropped.
const SNAPSHOT_BUFFER: usize = 8;

/// Entry point for the transport layer.
#[derive(Clone)]
pub struct ArenaHandle {
    state: Arc<RwLock<GameState>>,
    snapshots: broadcast::Sender<Arc<Snapshot>>,
}

impl ArenaHandle {
    /// Apply one intent under the state lock.
    pub async fn submit(&self, id: PlayerId, intent: Intent) {
        let mut game = self.state.write().await;
        let now = game.clock();
        game.apply_intent(id, intent, now);
    }

    /// Decode and apply a binary intent.
    pub async fn submit_bytes(&self, id: PlayerId, data: &[u8]) -> Result<(), ProtocolError> {
        let intent = Intent::parse(data)?;
        self.submit(id, intent).await;
        Ok(())
    }

    /// Receive every snapshot published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Snapshot>> {
        self.snapshots.subscribe()
    }

    /// Take a snapshot immediately.
    pub async fn snapshot(&self) -> Snapshot {
        let game = self.state.read().await;
        game.snapshot(game.clock())
    }
}

/// Build the game, seed bots, and spawn every periodic job.
pub async fn start(config: Config) -> anyhow::Result<ArenaHandle> {
    let mut game = GameState::new(config.clone())?;
    let now = game.clock();
    let bots = game.spawn_initial_bots(now);
    info!(
        "World initialized: {}x{}, {} food, {} bots",
        config.world.width,
        config.world.height,
        game.world.food.len(),
        bots
    );

    let state = Arc::new(RwLock::new(game));
    let (snapshots, _rx) = broadcast::channel(SNAPSHOT_BUFFER);

    for kind in TickKind::ALL {
        let period = kind.interval_ms(&config.server);
        tokio::spawn(run_job(Arc::clone(&state), kind, period));
    }
    tokio::spawn(run_snapshots(
        Arc::clone(&state),
        snapshots.clone(),
        config.server.snapshot_interval_ms,
    ));

    Ok(ArenaHandle { state, snapshots })
}

/// Run the arena until Ctrl-C.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let _handle = start(config).await?;
    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    Ok(())
}

fn ticker(period_ms: u64) -> tokio::time::Interval {
    let period = Duration::from_millis(period_ms.max(1));
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

async fn run_job(state: Arc<RwLock<GameState>>, kind: TickKind, period_ms: u64) {
    let mut ticker = ticker(period_ms);
    let budget = Duration::from_millis(period_ms);

    loop {
        ticker.tick().await;

        let report = {
            let mut game = state.write().await;
            let started = std::time::Instant::now();
            let now = game.clock();
            let report = game.tick(kind, now);

            let elapsed = started.elapsed();
            if elapsed > budget {
                warn!(
                    "Slow {} job: {:.3}ms (budget: {}ms) - {} players",
                    kind.name(),
                    elapsed.as_secs_f64() * 1000.0,
                    period_ms,
                    game.world.players.len()
                );
            }
            report
        }; // Write lock released here

        match report {
            TickReport::BotThink { spawned, kills, .. } if !spawned.is_empty() || !kills.is_empty() => {
                debug!("Bot tick: {} respawned, {} kills", spawned.len(), kills.len());
            }
            TickReport::MassPhysics { expired, absorbed, .. } if !expired.is_empty() || !absorbed.is_empty() => {
                debug!("Mass tick: {} expired, {} absorbed", expired.len(), absorbed.len());
            }
            _ => {}
        }
    }
}

async fn run_snapshots(state: Arc<RwLock<GameState>>, tx: broadcast::Sender<Arc<Snapshot>>, period_ms: u64) {
    let mut ticker = ticker(period_ms);
    loop {
        ticker.tick().await;
        if tx.receiver_count() == 0 {
            continue;
        }
        let snapshot = {
            let game = state.read().await;
            Arc::new(game.snapshot(game.clock()))
        };
        // Lagging receivers just miss frames.
        let _ = tx.send(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        let mut config = Config::default();
        config.bot.count = 2;
        config
    }

    #[tokio::test]
    async fn test_submitted_intents_reach_the_world() {
        let handle = start(config()).await.unwrap();
        handle
            .submit(7, Intent::Join {
                username: Some("zed".into()),
            })
            .await;

        let snapshot = handle.snapshot().await;
        let player = snapshot.players.iter().find(|p| p.id == 7).unwrap();
        assert_eq!(player.username, "zed");
        assert_eq!(snapshot.players.iter().filter(|p| p.is_bot).count(), 2);

        handle.submit_bytes(7, &Intent::Leave.encode()).await.unwrap();
        assert!(handle.snapshot().await.players.iter().all(|p| p.id != 7));
        assert!(handle.submit_bytes(7, &[0xFF]).await.is_err());
    }

    #[tokio::test]
    async fn test_snapshots_are_published() {
        let mut config = config();
        config.server.snapshot_interval_ms = 5;
        let handle = start(config).await.unwrap();
        let mut rx = handle.subscribe();
        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.bounds.width, 2000.0);
    }
}
