//! Playback coordinator: ties the player's "is playing" signal to usage
//! tracking and forces a pause the moment enforcement flips to blocked.
//!
//! State machine: Idle -> Tracking -> (Blocked | Idle). Blocked clears only
//! when a re-evaluation (typically after a parent override) comes back
//! unblocked. Evaluation results are published on a watch channel for the
//! presentation layer; the coordinator is an injected service, not a global.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

use playtime_common::clock::Clock;
use playtime_common::limits::{ensure_current_day, evaluate};
use playtime_common::types::{EvaluationResult, SessionEndReason};
use playtime_store::{Database, SettingsQueries};

use crate::accumulator::UsageAccumulator;

/// Seam to the platform media player. The coordinator only ever pauses;
/// starting playback and media selection belong to the player's owner.
#[async_trait]
pub trait PlayerControl: Send + Sync {
    async fn pause(&self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    Tracking,
    Blocked,
}

/// Cadences for the two repeating tasks.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub evaluation_cadence: Duration,
    pub flush_cadence: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            evaluation_cadence: Duration::from_secs(30),
            flush_cadence: Duration::from_secs(30),
        }
    }
}

/// Owns the evaluation tick task and the usage accumulator. Not a scoped
/// resource: embedders must call [`shutdown`](Self::shutdown) on teardown so
/// the tick task stops and any in-flight tracking gets its final flush.
pub struct PlaybackCoordinator {
    db: Arc<Database>,
    clock: Arc<dyn Clock>,
    player: Arc<dyn PlayerControl>,
    accumulator: UsageAccumulator,
    state: Arc<RwLock<CoordinatorState>>,
    running: Arc<Mutex<bool>>,
    eval_tx: watch::Sender<EvaluationResult>,
}

impl PlaybackCoordinator {
    pub fn new(
        db: Arc<Database>,
        clock: Arc<dyn Clock>,
        player: Arc<dyn PlayerControl>,
        config: EngineConfig,
    ) -> Arc<Self> {
        let accumulator = UsageAccumulator::new(db.clone(), clock.clone(), config.flush_cadence);
        let (eval_tx, _) = watch::channel(EvaluationResult::unrestricted());

        let coordinator = Arc::new(Self {
            db,
            clock,
            player,
            accumulator,
            state: Arc::new(RwLock::new(CoordinatorState::Idle)),
            running: Arc::new(Mutex::new(true)),
            eval_tx,
        });

        coordinator.clone().spawn_evaluation_loop(config.evaluation_cadence);
        coordinator
    }

    /// Receiver of every published evaluation, for remaining-time display
    /// and the blocking overlay.
    pub fn subscribe(&self) -> watch::Receiver<EvaluationResult> {
        self.eval_tx.subscribe()
    }

    pub async fn state(&self) -> CoordinatorState {
        *self.state.read().await
    }

    /// React to the platform player's "is playing" signal.
    pub async fn handle_playing_changed(&self, is_playing: bool) -> Result<()> {
        let current = *self.state.read().await;

        match (current, is_playing) {
            (CoordinatorState::Idle, true) => {
                self.accumulator.start_tracking().await?;
                *self.state.write().await = CoordinatorState::Tracking;
                info!("Playback started, tracking usage");
                // Catch an already-exhausted quota immediately rather than
                // waiting for the next tick.
                self.refresh().await?;
            }
            (CoordinatorState::Tracking, false) => {
                self.accumulator.stop_tracking(SessionEndReason::Stopped).await?;
                *self.state.write().await = CoordinatorState::Idle;
                info!("Playback stopped, tracking idle");
            }
            (CoordinatorState::Blocked, true) => {
                // The player should not be playing while blocked; pause it
                // again rather than silently accrue time.
                warn!("Player reported playing while blocked, pausing");
                if let Err(e) = self.player.pause().await {
                    warn!("Failed to pause player: {}", e);
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Re-run the evaluator now, apply any state transition, and publish the
    /// result. Called by the periodic tick, on screen entry, and after every
    /// parent override so changes take effect without a restart.
    pub async fn refresh(&self) -> Result<EvaluationResult> {
        // Account tracked time first so the evaluation sees the current
        // counter, not the one from the last flush cadence.
        if let Err(e) = self.accumulator.flush_now().await {
            warn!("Pre-evaluation usage flush failed: {}", e);
        }

        let result = self.evaluate_now().await;
        let current = *self.state.read().await;

        match current {
            CoordinatorState::Tracking if result.limit_reached => {
                info!("Limit reached during playback, blocking");
                if let Err(e) = self.player.pause().await {
                    warn!("Failed to pause player: {}", e);
                }
                self.accumulator.stop_tracking(SessionEndReason::LimitReached).await?;
                *self.state.write().await = CoordinatorState::Blocked;
            }
            CoordinatorState::Blocked if !result.limit_reached => {
                info!("Block lifted, returning to idle");
                *self.state.write().await = CoordinatorState::Idle;
            }
            _ => {}
        }

        self.eval_tx.send_replace(result.clone());
        Ok(result)
    }

    /// Evaluate against the persisted settings. Persistence failures fail
    /// open: enforcement is skipped for this cycle rather than blocking the
    /// parent's own workflow on a storage hiccup.
    async fn evaluate_now(&self) -> EvaluationResult {
        let config = match SettingsQueries::screen_time(&self.db).await {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load screen-time settings, failing open: {}", e);
                return EvaluationResult::unrestricted();
            }
        };
        let schedule = match SettingsQueries::access_schedule(&self.db).await {
            Ok(schedule) => schedule,
            Err(e) => {
                warn!("Failed to load schedule, failing open: {}", e);
                return EvaluationResult::unrestricted();
            }
        };

        // Make the day rollover durable so a stale counter cannot block
        // again after a restart.
        let rolled = ensure_current_day(&config, self.clock.today());
        if rolled != config {
            if let Err(e) = SettingsQueries::save_screen_time(&self.db, &rolled).await {
                warn!("Failed to persist daily reset, retrying next cycle: {}", e);
            }
        }

        evaluate(&rolled, &schedule, self.clock.now())
    }

    fn spawn_evaluation_loop(self: Arc<Self>, cadence: Duration) {
        let running = self.running.clone();

        tokio::spawn(async move {
            let mut ticker = interval(cadence);
            ticker.tick().await;

            loop {
                ticker.tick().await;

                {
                    let flag = running.lock().await;
                    if !*flag {
                        break;
                    }
                }

                if let Err(e) = self.refresh().await {
                    warn!("Periodic evaluation failed: {}", e);
                }
            }

            debug!("Evaluation loop stopped");
        });
    }

    /// Tear down: cancel the tick task cooperatively and make sure tracking
    /// stops with a final flush, whatever state we were in.
    pub async fn shutdown(&self) -> Result<()> {
        {
            let mut flag = self.running.lock().await;
            *flag = false;
        }

        self.accumulator.stop_tracking(SessionEndReason::Shutdown).await?;
        *self.state.write().await = CoordinatorState::Idle;

        info!("Playback coordinator shut down");
        Ok(())
    }
}
