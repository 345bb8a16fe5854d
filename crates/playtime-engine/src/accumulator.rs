//! Usage accumulator: turns active playback time into the persisted
//! "minutes used today" counter.
//!
//! While tracking, a background task flushes elapsed wall-clock time into the
//! store on a fixed cadence. Whole minutes are persisted; the sub-minute
//! remainder is carried in memory and rolled into the next flush, so the
//! persisted counter only ever grows within a day. A crash loses at most one
//! flush interval plus the carried remainder.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use tokio::sync::Mutex;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

use playtime_common::clock::Clock;
use playtime_common::limits::ensure_current_day;
use playtime_common::types::SessionEndReason;
use playtime_store::{Database, NewPlaybackSession, SessionQueries, SettingsQueries};

#[derive(Debug)]
struct TrackState {
    running: bool,
    /// Wall-clock instant up to which playback time has been accounted.
    accounted_to: Option<DateTime<Local>>,
    /// Accounted seconds not yet persisted (sub-minute remainder).
    carry_seconds: i64,
    /// Bumped on every start so a stale flush loop can tell it was replaced.
    generation: u64,
    session_id: Option<String>,
    session_minutes: u32,
}

#[derive(Clone)]
pub struct UsageAccumulator {
    db: Arc<Database>,
    clock: Arc<dyn Clock>,
    cadence: Duration,
    state: Arc<Mutex<TrackState>>,
}

impl UsageAccumulator {
    pub fn new(db: Arc<Database>, clock: Arc<dyn Clock>, cadence: Duration) -> Self {
        Self {
            db,
            clock,
            cadence,
            state: Arc::new(Mutex::new(TrackState {
                running: false,
                accounted_to: None,
                carry_seconds: 0,
                generation: 0,
                session_id: None,
                session_minutes: 0,
            })),
        }
    }

    /// Begin accruing playback time. Calling while already tracking is a
    /// no-op, so a duplicated player signal cannot double-count.
    pub async fn start_tracking(&self) -> Result<()> {
        let generation = {
            let mut state = self.state.lock().await;
            if state.running {
                debug!("start_tracking while already tracking, ignoring");
                return Ok(());
            }

            state.running = true;
            state.accounted_to = Some(self.clock.now());
            state.generation += 1;
            state.session_minutes = 0;

            let session = NewPlaybackSession::new(self.clock.now().with_timezone(&Utc));
            match SessionQueries::create(&self.db, session.clone()).await {
                Ok(()) => state.session_id = Some(session.id),
                Err(e) => {
                    // History is best-effort; tracking itself must not fail.
                    warn!("Failed to record playback session start: {}", e);
                    state.session_id = None;
                }
            }

            state.generation
        };

        info!("Usage tracking started");
        self.spawn_flush_loop(generation);
        Ok(())
    }

    /// Stop accruing, flushing the partial interval first. Idempotent.
    pub async fn stop_tracking(&self, reason: SessionEndReason) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.running {
            return Ok(());
        }

        if let Err(e) = self.flush_locked(&mut state).await {
            warn!("Final usage flush failed, up to one interval unaccounted: {}", e);
        }

        if let Some(session_id) = state.session_id.take() {
            let ended_at = self.clock.now().with_timezone(&Utc);
            if let Err(e) = SessionQueries::end_session(
                &self.db,
                &session_id,
                ended_at,
                state.session_minutes,
                reason.as_str(),
            )
            .await
            {
                warn!("Failed to record playback session end: {}", e);
            }
        }

        state.running = false;
        state.accounted_to = None;
        state.session_minutes = 0;

        info!(reason = reason.as_str(), "Usage tracking stopped");
        Ok(())
    }

    pub async fn is_tracking(&self) -> bool {
        self.state.lock().await.running
    }

    /// Flush accounted time immediately instead of waiting for the cadence.
    pub async fn flush_now(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.running {
            return Ok(());
        }
        self.flush_locked(&mut state).await
    }

    fn spawn_flush_loop(&self, generation: u64) {
        let this = self.clone();

        tokio::spawn(async move {
            let mut ticker = interval(this.cadence);
            // The first tick completes immediately; skip it.
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let mut state = this.state.lock().await;
                if !state.running || state.generation != generation {
                    break;
                }

                if let Err(e) = this.flush_locked(&mut state).await {
                    warn!("Usage flush failed, retrying next tick: {}", e);
                }
            }

            debug!("Usage flush loop stopped");
        });
    }

    /// Read-modify-write the persisted counter. On failure nothing in the
    /// state advances, so the same elapsed time is retried on the next tick.
    async fn flush_locked(&self, state: &mut TrackState) -> Result<()> {
        let Some(accounted_to) = state.accounted_to else {
            return Ok(());
        };

        let now = self.clock.now();
        let elapsed_seconds =
            (now - accounted_to).num_seconds().max(0) + state.carry_seconds;
        let whole_minutes = (elapsed_seconds / 60) as u32;
        let remainder_seconds = elapsed_seconds % 60;

        if whole_minutes == 0 {
            state.accounted_to = Some(now);
            state.carry_seconds = elapsed_seconds;
            return Ok(());
        }

        let config = SettingsQueries::screen_time(&self.db).await?;
        let mut config = ensure_current_day(&config, self.clock.today());
        config.used_today_minutes += whole_minutes;
        SettingsQueries::save_screen_time(&self.db, &config).await?;

        state.accounted_to = Some(now);
        state.carry_seconds = remainder_seconds;
        state.session_minutes += whole_minutes;

        debug!(
            minutes = whole_minutes,
            used_today = config.used_today_minutes,
            "Flushed playback minutes"
        );
        Ok(())
    }
}
