// End-to-end enforcement scenarios over an in-memory database, a manual
// clock, and a recording fake player.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Local, TimeZone};
use secrecy::SecretString;
use tokio::time::Duration;

use playtime_common::clock::{Clock, ManualClock};
use playtime_common::types::{PinVerification, ScreenTimeConfig};
use playtime_engine::{
    CoordinatorState, EngineConfig, OverrideAuthority, PlaybackCoordinator, PlayerControl,
};
use playtime_store::{Database, DatabaseConfig, SettingsQueries};

#[derive(Default)]
struct RecordingPlayer {
    pause_calls: AtomicUsize,
}

#[async_trait]
impl PlayerControl for RecordingPlayer {
    async fn pause(&self) -> Result<()> {
        self.pause_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct Harness {
    db: Arc<Database>,
    clock: Arc<ManualClock>,
    player: Arc<RecordingPlayer>,
    coordinator: Arc<PlaybackCoordinator>,
    authority: OverrideAuthority,
}

async fn harness(limit_minutes: u32, used_minutes: u32) -> Harness {
    let db = Arc::new(Database::open(DatabaseConfig::in_memory()).await.unwrap());
    let clock = Arc::new(ManualClock::new(Local.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()));
    let player = Arc::new(RecordingPlayer::default());

    let config = ScreenTimeConfig {
        enabled: true,
        daily_limit_minutes: limit_minutes,
        used_today_minutes: used_minutes,
        last_reset_date: clock.today(),
    };
    SettingsQueries::save_screen_time(&db, &config).await.unwrap();

    // Long cadences: the tests drive evaluation and flushing explicitly.
    let engine_config = EngineConfig {
        evaluation_cadence: Duration::from_secs(3600),
        flush_cadence: Duration::from_secs(3600),
    };

    let coordinator = PlaybackCoordinator::new(
        db.clone(),
        clock.clone() as Arc<dyn Clock>,
        player.clone() as Arc<dyn PlayerControl>,
        engine_config,
    );
    let authority = OverrideAuthority::new(db.clone(), clock.clone() as Arc<dyn Clock>)
        .with_coordinator(coordinator.clone());

    Harness { db, clock, player, coordinator, authority }
}

#[tokio::test]
async fn test_one_minute_remaining_does_not_block() {
    let h = harness(60, 59).await;

    h.coordinator.handle_playing_changed(true).await.unwrap();
    let result = h.coordinator.refresh().await.unwrap();

    assert!(!result.limit_reached);
    assert_eq!(result.remaining_minutes, Some(1));
    assert_eq!(h.coordinator.state().await, CoordinatorState::Tracking);
    assert_eq!(h.player.pause_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_crossing_the_limit_blocks_and_pauses() {
    let h = harness(60, 59).await;

    h.coordinator.handle_playing_changed(true).await.unwrap();

    // One more tracked minute exhausts the quota.
    h.clock.advance(chrono::Duration::minutes(1));
    let result = h.coordinator.refresh().await.unwrap();

    assert!(result.limit_reached);
    assert_eq!(result.remaining_minutes, Some(0));
    assert_eq!(h.coordinator.state().await, CoordinatorState::Blocked);
    assert_eq!(h.player.pause_calls.load(Ordering::SeqCst), 1);

    let config = SettingsQueries::screen_time(&h.db).await.unwrap();
    assert_eq!(config.used_today_minutes, 60);
}

#[tokio::test]
async fn test_extension_unblocks_without_restart() {
    let h = harness(60, 59).await;

    h.coordinator.handle_playing_changed(true).await.unwrap();
    h.clock.advance(chrono::Duration::minutes(1));
    h.coordinator.refresh().await.unwrap();
    assert_eq!(h.coordinator.state().await, CoordinatorState::Blocked);

    let pin = SecretString::new("4321".to_string().into());
    h.authority.set_pin(&pin).await.unwrap();
    let token = match h.authority.verify_pin(&pin).await.unwrap() {
        PinVerification::Success(token) => token,
        other => panic!("Expected PIN success, got {:?}", other),
    };

    h.authority.extend_screen_time(&token, 30).await.unwrap();
    let result = h.coordinator.refresh().await.unwrap();

    assert!(!result.limit_reached);
    assert_eq!(result.remaining_minutes, Some(30));
    assert_eq!(h.coordinator.state().await, CoordinatorState::Idle);
}

#[tokio::test]
async fn test_override_unblocks_without_waiting_for_a_tick() {
    let h = harness(60, 60).await;
    let rx = h.coordinator.subscribe();

    h.coordinator.handle_playing_changed(true).await.unwrap();
    assert_eq!(h.coordinator.state().await, CoordinatorState::Blocked);

    let pin = SecretString::new("4321".to_string().into());
    h.authority.set_pin(&pin).await.unwrap();
    let token = match h.authority.verify_pin(&pin).await.unwrap() {
        PinVerification::Success(token) => token,
        other => panic!("Expected PIN success, got {:?}", other),
    };

    // The override itself pushes the re-evaluation; nothing else runs.
    h.authority.extend_screen_time(&token, 30).await.unwrap();

    assert_eq!(h.coordinator.state().await, CoordinatorState::Idle);
    let published = rx.borrow().clone();
    assert!(!published.limit_reached);
    assert_eq!(published.remaining_minutes, Some(30));
}

#[tokio::test]
async fn test_date_rollover_clears_a_blocked_state() {
    let h = harness(60, 60).await;

    h.coordinator.handle_playing_changed(true).await.unwrap();
    assert_eq!(h.coordinator.state().await, CoordinatorState::Blocked);

    // Midnight passes.
    h.clock.advance(chrono::Duration::hours(13));
    let result = h.coordinator.refresh().await.unwrap();

    assert!(!result.limit_reached);
    assert_eq!(result.remaining_minutes, Some(60));
    assert_eq!(h.coordinator.state().await, CoordinatorState::Idle);

    let config = SettingsQueries::screen_time(&h.db).await.unwrap();
    assert_eq!(config.used_today_minutes, 0);
    assert_eq!(config.last_reset_date, h.clock.today());
}

#[tokio::test]
async fn test_starting_playback_when_already_exhausted_blocks_immediately() {
    let h = harness(60, 60).await;

    h.coordinator.handle_playing_changed(true).await.unwrap();

    assert_eq!(h.coordinator.state().await, CoordinatorState::Blocked);
    assert_eq!(h.player.pause_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_playing_signal_while_blocked_pauses_again() {
    let h = harness(60, 60).await;

    h.coordinator.handle_playing_changed(true).await.unwrap();
    assert_eq!(h.coordinator.state().await, CoordinatorState::Blocked);

    h.coordinator.handle_playing_changed(true).await.unwrap();
    assert_eq!(h.player.pause_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_pause_and_resume_roundtrip() {
    let h = harness(60, 0).await;

    h.coordinator.handle_playing_changed(true).await.unwrap();
    h.clock.advance(chrono::Duration::minutes(10));
    h.coordinator.handle_playing_changed(false).await.unwrap();
    assert_eq!(h.coordinator.state().await, CoordinatorState::Idle);

    h.coordinator.handle_playing_changed(true).await.unwrap();
    h.clock.advance(chrono::Duration::minutes(5));
    h.coordinator.handle_playing_changed(false).await.unwrap();

    let config = SettingsQueries::screen_time(&h.db).await.unwrap();
    assert_eq!(config.used_today_minutes, 15);
}

#[tokio::test]
async fn test_subscribers_see_published_evaluations() {
    let h = harness(60, 59).await;
    let mut rx = h.coordinator.subscribe();

    h.coordinator.handle_playing_changed(true).await.unwrap();
    h.clock.advance(chrono::Duration::minutes(1));
    h.coordinator.refresh().await.unwrap();

    rx.changed().await.unwrap();
    let published = rx.borrow().clone();
    assert!(published.limit_reached);
    assert_eq!(published.remaining_minutes, Some(0));
}

#[tokio::test]
async fn test_schedule_blocks_even_with_quota_disabled() {
    let h = harness(60, 0).await;

    let mut config = SettingsQueries::screen_time(&h.db).await.unwrap();
    config.enabled = false;
    SettingsQueries::save_screen_time(&h.db, &config).await.unwrap();

    let schedule = playtime_common::types::AccessSchedule {
        enabled: true,
        start: "09:00".to_string(),
        end: "11:00".to_string(),
    };
    SettingsQueries::save_access_schedule(&h.db, &schedule).await.unwrap();

    // The harness clock sits at 12:00, outside the window.
    h.coordinator.handle_playing_changed(true).await.unwrap();

    let result = h.coordinator.refresh().await.unwrap();
    assert!(result.limit_reached);
    assert!(!result.within_schedule);
    assert_eq!(result.remaining_minutes, None);
    assert_eq!(h.coordinator.state().await, CoordinatorState::Blocked);
}

#[tokio::test]
async fn test_shutdown_flushes_tracking_from_any_state() {
    let h = harness(60, 0).await;

    h.coordinator.handle_playing_changed(true).await.unwrap();
    h.clock.advance(chrono::Duration::minutes(7));
    h.coordinator.shutdown().await.unwrap();

    assert_eq!(h.coordinator.state().await, CoordinatorState::Idle);
    let config = SettingsQueries::screen_time(&h.db).await.unwrap();
    assert_eq!(config.used_today_minutes, 7);
}
