use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily screen-time quota state for the device's single child user.
///
/// `used_today_minutes` is only meaningful relative to `last_reset_date`:
/// if the stamp is not today's date the counter is stale and must be zeroed
/// before use (see `limits::ensure_current_day`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenTimeConfig {
    pub enabled: bool,
    pub daily_limit_minutes: u32,
    pub used_today_minutes: u32,
    pub last_reset_date: NaiveDate,
}

impl Default for ScreenTimeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            daily_limit_minutes: 120,
            used_today_minutes: 0,
            // Epoch stamp so the first evaluation after setup resets cleanly.
            last_reset_date: NaiveDate::default(),
        }
    }
}

/// Time-of-day window during which playback is permitted.
///
/// Times are 24-hour "HH:mm" strings. The window is assumed non-wrapping
/// (`start` earlier than `end` within the same day); overnight windows are
/// not supported and evaluate as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessSchedule {
    pub enabled: bool,
    pub start: String,
    pub end: String,
}

impl Default for AccessSchedule {
    fn default() -> Self {
        Self { enabled: false, start: "08:00".to_string(), end: "20:00".to_string() }
    }
}

/// Outcome of a single screen-time evaluation. Derived on demand, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationResult {
    /// Playback must be blocked (quota exhausted or outside the schedule).
    pub limit_reached: bool,
    /// Minutes left before the quota blocks, `None` when quota enforcement
    /// is disabled (no countdown should be displayed).
    pub remaining_minutes: Option<u32>,
    pub within_schedule: bool,
}

impl EvaluationResult {
    /// Unrestricted result, used before the first real evaluation runs.
    pub fn unrestricted() -> Self {
        Self { limit_reached: false, remaining_minutes: None, within_schedule: true }
    }
}

/// Proof of a successful parent PIN check. Only constructible inside this
/// crate, so override operations can demand one at the type level.
#[derive(Debug)]
pub struct ParentToken {
    pub(crate) _priv: (),
}

/// Result of verifying an entered PIN against the stored hash.
#[derive(Debug)]
pub enum PinVerification {
    Success(ParentToken),
    Failure,
    /// No PIN has been configured yet; callers should direct the user to
    /// the setup flow rather than treat this as a failed attempt.
    NotSet,
}

/// Why a tracked playback session ended, recorded in session history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEndReason {
    Stopped,
    LimitReached,
    Shutdown,
}

impl SessionEndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionEndReason::Stopped => "stopped",
            SessionEndReason::LimitReached => "limit_reached",
            SessionEndReason::Shutdown => "shutdown",
        }
    }
}
