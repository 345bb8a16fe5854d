// Daily reset policy and the combined quota/schedule evaluator.

use chrono::{DateTime, Local, NaiveDate};

use crate::schedule::is_within_window;
use crate::types::{AccessSchedule, EvaluationResult, ScreenTimeConfig};

/// Roll the usage counter over to a new calendar day if one has started.
///
/// Must run as the first step of every path that reads or writes
/// `used_today_minutes`; a stale counter from yesterday would otherwise keep
/// blocking access past midnight. Pure function of the config and "today".
pub fn ensure_current_day(config: &ScreenTimeConfig, today: NaiveDate) -> ScreenTimeConfig {
    if config.last_reset_date == today {
        return config.clone();
    }

    ScreenTimeConfig { used_today_minutes: 0, last_reset_date: today, ..config.clone() }
}

/// Evaluate whether playback is currently allowed.
///
/// The quota only blocks when quota enforcement is enabled; the schedule only
/// blocks when schedule enforcement is enabled. `remaining_minutes` is `None`
/// when there is no quota to count down.
pub fn evaluate(
    config: &ScreenTimeConfig,
    schedule: &AccessSchedule,
    now: DateTime<Local>,
) -> EvaluationResult {
    let config = ensure_current_day(config, now.date_naive());

    let quota_exceeded = config.enabled && config.used_today_minutes >= config.daily_limit_minutes;
    let within_schedule = is_within_window(schedule, now.time());
    let outside_schedule = schedule.enabled && !within_schedule;

    let remaining_minutes = config
        .enabled
        .then(|| config.daily_limit_minutes.saturating_sub(config.used_today_minutes));

    EvaluationResult {
        limit_reached: quota_exceeded || outside_schedule,
        remaining_minutes,
        within_schedule,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn noon(y: i32, m: u32, d: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn quota(enabled: bool, limit: u32, used: u32, reset: NaiveDate) -> ScreenTimeConfig {
        ScreenTimeConfig {
            enabled,
            daily_limit_minutes: limit,
            used_today_minutes: used,
            last_reset_date: reset,
        }
    }

    #[test]
    fn test_reset_on_new_day() {
        let config = quota(true, 60, 45, date(2025, 1, 1));
        let rolled = ensure_current_day(&config, date(2025, 1, 2));

        assert_eq!(rolled.used_today_minutes, 0);
        assert_eq!(rolled.last_reset_date, date(2025, 1, 2));
        assert_eq!(rolled.daily_limit_minutes, 60);
        assert!(rolled.enabled);
    }

    #[test]
    fn test_no_reset_on_same_day() {
        let config = quota(true, 60, 45, date(2025, 1, 1));
        let same = ensure_current_day(&config, date(2025, 1, 1));
        assert_eq!(same, config);
    }

    #[test]
    fn test_one_minute_remaining() {
        let config = quota(true, 60, 59, date(2025, 1, 1));
        let result = evaluate(&config, &AccessSchedule::default(), noon(2025, 1, 1));

        assert!(!result.limit_reached);
        assert_eq!(result.remaining_minutes, Some(1));
    }

    #[test]
    fn test_quota_exhausted_blocks() {
        let config = quota(true, 60, 60, date(2025, 1, 1));
        let result = evaluate(&config, &AccessSchedule::default(), noon(2025, 1, 1));

        assert!(result.limit_reached);
        assert_eq!(result.remaining_minutes, Some(0));
    }

    #[test]
    fn test_disabled_quota_never_blocks() {
        let config = quota(false, 60, 600, date(2025, 1, 1));
        let result = evaluate(&config, &AccessSchedule::default(), noon(2025, 1, 1));

        assert!(!result.limit_reached);
        assert_eq!(result.remaining_minutes, None);
    }

    #[test]
    fn test_disabled_quota_still_blocked_by_schedule() {
        let config = quota(false, 60, 600, date(2025, 1, 1));
        let schedule = AccessSchedule {
            enabled: true,
            start: "09:00".to_string(),
            end: "11:00".to_string(),
        };
        let result = evaluate(&config, &schedule, noon(2025, 1, 1));

        assert!(result.limit_reached);
        assert!(!result.within_schedule);
        assert_eq!(result.remaining_minutes, None);
    }

    #[test]
    fn test_blocked_state_clears_on_date_rollover() {
        let config = quota(true, 60, 60, date(2025, 1, 1));

        let before = evaluate(&config, &AccessSchedule::default(), noon(2025, 1, 1));
        assert!(before.limit_reached);

        let after = evaluate(&config, &AccessSchedule::default(), noon(2025, 1, 2));
        assert!(!after.limit_reached);
        assert_eq!(after.remaining_minutes, Some(60));
    }

    #[test]
    fn test_overuse_saturates_remaining_at_zero() {
        let config = quota(true, 60, 75, date(2025, 1, 1));
        let result = evaluate(&config, &AccessSchedule::default(), noon(2025, 1, 1));

        assert!(result.limit_reached);
        assert_eq!(result.remaining_minutes, Some(0));
    }
}
