// Schedule gate: time-of-day window checks for playback access.

use chrono::{NaiveTime, Timelike};
use tracing::warn;

use crate::error::Error;
use crate::types::AccessSchedule;

/// Check whether `now` falls inside the allowed window.
///
/// A disabled schedule never restricts. The comparison is inclusive at the
/// start and exclusive at the end (`start <= now < end`), so a window of
/// 09:00-20:00 admits 09:00 exactly and blocks 20:00 exactly. A window with
/// `start == end` is empty and always outside. Windows with `start > end`
/// (overnight) are unsupported and evaluate the same way: empty.
///
/// Malformed time strings fail open: the schedule is treated as imposing no
/// restriction, so a configuration mistake never locks the parent out.
pub fn is_within_window(schedule: &AccessSchedule, now: NaiveTime) -> bool {
    if !schedule.enabled {
        return true;
    }

    let (start, end) = match (parse_time(&schedule.start), parse_time(&schedule.end)) {
        (Ok(start), Ok(end)) => (start, end),
        _ => {
            warn!(
                start = %schedule.start,
                end = %schedule.end,
                "Malformed schedule window, treating as unrestricted"
            );
            return true;
        }
    };

    let now = minutes_since_midnight(now);
    let start = minutes_since_midnight(start);
    let end = minutes_since_midnight(end);

    start <= now && now < end
}

fn minutes_since_midnight(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Parse a 24-hour "HH:mm" clock string.
pub fn parse_time(time_str: &str) -> crate::Result<NaiveTime> {
    NaiveTime::parse_from_str(time_str, "%H:%M")
        .map_err(|e| Error::InvalidTime(format!("{}: {}", time_str, e)))
}
