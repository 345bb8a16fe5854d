use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, NaiveDate};

/// Source of wall-clock time and the local calendar date.
///
/// The enforcement engine never reads the system clock directly; it goes
/// through this port so day rollovers and schedule boundaries can be driven
/// deterministically in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Settable clock for tests and simulations.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<Mutex<DateTime<Local>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Local>) -> Self {
        Self { current: Arc::new(Mutex::new(start)) }
    }

    pub fn set(&self, time: DateTime<Local>) {
        *self.current.lock().unwrap() = time;
    }

    pub fn advance(&self, duration: chrono::Duration) {
        let mut current = self.current.lock().unwrap();
        *current += duration;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.current.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_system_clock_today_matches_now() {
        let clock = SystemClock;
        assert_eq!(clock.today(), clock.now().date_naive());
    }

    #[test]
    fn test_manual_clock_set_and_advance() {
        let start = Local.with_ymd_and_hms(2025, 1, 1, 23, 30, 0).unwrap();
        let clock = ManualClock::new(start);

        assert_eq!(clock.now(), start);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());

        clock.advance(chrono::Duration::hours(1));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
    }
}
