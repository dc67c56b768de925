//! Injected clock so every engine computation is testable without real time.

use chrono::{DateTime, NaiveDate, Utc};

/// Source of "now" and "today". The engine never reads the system
/// clock directly; callers pass one of these in.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// The current calendar day, derived from the same instant as
    /// `now()` so day bounds and elapsed time can never disagree.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock implementation used by the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed instant, for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_clock_day_matches_instant() {
        let t = Utc.with_ymd_and_hms(2026, 3, 5, 23, 59, 58).unwrap();
        let clock = FixedClock(t);
        assert_eq!(clock.now(), t);
        assert_eq!(clock.today(), t.date_naive());
    }
}
