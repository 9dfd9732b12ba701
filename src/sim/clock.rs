use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::FeedError;

/// Wall-clock layout of one trading session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClock {
    pub open: NaiveTime,
    /// Session length in seconds; also the number of ticks per day.
    pub length_secs: u32,
}

impl SessionClock {
    pub fn new(open: NaiveTime, length_secs: u32) -> Self {
        Self { open, length_secs }
    }

    pub fn session_start(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.open)
    }

    /// Fails when the session would spill into the next calendar day.
    pub fn ensure_fits(&self) -> Result<(), FeedError> {
        let open_secs = u64::from(self.open.num_seconds_from_midnight());
        if open_secs + u64::from(self.length_secs) > 86_400 {
            return Err(FeedError::SessionOverflow(self.length_secs));
        }
        Ok(())
    }

    pub fn timestamp(&self, date: NaiveDate, step: u32) -> NaiveDateTime {
        self.session_start(date) + Duration::seconds(i64::from(step))
    }
}
