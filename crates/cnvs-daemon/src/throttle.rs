//! Rate limiting for repeated render errors.

use std::time::{Duration, Instant};

/// How often a persisting error is summarized.
const SUMMARY_INTERVAL: Duration = Duration::from_secs(60);

/// What to log for a failure, if anything.
#[derive(Debug, PartialEq, Eq)]
pub enum Report {
    /// First failure after a success.
    First,
    /// Summary of a run of failures.
    Repeated { count: u32, since: Duration },
}

/// Counts consecutive render failures and decides which ones get logged.
///
/// The first failure of a run is always logged; after that a summary goes
/// out at most once per minute.
#[derive(Debug, Default)]
pub struct ErrorThrottle {
    consecutive: u32,
    last_log: Option<Instant>,
}

impl ErrorThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure at `now`.
    pub fn failure(&mut self, now: Instant) -> Option<Report> {
        self.consecutive += 1;
        if self.consecutive == 1 {
            self.last_log = Some(now);
            return Some(Report::First);
        }

        let since = self
            .last_log
            .map_or(SUMMARY_INTERVAL, |last| now.saturating_duration_since(last));
        if since < SUMMARY_INTERVAL {
            return None;
        }
        self.last_log = Some(now);
        Some(Report::Repeated {
            count: self.consecutive,
            since,
        })
    }

    /// Records a success. Returns the length of the run it ended, if that
    /// run was worth a recovery message.
    pub fn success(&mut self) -> Option<u32> {
        let count = std::mem::take(&mut self.consecutive);
        (count > 1).then_some(count)
    }
}
