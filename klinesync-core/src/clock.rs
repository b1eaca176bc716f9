use chrono::{DateTime, Utc};

/// Source of "now" for horizon decisions.
///
/// The pagination driver re-reads the horizon through this trait before
/// every page, so long backfills converge on a moving "now" and tests can
/// substitute a deterministic clock.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
