use core::fmt;

use chrono::{DateTime, Utc};

use crate::types::{Candle, Interval};

/// First continuity violation found in a page, for retry decisions and
/// anomaly logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinuityBreak {
    /// The page does not join the previously accepted candle.
    Boundary {
        /// Open time the page should have started at.
        expected: DateTime<Utc>,
        /// Open time the page actually started at.
        actual: DateTime<Utc>,
    },
    /// Two adjacent candles inside the page are not one interval apart.
    IntraPage {
        /// Index of the candle whose open time is off.
        index: usize,
        /// Open time this candle should have had.
        expected: DateTime<Utc>,
        /// Open time this candle actually had.
        actual: DateTime<Utc>,
    },
}

impl fmt::Display for ContinuityBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boundary { expected, actual } => {
                write!(f, "page boundary gap: expected {expected}, got {actual}")
            }
            Self::IntraPage {
                index,
                expected,
                actual,
            } => write!(
                f,
                "gap inside page at index {index}: expected {expected}, got {actual}"
            ),
        }
    }
}

/// Validate a fetched page against the previously accepted candle.
///
/// The cross-page check requires `page[0].open_time` to be exactly one
/// interval after `previous.open_time`; the intra-page check requires every
/// adjacent pair to be exactly one interval apart. There is no numeric
/// tolerance: any spacing mismatch, including negative (out-of-order)
/// spacing, fails the whole page.
///
/// # Errors
/// Returns the first [`ContinuityBreak`] found, boundary check first.
pub fn check_page(
    page: &[Candle],
    previous: Option<&Candle>,
    interval: Interval,
) -> Result<(), ContinuityBreak> {
    let step = interval.duration();

    if let (Some(prev), Some(first)) = (previous, page.first()) {
        let expected = prev.open_time + step;
        if first.open_time != expected {
            return Err(ContinuityBreak::Boundary {
                expected,
                actual: first.open_time,
            });
        }
    }

    for (index, pair) in page.windows(2).enumerate() {
        let expected = pair[0].open_time + step;
        if pair[1].open_time != expected {
            return Err(ContinuityBreak::IntraPage {
                index: index + 1,
                expected,
                actual: pair[1].open_time,
            });
        }
    }

    Ok(())
}

/// Convenience predicate: does the page pass intra-page validation on its
/// own, with no previous candle to join?
#[must_use]
pub fn is_continuous(page: &[Candle], interval: Interval) -> bool {
    check_page(page, None, interval).is_ok()
}
