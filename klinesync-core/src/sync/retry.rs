use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What to do with a page that still fails continuity validation after the
/// retry ceiling is exhausted.
///
/// The reference behavior is [`ForceAccept`](GapPolicy::ForceAccept): keep
/// the page, record the anomaly, and keep moving. Deployments that prefer
/// strict series over availability can select
/// [`Abort`](GapPolicy::Abort) instead, which terminates the session while
/// preserving the last accepted checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GapPolicy {
    /// Accept the page anyway and log the gap (best-effort, source-faithful).
    #[default]
    ForceAccept,
    /// Abort the session with a `ContinuityGap` error.
    Abort,
}

/// Bounded-retry configuration for rejected pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum identical re-fetches of a rejected page.
    pub max_retries: u32,
    /// Fixed pause before each re-fetch. No exponential growth, no jitter:
    /// the same window is re-requested as-is.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

/// Verdict for one rejected page attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Pause for the given backoff, then re-fetch the same window.
    RetryAfter(Duration),
    /// Ceiling exceeded under [`GapPolicy::ForceAccept`]: accept the page
    /// and record an anomaly carrying the retry count.
    ForceAccept {
        /// Rejected attempts that preceded the forced acceptance.
        retries: u32,
    },
    /// Ceiling exceeded under [`GapPolicy::Abort`]: terminate the session.
    Abort {
        /// Rejected attempts that preceded the abort.
        retries: u32,
    },
}

/// Per-page rejection counter, reset to zero whenever a page is accepted.
#[derive(Debug, Default)]
pub struct RetryState {
    attempts: u32,
}

impl RetryState {
    /// Fresh counter with zero rejected attempts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejected attempts recorded since the last acceptance.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Record one rejected attempt and decide whether to retry the same
    /// window or give up per the configured policies.
    pub fn on_rejected(&mut self, policy: &RetryPolicy, gap: GapPolicy) -> RetryDecision {
        self.attempts += 1;
        if self.attempts > policy.max_retries {
            let retries = policy.max_retries;
            match gap {
                GapPolicy::ForceAccept => RetryDecision::ForceAccept { retries },
                GapPolicy::Abort => RetryDecision::Abort { retries },
            }
        } else {
            RetryDecision::RetryAfter(policy.backoff)
        }
    }

    /// Reset on acceptance (clean or forced).
    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}
