//! The pagination driver: the core loop that pages through a source,
//! validates continuity, retries bounded, and advances a resumable cursor
//! against a continuously re-evaluated "now" horizon.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::clock::Clock;
use crate::source::KlineSource;
use crate::sync::continuity::{check_page, ContinuityBreak};
use crate::sync::retry::{GapPolicy, RetryDecision, RetryPolicy, RetryState};
use crate::types::{Candle, Interval};
use crate::SyncError;

/// Tunables for one sync session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPolicy {
    /// Bounded-retry settings for rejected pages.
    pub retry: RetryPolicy,
    /// What to do when the retry ceiling is exhausted.
    pub gap: GapPolicy,
    /// Fixed pause after every accepted page. A static, conservative
    /// throttle; provider rate-limit headers are not consulted.
    pub page_pause: Duration,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            gap: GapPolicy::default(),
            page_pause: Duration::from_secs(1),
        }
    }
}

/// A continuity gap that was accepted anyway after the retry ceiling, kept
/// for operator audit alongside the warning log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapAnomaly {
    /// `start_inclusive` of the page window that kept failing validation.
    pub window_start: DateTime<Utc>,
    /// Rejected re-fetches before the forced acceptance.
    pub retries: u32,
    /// The violation that persisted.
    pub detail: ContinuityBreak,
}

/// Why a session stopped.
#[derive(Debug)]
pub enum Termination {
    /// The provider returned an empty page, or the cursor caught up with
    /// the horizon.
    Drained,
    /// Cancellation was requested between pages.
    Cancelled,
    /// A fatal error ended the session early; accumulated candles and the
    /// last checkpoint are still exposed.
    Aborted(SyncError),
}

impl Termination {
    /// Whether the session drained normally.
    #[must_use]
    pub const fn is_drained(&self) -> bool {
        matches!(self, Self::Drained)
    }
}

/// Result of one sync run: everything accepted, the final resumable
/// checkpoint, audit anomalies, and the reason the loop stopped.
#[derive(Debug)]
pub struct SyncOutcome {
    /// Accepted candles for the whole session, ordered by `open_time`.
    pub candles: Vec<Candle>,
    /// End-of-interval instant of the last accepted candle, if any page was
    /// accepted.
    pub checkpoint: Option<DateTime<Utc>>,
    /// Force-accepted continuity gaps, in occurrence order.
    pub anomalies: Vec<GapAnomaly>,
    /// Why the session stopped.
    pub termination: Termination,
}

/// One sync session over a single `(source, symbol, interval)`.
///
/// The session owns its cursor and retry state exclusively; sessions for
/// other symbols or intervals are independent and may run concurrently.
pub struct SyncSession {
    source: Arc<dyn KlineSource>,
    clock: Arc<dyn Clock>,
    symbol: String,
    interval: Interval,
    policy: SyncPolicy,
    cancel: CancelToken,
}

impl SyncSession {
    /// Build a session, verifying interval support up front so unsupported
    /// intervals fail before any request is made.
    ///
    /// # Errors
    /// Returns [`SyncError::UnsupportedInterval`] when `interval` is outside
    /// the source's supported set.
    pub fn new(
        source: Arc<dyn KlineSource>,
        clock: Arc<dyn Clock>,
        symbol: impl Into<String>,
        interval: Interval,
        policy: SyncPolicy,
    ) -> Result<Self, SyncError> {
        source.ensure_interval_supported(interval)?;
        Ok(Self {
            source,
            clock,
            symbol: symbol.into(),
            interval,
            policy,
            cancel: CancelToken::new(),
        })
    }

    /// Token that stops the session cooperatively between pages.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Replace the session's token with an externally shared one, so one
    /// token can stop a whole group of sessions.
    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Drive the pagination loop from `start_inclusive` until the source
    /// drains, the horizon is reached, cancellation is requested, or a
    /// fatal error occurs.
    ///
    /// The horizon is re-read from the clock before every page, so long
    /// backfills converge instead of overrunning a "now" fixed at loop
    /// start.
    pub async fn run(&self, start_inclusive: DateTime<Utc>) -> SyncOutcome {
        let mode = self.source.cursor_mode();
        let limit = self.source.max_page_size();

        let mut cursor = start_inclusive;
        let mut last_accepted: Option<Candle> = None;
        let mut candles: Vec<Candle> = Vec::new();
        let mut anomalies: Vec<GapAnomaly> = Vec::new();
        let mut retry = RetryState::new();

        tracing::info!(
            source = self.source.name(),
            symbol = %self.symbol,
            interval = %self.interval,
            start = %cursor,
            "starting sync session"
        );

        let termination = loop {
            if self.cancel.is_cancelled() {
                tracing::info!(symbol = %self.symbol, "sync session cancelled");
                break Termination::Cancelled;
            }

            let horizon = self.clock.now();
            if cursor >= horizon {
                break Termination::Drained;
            }

            let page = match self
                .source
                .fetch_page(&self.symbol, self.interval, cursor, limit)
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!(
                        source = self.source.name(),
                        symbol = %self.symbol,
                        start = %cursor,
                        error = %e,
                        "aborting sync session"
                    );
                    break Termination::Aborted(e);
                }
            };

            let Some(tail) = page.last().cloned() else {
                tracing::info!(symbol = %self.symbol, start = %cursor, "source drained");
                break Termination::Drained;
            };

            tracing::info!(
                symbol = %self.symbol,
                rows = page.len(),
                from = %cursor,
                "fetched page"
            );

            if let Err(gap) = check_page(&page, last_accepted.as_ref(), self.interval) {
                match retry.on_rejected(&self.policy.retry, self.policy.gap) {
                    RetryDecision::RetryAfter(backoff) => {
                        tracing::warn!(
                            symbol = %self.symbol,
                            start = %cursor,
                            attempt = retry.attempts(),
                            gap = %gap,
                            "page failed continuity validation, re-fetching"
                        );
                        tokio::time::sleep(backoff).await;
                        continue;
                    }
                    RetryDecision::ForceAccept { retries } => {
                        tracing::warn!(
                            symbol = %self.symbol,
                            window_start = %cursor,
                            retries,
                            gap = %gap,
                            "continuity gap persisted past retry ceiling, accepting page anyway"
                        );
                        anomalies.push(GapAnomaly {
                            window_start: cursor,
                            retries,
                            detail: gap,
                        });
                    }
                    RetryDecision::Abort { retries } => {
                        tracing::error!(
                            symbol = %self.symbol,
                            window_start = %cursor,
                            retries,
                            gap = %gap,
                            "continuity gap persisted past retry ceiling, aborting"
                        );
                        break Termination::Aborted(SyncError::ContinuityGap {
                            window_start: cursor,
                            retries,
                        });
                    }
                }
            }

            // Acceptance, clean or forced: advance off the accepted tail,
            // never off the requested window edge.
            retry.reset();
            cursor = mode.next_start(&tail, self.interval);
            last_accepted = Some(tail);
            candles.extend(page);

            tokio::time::sleep(self.policy.page_pause).await;
        };

        let checkpoint = last_accepted
            .as_ref()
            .map(|c| c.close_or_derived(self.interval));

        tracing::info!(
            symbol = %self.symbol,
            rows = candles.len(),
            anomalies = anomalies.len(),
            checkpoint = ?checkpoint.map(crate::checkpoint::format_checkpoint),
            "sync session finished"
        );

        SyncOutcome {
            candles,
            checkpoint,
            anomalies,
            termination,
        }
    }
}
