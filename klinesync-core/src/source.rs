use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};

use crate::types::{Candle, CursorMode, Interval};
use crate::SyncError;

/// Role trait implemented by exchange bindings that serve kline pages.
///
/// Each `fetch_page` call performs exactly one outbound request; retries are
/// the sync engine's responsibility, never the binding's. Implementations
/// normalize provider time units (milliseconds vs seconds) to UTC instants
/// and provider rows to [`Candle`]s before returning.
#[async_trait]
pub trait KlineSource: Send + Sync {
    /// Stable source name used in checkpoint keys and logs (e.g. `"binance"`).
    fn name(&self) -> &'static str;

    /// Exact intervals this source can natively serve.
    fn supported_intervals(&self) -> &'static [Interval];

    /// How the cursor advances from an accepted candle to the next page start.
    fn cursor_mode(&self) -> CursorMode;

    /// Provider-specific maximum number of candles per page.
    fn max_page_size(&self) -> u32;

    /// Very-early anchor instant used to seed earliest-point probing.
    fn bootstrap_anchor(&self) -> DateTime<Utc>;

    /// Coarse step by which the earliest-point probe advances on an empty
    /// response (provider-dependent, 30–365 days).
    fn probe_step(&self) -> TimeDelta;

    /// Fetch one page of candles ordered by `open_time` ascending, starting
    /// at or after `start_inclusive`, with at most `limit` rows.
    ///
    /// An empty page means the provider has no more data at or after
    /// `start_inclusive`.
    ///
    /// # Errors
    /// - [`SyncError::Transport`] on a non-success HTTP status or transport
    ///   failure.
    /// - [`SyncError::Decode`] when a provider row cannot be mapped into a
    ///   [`Candle`].
    async fn fetch_page(
        &self,
        symbol: &str,
        interval: Interval,
        start_inclusive: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<Candle>, SyncError>;

    /// Check that `interval` belongs to this source's supported set.
    ///
    /// Called once at session construction so that unsupported intervals
    /// fail before any request is made.
    ///
    /// # Errors
    /// Returns [`SyncError::UnsupportedInterval`] when the interval is not
    /// supported.
    fn ensure_interval_supported(&self, interval: Interval) -> Result<(), SyncError> {
        if self.supported_intervals().contains(&interval) {
            Ok(())
        } else {
            Err(SyncError::unsupported_interval(self.name(), interval))
        }
    }
}
