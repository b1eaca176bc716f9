//! klinesync-bybit
//!
//! Bybit linear [`KlineSource`] for the klinesync sync engine. Speaks the
//! `GET /public/linear/kline` endpoint: second epochs, object rows wrapped
//! in a `result` envelope, pages of up to 200 candles, cursor advance of
//! open time plus one interval.
#![warn(missing_docs)]

mod convert;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use klinesync_core::{Candle, CursorMode, Interval, KlineSource, SyncError};

use convert::{candle_from_raw, KlineEnvelope};

/// Stable source name used in checkpoint keys and logs.
pub const SOURCE_NAME: &str = "bybit";

const DEFAULT_HOST: &str = "https://api.bybit.com";
const MAX_PAGE_SIZE: u32 = 200;

/// Bybit linear kline source backed by `reqwest`.
///
/// Each [`fetch_page`](KlineSource::fetch_page) call performs exactly one
/// outbound request; retrying is the sync engine's job.
pub struct BybitSource {
    http: reqwest::Client,
    base_url: String,
}

/// Builder for [`BybitSource`].
#[derive(Debug, Default)]
pub struct BybitSourceBuilder {
    host: Option<String>,
    http: Option<reqwest::Client>,
}

impl BybitSourceBuilder {
    /// Override the API host (e.g. a testnet or mock endpoint).
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Provide a pre-configured HTTP client (proxy, timeouts, pooling).
    #[must_use]
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Finish building the source.
    #[must_use]
    pub fn build(self) -> BybitSource {
        BybitSource {
            http: self.http.unwrap_or_default(),
            base_url: self
                .host
                .unwrap_or_else(|| DEFAULT_HOST.to_string())
                .trim_end_matches('/')
                .to_string(),
        }
    }
}

impl Default for BybitSource {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl BybitSource {
    /// Start building a source against the production host.
    #[must_use]
    pub fn builder() -> BybitSourceBuilder {
        BybitSourceBuilder::default()
    }
}

#[async_trait]
impl KlineSource for BybitSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn supported_intervals(&self) -> &'static [Interval] {
        const SUPPORTED: &[Interval] = &[
            Interval::M1,
            Interval::M3,
            Interval::M5,
            Interval::M15,
            Interval::M30,
            Interval::H1,
        ];
        SUPPORTED
    }

    fn cursor_mode(&self) -> CursorMode {
        CursorMode::OpenPlusInterval
    }

    fn max_page_size(&self) -> u32 {
        MAX_PAGE_SIZE
    }

    fn bootstrap_anchor(&self) -> DateTime<Utc> {
        // Predates the linear contracts Bybit serves history for.
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
    }

    fn probe_step(&self) -> TimeDelta {
        TimeDelta::days(30)
    }

    async fn fetch_page(
        &self,
        symbol: &str,
        interval: Interval,
        start_inclusive: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<Candle>, SyncError> {
        let url = format!("{}/public/linear/kline", self.base_url);
        let from_s = start_inclusive.timestamp();

        let response = self
            .http
            .get(&url)
            .query(&[("symbol", symbol)])
            .query(&[("interval", interval.minutes())])
            .query(&[("from", from_s)])
            .query(&[("limit", i64::from(limit))])
            .send()
            .await
            .map_err(|e| SyncError::transport(SOURCE_NAME, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::transport(
                SOURCE_NAME,
                format!("status {status}: {body}"),
            ));
        }

        let envelope: KlineEnvelope = response
            .json()
            .await
            .map_err(|e| SyncError::decode(SOURCE_NAME, e.to_string()))?;

        let rows = envelope.result.unwrap_or_default();
        tracing::debug!(symbol, start = %start_inclusive, rows = rows.len(), "kline page");

        rows.into_iter().map(candle_from_raw).collect()
    }
}
