//! klinesync-binance
//!
//! Binance spot [`KlineSource`] for the klinesync sync engine. Speaks the
//! `GET /api/v3/klines` endpoint: millisecond epochs, 12-field array rows,
//! pages of up to 500 candles, cursor advance of close time plus one
//! millisecond.
#![warn(missing_docs)]

mod convert;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use klinesync_core::{Candle, CursorMode, Interval, KlineSource, SyncError};

use convert::{candle_from_raw, RawKline};

/// Stable source name used in checkpoint keys and logs.
pub const SOURCE_NAME: &str = "binance";

const DEFAULT_HOST: &str = "https://api.binance.com";
const MAX_PAGE_SIZE: u32 = 500;

/// Binance spot kline source backed by `reqwest`.
///
/// Each [`fetch_page`](KlineSource::fetch_page) call performs exactly one
/// outbound request; retrying is the sync engine's job.
pub struct BinanceSource {
    http: reqwest::Client,
    base_url: String,
}

/// Builder for [`BinanceSource`].
#[derive(Debug, Default)]
pub struct BinanceSourceBuilder {
    host: Option<String>,
    http: Option<reqwest::Client>,
}

impl BinanceSourceBuilder {
    /// Override the API host (e.g. a regional or mock endpoint).
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
    pub fn build(self) -> BinanceSource {
        BinanceSource {
            http: self.http.unwrap_or_default(),
            base_url: self
                .host
                .unwrap_or_else(|| DEFAULT_HOST.to_string())
                .trim_end_matches('/')
                .to_string(),
        }
    }
}

impl Default for BinanceSource {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl BinanceSource {
    /// Start building a source against the production host.
    #[must_use]
    pub fn builder() -> BinanceSourceBuilder {
        BinanceSourceBuilder::default()
    }
}

#[async_trait]
impl KlineSource for BinanceSource {
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
        CursorMode::ClosePlusOneMilli
    }

    fn max_page_size(&self) -> u32 {
        MAX_PAGE_SIZE
    }

    fn bootstrap_anchor(&self) -> DateTime<Utc> {
        // Predates every Binance listing.
        Utc.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).unwrap()
    }

    fn probe_step(&self) -> TimeDelta {
        TimeDelta::days(365)
    }

    async fn fetch_page(
        &self,
        symbol: &str,
        interval: Interval,
        start_inclusive: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<Candle>, SyncError> {
        let url = format!("{}/api/v3/klines", self.base_url);
        let start_ms = start_inclusive.timestamp_millis();

        let response = self
            .http
            .get(&url)
            .query(&[("symbol", symbol), ("interval", interval.code())])
            .query(&[("startTime", start_ms)])
            .query(&[("limit", limit)])
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

        let rows: Vec<RawKline> = response
            .json()
            .await
            .map_err(|e| SyncError::decode(SOURCE_NAME, e.to_string()))?;

        tracing::debug!(symbol, start = %start_inclusive, rows = rows.len(), "klines page");

        rows.into_iter().map(candle_from_raw).collect()
    }
}
