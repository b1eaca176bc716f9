use chrono::DateTime;
use rust_decimal::Decimal;
use serde::Deserialize;

use klinesync_core::{Candle, SyncError};

use crate::SOURCE_NAME;

/// Envelope around `/public/linear/kline`; `result` is null or absent when
/// the window holds no data.
#[derive(Debug, Deserialize)]
pub(crate) struct KlineEnvelope {
    #[serde(default)]
    pub result: Option<Vec<RawKline>>,
}

/// One raw kline object: second-resolution open time, numeric OHLCV, and
/// turnover. Bybit emits no close time; the engine derives it from the
/// interval where needed.
#[derive(Debug, Deserialize)]
pub(crate) struct RawKline {
    pub open_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    #[serde(default)]
    pub turnover: Option<Decimal>,
}

/// Map a raw row into the canonical candle, normalizing the second epoch to
/// a UTC instant.
pub(crate) fn candle_from_raw(raw: RawKline) -> Result<Candle, SyncError> {
    let open_time = DateTime::from_timestamp(raw.open_time, 0).ok_or_else(|| {
        SyncError::decode(SOURCE_NAME, format!("open_time {} out of range", raw.open_time))
    })?;

    Ok(Candle {
        open_time,
        close_time: None,
        open: raw.open,
        high: raw.high,
        low: raw.low,
        close: raw.close,
        volume: raw.volume,
        quote_volume: None,
        trade_count: None,
        turnover: raw.turnover,
    })
}
