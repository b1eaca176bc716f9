use std::str::FromStr;

use chrono::DateTime;
use rust_decimal::Decimal;
use serde::Deserialize;

use klinesync_core::{Candle, SyncError};

use crate::SOURCE_NAME;

/// One raw `/api/v3/klines` row: a 12-field JSON array of open time (ms),
/// OHLCV (strings), close time (ms), quote asset volume, trade count, taker
/// buy volumes, and a field Binance documents as ignorable.
#[derive(Debug, Deserialize)]
pub(crate) struct RawKline(
    pub i64,
    pub String,
    pub String,
    pub String,
    pub String,
    pub String,
    pub i64,
    pub String,
    pub u64,
    pub String,
    pub String,
    pub serde_json::Value,
);

fn decimal(field: &'static str, raw: &str) -> Result<Decimal, SyncError> {
    Decimal::from_str(raw)
        .map_err(|e| SyncError::decode(SOURCE_NAME, format!("non-numeric {field} {raw:?}: {e}")))
}

fn instant_ms(field: &'static str, ms: i64) -> Result<chrono::DateTime<chrono::Utc>, SyncError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| SyncError::decode(SOURCE_NAME, format!("{field} {ms} out of range")))
}

/// Map a raw row into the canonical candle, normalizing millisecond epochs
/// to UTC instants. Taker buy volumes are validated upstream by Binance and
/// not carried.
pub(crate) fn candle_from_raw(raw: RawKline) -> Result<Candle, SyncError> {
    let open_time = instant_ms("open_time", raw.0)?;
    let close_time = instant_ms("close_time", raw.6)?;
    if close_time <= open_time {
        return Err(SyncError::decode(
            SOURCE_NAME,
            format!("close_time {close_time} not after open_time {open_time}"),
        ));
    }

    Ok(Candle {
        open_time,
        close_time: Some(close_time),
        open: decimal("open", &raw.1)?,
        high: decimal("high", &raw.2)?,
        low: decimal("low", &raw.3)?,
        close: decimal("close", &raw.4)?,
        volume: decimal("volume", &raw.5)?,
        quote_volume: Some(decimal("quote_asset_volume", &raw.7)?),
        trade_count: Some(raw.8),
        turnover: None,
    })
}
