//! Canonical kline data model shared by all exchange bindings.

use core::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::SyncError;

/// One fixed-interval OHLCV bar, normalized from a provider row.
///
/// `open_time` is the start of the interval; `close_time` is the provider's
/// end-of-interval instant and is absent for providers that only emit open
/// times. Prices and volumes are exact decimals; provider-specific extras
/// (quote volume, trade count, turnover) are carried when the wire format
/// supplies them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    /// Start of the interval (UTC).
    pub open_time: DateTime<Utc>,
    /// Provider-defined end of the interval, when emitted.
    pub close_time: Option<DateTime<Utc>>,
    /// Opening price.
    pub open: Decimal,
    /// Highest price.
    pub high: Decimal,
    /// Lowest price.
    pub low: Decimal,
    /// Closing price.
    pub close: Decimal,
    /// Base-asset volume.
    pub volume: Decimal,
    /// Quote-asset volume, when the provider reports it.
    pub quote_volume: Option<Decimal>,
    /// Number of trades in the interval, when the provider reports it.
    pub trade_count: Option<u64>,
    /// Turnover, when the provider reports it.
    pub turnover: Option<Decimal>,
}

impl Candle {
    /// End-of-interval instant: the provider's `close_time` when present,
    /// otherwise derived as `open_time + interval`.
    ///
    /// This is the value persisted as the session checkpoint.
    #[must_use]
    pub fn close_or_derived(&self, interval: Interval) -> DateTime<Utc> {
        self.close_time
            .unwrap_or_else(|| self.open_time + interval.duration())
    }
}

/// Fixed bar duration drawn from the enumerated set shared by the supported
/// providers. The duration never changes for the lifetime of one sync
/// session; mixed intervals are never intermixed in one cursor.
///
/// Serializes as the provider wire code (`"5m"`), matching how intervals
/// appear in connection configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    /// 1 minute.
    M1,
    /// 3 minutes.
    M3,
    /// 5 minutes.
    M5,
    /// 15 minutes.
    M15,
    /// 30 minutes.
    M30,
    /// 1 hour.
    H1,
}

impl Interval {
    /// Interval length in whole minutes.
    #[must_use]
    pub const fn minutes(self) -> i64 {
        match self {
            Self::M1 => 1,
            Self::M3 => 3,
            Self::M5 => 5,
            Self::M15 => 15,
            Self::M30 => 30,
            Self::H1 => 60,
        }
    }

    /// Exact interval duration used for gap arithmetic.
    #[must_use]
    pub fn duration(self) -> TimeDelta {
        TimeDelta::minutes(self.minutes())
    }

    /// Provider wire code (`"1m"`, `"3m"`, ..., `"1h"`).
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::M1 => "1m",
            Self::M3 => "3m",
            Self::M5 => "5m",
            Self::M15 => "15m",
            Self::M30 => "30m",
            Self::H1 => "1h",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Interval {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Interval {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        code.parse().map_err(serde::de::Error::custom)
    }
}

impl FromStr for Interval {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1m" => Ok(Self::M1),
            "3m" => Ok(Self::M3),
            "5m" => Ok(Self::M5),
            "15m" => Ok(Self::M15),
            "30m" => Ok(Self::M30),
            "1h" | "60m" => Ok(Self::H1),
            other => Err(SyncError::InvalidArg(format!(
                "unrecognized interval code: {other}"
            ))),
        }
    }
}

/// How a provider's cursor advances from the last accepted candle to the
/// next page's `start_inclusive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMode {
    /// Binance-style: next start is the accepted candle's close time plus
    /// one millisecond.
    ClosePlusOneMilli,
    /// Bybit-style: next start is the accepted candle's open time plus one
    /// interval.
    OpenPlusInterval,
}

impl CursorMode {
    /// Compute the next `start_inclusive` from the last accepted candle.
    ///
    /// Advance is always anchored to the accepted record, never to the
    /// requested window edge.
    #[must_use]
    pub fn next_start(self, last: &Candle, interval: Interval) -> DateTime<Utc> {
        match self {
            Self::ClosePlusOneMilli => {
                last.close_or_derived(interval) + TimeDelta::milliseconds(1)
            }
            Self::OpenPlusInterval => last.open_time + interval.duration(),
        }
    }
}
