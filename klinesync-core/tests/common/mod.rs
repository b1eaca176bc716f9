#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use rust_decimal::Decimal;

use klinesync_core::{Candle, Clock, CursorMode, Interval, KlineSource, SyncError};

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
}

pub fn candle_at(open_time: DateTime<Utc>, interval: Interval) -> Candle {
    Candle {
        open_time,
        close_time: Some(open_time + interval.duration() - TimeDelta::milliseconds(1)),
        open: Decimal::ONE,
        high: Decimal::TWO,
        low: Decimal::ONE,
        close: Decimal::TWO,
        volume: Decimal::TEN,
        quote_volume: None,
        trade_count: None,
        turnover: None,
    }
}

/// `n` exactly interval-spaced candles starting at `start`.
pub fn page(start: DateTime<Utc>, interval: Interval, n: usize) -> Vec<Candle> {
    (0..n)
        .map(|i| candle_at(start + interval.duration() * i32::try_from(i).unwrap(), interval))
        .collect()
}

/// Candles opened at `start + offset * interval` for each offset, so gaps
/// can be injected by skipping offsets.
pub fn page_at_offsets(start: DateTime<Utc>, interval: Interval, offsets: &[i32]) -> Vec<Candle> {
    offsets
        .iter()
        .map(|&i| candle_at(start + interval.duration() * i, interval))
        .collect()
}

pub struct FrozenClock(pub DateTime<Utc>);

impl Clock for FrozenClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Scripted source replaying enqueued pages; empty once the script drains.
pub struct ScriptedSource {
    cursor_mode: CursorMode,
    bootstrap_anchor: DateTime<Utc>,
    probe_step: TimeDelta,
    script: Mutex<VecDeque<Result<Vec<Candle>, SyncError>>>,
    calls: Mutex<Vec<(DateTime<Utc>, u32)>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            cursor_mode: CursorMode::ClosePlusOneMilli,
            bootstrap_anchor: t0(),
            probe_step: TimeDelta::days(30),
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_cursor_mode(mut self, mode: CursorMode) -> Self {
        self.cursor_mode = mode;
        self
    }

    pub fn with_bootstrap_anchor(mut self, anchor: DateTime<Utc>) -> Self {
        self.bootstrap_anchor = anchor;
        self
    }

    pub fn with_probe_step(mut self, step: TimeDelta) -> Self {
        self.probe_step = step;
        self
    }

    pub fn push_page(&self, page: Vec<Candle>) {
        self.script.lock().unwrap().push_back(Ok(page));
    }

    pub fn push_error(&self, error: SyncError) {
        self.script.lock().unwrap().push_back(Err(error));
    }

    pub fn calls(&self) -> Vec<(DateTime<Utc>, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl KlineSource for ScriptedSource {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn supported_intervals(&self) -> &'static [Interval] {
        const ALL: &[Interval] = &[
            Interval::M1,
            Interval::M3,
            Interval::M5,
            Interval::M15,
            Interval::M30,
            Interval::H1,
        ];
        ALL
    }

    fn cursor_mode(&self) -> CursorMode {
        self.cursor_mode
    }

    fn max_page_size(&self) -> u32 {
        500
    }

    fn bootstrap_anchor(&self) -> DateTime<Utc> {
        self.bootstrap_anchor
    }

    fn probe_step(&self) -> TimeDelta {
        self.probe_step
    }

    async fn fetch_page(
        &self,
        _symbol: &str,
        _interval: Interval,
        start_inclusive: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<Candle>, SyncError> {
        self.calls.lock().unwrap().push((start_inclusive, limit));
        match self.script.lock().unwrap().pop_front() {
            Some(scripted) => scripted,
            None => Ok(vec![]),
        }
    }
}
