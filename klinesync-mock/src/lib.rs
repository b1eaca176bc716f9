//! klinesync-mock
//!
//! Deterministic test doubles for the klinesync ecosystem: a scripted
//! [`KlineSource`], a manually driven [`Clock`], an in-memory checkpoint
//! store, and a collecting sink. No network, no filesystem; safe for CI.
#![warn(missing_docs)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use rust_decimal::Decimal;

use klinesync_core::{
    format_checkpoint, parse_checkpoint, Candle, CandleSink, CheckpointStore, Clock, CursorMode,
    Interval, KlineSource, SessionKey, SyncError,
};

/// Build one candle opening at `open_time`, with a Binance-style close time
/// one millisecond before the next interval boundary.
#[must_use]
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

/// Build `n` exactly interval-spaced candles starting at `start`.
#[must_use]
pub fn continuous_page(start: DateTime<Utc>, interval: Interval, n: usize) -> Vec<Candle> {
    (0..n)
        .map(|i| {
            let offset = interval.duration() * i32::try_from(i).unwrap_or(i32::MAX);
            candle_at(start + offset, interval)
        })
        .collect()
}

/// A scripted page response: either candles or a source failure.
pub type ScriptedPage = Result<Vec<Candle>, SyncError>;

/// Scripted [`KlineSource`] that replays enqueued pages in order and records
/// every request it receives.
///
/// Once the script is exhausted, further fetches return empty pages (the
/// drained signal).
pub struct ScriptedSource {
    name: &'static str,
    cursor_mode: CursorMode,
    max_page_size: u32,
    bootstrap_anchor: DateTime<Utc>,
    probe_step: TimeDelta,
    script: Mutex<VecDeque<ScriptedPage>>,
    calls: Mutex<Vec<(DateTime<Utc>, u32)>>,
}

impl ScriptedSource {
    /// New scripted source with Binance-like descriptors.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            cursor_mode: CursorMode::ClosePlusOneMilli,
            max_page_size: 500,
            bootstrap_anchor: Utc.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).unwrap(),
            probe_step: TimeDelta::days(365),
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Override the cursor advance mode.
    #[must_use]
    pub const fn with_cursor_mode(mut self, mode: CursorMode) -> Self {
        self.cursor_mode = mode;
        self
    }

    /// Override the page size hint.
    #[must_use]
    pub const fn with_max_page_size(mut self, limit: u32) -> Self {
        self.max_page_size = limit;
        self
    }

    /// Override the earliest-point bootstrap anchor.
    #[must_use]
    pub fn with_bootstrap_anchor(mut self, anchor: DateTime<Utc>) -> Self {
        self.bootstrap_anchor = anchor;
        self
    }

    /// Override the coarse probe step.
    #[must_use]
    pub fn with_probe_step(mut self, step: TimeDelta) -> Self {
        self.probe_step = step;
        self
    }

    /// Enqueue a successful page.
    pub fn push_page(&self, page: Vec<Candle>) {
        self.script.lock().expect("mutex poisoned").push_back(Ok(page));
    }

    /// Enqueue a source failure.
    pub fn push_error(&self, error: SyncError) {
        self.script
            .lock()
            .expect("mutex poisoned")
            .push_back(Err(error));
    }

    /// Every `(start_inclusive, limit)` this source was asked for, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<(DateTime<Utc>, u32)> {
        self.calls.lock().expect("mutex poisoned").clone()
    }
}

#[async_trait]
impl KlineSource for ScriptedSource {
    fn name(&self) -> &'static str {
        self.name
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
        self.max_page_size
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
        self.calls
            .lock()
            .expect("mutex poisoned")
            .push((start_inclusive, limit));
        match self.script.lock().expect("mutex poisoned").pop_front() {
            Some(scripted) => scripted,
            None => Ok(vec![]),
        }
    }
}

/// Manually driven [`Clock`] for deterministic horizon decisions.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Clock frozen at `now`.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Jump to an absolute instant.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().expect("mutex poisoned") = now;
    }

    /// Advance by a delta.
    pub fn advance(&self, by: TimeDelta) {
        let mut now = self.now.lock().expect("mutex poisoned");
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("mutex poisoned")
    }
}

/// In-memory [`CheckpointStore`] that round-trips values through the stored
/// text form, so tests exercise the same minute-exact truncation as a real
/// store.
#[derive(Default)]
pub struct MemoryCheckpointStore {
    entries: Mutex<HashMap<SessionKey, String>>,
}

impl MemoryCheckpointStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored text for `key`, if any.
    #[must_use]
    pub fn raw(&self, key: &SessionKey) -> Option<String> {
        self.entries.lock().expect("mutex poisoned").get(key).cloned()
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn read(&self, key: &SessionKey) -> Result<Option<DateTime<Utc>>, SyncError> {
        let stored = self.entries.lock().expect("mutex poisoned").get(key).cloned();
        stored.map(|s| parse_checkpoint(&s)).transpose()
    }

    async fn write(&self, key: &SessionKey, at: DateTime<Utc>) -> Result<(), SyncError> {
        self.entries
            .lock()
            .expect("mutex poisoned")
            .insert(key.clone(), format_checkpoint(at));
        Ok(())
    }
}

/// [`CandleSink`] that collects every append for later assertions.
#[derive(Default)]
pub struct VecSink {
    appended: Mutex<Vec<(SessionKey, Vec<Candle>)>>,
}

impl VecSink {
    /// Empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(key, candles)` append observed so far, in order.
    #[must_use]
    pub fn appended(&self) -> Vec<(SessionKey, Vec<Candle>)> {
        self.appended.lock().expect("mutex poisoned").clone()
    }
}

#[async_trait]
impl CandleSink for VecSink {
    async fn append(&self, key: &SessionKey, candles: &[Candle]) -> Result<(), SyncError> {
        self.appended
            .lock()
            .expect("mutex poisoned")
            .push((key.clone(), candles.to_vec()));
        Ok(())
    }
}
