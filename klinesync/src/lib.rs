//! klinesync
//!
//! Incremental kline (candlestick) history synchronization across exchange
//! sources. The [`Updater`] resolves configured connections through a static
//! [`SourceRegistry`], runs one independent sync session per
//! `(source, symbol, interval)`, and persists a resumable checkpoint after
//! every accepted page through an injected [`CheckpointStore`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use klinesync::{ConnectionConfig, Updater};
//! # async fn demo(store: Arc<dyn klinesync::CheckpointStore>, sink: Arc<dyn klinesync::CandleSink>) -> Result<(), klinesync::SyncError> {
//! let updater = Updater::builder()
//!     .connection(ConnectionConfig {
//!         name: "binance".into(),
//!         host: None,
//!         history_symbols: vec!["BTCUSDT".into()],
//!         history_intervals: vec!["15m".parse()?],
//!     })
//!     .checkpoint_store(store)
//!     .sink(sink)
//!     .build()?;
//! let reports = updater.run().await;
//! # let _ = reports;
//! # Ok(())
//! # }
//! ```
#![warn(missing_docs)]

/// Connection configuration types.
pub mod config;
/// Static provider-name to source-factory registry.
pub mod registry;
/// The session-fanning history updater.
pub mod updater;

pub use config::ConnectionConfig;
pub use registry::{SourceFactory, SourceRegistry};
pub use updater::{SessionReport, SessionSummary, Updater, UpdaterBuilder};

pub use klinesync_core::{
    Candle, CandleSink, CheckpointStore, Clock, GapPolicy, Interval, KlineSource, LocatorPolicy,
    RetryPolicy, SessionKey, SyncError, SyncPolicy, SystemClock,
};
