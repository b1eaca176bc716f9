//! klinesync-core
//!
//! Core types, traits, and the incremental synchronization engine shared
//! across the klinesync ecosystem.
//!
//! - `types`: canonical candle/interval data model.
//! - `source`: the `KlineSource` trait implemented by exchange bindings.
//! - `sync`: continuity validation, bounded retry, the pagination driver,
//!   and the earliest-point locator.
//! - `checkpoint` / `sink`: injected collaborator traits for resumable
//!   checkpoints and durable candle storage.
//!
//! Async runtime (Tokio)
//! ---------------------
//! This crate assumes the Tokio ecosystem as the async runtime. The driver
//! paces pages and retries with `tokio::time::sleep`, so sessions must run
//! under a Tokio 1.x runtime (and tests can run them under a paused clock).
//!
#![warn(missing_docs)]

/// Cooperative cancellation checked between pages.
pub mod cancel;
/// Checkpoint keys, text form, and the injected store trait.
pub mod checkpoint;
/// Clock abstraction for the moving "now" horizon.
pub mod clock;
mod error;
/// Durable destination for accepted candles.
pub mod sink;
/// The `KlineSource` role trait implemented by exchange bindings.
pub mod source;
/// The synchronization engine: validation, retry, driver, locator.
pub mod sync;
pub mod types;

pub use cancel::CancelToken;
pub use checkpoint::{
    format_checkpoint, parse_checkpoint, CheckpointStore, SessionKey, CHECKPOINT_FORMAT,
};
pub use clock::{Clock, SystemClock};
pub use error::SyncError;
pub use sink::CandleSink;
pub use source::KlineSource;
pub use sync::continuity::{check_page, is_continuous, ContinuityBreak};
pub use sync::driver::{GapAnomaly, SyncOutcome, SyncPolicy, SyncSession, Termination};
pub use sync::locator::{locate_earliest, LocatorPolicy};
pub use sync::retry::{GapPolicy, RetryDecision, RetryPolicy, RetryState};
pub use types::{Candle, CursorMode, Interval};
