//! The incremental synchronization engine.
//!
//! Modules include:
//! - `continuity`: exact interval-spacing validation within and across pages
//! - `retry`: bounded identical re-fetch of rejected pages
//! - `driver`: the pagination loop and its resumable cursor
//! - `locator`: coarse probing for the earliest available kline
/// Continuity validation for pages of candles.
pub mod continuity;
/// The pagination driver and session state machine.
pub mod driver;
/// Earliest-point probing used to seed from-scratch syncs.
pub mod locator;
/// Bounded retry policy and per-page retry state.
pub mod retry;
