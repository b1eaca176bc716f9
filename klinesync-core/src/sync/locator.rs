use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::source::KlineSource;
use crate::types::Interval;
use crate::SyncError;

/// Bound on earliest-point probing.
///
/// The default allows a 30-day probe step to cover roughly ten years of
/// empty history before giving up on a symbol the provider will never serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorPolicy {
    /// Maximum number of coarse probe steps before
    /// [`SyncError::LocatorExhausted`].
    pub max_probes: u32,
}

impl Default for LocatorPolicy {
    fn default() -> Self {
        Self { max_probes: 128 }
    }
}

/// Discover the first instant for which the provider has any data, used to
/// seed a from-scratch sync when no checkpoint exists.
///
/// Starting at the source's bootstrap anchor, requests a single-record page;
/// on an empty response, advances the anchor by the source's coarse probe
/// step and tries again. Returns the first non-empty response's `open_time`.
///
/// # Errors
/// - [`SyncError::LocatorExhausted`] after `max_probes` empty responses.
/// - [`SyncError::Transport`] / [`SyncError::Decode`] from the source are
///   propagated as-is.
pub async fn locate_earliest(
    source: &dyn KlineSource,
    symbol: &str,
    interval: Interval,
    policy: LocatorPolicy,
) -> Result<DateTime<Utc>, SyncError> {
    let mut anchor = source.bootstrap_anchor();
    let step = source.probe_step();

    for _ in 0..policy.max_probes {
        let page = source.fetch_page(symbol, interval, anchor, 1).await?;
        if let Some(first) = page.first() {
            tracing::info!(
                source = source.name(),
                symbol,
                earliest = %first.open_time,
                "found earliest available kline"
            );
            return Ok(first.open_time);
        }
        anchor += step;
    }

    Err(SyncError::LocatorExhausted {
        symbol: symbol.to_string(),
        probes: policy.max_probes,
    })
}
