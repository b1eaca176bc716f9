//! Connection configuration threaded explicitly through construction.

use klinesync_core::Interval;
use serde::{Deserialize, Serialize};

/// One exchange connection: which provider to talk to and which symbol and
/// interval histories to keep in sync.
///
/// An explicit value handed to the [`UpdaterBuilder`](crate::UpdaterBuilder);
/// there is no process-wide configuration state. Loading this from a JSON
/// file is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Registered source name (e.g. `"binance"`, `"bybit"`).
    pub name: String,
    /// API host override; each source falls back to its production host.
    #[serde(default)]
    pub host: Option<String>,
    /// Symbols to sync history for. A connection may legitimately want no
    /// history at all.
    #[serde(default)]
    pub history_symbols: Vec<String>,
    /// Intervals to sync per symbol; defaults to five minutes when empty.
    #[serde(default)]
    pub history_intervals: Vec<Interval>,
}

impl ConnectionConfig {
    /// Intervals to sync, applying the five-minute default.
    #[must_use]
    pub fn intervals(&self) -> Vec<Interval> {
        if self.history_intervals.is_empty() {
            vec![Interval::M5]
        } else {
            self.history_intervals.clone()
        }
    }
}
