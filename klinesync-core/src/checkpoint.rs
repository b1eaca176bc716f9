//! Resumable checkpoint keys, text form, and the injected store trait.

use core::fmt;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};

use crate::types::Interval;
use crate::SyncError;

/// Display-formatted checkpoint text form, exact to the minute.
pub const CHECKPOINT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Identity of one sync session: provider name plus symbol plus interval.
///
/// One checkpoint exists per key; sessions with distinct keys share no
/// mutable state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    /// Source name (e.g. `"binance"`).
    pub source: String,
    /// Trading symbol (e.g. `"BTCUSDT"`).
    pub symbol: String,
    /// Bar interval.
    pub interval: Interval,
}

impl SessionKey {
    /// Build a key from its parts.
    pub fn new(source: impl Into<String>, symbol: impl Into<String>, interval: Interval) -> Self {
        Self {
            source: source.into(),
            symbol: symbol.into(),
            interval,
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}-{}", self.source, self.symbol, self.interval)
    }
}

/// Render a checkpoint instant in its stored text form.
#[must_use]
pub fn format_checkpoint(at: DateTime<Utc>) -> String {
    at.format(CHECKPOINT_FORMAT).to_string()
}

/// Parse a stored checkpoint back into an instant.
///
/// Round-trip through [`format_checkpoint`] is exact to the minute.
///
/// # Errors
/// Returns [`SyncError::Storage`] when the text does not match the stored
/// form.
pub fn parse_checkpoint(s: &str) -> Result<DateTime<Utc>, SyncError> {
    let naive = NaiveDateTime::parse_from_str(s.trim(), CHECKPOINT_FORMAT)
        .map_err(|e| SyncError::storage(format!("malformed checkpoint {s:?}: {e}")))?;
    Ok(naive.and_utc())
}

/// Injected key-value store holding one checkpoint per [`SessionKey`].
///
/// The on-disk representation is a collaborator concern; implementations
/// only need to round-trip instants exactly to the minute.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Read the checkpoint for `key`, if one was ever written.
    async fn read(&self, key: &SessionKey) -> Result<Option<DateTime<Utc>>, SyncError>;

    /// Overwrite the checkpoint for `key`.
    async fn write(&self, key: &SessionKey, at: DateTime<Utc>) -> Result<(), SyncError>;
}
