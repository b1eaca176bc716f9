use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::types::Interval;

/// Unified error type for the klinesync workspace.
///
/// Fatal variants terminate the current sync session only; other concurrent
/// sessions are unaffected. Partial progress up to the last accepted page is
/// always preserved through the session's exposed checkpoint.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The interval is not in the source's supported set. Raised at session
    /// construction, never per call.
    #[error("{provider} does not support interval {interval}")]
    UnsupportedInterval {
        /// Source name that rejected the interval.
        provider: String,
        /// The unsupported interval.
        interval: Interval,
    },

    /// A non-success HTTP status or transport failure from a source.
    #[error("{provider} transport failure: {msg}")]
    Transport {
        /// Source name that failed.
        provider: String,
        /// Human-readable failure message (status, body excerpt, ...).
        msg: String,
    },

    /// A provider row could not be mapped into a [`Candle`](crate::Candle).
    #[error("{provider} returned malformed data: {msg}")]
    Decode {
        /// Source name whose response failed to decode.
        provider: String,
        /// What failed to parse.
        msg: String,
    },

    /// A continuity gap persisted past the retry ceiling while the session
    /// was configured to abort rather than force-accept.
    #[error("continuity gap at {window_start} persisted after {retries} retries")]
    ContinuityGap {
        /// Start of the page window that kept failing validation.
        window_start: DateTime<Utc>,
        /// Number of rejected re-fetches before giving up.
        retries: u32,
    },

    /// The earliest-point locator ran out of probes without ever seeing data.
    #[error("no data found for {symbol} after {probes} probes")]
    LocatorExhausted {
        /// Symbol that never returned data.
        symbol: String,
        /// Number of coarse probe steps attempted.
        probes: u32,
    },

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// A checkpoint store or sink collaborator failed.
    #[error("storage failure: {0}")]
    Storage(String),

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl SyncError {
    /// Helper: build an `UnsupportedInterval` error.
    pub fn unsupported_interval(provider: impl Into<String>, interval: Interval) -> Self {
        Self::UnsupportedInterval {
            provider: provider.into(),
            interval,
        }
    }

    /// Helper: build a `Transport` error with the provider name and message.
    pub fn transport(provider: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Transport {
            provider: provider.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `Decode` error with the provider name and message.
    pub fn decode(provider: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Decode {
            provider: provider.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `Storage` error from a collaborator failure.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// True for errors that abort a running session (transport/decode and
    /// strict-mode continuity gaps), as opposed to construction-time or
    /// bootstrap failures.
    #[must_use]
    pub const fn is_session_fatal(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Decode { .. } | Self::ContinuityGap { .. }
        )
    }
}
