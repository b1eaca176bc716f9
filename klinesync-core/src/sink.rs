use async_trait::async_trait;

use crate::checkpoint::SessionKey;
use crate::types::Candle;
use crate::SyncError;

/// Injected durable destination for accepted candles.
///
/// The sync engine calls [`append`](CandleSink::append) once per completed
/// or aborted session with the whole accumulated ordered sequence; the
/// storage format (CSV in the reference deployment) is a collaborator
/// concern.
#[async_trait]
pub trait CandleSink: Send + Sync {
    /// Append `candles` (ordered by `open_time` ascending) for `key`.
    async fn append(&self, key: &SessionKey, candles: &[Candle]) -> Result<(), SyncError>;
}
