//! Static source registry resolved at startup.
//!
//! Maps a provider identifier from configuration to a factory over the
//! shared [`KlineSource`] capability interface. Registration is explicit
//! and compile-time checked; there is no lookup of loader implementations
//! by runtime name mangling.

use std::collections::HashMap;
use std::sync::Arc;

use klinesync_binance::BinanceSource;
use klinesync_bybit::BybitSource;
use klinesync_core::{KlineSource, SyncError};

use crate::config::ConnectionConfig;

/// Factory constructing a source from one connection's configuration.
pub type SourceFactory = fn(&ConnectionConfig) -> Result<Arc<dyn KlineSource>, SyncError>;

/// Registry of known source factories, keyed by provider identifier.
pub struct SourceRegistry {
    factories: HashMap<&'static str, SourceFactory>,
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl SourceRegistry {
    /// Empty registry; register factories explicitly.
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry pre-populated with the bundled exchange bindings.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(klinesync_binance::SOURCE_NAME, binance_factory);
        registry.register(klinesync_bybit::SOURCE_NAME, bybit_factory);
        registry
    }

    /// Register (or replace) a factory for `name`.
    pub fn register(&mut self, name: &'static str, factory: SourceFactory) {
        self.factories.insert(name, factory);
    }

    /// Construct the source a connection refers to.
    ///
    /// # Errors
    /// Returns [`SyncError::InvalidArg`] for an unregistered provider name,
    /// or whatever the factory itself fails with.
    pub fn build(&self, config: &ConnectionConfig) -> Result<Arc<dyn KlineSource>, SyncError> {
        let factory = self.factories.get(config.name.as_str()).ok_or_else(|| {
            SyncError::InvalidArg(format!("no source registered for {:?}", config.name))
        })?;
        factory(config)
    }
}

fn binance_factory(config: &ConnectionConfig) -> Result<Arc<dyn KlineSource>, SyncError> {
    let mut builder = BinanceSource::builder();
    if let Some(host) = &config.host {
        builder = builder.host(host);
    }
    Ok(Arc::new(builder.build()))
}

fn bybit_factory(config: &ConnectionConfig) -> Result<Arc<dyn KlineSource>, SyncError> {
    let mut builder = BybitSource::builder();
    if let Some(host) = &config.host {
        builder = builder.host(host);
    }
    Ok(Arc::new(builder.build()))
}
