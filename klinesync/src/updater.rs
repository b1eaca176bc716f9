//! The history updater: fans independent sync sessions out over every
//! configured `(source, symbol, interval)` and reports per-session results.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use klinesync_core::{
    locate_earliest, CancelToken, CandleSink, CheckpointStore, Clock, KlineSource, LocatorPolicy,
    SessionKey, SyncError, SyncOutcome, SyncPolicy, SyncSession, SystemClock, Termination,
};

use crate::config::ConnectionConfig;
use crate::registry::SourceRegistry;

/// One planned sync session.
struct SessionPlan {
    source: Arc<dyn KlineSource>,
    symbol: String,
    interval: klinesync_core::Interval,
}

/// What one session accomplished.
#[derive(Debug)]
pub struct SessionSummary {
    /// Candles accepted and appended to the sink.
    pub fetched: usize,
    /// Force-accepted continuity gaps recorded for audit.
    pub anomalies: usize,
    /// Final resumable checkpoint, if any page was accepted.
    pub checkpoint: Option<DateTime<Utc>>,
    /// Whether the session drained normally (as opposed to being cancelled).
    pub drained: bool,
}

/// Per-session report returned by [`Updater::run`].
#[derive(Debug)]
pub struct SessionReport {
    /// Which session this report covers.
    pub key: SessionKey,
    /// Summary, or the fatal error that ended the session. Either way the
    /// sink received whatever was accepted and the checkpoint reflects it.
    pub result: Result<SessionSummary, SyncError>,
}

/// Builder for the [`Updater`].
pub struct UpdaterBuilder {
    registry: SourceRegistry,
    connections: Vec<ConnectionConfig>,
    extra_sources: Vec<(Arc<dyn KlineSource>, Vec<String>, Vec<klinesync_core::Interval>)>,
    checkpoints: Option<Arc<dyn CheckpointStore>>,
    sink: Option<Arc<dyn CandleSink>>,
    clock: Arc<dyn Clock>,
    policy: SyncPolicy,
    locator: LocatorPolicy,
}

impl Default for UpdaterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdaterBuilder {
    /// Builder with the default registry, system clock, and policies.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: SourceRegistry::with_defaults(),
            connections: vec![],
            extra_sources: vec![],
            checkpoints: None,
            sink: None,
            clock: Arc::new(SystemClock),
            policy: SyncPolicy::default(),
            locator: LocatorPolicy::default(),
        }
    }

    /// Replace the source registry used to resolve connections.
    #[must_use]
    pub fn registry(mut self, registry: SourceRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Add a connection to resolve through the registry at build time.
    #[must_use]
    pub fn connection(mut self, config: ConnectionConfig) -> Self {
        self.connections.push(config);
        self
    }

    /// Add an already-constructed source with its symbols and intervals,
    /// bypassing the registry (used by tests and embedders).
    #[must_use]
    pub fn source(
        mut self,
        source: Arc<dyn KlineSource>,
        symbols: Vec<String>,
        intervals: Vec<klinesync_core::Interval>,
    ) -> Self {
        self.extra_sources.push((source, symbols, intervals));
        self
    }

    /// Set the injected checkpoint store (required).
    #[must_use]
    pub fn checkpoint_store(mut self, store: Arc<dyn CheckpointStore>) -> Self {
        self.checkpoints = Some(store);
        self
    }

    /// Set the injected candle sink (required).
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn CandleSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Replace the horizon clock (tests use a manual clock).
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Override sync tunables (retry ceiling, gap policy, page pause).
    #[must_use]
    pub fn sync_policy(mut self, policy: SyncPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Override the earliest-point probing bound.
    #[must_use]
    pub const fn locator_policy(mut self, policy: LocatorPolicy) -> Self {
        self.locator = policy;
        self
    }

    /// Resolve connections and finish building.
    ///
    /// # Errors
    /// - [`SyncError::InvalidArg`] when a checkpoint store or sink is
    ///   missing, or a connection names an unregistered source.
    pub fn build(self) -> Result<Updater, SyncError> {
        let checkpoints = self
            .checkpoints
            .ok_or_else(|| SyncError::InvalidArg("updater requires a checkpoint store".into()))?;
        let sink = self
            .sink
            .ok_or_else(|| SyncError::InvalidArg("updater requires a candle sink".into()))?;

        let mut plans = Vec::new();
        for config in &self.connections {
            let source = self.registry.build(config)?;
            for symbol in &config.history_symbols {
                for interval in config.intervals() {
                    plans.push(SessionPlan {
                        source: Arc::clone(&source),
                        symbol: symbol.clone(),
                        interval,
                    });
                }
            }
        }
        for (source, symbols, intervals) in self.extra_sources {
            for symbol in &symbols {
                for &interval in &intervals {
                    plans.push(SessionPlan {
                        source: Arc::clone(&source),
                        symbol: symbol.clone(),
                        interval,
                    });
                }
            }
        }

        Ok(Updater {
            plans,
            checkpoints,
            sink,
            clock: self.clock,
            policy: self.policy,
            locator: self.locator,
            cancel: CancelToken::new(),
        })
    }
}

/// Orchestrator that keeps exchange kline histories current.
///
/// Each `(source, symbol, interval)` runs as its own tokio task with its own
/// cursor, retry state, and checkpoint key; sessions share nothing mutable,
/// so one failing session never affects the others.
pub struct Updater {
    plans: Vec<SessionPlan>,
    checkpoints: Arc<dyn CheckpointStore>,
    sink: Arc<dyn CandleSink>,
    clock: Arc<dyn Clock>,
    policy: SyncPolicy,
    locator: LocatorPolicy,
    cancel: CancelToken,
}

impl Updater {
    /// Start building an updater.
    #[must_use]
    pub fn builder() -> UpdaterBuilder {
        UpdaterBuilder::new()
    }

    /// Token that cooperatively stops every session between pages.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run every planned session to completion concurrently and collect
    /// per-session reports, in plan order.
    pub async fn run(&self) -> Vec<SessionReport> {
        let mut handles = Vec::with_capacity(self.plans.len());
        for plan in &self.plans {
            let ctx = SessionContext {
                source: Arc::clone(&plan.source),
                symbol: plan.symbol.clone(),
                interval: plan.interval,
                checkpoints: Arc::clone(&self.checkpoints),
                sink: Arc::clone(&self.sink),
                clock: Arc::clone(&self.clock),
                policy: self.policy.clone(),
                locator: self.locator,
                cancel: self.cancel.clone(),
            };
            handles.push(tokio::spawn(ctx.run()));
        }

        let mut reports = Vec::with_capacity(handles.len());
        for (handle, plan) in handles.into_iter().zip(&self.plans) {
            let key = SessionKey::new(plan.source.name(), plan.symbol.clone(), plan.interval);
            match handle.await {
                Ok(report) => reports.push(report),
                Err(e) => reports.push(SessionReport {
                    key,
                    result: Err(SyncError::Other(format!("session task failed: {e}"))),
                }),
            }
        }
        reports
    }
}

struct SessionContext {
    source: Arc<dyn KlineSource>,
    symbol: String,
    interval: klinesync_core::Interval,
    checkpoints: Arc<dyn CheckpointStore>,
    sink: Arc<dyn CandleSink>,
    clock: Arc<dyn Clock>,
    policy: SyncPolicy,
    locator: LocatorPolicy,
    cancel: CancelToken,
}

impl SessionContext {
    async fn run(self) -> SessionReport {
        let key = SessionKey::new(self.source.name(), self.symbol.clone(), self.interval);
        let result = self.run_inner(&key).await;
        if let Err(e) = &result {
            tracing::error!(
                key = %key,
                error = %e,
                session_fatal = e.is_session_fatal(),
                "sync session failed"
            );
        }
        SessionReport { key, result }
    }

    async fn run_inner(&self, key: &SessionKey) -> Result<SessionSummary, SyncError> {
        // Seed from the persisted checkpoint; only a from-scratch sync pays
        // for earliest-point probing.
        let seed = match self.checkpoints.read(key).await? {
            Some(checkpoint) => checkpoint,
            None => {
                locate_earliest(
                    self.source.as_ref(),
                    &self.symbol,
                    self.interval,
                    self.locator,
                )
                .await?
            }
        };

        let session = SyncSession::new(
            Arc::clone(&self.source),
            Arc::clone(&self.clock),
            self.symbol.clone(),
            self.interval,
            self.policy.clone(),
        )?
        .with_cancel(self.cancel.clone());

        let SyncOutcome {
            candles,
            checkpoint,
            anomalies,
            termination,
        } = session.run(seed).await;

        // Sink and checkpoint reflect partial progress even for aborts.
        if !candles.is_empty() {
            self.sink.append(key, &candles).await?;
        }
        if let Some(at) = checkpoint {
            self.checkpoints.write(key, at).await?;
        }

        match termination {
            Termination::Drained => Ok(SessionSummary {
                fetched: candles.len(),
                anomalies: anomalies.len(),
                checkpoint,
                drained: true,
            }),
            Termination::Cancelled => Ok(SessionSummary {
                fetched: candles.len(),
                anomalies: anomalies.len(),
                checkpoint,
                drained: false,
            }),
            Termination::Aborted(e) => Err(e),
        }
    }
}
