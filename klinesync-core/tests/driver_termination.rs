mod common;

use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeDelta, Utc};
use common::{page, t0, FrozenClock, ScriptedSource};
use klinesync_core::{Clock, Interval, KlineSource, SyncError, SyncPolicy, SyncSession, Termination};

fn session(source: &Arc<ScriptedSource>, clock: Arc<dyn Clock>) -> SyncSession {
    SyncSession::new(
        Arc::clone(source) as Arc<dyn KlineSource>,
        clock,
        "BTCUSDT",
        Interval::M5,
        SyncPolicy::default(),
    )
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn empty_page_drains_keeping_prior_checkpoint() {
    let source = Arc::new(ScriptedSource::new());
    source.push_page(page(t0(), Interval::M5, 5));
    source.push_page(vec![]);

    let clock = Arc::new(FrozenClock(t0() + TimeDelta::hours(2)));
    let outcome = session(&source, clock).run(t0()).await;

    assert!(outcome.termination.is_drained());
    assert_eq!(outcome.candles.len(), 5);
    // Checkpoint is the close of the last accepted candle before the empty
    // window, untouched by the drain.
    assert_eq!(
        outcome.checkpoint,
        Some(t0() + TimeDelta::minutes(25) - TimeDelta::milliseconds(1))
    );
}

#[tokio::test(start_paused = true)]
async fn start_at_horizon_drains_without_fetching() {
    let source = Arc::new(ScriptedSource::new());
    source.push_page(page(t0(), Interval::M5, 5));

    let clock = Arc::new(FrozenClock(t0()));
    let outcome = session(&source, clock).run(t0()).await;

    assert!(outcome.termination.is_drained());
    assert!(outcome.candles.is_empty());
    assert_eq!(outcome.checkpoint, None);
    assert!(source.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn transport_failure_aborts_preserving_partial_progress() {
    let source = Arc::new(ScriptedSource::new());
    source.push_page(page(t0(), Interval::M5, 5));
    source.push_error(SyncError::transport("scripted", "status 502"));

    let clock = Arc::new(FrozenClock(t0() + TimeDelta::hours(2)));
    let outcome = session(&source, clock).run(t0()).await;

    assert!(matches!(
        outcome.termination,
        Termination::Aborted(SyncError::Transport { .. })
    ));
    assert_eq!(outcome.candles.len(), 5);
    assert_eq!(
        outcome.checkpoint,
        Some(t0() + TimeDelta::minutes(25) - TimeDelta::milliseconds(1))
    );
}

#[tokio::test(start_paused = true)]
async fn decode_failure_is_fatal_like_transport() {
    let source = Arc::new(ScriptedSource::new());
    source.push_error(SyncError::decode("scripted", "non-numeric volume"));

    let clock = Arc::new(FrozenClock(t0() + TimeDelta::hours(2)));
    let outcome = session(&source, clock).run(t0()).await;

    assert!(matches!(
        outcome.termination,
        Termination::Aborted(SyncError::Decode { .. })
    ));
    assert!(outcome.candles.is_empty());
    assert_eq!(outcome.checkpoint, None);
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_between_pages() {
    let source = Arc::new(ScriptedSource::new());
    source.push_page(page(t0(), Interval::M5, 5));

    let clock = Arc::new(FrozenClock(t0() + TimeDelta::hours(2)));
    let session = session(&source, clock);
    session.cancel_token().cancel();

    let outcome = session.run(t0()).await;
    assert!(matches!(outcome.termination, Termination::Cancelled));
    assert!(source.calls().is_empty());
}

/// Clock that moves forward every time it is read, like a long backfill
/// racing real time.
struct TickingClock {
    now: Mutex<DateTime<Utc>>,
    step: TimeDelta,
}

impl Clock for TickingClock {
    fn now(&self) -> DateTime<Utc> {
        let mut now = self.now.lock().unwrap();
        let current = *now;
        *now += self.step;
        current
    }
}

#[tokio::test(start_paused = true)]
async fn horizon_is_re_read_each_iteration_not_fixed_at_start() {
    let source = Arc::new(ScriptedSource::new());
    // Three pages of 25 minutes each.
    source.push_page(page(t0(), Interval::M5, 5));
    source.push_page(page(t0() + TimeDelta::minutes(25), Interval::M5, 5));
    source.push_page(page(t0() + TimeDelta::minutes(50), Interval::M5, 5));

    // Against the initial horizon alone the run would stop after two pages;
    // a moving "now" lets it converge through all three.
    let clock = Arc::new(TickingClock {
        now: Mutex::new(t0() + TimeDelta::minutes(30)),
        step: TimeDelta::minutes(30),
    });
    let outcome = session(&source, clock).run(t0()).await;

    assert!(outcome.termination.is_drained());
    assert_eq!(outcome.candles.len(), 15);
}
