mod common;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::TimeDelta;
use common::{page, t0, FrozenClock, ScriptedSource};
use klinesync_core::{Candle, Clock, CursorMode, Interval, KlineSource, SyncPolicy, SyncSession};

fn session(
    source: &Arc<ScriptedSource>,
    clock: Arc<dyn Clock>,
    interval: Interval,
) -> SyncSession {
    SyncSession::new(
        Arc::clone(source) as Arc<dyn KlineSource>,
        clock,
        "BTCUSDT",
        interval,
        SyncPolicy::default(),
    )
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn close_anchored_advance_requests_the_next_bar_exactly() {
    let source = Arc::new(ScriptedSource::new());
    source.push_page(page(t0(), Interval::M5, 5));

    let clock = Arc::new(FrozenClock(t0() + TimeDelta::hours(2)));
    let outcome = session(&source, clock, Interval::M5).run(t0()).await;
    assert!(outcome.termination.is_drained());

    let calls = source.calls();
    assert_eq!(calls.len(), 2);
    // Last accepted bar closes at 25:00 minus 1 ms; the next request starts
    // exactly at 25:00.
    assert_eq!(calls[1].0, t0() + TimeDelta::minutes(25));
}

#[tokio::test(start_paused = true)]
async fn open_anchored_advance_works_without_close_times() {
    let source = Arc::new(ScriptedSource::new().with_cursor_mode(CursorMode::OpenPlusInterval));
    let open_only: Vec<Candle> = page(t0(), Interval::M5, 4)
        .into_iter()
        .map(|mut c| {
            c.close_time = None;
            c
        })
        .collect();
    source.push_page(open_only);

    let clock = Arc::new(FrozenClock(t0() + TimeDelta::hours(2)));
    let outcome = session(&source, clock, Interval::M5).run(t0()).await;
    assert!(outcome.termination.is_drained());

    let calls = source.calls();
    assert_eq!(calls.len(), 2);
    // Last accepted bar opened at minute 15; the next request starts one
    // interval later.
    assert_eq!(calls[1].0, t0() + TimeDelta::minutes(20));
    // Checkpoint is derived from the open time in the absence of a close.
    assert_eq!(outcome.checkpoint, Some(t0() + TimeDelta::minutes(20)));
}

#[tokio::test(start_paused = true)]
async fn advance_is_anchored_to_the_accepted_tail_not_the_request_window() {
    let source = Arc::new(ScriptedSource::new());
    // The provider returns fewer bars than the page size hint.
    source.push_page(page(t0(), Interval::M5, 2));

    let clock = Arc::new(FrozenClock(t0() + TimeDelta::hours(2)));
    let outcome = session(&source, clock, Interval::M5).run(t0()).await;
    assert!(outcome.termination.is_drained());

    let calls = source.calls();
    // Short page: next start follows the 2nd bar, not the 500-bar window.
    assert_eq!(calls[1].0, t0() + TimeDelta::minutes(10));
    assert_eq!(outcome.candles.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn rerun_from_prior_checkpoint_yields_disjoint_records() {
    let interval = Interval::M5;
    let clock = Arc::new(FrozenClock(t0() + TimeDelta::hours(2)));

    let first_source = Arc::new(ScriptedSource::new());
    first_source.push_page(page(t0(), interval, 6));
    let first = session(&first_source, Arc::clone(&clock) as Arc<dyn Clock>, interval)
        .run(t0())
        .await;
    let checkpoint = first.checkpoint.expect("first run accepted a page");

    // Resume exactly from the persisted checkpoint; the provider serves
    // whatever exists at or after it.
    let second_source = Arc::new(ScriptedSource::new());
    second_source.push_page(page(t0() + TimeDelta::minutes(30), interval, 6));
    let second = session(&second_source, Arc::clone(&clock) as Arc<dyn Clock>, interval)
        .run(checkpoint)
        .await;

    let first_opens: HashSet<_> = first.candles.iter().map(|c| c.open_time).collect();
    let overlap = second
        .candles
        .iter()
        .filter(|c| first_opens.contains(&c.open_time))
        .count();
    assert_eq!(overlap, 0);
    assert_eq!(second.candles.len(), 6);

    // And the resumed run starts fetching at the checkpoint, not before.
    assert_eq!(second_source.calls()[0].0, checkpoint);

    let mut all: Vec<_> = first
        .candles
        .iter()
        .chain(second.candles.iter())
        .map(|c| c.open_time)
        .collect();
    let deduped: HashSet<_> = all.iter().copied().collect();
    assert_eq!(deduped.len(), all.len());
    all.sort();
    assert!(all.windows(2).all(|w| w[1] - w[0] == interval.duration()));
}
