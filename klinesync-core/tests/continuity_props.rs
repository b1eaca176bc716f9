mod common;

use chrono::TimeDelta;
use common::{page, t0};
use klinesync_core::{check_page, is_continuous, Interval};
use proptest::prelude::*;

const INTERVALS: &[Interval] = &[
    Interval::M1,
    Interval::M3,
    Interval::M5,
    Interval::M15,
    Interval::M30,
    Interval::H1,
];

proptest! {
    #[test]
    fn exactly_spaced_pages_always_validate(
        interval_idx in 0usize..INTERVALS.len(),
        n in 1usize..200,
        start_offset_minutes in 0i64..1_000_000,
    ) {
        let interval = INTERVALS[interval_idx];
        let start = t0() + TimeDelta::minutes(start_offset_minutes);
        let p = page(start, interval, n);
        prop_assert!(is_continuous(&p, interval));
    }

    #[test]
    fn any_single_displacement_fails_validation(
        interval_idx in 0usize..INTERVALS.len(),
        n in 2usize..100,
        victim in any::<prop::sample::Index>(),
        shift_ms in prop_oneof![-100_000i64..0, 1i64..100_000],
    ) {
        let interval = INTERVALS[interval_idx];
        let mut p = page(t0(), interval, n);
        let i = victim.index(n);
        p[i].open_time += TimeDelta::milliseconds(shift_ms);
        prop_assert!(!is_continuous(&p, interval));
    }

    #[test]
    fn split_of_a_continuous_series_joins_across_the_boundary(
        interval_idx in 0usize..INTERVALS.len(),
        n in 2usize..100,
        cut in any::<prop::sample::Index>(),
    ) {
        let interval = INTERVALS[interval_idx];
        let p = page(t0(), interval, n);
        let cut = 1 + cut.index(n - 1);
        let (head, tail) = p.split_at(cut);
        let prev = head.last();
        prop_assert!(check_page(tail, prev, interval).is_ok());
    }
}
