use chartwell_core::timeseries::cutoff::{apply_cutoff, cutoff_threshold};
use chartwell_core::{Granularity, Point, RangePolicy, TimeRange};
use chrono::{DateTime, TimeDelta, Utc};
use proptest::prelude::*;

fn t(sec: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(sec, 0).unwrap()
}

const NOW: i64 = 1_700_000_000;

fn arb_point() -> impl Strategy<Value = Point> {
    (
        (NOW - 400_000_000)..(NOW + 86_400),
        prop_oneof![
            9 => (0.0f64..10_000.0),
            1 => Just(f64::NAN),
            1 => Just(f64::INFINITY),
        ],
        prop::bool::ANY,
    )
        .prop_map(|(ts, price, intraday)| Point {
            ts: t(ts),
            price,
            granularity: if intraday {
                Granularity::Intraday
            } else {
                Granularity::Daily
            },
        })
}

proptest! {
    #[test]
    fn retained_points_respect_cutoff_and_are_sorted(
        points in proptest::collection::vec(arb_point(), 0..300),
        range in prop::sample::select(TimeRange::ALL.to_vec()),
    ) {
        let policy = RangePolicy::for_range(range);
        let out = apply_cutoff(&points, policy.cutoff, t(NOW));
        let threshold = t(NOW) - policy.cutoff;

        for p in &out.points {
            prop_assert!(p.ts >= threshold);
            prop_assert!(p.price.is_finite());
        }
        for w in out.points.windows(2) {
            prop_assert!(w[0].ts <= w[1].ts);
        }

        let malformed = points.iter().filter(|p| !p.price.is_finite()).count();
        prop_assert_eq!(out.malformed, malformed);
        let expected = points
            .iter()
            .filter(|p| p.price.is_finite() && p.ts >= threshold)
            .count();
        prop_assert_eq!(out.points.len(), expected);
    }
}

#[test]
fn empty_input_is_empty_output() {
    let out = apply_cutoff(&[], TimeDelta::days(1), t(NOW));
    assert!(out.points.is_empty());
    assert_eq!(out.malformed, 0);
}

#[test]
fn everything_too_old_is_empty_not_error() {
    let pts = vec![Point::daily(t(0), 1.0), Point::daily(t(86_400), 2.0)];
    let out = apply_cutoff(&pts, TimeDelta::days(1), t(NOW));
    assert!(out.points.is_empty());
}

#[test]
fn boundary_point_is_kept() {
    let cutoff = TimeDelta::hours(24);
    let pts = vec![
        Point::intraday(t(NOW - 86_400), 1.0),
        Point::intraday(t(NOW - 86_401), 2.0),
    ];
    let out = apply_cutoff(&pts, cutoff, t(NOW));
    assert_eq!(out.points.len(), 1);
    assert_eq!(out.points[0].price, 1.0);
}

#[test]
fn sort_is_stable_for_equal_timestamps() {
    let pts = vec![
        Point::intraday(t(NOW - 10), 3.0),
        Point::intraday(t(NOW - 20), 1.0),
        Point::intraday(t(NOW - 10), 4.0),
    ];
    let out = apply_cutoff(&pts, TimeDelta::hours(1), t(NOW));
    let prices: Vec<f64> = out.points.iter().map(|p| p.price).collect();
    assert_eq!(prices, vec![1.0, 3.0, 4.0]);
}

#[test]
fn huge_cutoff_saturates() {
    assert_eq!(
        cutoff_threshold(t(NOW), TimeDelta::MAX),
        DateTime::<Utc>::MIN_UTC
    );
}
