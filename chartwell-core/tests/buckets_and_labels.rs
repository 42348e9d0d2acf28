use chartwell_core::dataset::{color_for_position, format_label};
use chartwell_core::timeseries::bucket::{bucket_start, bucketize};
use chartwell_core::{
    BucketUnit, GranularityPreference, Point, PolicyOverride, RangePolicy, TimeRange,
};
use chartwell_types::DEFAULT_PALETTE;
use chrono::{TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

#[test]
fn policy_table_rows() {
    let d1 = RangePolicy::for_range(TimeRange::D1);
    assert_eq!(d1.cutoff, TimeDelta::hours(24));
    assert_eq!(d1.preference, GranularityPreference::IntradayOnly);
    assert_eq!(d1.bucket, BucketUnit::Minute);

    let d7 = RangePolicy::for_range(TimeRange::D7);
    assert_eq!(d7.preference, GranularityPreference::MostRecent);
    assert_eq!(d7.bucket, BucketUnit::Hour);

    for r in [TimeRange::D30, TimeRange::Y1, TimeRange::Y5] {
        let p = RangePolicy::for_range(r);
        assert_eq!(p.preference, GranularityPreference::Daily);
        assert_eq!(p.bucket, BucketUnit::Day);
    }
    assert_eq!(RangePolicy::for_range(TimeRange::Y5).cutoff, TimeDelta::days(1825));
    assert_eq!(RangePolicy::for_range(TimeRange::Y5).point_budget, 260);
}

#[test]
fn overrides_only_touch_their_range() {
    let overrides = [PolicyOverride {
        range: TimeRange::D7,
        cutoff_secs: Some(3_600),
        point_budget: Some(12),
    }];
    let d7 = RangePolicy::with_overrides(TimeRange::D7, &overrides);
    assert_eq!(d7.cutoff, TimeDelta::hours(1));
    assert_eq!(d7.point_budget, 12);
    assert_eq!(d7.bucket, BucketUnit::Hour);

    let d30 = RangePolicy::with_overrides(TimeRange::D30, &overrides);
    assert_eq!(d30, RangePolicy::for_range(TimeRange::D30));
}

#[test]
fn hour_buckets_split_repeated_dst_hour() {
    let tz = chrono_tz::America::New_York;
    // 2024-11-03 01:30 occurs twice in New York: 05:30Z (EDT) and 06:30Z (EST).
    let first = Utc.with_ymd_and_hms(2024, 11, 3, 5, 30, 0).unwrap();
    let second = Utc.with_ymd_and_hms(2024, 11, 3, 6, 30, 0).unwrap();

    let a = bucket_start(first, BucketUnit::Hour, tz).unwrap();
    let b = bucket_start(second, BucketUnit::Hour, tz).unwrap();
    assert_eq!(a, Utc.with_ymd_and_hms(2024, 11, 3, 5, 0, 0).unwrap());
    assert_eq!(b, Utc.with_ymd_and_hms(2024, 11, 3, 6, 0, 0).unwrap());
}

#[test]
fn day_bucket_follows_local_calendar() {
    let tz = chrono_tz::Asia::Tokyo;
    let ts = Utc.with_ymd_and_hms(2024, 1, 1, 16, 0, 0).unwrap();
    let slot = bucket_start(ts, BucketUnit::Day, tz).unwrap();
    // 01:00 on Jan 2 in Tokyo, so the bucket is Tokyo midnight of Jan 2.
    assert_eq!(slot, Utc.with_ymd_and_hms(2024, 1, 1, 15, 0, 0).unwrap());
}

#[test]
fn minute_buckets_keep_latest_tick() {
    let base = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap();
    let points: Vec<Point> = (0..20)
        .map(|i| Point::intraday(base + TimeDelta::seconds(i * 10), i as f64))
        .collect();
    let policy = RangePolicy::for_range(TimeRange::D1);
    let out = bucketize(&points, &policy, Tz::UTC, 10);

    assert!(!out.intraday_fallback);
    assert_eq!(out.points.len(), 4);
    assert_eq!(out.points[0].slot, base);
    assert_eq!(out.points[0].point.price, 5.0);
    assert_eq!(out.points[3].point.price, 19.0);
}

#[test]
fn intraday_only_with_no_daily_points_never_falls_back() {
    let base = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap();
    let points = vec![Point::intraday(base, 1.0)];
    let policy = RangePolicy::for_range(TimeRange::D1);
    let out = bucketize(&points, &policy, Tz::UTC, 10);
    assert!(!out.intraday_fallback);
    assert_eq!(out.points.len(), 1);
}

#[test]
fn labels_per_range_in_display_timezone() {
    let ts = Utc.with_ymd_and_hms(2024, 7, 4, 20, 0, 0).unwrap();
    let tz = chrono_tz::America::Los_Angeles;
    assert_eq!(format_label(ts, TimeRange::D1, tz), "13:00");
    assert_eq!(format_label(ts, TimeRange::D7, tz), "Thu 13:00");
    assert_eq!(format_label(ts, TimeRange::Y1, tz), "Jul 4");
    assert_eq!(format_label(ts, TimeRange::Y5, tz), "Jul 2024");
}

#[test]
fn palette_then_generated_colors() {
    let palette: Vec<String> = DEFAULT_PALETTE.iter().map(|c| (*c).to_string()).collect();
    assert_eq!(color_for_position(0, &palette), DEFAULT_PALETTE[0]);
    assert_eq!(
        color_for_position(palette.len() - 1, &palette),
        DEFAULT_PALETTE[DEFAULT_PALETTE.len() - 1]
    );

    let extra: Vec<String> = (palette.len()..palette.len() + 8)
        .map(|i| color_for_position(i, &palette))
        .collect();
    for c in &extra {
        assert_eq!(c.len(), 7);
        assert!(c.starts_with('#'));
        assert!(c[1..].chars().all(|ch| ch.is_ascii_hexdigit()));
    }
    let unique: std::collections::HashSet<&String> = extra.iter().collect();
    assert_eq!(unique.len(), extra.len());
    assert_eq!(color_for_position(12, &palette), color_for_position(12, &palette));
}

#[test]
fn empty_palette_still_colors() {
    let c = color_for_position(0, &[]);
    assert!(c.starts_with('#'));
}
