use chartwell_core::{
    ChartData, Engine, EngineConfig, Granularity, Point, SymbolSeries, TimeRange,
};
use chrono::{DateTime, TimeZone, Utc};

fn at(y: i32, m: u32, d: u32, hh: u32, mm: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, hh, mm, 0).unwrap()
}

fn day(d: u32) -> DateTime<Utc> {
    at(2024, 1, d, 0, 0)
}

#[test]
fn daily_close_wins_over_intraday_tick_for_30d() {
    let series = SymbolSeries::new(
        "AAPL",
        vec![
            Point::daily(day(1), 10.0),
            Point::intraday(at(2024, 1, 1, 14, 30), 11.0),
        ],
    );
    let out = Engine::default().compute(&[series], TimeRange::D30, &["AAPL"], day(15));

    assert_eq!(out.data.labels, vec!["Jan 1"]);
    assert_eq!(out.data.datasets.len(), 1);
    assert_eq!(out.data.datasets[0].values, vec![Some(10.0)]);
    assert_eq!(out.data.raw_axis, vec![day(1)]);
}

#[test]
fn daily_close_wins_even_when_it_arrives_first_in_sorted_order() {
    // The intraday tick is later in the day but must not displace the close.
    let series = SymbolSeries::new(
        "AAPL",
        vec![
            Point::intraday(at(2024, 1, 1, 14, 30), 11.0),
            Point::daily(day(1), 10.0),
            Point::intraday(at(2024, 1, 1, 15, 30), 12.0),
        ],
    );
    let out = Engine::default().compute(&[series], TimeRange::Y1, &["AAPL"], day(15));
    assert_eq!(out.data.datasets[0].values, vec![Some(10.0)]);
}

#[test]
fn missing_day_becomes_a_gap() {
    let aapl = SymbolSeries::new(
        "AAPL",
        vec![
            Point::daily(day(1), 1.0),
            Point::daily(day(2), 2.0),
            Point::daily(day(3), 3.0),
        ],
    );
    let msft = SymbolSeries::new(
        "MSFT",
        vec![Point::daily(day(1), 10.0), Point::daily(day(3), 30.0)],
    );
    let out = Engine::default().compute(
        &[aapl, msft],
        TimeRange::D30,
        &["AAPL", "MSFT"],
        day(20),
    );

    assert_eq!(out.data.labels.len(), 3);
    assert_eq!(
        out.data.datasets[0].values,
        vec![Some(1.0), Some(2.0), Some(3.0)]
    );
    assert_eq!(
        out.data.datasets[1].values,
        vec![Some(10.0), None, Some(30.0)]
    );

    let json = serde_json::to_value(&out.data).unwrap();
    assert_eq!(json["datasets"][1]["values"][1], serde_json::Value::Null);
}

#[test]
fn five_year_budget_keeps_first_and_last_dates() {
    let start = at(2020, 1, 1, 0, 0);
    let points: Vec<Point> = (0..1000)
        .map(|i| Point::daily(start + chrono::TimeDelta::days(i), f64::from(i as i32)))
        .collect();
    let first = points[0].ts;
    let last = points[999].ts;
    let now = last + chrono::TimeDelta::days(1);

    let series = SymbolSeries::new("SPY", points);
    let out = Engine::default().compute(&[series], TimeRange::Y5, &["SPY"], now);

    let len = out.data.raw_axis.len();
    let stride = 1000usize.div_ceil(260);
    assert!(len <= 260);
    assert_eq!(len, 1000usize.div_ceil(stride));
    assert_eq!(out.data.raw_axis.first(), Some(&first));
    assert_eq!(out.data.raw_axis.last(), Some(&last));
    assert_eq!(out.diagnostics.symbols[0].after_bucketing, 1000);
    assert_eq!(out.diagnostics.symbols[0].after_downsampling, len);
}

#[test]
fn empty_selection_is_an_empty_chart() {
    let aapl = SymbolSeries::new("AAPL", vec![Point::daily(day(1), 1.0)]);
    let none: [&str; 0] = [];
    let out = Engine::default().compute(&[aapl], TimeRange::D30, &none, day(2));

    assert!(out.data.is_empty());
    assert_eq!(out.data, ChartData::default());
    let json = serde_json::to_value(&out.data).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "labels": [], "datasets": [], "rawAxis": [] })
    );
}

#[test]
fn one_day_uses_intraday_ticks_when_enough_exist() {
    let now = at(2024, 3, 5, 16, 0);
    let mut points: Vec<Point> = (0..30)
        .map(|i| Point::intraday(at(2024, 3, 5, 9, 30) + chrono::TimeDelta::minutes(i), 100.0 + i as f64))
        .collect();
    points.push(Point::daily(at(2024, 3, 5, 0, 0), 1.0));

    let series = SymbolSeries::new("AAPL", points);
    let out = Engine::default().compute(&[series], TimeRange::D1, &["AAPL"], now);

    assert_eq!(out.data.labels.len(), 30);
    assert_eq!(out.data.labels[0], "09:30");
    assert!(!out.diagnostics.symbols[0].intraday_fallback);
    assert!(!out.data.datasets[0].values.contains(&Some(1.0)));
}

#[test]
fn one_day_falls_back_when_intraday_is_sparse() {
    let now = at(2024, 3, 5, 16, 0);
    let series = SymbolSeries::new(
        "AAPL",
        vec![
            Point::daily(at(2024, 3, 5, 0, 0), 1.0),
            Point::intraday(at(2024, 3, 5, 10, 0), 2.0),
        ],
    );
    let out = Engine::default().compute(&[series], TimeRange::D1, &["AAPL"], now);

    assert!(out.diagnostics.symbols[0].intraday_fallback);
    assert_eq!(out.data.datasets[0].values, vec![Some(1.0), Some(2.0)]);
}

#[test]
fn seven_day_most_recent_point_wins_within_hour() {
    let now = at(2024, 3, 8, 0, 0);
    let series = SymbolSeries::new(
        "AAPL",
        vec![
            Point::intraday(at(2024, 3, 5, 10, 5), 1.0),
            Point::daily(at(2024, 3, 5, 10, 0), 9.0),
            Point::intraday(at(2024, 3, 5, 10, 45), 2.0),
        ],
    );
    let out = Engine::default().compute(&[series], TimeRange::D7, &["AAPL"], now);

    assert_eq!(out.data.labels, vec!["Tue 10:00"]);
    assert_eq!(out.data.datasets[0].values, vec![Some(2.0)]);
}

#[test]
fn equal_timestamps_resolve_to_later_input() {
    let ts = at(2024, 3, 5, 10, 30);
    let series = SymbolSeries::new(
        "AAPL",
        vec![Point::intraday(ts, 1.0), Point::intraday(ts, 2.0)],
    );
    let out = Engine::default().compute(
        &[series],
        TimeRange::D7,
        &["AAPL"],
        at(2024, 3, 6, 0, 0),
    );
    assert_eq!(out.data.datasets[0].values, vec![Some(2.0)]);
}

#[test]
fn datasets_follow_watchlist_order_not_selection_order() {
    let watchlist = vec![
        SymbolSeries::new("AAPL", vec![Point::daily(day(1), 1.0)]),
        SymbolSeries::new("MSFT", vec![Point::daily(day(1), 2.0)]),
        SymbolSeries::new("GOOG", vec![Point::daily(day(1), 3.0)]),
    ];
    let out = Engine::default().compute(
        &watchlist,
        TimeRange::D30,
        &["GOOG", "AAPL", "GOOG"],
        day(2),
    );
    let symbols: Vec<&str> = out.data.datasets.iter().map(|d| d.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["AAPL", "GOOG"]);
}

#[test]
fn colors_are_stable_across_selection_changes() {
    let watchlist = vec![
        SymbolSeries::new("AAPL", vec![Point::daily(day(1), 1.0)]),
        SymbolSeries::new("MSFT", vec![Point::daily(day(1), 2.0)]),
    ];
    let engine = Engine::default();
    let both = engine.compute(&watchlist, TimeRange::D30, &["AAPL", "MSFT"], day(2));
    let only = engine.compute(&watchlist, TimeRange::D30, &["MSFT"], day(2));

    assert_eq!(both.data.datasets[1].color, only.data.datasets[0].color);
    assert_ne!(both.data.datasets[0].color, both.data.datasets[1].color);
}

#[test]
fn unknown_selected_symbol_is_an_all_null_column() {
    let watchlist = vec![SymbolSeries::new(
        "AAPL",
        vec![Point::daily(day(1), 1.0), Point::daily(day(2), 2.0)],
    )];
    let out = Engine::default().compute(&watchlist, TimeRange::D30, &["ZZZZ", "AAPL"], day(3));

    assert_eq!(out.data.datasets.len(), 2);
    assert_eq!(out.data.datasets[0].symbol, "AAPL");
    assert_eq!(out.data.datasets[1].symbol, "ZZZZ");
    assert_eq!(out.data.datasets[1].values, vec![None, None]);
    assert_eq!(out.diagnostics.symbols[1].input_points, 0);
}

#[test]
fn malformed_points_are_dropped_and_counted() {
    let series = SymbolSeries::new(
        "AAPL",
        vec![
            Point::daily(day(1), f64::NAN),
            Point::daily(day(2), 2.0),
            Point {
                ts: day(3),
                price: f64::NEG_INFINITY,
                granularity: Granularity::Daily,
            },
        ],
    );
    let out = Engine::default().compute(&[series], TimeRange::D30, &["AAPL"], day(4));
    assert_eq!(out.data.datasets[0].values, vec![Some(2.0)]);
    assert_eq!(out.diagnostics.total_malformed(), 2);
}

#[test]
fn all_points_outside_cutoff_gives_empty_axis() {
    let series = SymbolSeries::new("AAPL", vec![Point::daily(at(2020, 1, 1, 0, 0), 1.0)]);
    let out = Engine::default().compute(&[series], TimeRange::D7, &["AAPL"], day(1));
    assert!(out.data.labels.is_empty());
    assert_eq!(out.data.datasets.len(), 1);
    assert!(out.data.datasets[0].values.is_empty());
}

#[test]
fn display_timezone_moves_day_buckets() {
    let cfg = EngineConfig {
        timezone: "America/New_York".to_string(),
        ..EngineConfig::default()
    };
    let engine = Engine::new(&cfg).unwrap();
    // 02:00 UTC on Jan 2 is still Jan 1 in New York.
    let series = SymbolSeries::new(
        "AAPL",
        vec![Point::intraday(at(2024, 1, 2, 2, 0), 5.0)],
    );
    let out = engine.compute(&[series], TimeRange::D30, &["AAPL"], day(10));

    assert_eq!(out.data.labels, vec!["Jan 1"]);
    assert_eq!(out.data.raw_axis, vec![at(2024, 1, 1, 5, 0)]);
}

#[test]
fn unknown_timezone_is_rejected() {
    let cfg = EngineConfig {
        timezone: "Mars/Olympus_Mons".to_string(),
        ..EngineConfig::default()
    };
    let err = Engine::new(&cfg).unwrap_err();
    assert!(matches!(err, chartwell_core::ChartwellError::InvalidArg(_)));
}

#[test]
fn policy_override_changes_budget() {
    let cfg = EngineConfig {
        policy_overrides: vec![chartwell_core::PolicyOverride {
            range: TimeRange::D30,
            cutoff_secs: None,
            point_budget: Some(2),
        }],
        ..EngineConfig::default()
    };
    let engine = Engine::new(&cfg).unwrap();
    let series = SymbolSeries::new(
        "AAPL",
        (1..=5).map(|d| Point::daily(day(d), f64::from(d))).collect(),
    );
    let out = engine.compute(&[series], TimeRange::D30, &["AAPL"], day(10));
    assert_eq!(out.data.datasets[0].values, vec![Some(1.0), Some(5.0)]);
}
