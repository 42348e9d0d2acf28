use chartwell_core::RawRecord;
use chrono::{Datelike, Days, NaiveDate, TimeDelta, Weekday};

const WAVE_FREQ: f64 = 0.7;

enum Gaps {
    None,
    Mondays,
}

pub fn by_symbol(s: &str) -> Option<Vec<RawRecord>> {
    match s {
        "AAPL" => build(170.0, &Gaps::None, true),
        "MSFT" => build(410.0, &Gaps::Mondays, true),
        "GOOG" => build(150.0, &Gaps::None, false),
        "TSLA" => build(175.0, &Gaps::None, true).map(with_malformed),
        _ => None,
    }
}

fn is_weekend(d: NaiveDate) -> bool {
    matches!(d.weekday(), Weekday::Sat | Weekday::Sun)
}

fn close(base: f64, t: f64) -> f64 {
    let drift = base * 0.0004f64.mul_add(t, 1.0);
    (t * WAVE_FREQ).sin().mul_add(2.5, drift)
}

fn build(base: f64, gaps: &Gaps, intraday: bool) -> Option<Vec<RawRecord>> {
    let first = NaiveDate::from_ymd_opt(2019, 4, 1)?;
    let last = NaiveDate::from_ymd_opt(2024, 3, 28)?;

    let mut out = Vec::new();
    let mut t = 0.0;
    let mut last_close = base;
    for day in first.iter_days().take_while(|d| *d <= last) {
        t += 1.0;
        if is_weekend(day) || (matches!(gaps, Gaps::Mondays) && day.weekday() == Weekday::Mon) {
            continue;
        }
        last_close = close(base, t);
        out.push(RawRecord::new(day.format("%Y-%m-%d").to_string(), last_close));
    }

    if intraday {
        // Hourly ticks over the four sessions before the last one.
        let earlier: Vec<NaiveDate> = (1..8)
            .filter_map(|k| last.checked_sub_days(Days::new(k)))
            .filter(|d| !is_weekend(*d))
            .take(4)
            .collect();
        for day in earlier.into_iter().rev() {
            for (i, hour) in (14..=20).enumerate() {
                let ts = day.and_hms_opt(hour, 0, 0)?;
                let px = last_close + f64::from(u8::try_from(i).ok()?) * 0.15 - 0.5;
                out.push(RawRecord::new(ts.format("%Y-%m-%d %H:%M").to_string(), px));
            }
        }

        // Five-minute ticks through the last session, 13:30 to 20:00.
        let open = last.and_hms_opt(13, 30, 0)?;
        for i in 0..=78u8 {
            let ts = open + TimeDelta::minutes(5 * i64::from(i));
            let px = (f64::from(i) * 0.37).cos().mul_add(0.8, last_close);
            out.push(RawRecord::new(ts.format("%Y-%m-%d %H:%M").to_string(), px));
        }
    }

    Some(out)
}

fn with_malformed(mut records: Vec<RawRecord>) -> Vec<RawRecord> {
    records.push(RawRecord {
        date: "2024-03-27".to_string(),
        price: None,
        is_intraday: None,
    });
    records.push(RawRecord::new("2024-03-2x", 180.0));
    records.push(RawRecord::new("2024-03-26 15:00", f64::NAN));
    records
}
