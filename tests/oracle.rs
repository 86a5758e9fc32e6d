//! Span-to-query mapping and price normalization tests.

use chrono::NaiveDate;
use paper_trader::oracle::{close_to_cents, span_window, HistorySpan};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn day_span_looks_back_one_day_with_five_minute_buckets() {
    let window = span_window(HistorySpan::Day, date(2026, 3, 15));
    assert_eq!(window.from, date(2026, 3, 14));
    assert_eq!(window.to, date(2026, 3, 15));
    assert_eq!(window.multiplier, 5);
    assert_eq!(window.timespan, "minute");
}

#[test]
fn week_span_looks_back_seven_days_with_thirty_minute_buckets() {
    let window = span_window(HistorySpan::Week, date(2026, 3, 15));
    assert_eq!(window.from, date(2026, 3, 8));
    assert_eq!(window.to, date(2026, 3, 15));
    assert_eq!(window.multiplier, 30);
    assert_eq!(window.timespan, "minute");
}

#[test]
fn month_span_looks_back_one_month_with_daily_buckets() {
    let window = span_window(HistorySpan::Month, date(2026, 3, 15));
    assert_eq!(window.from, date(2026, 2, 15));
    assert_eq!(window.to, date(2026, 3, 15));
    assert_eq!(window.multiplier, 1);
    assert_eq!(window.timespan, "day");
}

#[test]
fn month_span_clamps_at_month_ends() {
    // March 31 minus one month lands on the last day of February.
    let window = span_window(HistorySpan::Month, date(2026, 3, 31));
    assert_eq!(window.from, date(2026, 2, 28));
}

#[test]
fn span_tags_parse_exactly() {
    assert_eq!(HistorySpan::from_tag("DAY"), Some(HistorySpan::Day));
    assert_eq!(HistorySpan::from_tag("WEEK"), Some(HistorySpan::Week));
    assert_eq!(HistorySpan::from_tag("MONTH"), Some(HistorySpan::Month));
    assert_eq!(HistorySpan::from_tag("YEAR"), None);
    assert_eq!(HistorySpan::from_tag("day"), None);
}

#[test]
fn close_rounds_to_nearest_cent() {
    assert_eq!(close_to_cents(187.23), 18_723);
    assert_eq!(close_to_cents(99.99), 9_999);
    assert_eq!(close_to_cents(0.004), 0);
    assert_eq!(close_to_cents(100.0), 10_000);
}
