//! Tests for half-open intervals and time parsing.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use slot_engine::interval::{any_contains, at_utc, parse_date, parse_time_of_day, TimeRange};

fn utc(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 7, h, m, 0).unwrap()
}

#[test]
fn contains_is_half_open() {
    let range = TimeRange::new(utc(12, 0), utc(14, 0)).unwrap();
    assert!(range.contains(utc(12, 0)));
    assert!(range.contains(utc(13, 59)));
    assert!(!range.contains(utc(14, 0)));
    assert!(!range.contains(utc(11, 59)));
}

#[test]
fn adjacent_ranges_do_not_overlap() {
    let a = TimeRange::new(utc(9, 0), utc(10, 0)).unwrap();
    let b = TimeRange::new(utc(10, 0), utc(11, 0)).unwrap();
    assert!(!a.overlaps(&b));
    assert!(a.overlaps(&TimeRange::new(utc(9, 30), utc(10, 30)).unwrap()));
}

#[test]
fn empty_and_inverted_ranges_are_rejected() {
    assert!(TimeRange::new(utc(14, 0), utc(12, 0)).is_err());
    assert!(TimeRange::new(utc(12, 0), utc(12, 0)).is_err());
}

#[test]
fn any_contains_over_several_ranges() {
    let ranges = [
        TimeRange::new(utc(9, 0), utc(10, 0)).unwrap(),
        TimeRange::new(utc(15, 0), utc(16, 0)).unwrap(),
    ];
    assert!(any_contains(&ranges, utc(15, 30)));
    assert!(!any_contains(&ranges, utc(12, 0)));
    let none: [TimeRange; 0] = [];
    assert!(!any_contains(&none, utc(12, 0)));
}

#[test]
fn parses_single_digit_hours() {
    assert_eq!(
        parse_time_of_day("9:00").unwrap(),
        NaiveTime::from_hms_opt(9, 0, 0).unwrap()
    );
    assert_eq!(
        parse_time_of_day(" 13:20 ").unwrap(),
        NaiveTime::from_hms_opt(13, 20, 0).unwrap()
    );
    assert!(parse_time_of_day("25:00").is_err());
}

#[test]
fn dates_combine_with_times_in_utc() {
    let day = parse_date("2025-01-07").unwrap();
    assert_eq!(day, NaiveDate::from_ymd_opt(2025, 1, 7).unwrap());
    assert_eq!(
        at_utc(day, NaiveTime::from_hms_opt(12, 0, 0).unwrap()),
        utc(12, 0)
    );
    assert!(parse_date("07-01-2025").is_err());
}
