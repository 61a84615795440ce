//! Tests for slot recurrence rules.

use chrono::{NaiveDate, NaiveTime};
use slot_engine::recurrence::{weeks_between, AvailabilitySlot};
use slot_engine::{should_show, Recurrence, MISSING_RECURRENCE_FALLBACK};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn slot(recurrence: Recurrence) -> AvailabilitySlot {
    AvailabilitySlot {
        start: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
        end: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
        recurrence,
    }
}

// ── Weekly ──────────────────────────────────────────────────────────────────

#[test]
fn weekly_shows_every_date() {
    let weekly = slot(Recurrence::Weekly);
    let mut day = date(2024, 12, 30);
    for _ in 0..400 {
        assert!(should_show(&weekly, day), "weekly slot hidden on {}", day);
        day = day.succ_opt().unwrap();
    }
}

// ── Biweekly ────────────────────────────────────────────────────────────────

#[test]
fn biweekly_shows_on_anchor_and_every_second_week() {
    let biweekly = slot(Recurrence::Biweekly {
        anchor: date(2025, 10, 21),
    });

    assert!(should_show(&biweekly, date(2025, 10, 21)));
    assert!(should_show(&biweekly, date(2025, 11, 4)));
    assert!(should_show(&biweekly, date(2025, 11, 18)));
    assert!(!should_show(&biweekly, date(2025, 10, 28)));
    assert!(!should_show(&biweekly, date(2025, 11, 11)));
}

#[test]
fn biweekly_hidden_before_anchor() {
    let biweekly = slot(Recurrence::Biweekly {
        anchor: date(2025, 10, 21),
    });

    // Two and four weeks before the anchor would be "even" weeks.
    assert!(!should_show(&biweekly, date(2025, 10, 7)));
    assert!(!should_show(&biweekly, date(2025, 9, 23)));
    assert!(!should_show(&biweekly, date(2025, 10, 20)));
}

#[test]
fn biweekly_crosses_year_boundary() {
    let biweekly = slot(Recurrence::Biweekly {
        anchor: date(2025, 12, 23),
    });
    assert!(should_show(&biweekly, date(2026, 1, 6)));
    assert!(!should_show(&biweekly, date(2025, 12, 30)));
}

#[test]
fn weeks_between_floors_partial_weeks() {
    let anchor = date(2025, 10, 21);
    assert_eq!(weeks_between(anchor, anchor), 0);
    assert_eq!(weeks_between(anchor, date(2025, 10, 27)), 0);
    assert_eq!(weeks_between(anchor, date(2025, 10, 28)), 1);
    assert_eq!(weeks_between(anchor, date(2025, 11, 4)), 2);
    assert_eq!(weeks_between(anchor, date(2025, 10, 20)), -1);
}

// ── Monthly ─────────────────────────────────────────────────────────────────

#[test]
fn monthly_shows_on_day_of_month_only() {
    let monthly = slot(Recurrence::Monthly { day_of_month: 10 });

    assert!(should_show(&monthly, date(2025, 3, 10)));
    assert!(should_show(&monthly, date(2025, 11, 10)));
    assert!(!should_show(&monthly, date(2025, 3, 11)));
    assert!(!should_show(&monthly, date(2025, 3, 9)));
}

// ── Building from table metadata ────────────────────────────────────────────

#[test]
fn from_raw_reads_each_kind() {
    assert_eq!(Recurrence::from_raw(None, None, None), Recurrence::Weekly);
    assert_eq!(Recurrence::from_raw(Some("weekly"), None, None), Recurrence::Weekly);
    assert_eq!(
        Recurrence::from_raw(Some("biweekly"), Some("2025-10-29"), None),
        Recurrence::Biweekly {
            anchor: date(2025, 10, 29)
        }
    );
    assert_eq!(
        Recurrence::from_raw(Some("monthly"), None, Some(10)),
        Recurrence::Monthly { day_of_month: 10 }
    );
}

#[test]
fn fallback_constant_is_weekly() {
    assert_eq!(MISSING_RECURRENCE_FALLBACK, Recurrence::Weekly);
}

#[test]
fn malformed_metadata_falls_back() {
    let cases = [
        Recurrence::from_raw(Some("biweekly"), None, None),
        Recurrence::from_raw(Some("biweekly"), Some("29/10/2025"), None),
        Recurrence::from_raw(Some("monthly"), None, None),
        Recurrence::from_raw(Some("monthly"), None, Some(0)),
        Recurrence::from_raw(Some("monthly"), None, Some(32)),
        Recurrence::from_raw(Some("fortnightly"), None, None),
    ];
    for recurrence in cases {
        assert_eq!(recurrence, MISSING_RECURRENCE_FALLBACK);
    }
}

#[test]
fn fallback_slot_shows_every_week() {
    let misconfigured = slot(Recurrence::from_raw(Some("biweekly"), None, None));
    assert!(should_show(&misconfigured, date(2025, 10, 21)));
    assert!(should_show(&misconfigured, date(2025, 10, 28)));
}

#[test]
fn slot_covers_start_but_not_end() {
    let s = slot(Recurrence::Weekly);
    assert!(s.covers(NaiveTime::from_hms_opt(15, 0, 0).unwrap()));
    assert!(s.covers(NaiveTime::from_hms_opt(18, 40, 0).unwrap()));
    assert!(!s.covers(NaiveTime::from_hms_opt(19, 0, 0).unwrap()));
    assert!(!s.covers(NaiveTime::from_hms_opt(14, 40, 0).unwrap()));
}
