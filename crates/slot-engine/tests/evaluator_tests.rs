//! Tests for per-cell slot evaluation.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use slot_engine::evaluator::start_of_tomorrow;
use slot_engine::feeds::{ExceptionKind, ExceptionRange};
use slot_engine::interval::TimeRange;
use slot_engine::table::SpecialtySchedule;
use slot_engine::{evaluate, AvailabilitySlot, CellStatus, Recurrence, SlotContext};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn instant(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn range(start: &str, end: &str) -> TimeRange {
    TimeRange::new(instant(start), instant(end)).unwrap()
}

fn exception(kind: ExceptionKind, start: &str, end: &str) -> ExceptionRange {
    ExceptionRange {
        kind,
        range: range(start, end),
    }
}

/// Tuesdays 12:00-14:00, weekly.
fn tuesday_noon() -> SpecialtySchedule {
    SpecialtySchedule {
        room_id: Some(1),
        day_slots: BTreeMap::from([(
            2,
            vec![AvailabilitySlot {
                start: time(12, 0),
                end: time(14, 0),
                recurrence: Recurrence::Weekly,
            }],
        )]),
    }
}

fn new_year() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 10, 30, 0).unwrap()
}

fn ctx<'a>(
    schedule: &'a SpecialtySchedule,
    blackouts: &'a [ExceptionRange],
    open: &'a [ExceptionRange],
    booked: &'a [TimeRange],
) -> SlotContext<'a> {
    SlotContext {
        schedule,
        blackouts,
        open_exceptions: open,
        booked,
        now: new_year(),
    }
}

// ── Availability window ─────────────────────────────────────────────────────

#[test]
fn cell_inside_window_is_available() {
    let schedule = tuesday_noon();
    let c = ctx(&schedule, &[], &[], &[]);
    assert_eq!(evaluate(date(2025, 1, 7), time(12, 0), &c), CellStatus::Available);
    assert_eq!(evaluate(date(2025, 1, 7), time(13, 40), &c), CellStatus::Available);
}

#[test]
fn window_end_is_exclusive() {
    let schedule = tuesday_noon();
    let c = ctx(&schedule, &[], &[], &[]);
    assert_eq!(evaluate(date(2025, 1, 7), time(14, 0), &c), CellStatus::OutOfRange);
}

#[test]
fn cell_before_window_is_out_of_range() {
    let schedule = tuesday_noon();
    let c = ctx(&schedule, &[], &[], &[]);
    assert_eq!(evaluate(date(2025, 1, 7), time(11, 40), &c), CellStatus::OutOfRange);
}

#[test]
fn other_weekdays_are_out_of_range() {
    let schedule = tuesday_noon();
    let c = ctx(&schedule, &[], &[], &[]);
    assert_eq!(evaluate(date(2025, 1, 8), time(12, 0), &c), CellStatus::OutOfRange);
}

#[test]
fn same_day_and_past_cells_are_not_offered() {
    let schedule = tuesday_noon();
    let mut c = ctx(&schedule, &[], &[], &[]);
    // "Now" is the Tuesday morning itself.
    c.now = Utc.with_ymd_and_hms(2025, 1, 7, 8, 0, 0).unwrap();
    assert_eq!(evaluate(date(2025, 1, 7), time(12, 0), &c), CellStatus::OutOfRange);
    // A week later is fine.
    assert_eq!(evaluate(date(2025, 1, 14), time(12, 0), &c), CellStatus::Available);
}

#[test]
fn start_of_tomorrow_is_next_utc_midnight() {
    assert_eq!(
        start_of_tomorrow(Utc.with_ymd_and_hms(2025, 1, 1, 23, 59, 59).unwrap()),
        Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap()
    );
    assert_eq!(
        start_of_tomorrow(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()),
        Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap()
    );
}

#[test]
fn recurrence_is_applied_per_date() {
    let schedule = SpecialtySchedule {
        room_id: Some(4),
        day_slots: BTreeMap::from([(
            3,
            vec![AvailabilitySlot {
                start: time(9, 0),
                end: time(12, 40),
                recurrence: Recurrence::Biweekly {
                    anchor: date(2025, 10, 29),
                },
            }],
        )]),
    };
    let mut c = ctx(&schedule, &[], &[], &[]);
    c.now = Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap();

    assert_eq!(evaluate(date(2025, 10, 29), time(9, 0), &c), CellStatus::Available);
    assert_eq!(evaluate(date(2025, 11, 5), time(9, 0), &c), CellStatus::OutOfRange);
    assert_eq!(evaluate(date(2025, 11, 12), time(12, 20), &c), CellStatus::Available);
}

// ── Bookings ────────────────────────────────────────────────────────────────

#[test]
fn booking_inside_window_is_booked() {
    let schedule = tuesday_noon();
    let booked = [range("2025-01-07T12:00:00Z", "2025-01-07T12:40:00Z")];
    let c = ctx(&schedule, &[], &[], &booked);

    assert_eq!(evaluate(date(2025, 1, 7), time(12, 0), &c), CellStatus::Booked);
    assert_eq!(evaluate(date(2025, 1, 7), time(12, 20), &c), CellStatus::Booked);
    assert_eq!(evaluate(date(2025, 1, 7), time(12, 40), &c), CellStatus::Available);
}

#[test]
fn booking_outside_any_window_is_not_flagged() {
    let schedule = tuesday_noon();
    let booked = [range("2025-01-08T12:00:00Z", "2025-01-08T13:00:00Z")];
    let c = ctx(&schedule, &[], &[], &booked);
    assert_eq!(evaluate(date(2025, 1, 8), time(12, 0), &c), CellStatus::OutOfRange);
}

#[test]
fn booking_over_open_exception_is_not_selectable() {
    let schedule = tuesday_noon();
    let open = [exception(
        ExceptionKind::Open,
        "2025-01-08T09:00:00Z",
        "2025-01-08T12:00:00Z",
    )];
    let booked = [range("2025-01-08T10:00:00Z", "2025-01-08T10:20:00Z")];
    let c = ctx(&schedule, &[], &open, &booked);

    let status = evaluate(date(2025, 1, 8), time(10, 0), &c);
    assert_eq!(status, CellStatus::Booked);
    assert!(!status.is_selectable());

    // Without the booking the same cell is bookable again.
    let c = ctx(&schedule, &[], &open, &[]);
    assert_eq!(
        evaluate(date(2025, 1, 8), time(10, 0), &c),
        CellStatus::OpenException
    );
}

// ── Exceptions ──────────────────────────────────────────────────────────────

#[test]
fn blackout_blocks_available_cell() {
    let schedule = tuesday_noon();
    let blackouts = [exception(
        ExceptionKind::Blackout,
        "2025-01-07T00:00:00Z",
        "2025-01-08T00:00:00Z",
    )];
    let c = ctx(&schedule, &blackouts, &[], &[]);
    assert_eq!(evaluate(date(2025, 1, 7), time(12, 0), &c), CellStatus::Blocked);
    // Outside the availability window the blackout still reports as blocked.
    assert_eq!(evaluate(date(2025, 1, 7), time(9, 0), &c), CellStatus::Blocked);
}

#[test]
fn open_exception_overrides_blackout() {
    let schedule = tuesday_noon();
    let blackouts = [exception(
        ExceptionKind::Blackout,
        "2025-01-07T00:00:00Z",
        "2025-01-08T00:00:00Z",
    )];
    let open = [exception(
        ExceptionKind::Open,
        "2025-01-07T12:00:00Z",
        "2025-01-07T13:00:00Z",
    )];
    let c = ctx(&schedule, &blackouts, &open, &[]);

    let status = evaluate(date(2025, 1, 7), time(12, 20), &c);
    assert_eq!(status, CellStatus::OpenException);
    assert!(status.is_selectable());
    assert_eq!(evaluate(date(2025, 1, 7), time(13, 0), &c), CellStatus::Blocked);
}

#[test]
fn open_exception_opens_cell_outside_window() {
    let schedule = tuesday_noon();
    let open = [exception(
        ExceptionKind::Open,
        "2025-01-09T15:00:00Z",
        "2025-01-09T16:00:00Z",
    )];
    let c = ctx(&schedule, &[], &open, &[]);
    assert_eq!(
        evaluate(date(2025, 1, 9), time(15, 40), &c),
        CellStatus::OpenException
    );
    assert_eq!(evaluate(date(2025, 1, 9), time(16, 0), &c), CellStatus::OutOfRange);
}

#[test]
fn open_exception_inside_window_stays_available() {
    let schedule = tuesday_noon();
    let open = [exception(
        ExceptionKind::Open,
        "2025-01-07T12:00:00Z",
        "2025-01-07T13:00:00Z",
    )];
    let c = ctx(&schedule, &[], &open, &[]);
    assert_eq!(evaluate(date(2025, 1, 7), time(12, 0), &c), CellStatus::Available);
}

#[test]
fn booked_beats_blackout() {
    let schedule = tuesday_noon();
    let blackouts = [exception(
        ExceptionKind::Blackout,
        "2025-01-07T00:00:00Z",
        "2025-01-08T00:00:00Z",
    )];
    let booked = [range("2025-01-07T12:00:00Z", "2025-01-07T12:20:00Z")];
    let c = ctx(&schedule, &blackouts, &[], &booked);
    assert_eq!(evaluate(date(2025, 1, 7), time(12, 0), &c), CellStatus::Booked);
}

#[test]
fn css_classes_match_stylesheet() {
    assert_eq!(CellStatus::Available.css_class(), "slot");
    assert_eq!(CellStatus::OpenException.css_class(), "slot");
    assert_eq!(CellStatus::Booked.css_class(), "booked-slot");
    assert_eq!(CellStatus::Blocked.css_class(), "disabled-slot");
    assert_eq!(CellStatus::OutOfRange.css_class(), "disabled-slot");
}
