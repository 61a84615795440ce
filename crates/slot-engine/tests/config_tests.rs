//! Tests for widget configuration and locale resolution.

use chrono::NaiveTime;
use slot_engine::locale::Locale;
use slot_engine::{SlotError, WidgetConfig};

#[test]
fn defaults_match_clinic_site() {
    let config = WidgetConfig::default();
    assert_eq!(
        config.day_bounds().unwrap(),
        (
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(19, 0, 0).unwrap()
        )
    );
    assert_eq!(config.interval_for(1), 20);
    assert_eq!(config.interval_for(2), 30);
    assert_eq!(config.locale(), Locale::Pt);
    assert_eq!(config.email.clinic_template, "template_yaezzgg");
}

#[test]
fn partial_json_keeps_defaults() {
    let config =
        WidgetConfig::from_json(r#"{"version": "42", "locale": "en", "interval_overrides": {"3": 15}}"#)
            .unwrap();
    assert_eq!(config.version, "42");
    assert_eq!(config.locale(), Locale::En);
    assert_eq!(config.interval_for(3), 15);
    assert_eq!(config.interval_for(1), 20);
    assert_eq!(config.rules_path, "/calendar-rules.json");
}

#[test]
fn invalid_configs_are_rejected() {
    assert!(matches!(
        WidgetConfig::from_json(r#"{"default_interval_minutes": 0}"#).unwrap_err(),
        SlotError::Config(_)
    ));
    assert!(matches!(
        WidgetConfig::from_json(r#"{"day_start": "9h"}"#).unwrap_err(),
        SlotError::InvalidTime(_)
    ));
    assert!(WidgetConfig::from_json(r#"{"day_start": "19:00", "day_end": "19:00"}"#).is_err());
    assert!(WidgetConfig::from_json("not json").is_err());
}

#[test]
fn locale_from_language_tags() {
    assert_eq!(Locale::from_tag("pt-PT"), Locale::Pt);
    assert_eq!(Locale::from_tag("en"), Locale::En);
    assert_eq!(Locale::from_tag("en-GB"), Locale::En);
    assert_eq!(Locale::from_tag("ES_es"), Locale::Es);
    assert_eq!(Locale::from_tag("fr"), Locale::Pt);
    assert_eq!(Locale::from_tag(""), Locale::Pt);
}

#[test]
fn month_names() {
    assert_eq!(Locale::Pt.month_label(2025, 3), "março 2025");
    assert_eq!(Locale::Es.month_label(2025, 12), "diciembre 2025");
}
