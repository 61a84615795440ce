//! Widget configuration.
//!
//! Every field has a default matching the clinic site, so an empty JSON object
//! (or no configuration at all) yields a working widget.

use std::collections::BTreeMap;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::interval::parse_time_of_day;
use crate::locale::Locale;

/// Identifiers for the transactional e-mail relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailTemplates {
    pub service_id: String,
    /// Template notifying the clinic of a new request.
    pub clinic_template: String,
    /// Template confirming receipt to the client.
    pub client_template: String,
}

impl Default for EmailTemplates {
    fn default() -> Self {
        Self {
            service_id: "service_2mkemrj".to_string(),
            clinic_template: "template_yaezzgg".to_string(),
            client_template: "template_ppny0sk".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// First row of the grid (`HH:MM`, UTC).
    pub day_start: String,
    /// End of the grid, exclusive (`HH:MM`, UTC).
    pub day_end: String,
    pub default_interval_minutes: u32,
    /// Row granularity per specialty, overriding the default.
    pub interval_overrides: BTreeMap<u32, u32>,
    pub rules_path: String,
    pub appointments_path: String,
    /// Cache-busting value appended to feed URLs.
    pub version: String,
    /// BCP 47 tag of the page language.
    pub locale: String,
    pub email: EmailTemplates,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            day_start: "09:00".to_string(),
            day_end: "19:00".to_string(),
            default_interval_minutes: 20,
            interval_overrides: BTreeMap::from([(2, 30)]),
            rules_path: "/calendar-rules.json".to_string(),
            appointments_path: "/appointments.json".to_string(),
            version: String::new(),
            locale: "pt-PT".to_string(),
            email: EmailTemplates::default(),
        }
    }
}

impl WidgetConfig {
    /// Parse and validate a configuration from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: WidgetConfig =
            serde_json::from_str(json).map_err(|e| SlotError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the grid bounds parse, are ordered and every interval is positive.
    pub fn validate(&self) -> Result<()> {
        let (start, end) = self.day_bounds()?;
        if start >= end {
            return Err(SlotError::Config(format!(
                "day_start {} must be before day_end {}",
                self.day_start, self.day_end
            )));
        }
        let zero_interval = self.default_interval_minutes == 0
            || self.interval_overrides.values().any(|m| *m == 0);
        if zero_interval {
            return Err(SlotError::Config("intervals must be positive".to_string()));
        }
        Ok(())
    }

    pub fn day_bounds(&self) -> Result<(NaiveTime, NaiveTime)> {
        Ok((
            parse_time_of_day(&self.day_start)?,
            parse_time_of_day(&self.day_end)?,
        ))
    }

    /// Grid row granularity for a specialty, in minutes.
    pub fn interval_for(&self, specialty: u32) -> u32 {
        self.interval_overrides
            .get(&specialty)
            .copied()
            .unwrap_or(self.default_interval_minutes)
    }

    pub fn locale(&self) -> Locale {
        Locale::from_tag(&self.locale)
    }
}
