//! Application state for one booking widget.
//!
//! The widget has one table, one configuration, the latest snapshot of each
//! feed, the navigation cursor and the visitor's selection. Feeds are refreshed
//! in pairs: the host fetches both concurrently and hands both bodies over in a
//! single [`AppState::complete_refresh`] call, so a render never sees one feed
//! updated and the other not. Refreshes are numbered; a completion older than
//! the last applied one is discarded.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::WidgetConfig;
use crate::error::Result;
use crate::feeds::{feed_url, Appointments, CalendarRules};
use crate::grid::{render_week, CalendarCursor, CalendarView, GridSpec, RenderRequest};
use crate::table::AvailabilityTable;

/// Identifies one pair of feed fetches. Issued in increasing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RefreshToken(pub u64);

/// Result of handing a completed refresh to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// The snapshot was installed (feeds that failed kept their previous value).
    Applied,
    /// A newer refresh was already applied, or the token was never issued;
    /// nothing changed.
    Stale,
}

/// Result of a render request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "view", rename_all = "snake_case")]
pub enum RenderOutcome {
    /// A refresh newer than the installed snapshot is still in flight.
    Deferred,
    Ready(CalendarView),
}

/// The location and specialty the visitor picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub location: String,
    pub specialty: u32,
}

#[derive(Debug, Clone)]
pub struct AppState {
    table: AvailabilityTable,
    config: WidgetConfig,
    rules: CalendarRules,
    appointments: Appointments,
    cursor: CalendarCursor,
    selection: Option<Selection>,
    issued: u64,
    applied: u64,
}

impl AppState {
    /// Create the state with empty feeds and the cursor on the week of `now`.
    ///
    /// # Errors
    /// Returns `SlotError::Config` or `SlotError::InvalidTime` when the
    /// configuration does not validate.
    pub fn new(table: AvailabilityTable, config: WidgetConfig, now: DateTime<Utc>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            table,
            config,
            rules: CalendarRules::default(),
            appointments: Appointments::default(),
            cursor: CalendarCursor::for_date(now.date_naive()),
            selection: None,
            issued: 0,
            applied: 0,
        })
    }

    pub fn table(&self) -> &AvailabilityTable {
        &self.table
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn rules(&self) -> &CalendarRules {
        &self.rules
    }

    pub fn appointments(&self) -> &Appointments {
        &self.appointments
    }

    pub fn cursor(&self) -> CalendarCursor {
        self.cursor
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Cache-busted URLs of the rules and appointments feeds.
    pub fn feed_urls(&self) -> (String, String) {
        (
            feed_url(&self.config.rules_path, &self.config.version),
            feed_url(&self.config.appointments_path, &self.config.version),
        )
    }

    /// Start a refresh. The host fetches both feeds and reports back with the token.
    pub fn begin_refresh(&mut self) -> RefreshToken {
        self.issued += 1;
        debug!(token = self.issued, "refresh started");
        RefreshToken(self.issued)
    }

    /// Whether a refresh newer than the installed snapshot is outstanding.
    pub fn is_refreshing(&self) -> bool {
        self.issued > self.applied
    }

    /// Install the feed bodies fetched for `token`.
    ///
    /// `None` means the fetch failed (network error or non-OK status). A
    /// failed or unparseable feed keeps its last-known value; the other feed is
    /// still updated. Completions older than the last applied refresh are
    /// discarded so a slow response can never overwrite a newer one, and so
    /// are tokens this state never issued.
    pub fn complete_refresh(
        &mut self,
        token: RefreshToken,
        rules_body: Option<&str>,
        appointments_body: Option<&str>,
    ) -> RefreshOutcome {
        if token.0 <= self.applied {
            info!(token = token.0, applied = self.applied, "discarding stale refresh");
            return RefreshOutcome::Stale;
        }
        if token.0 > self.issued {
            warn!(
                token = token.0,
                issued = self.issued,
                "discarding refresh with an unissued token"
            );
            return RefreshOutcome::Stale;
        }

        match rules_body.map(CalendarRules::from_json) {
            Some(Ok(rules)) => self.rules = rules,
            Some(Err(e)) => error!(error = %e, "calendar rules unusable, keeping previous rules"),
            None => error!("calendar rules fetch failed, keeping previous rules"),
        }

        match appointments_body.map(Appointments::from_json) {
            Some(Ok(appointments)) => self.appointments = appointments,
            Some(Err(e)) => {
                error!(error = %e, "appointments unusable, keeping previous appointments")
            }
            None => error!("appointments fetch failed, keeping previous appointments"),
        }

        self.applied = token.0;
        debug!(
            token = token.0,
            bookings = self.appointments.len(),
            "refresh applied"
        );
        RefreshOutcome::Applied
    }

    /// Change the selected location and specialty.
    ///
    /// The host should start a refresh afterwards, as the widget reloads both
    /// feeds whenever the selection changes.
    pub fn select(&mut self, location: &str, specialty: u32) {
        self.selection = Some(Selection {
            location: location.to_string(),
            specialty,
        });
    }

    pub fn change_week(&mut self, offset: i64) {
        self.cursor.change_week(offset);
        debug!(monday = %self.cursor.monday, "week changed");
    }

    pub fn change_month(&mut self, offset: i32) {
        self.cursor.change_month(offset);
        debug!(year = self.cursor.year, month = self.cursor.month, "month changed");
    }

    /// Grid layout for a specialty.
    pub fn grid_spec(&self, specialty: u32) -> Result<GridSpec> {
        let (day_start, day_end) = self.config.day_bounds()?;
        Ok(GridSpec {
            day_start,
            day_end,
            interval_minutes: self.config.interval_for(specialty),
        })
    }

    /// Render the current week for the current selection.
    ///
    /// Without a selection the view is hidden. While a newer refresh than the
    /// installed snapshot is in flight the render is deferred.
    pub fn render(&self, now: DateTime<Utc>) -> Result<RenderOutcome> {
        if self.is_refreshing() {
            return Ok(RenderOutcome::Deferred);
        }

        let (location, specialty) = match &self.selection {
            Some(selection) => (selection.location.as_str(), selection.specialty),
            None => ("", 0),
        };

        let request = RenderRequest {
            table: &self.table,
            rules: &self.rules,
            appointments: &self.appointments,
            location,
            specialty,
            cursor: &self.cursor,
            grid: self.grid_spec(specialty)?,
            locale: self.config.locale(),
            now,
        };
        Ok(RenderOutcome::Ready(render_week(&request)))
    }
}
