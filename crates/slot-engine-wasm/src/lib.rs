//! WASM bindings for slot-engine.
//!
//! Exposes the booking calendar to the clinic page via `wasm-bindgen`. The
//! page keeps ownership of the DOM, the network and the e-mail relay; this
//! module keeps the widget state and answers with JSON strings.
//!
//! ## Page flow
//!
//! ```js
//! const widget = new BookingWidget(configJson, new Date().toISOString());
//! widget.select("Porto", specialty.selectedIndex);
//! const token = widget.beginRefresh();
//! const [rulesUrl, appointmentsUrl] = JSON.parse(widget.feedUrls());
//! const [rules, appts] = await Promise.all([fetchText(rulesUrl), fetchText(appointmentsUrl)]);
//! widget.completeRefresh(token, rules, appts); // null for a failed fetch
//! const view = JSON.parse(widget.render(new Date().toISOString()));
//! ```
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p slot-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir site/js/pkg/ \
//!   target/wasm32-unknown-unknown/release/slot_engine_wasm.wasm
//! ```

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use slot_engine::booking::{BookingRequest, SubmissionOutcome};
use slot_engine::interval::{parse_date, parse_time_of_day, parse_timestamp};
use slot_engine::{
    evaluate, AppState, Appointments, AvailabilityTable, CalendarRules, RefreshOutcome,
    SlotContext, WidgetConfig,
};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct CursorDto {
    year: i32,
    month: u32,
    monday: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionStatusDto {
    message: &'static str,
    reset_form: bool,
    clear_form: bool,
}

#[derive(Serialize)]
struct ValidationDto<T: Serialize> {
    ok: bool,
    error: Option<String>,
    payload: Option<T>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn parse_now(now: &str) -> Result<DateTime<Utc>, JsValue> {
    parse_timestamp(now).map_err(js_err)
}

// ---------------------------------------------------------------------------
// Stateful widget
// ---------------------------------------------------------------------------

/// The booking calendar's state, owned by the page.
#[wasm_bindgen]
pub struct BookingWidget {
    state: AppState,
}

#[wasm_bindgen]
impl BookingWidget {
    /// Create a widget with the built-in availability table.
    ///
    /// `config_json` is a `WidgetConfig` object (any subset of fields);
    /// `now` is an ISO 8601 timestamp placing the cursor on the current week.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>, now: &str) -> Result<BookingWidget, JsValue> {
        let config = match config_json.as_deref() {
            Some(json) => WidgetConfig::from_json(json).map_err(js_err)?,
            None => WidgetConfig::default(),
        };
        let table = AvailabilityTable::clinic_default().map_err(js_err)?;
        let state = AppState::new(table, config, parse_now(now)?).map_err(js_err)?;
        Ok(BookingWidget { state })
    }

    /// Create a widget with a custom availability table (JSON).
    #[wasm_bindgen(js_name = "withTable")]
    pub fn with_table(
        table_json: &str,
        config_json: Option<String>,
        now: &str,
    ) -> Result<BookingWidget, JsValue> {
        let config = match config_json.as_deref() {
            Some(json) => WidgetConfig::from_json(json).map_err(js_err)?,
            None => WidgetConfig::default(),
        };
        let table = AvailabilityTable::from_json(table_json).map_err(js_err)?;
        let state = AppState::new(table, config, parse_now(now)?).map_err(js_err)?;
        Ok(BookingWidget { state })
    }

    /// `[rulesUrl, appointmentsUrl]` with the cache-busting parameter.
    #[wasm_bindgen(js_name = "feedUrls")]
    pub fn feed_urls(&self) -> Result<String, JsValue> {
        let (rules, appointments) = self.state.feed_urls();
        to_json(&[rules, appointments])
    }

    /// Start a pair of feed fetches; returns the token to complete them with.
    #[wasm_bindgen(js_name = "beginRefresh")]
    pub fn begin_refresh(&mut self) -> f64 {
        // JS numbers are exact up to 2^53, far beyond any refresh count.
        self.state.begin_refresh().0 as f64
    }

    /// Install fetched feed bodies. Pass `null` for a feed whose fetch failed.
    ///
    /// Returns `true` when applied, `false` when a newer refresh already won.
    #[wasm_bindgen(js_name = "completeRefresh")]
    pub fn complete_refresh(
        &mut self,
        token: f64,
        rules_json: Option<String>,
        appointments_json: Option<String>,
    ) -> bool {
        let token = slot_engine::RefreshToken(token.max(0.0) as u64);
        let outcome = self.state.complete_refresh(
            token,
            rules_json.as_deref(),
            appointments_json.as_deref(),
        );
        outcome == RefreshOutcome::Applied
    }

    #[wasm_bindgen(js_name = "isRefreshing")]
    pub fn is_refreshing(&self) -> bool {
        self.state.is_refreshing()
    }

    /// Select a location and specialty (the specialty's index in the form).
    pub fn select(&mut self, location: &str, specialty: u32) {
        self.state.select(location, specialty);
    }

    #[wasm_bindgen(js_name = "changeWeek")]
    pub fn change_week(&mut self, offset: i32) {
        self.state.change_week(offset as i64);
    }

    #[wasm_bindgen(js_name = "changeMonth")]
    pub fn change_month(&mut self, offset: i32) {
        self.state.change_month(offset);
    }

    /// Current cursor as `{year, month, monday}`.
    pub fn cursor(&self) -> Result<String, JsValue> {
        let cursor = self.state.cursor();
        to_json(&CursorDto {
            year: cursor.year,
            month: cursor.month,
            monday: cursor.monday.to_string(),
        })
    }

    /// Render the current week.
    ///
    /// Returns `{"state":"deferred"}` while a refresh is in flight, otherwise
    /// `{"state":"ready","view":{...}}`.
    pub fn render(&self, now: &str) -> Result<String, JsValue> {
        let outcome = self.state.render(parse_now(now)?).map_err(js_err)?;
        to_json(&outcome)
    }

    /// Validate the form and build the e-mail payload.
    ///
    /// Returns `{ok, error, payload}`; `error` is the localized prompt when a
    /// slot is missing, or the validation message otherwise.
    #[wasm_bindgen(js_name = "buildBookingPayload")]
    pub fn build_booking_payload(
        &self,
        request_json: &str,
        specialty_index: u32,
    ) -> Result<String, JsValue> {
        let request: BookingRequest = serde_json::from_str(request_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid booking JSON: {}", e)))?;

        let dto = match request.validate(self.state.table(), specialty_index) {
            Ok(()) => ValidationDto {
                ok: true,
                error: None,
                payload: Some(request.to_payload()),
            },
            Err(slot_engine::SlotError::SlotRequired { .. }) => ValidationDto {
                ok: false,
                error: Some(self.state.config().locale().slot_required().to_string()),
                payload: None,
            },
            Err(e) => ValidationDto {
                ok: false,
                error: Some(e.to_string()),
                payload: None,
            },
        };
        to_json(&dto)
    }

    /// E-mail relay identifiers as `{service_id, clinic_template, client_template}`.
    #[wasm_bindgen(js_name = "emailTemplates")]
    pub fn email_templates(&self) -> Result<String, JsValue> {
        to_json(&self.state.config().email)
    }

    /// Status after dispatch. `client_ok` is `undefined` when the client
    /// e-mail was never sent because the clinic e-mail failed.
    #[wasm_bindgen(js_name = "submissionStatus")]
    pub fn submission_status(&self, clinic_ok: bool, client_ok: Option<bool>) -> Result<String, JsValue> {
        let outcome = SubmissionOutcome::from_dispatch(clinic_ok, client_ok);
        to_json(&SubmissionStatusDto {
            message: outcome.status_message(self.state.config().locale()),
            reset_form: outcome.resets_form(),
            clear_form: outcome.clears_form(),
        })
    }
}

// ---------------------------------------------------------------------------
// Stateless export
// ---------------------------------------------------------------------------

/// Evaluate one cell without a widget.
///
/// `table_json` is an availability table, `rules_json` and `appointments_json`
/// are feed bodies, `date` is `YYYY-MM-DD`, `time` is `HH:MM` and `now` is an
/// ISO 8601 timestamp. Returns the status as a JSON string such as
/// `"available"`.
#[wasm_bindgen(js_name = "evaluateCell")]
#[allow(clippy::too_many_arguments)]
pub fn evaluate_cell(
    table_json: &str,
    rules_json: &str,
    appointments_json: &str,
    location: &str,
    specialty: u32,
    date: &str,
    time: &str,
    now: &str,
) -> Result<String, JsValue> {
    let table = AvailabilityTable::from_json(table_json).map_err(js_err)?;
    let rules = CalendarRules::from_json(rules_json).map_err(js_err)?;
    let appointments = Appointments::from_json(appointments_json).map_err(js_err)?;
    let date: NaiveDate = parse_date(date).map_err(js_err)?;
    let time: NaiveTime = parse_time_of_day(time).map_err(js_err)?;

    let schedule = table
        .schedule(location, specialty)
        .cloned()
        .unwrap_or_default();
    let booked = schedule
        .room_id
        .map(|room| appointments.for_room(room))
        .unwrap_or_default();

    let ctx = SlotContext {
        schedule: &schedule,
        blackouts: rules.blackouts_for(specialty),
        open_exceptions: rules.open_exceptions_for(specialty),
        booked: &booked,
        now: parse_now(now)?,
    };

    to_json(&evaluate(date, time, &ctx))
}
