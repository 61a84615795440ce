//! # slot-engine
//!
//! Appointment-slot availability for a clinic booking calendar.
//!
//! Given a static availability table (location → specialty → weekday → time
//! ranges with weekly, biweekly or monthly recurrence), the remotely published
//! calendar rules (blackouts and exceptional openings) and the appointments
//! already booked, the engine decides for every cell of a Monday–Friday grid
//! whether it can be booked. All comparisons happen in UTC.
//!
//! ## Modules
//!
//! - [`recurrence`]: which weeks or days a slot applies to
//! - [`table`]: the availability table and its JSON form
//! - [`feeds`]: calendar-rules and appointments feed parsing
//! - [`evaluator`]: per-cell status decision
//! - [`grid`]: week columns, time rows, navigation cursor, view-model
//! - [`state`]: widget state with ordered feed refreshes
//! - [`booking`]: request validation, e-mail payload, submission status
//! - [`config`], [`locale`], [`interval`], [`error`]

pub mod booking;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod feeds;
pub mod grid;
pub mod interval;
pub mod locale;
pub mod recurrence;
pub mod state;
pub mod table;

pub use config::WidgetConfig;
pub use error::SlotError;
pub use evaluator::{evaluate, CellStatus, SlotContext};
pub use feeds::{Appointments, CalendarRules};
pub use grid::{render_week, CalendarCursor, CalendarView};
pub use recurrence::{should_show, AvailabilitySlot, Recurrence, MISSING_RECURRENCE_FALLBACK};
pub use state::{AppState, RefreshOutcome, RefreshToken, RenderOutcome};
pub use table::AvailabilityTable;
