//! `slots` CLI: preview a week of the booking calendar and validate
//! availability tables without a browser.
//!
//! ## Usage
//!
//! ```sh
//! # Render the week containing 2025-01-07 for Porto, specialty 1
//! slots render --location Porto --specialty 1 --week 2025-01-07 \
//!     --rules calendar-rules.json --appointments appointments.json
//!
//! # Same, as the JSON view-model the widget produces
//! slots render --location Porto --specialty 1 --week 2025-01-07 --format json
//!
//! # Validate a hand-edited availability table
//! slots check -i availability.json
//!
//! # Settings from a file, overridden by SLOTS__* environment variables
//! SLOTS__LOCALE=en slots --config widget.toml render --location Porto --specialty 1
//! ```

mod logging;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use slot_engine::grid::{CalendarView, CellView};
use slot_engine::interval::{parse_date, parse_timestamp};
use slot_engine::table::SpecialtySchedule;
use slot_engine::{
    AppState, AvailabilityTable, CellStatus, Recurrence, RenderOutcome, WidgetConfig,
};
use std::io::{self, Read};
use tracing::info;

#[derive(Parser)]
#[command(name = "slots", version, about = "Clinic booking calendar preview")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Widget configuration file (JSON, TOML or YAML)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log engine decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one week of the calendar
    Render {
        /// Availability table (built-in clinic table if omitted)
        #[arg(long)]
        table: Option<String>,
        /// Calendar rules feed body
        #[arg(long)]
        rules: Option<String>,
        /// Appointments feed body
        #[arg(long)]
        appointments: Option<String>,
        #[arg(long)]
        location: String,
        /// Specialty index as used in the availability table
        #[arg(long)]
        specialty: u32,
        /// Any date in the week to show (YYYY-MM-DD); defaults to the current week
        #[arg(long)]
        week: Option<String>,
        /// The instant treated as "now" (ISO 8601); defaults to the system clock
        #[arg(long)]
        now: Option<String>,
        #[arg(long, value_enum, default_value = "text")]
        format: Format,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Validate an availability table and list its slots
    Check {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Render {
            table,
            rules,
            appointments,
            location,
            specialty,
            week,
            now,
            format,
            output,
        } => {
            let now: DateTime<Utc> = match now.as_deref() {
                Some(s) => parse_timestamp(s).context("Invalid --now")?,
                None => Utc::now(),
            };
            let table = match table.as_deref() {
                Some(path) => AvailabilityTable::from_json(&read_input(Some(path))?)
                    .with_context(|| format!("Invalid availability table: {}", path))?,
                None => AvailabilityTable::clinic_default()?,
            };

            // The cursor starts on the week of `now`; move it to the requested week.
            let mut state = AppState::new(table, config, now)?;
            if let Some(week) = week.as_deref() {
                let target = parse_date(week).context("Invalid --week")?;
                let offset = (slot_engine::grid::monday_of(target) - state.cursor().monday)
                    .num_weeks();
                if offset != 0 {
                    state.change_week(offset);
                }
            }
            state.select(&location, specialty);

            // An omitted feed file previews as an empty feed.
            let rules_body = match rules.as_deref() {
                Some(path) => read_input(Some(path))?,
                None => "{}".to_string(),
            };
            let appointments_body = match appointments.as_deref() {
                Some(path) => read_input(Some(path))?,
                None => "[]".to_string(),
            };
            let token = state.begin_refresh();
            state.complete_refresh(token, Some(&rules_body), Some(&appointments_body));

            let view = match state.render(now)? {
                RenderOutcome::Ready(view) => view,
                RenderOutcome::Deferred => anyhow::bail!("render deferred by a pending refresh"),
            };
            info!(
                selectable = view.cells().filter(|c| c.selectable).count(),
                "week rendered"
            );

            let rendered = match format {
                Format::Json => serde_json::to_string_pretty(&view)?,
                Format::Text => render_text(&view),
            };
            write_output(output.as_deref(), &rendered)?;
        }
        Commands::Check { input } => {
            let json = read_input(input.as_deref())?;
            let table =
                AvailabilityTable::from_json(&json).context("Invalid availability table")?;
            if table.is_empty() {
                anyhow::bail!("Availability table has no schedules");
            }
            for (location, specialty, schedule) in table.entries() {
                println!("{}", describe_schedule(location, specialty, schedule));
            }
        }
    }

    Ok(())
}

/// Layer an optional config file and `SLOTS__*` environment variables over
/// the defaults.
fn load_config(path: Option<&str>) -> Result<WidgetConfig> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::with_name(path).required(true));
    }
    builder = builder.add_source(
        config::Environment::with_prefix("SLOTS")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let mut value: serde_json::Value = builder
        .build()
        .context("Failed to load configuration")?
        .try_deserialize()
        .context("Failed to read configuration")?;

    // try_parsing turns a numeric SLOTS__VERSION into a number.
    if let Some(version) = value.get_mut("version") {
        if !version.is_string() {
            *version = serde_json::Value::String(version.to_string());
        }
    }
    let config = WidgetConfig::from_json(&value.to_string()).context("Invalid configuration")?;
    Ok(config)
}

const CELL_WIDTH: usize = 14;

fn cell_symbol(cell: &CellView) -> &'static str {
    match cell.status {
        CellStatus::Available => "A",
        CellStatus::OpenException => "O",
        CellStatus::Booked => "B",
        CellStatus::Blocked => "X",
        CellStatus::OutOfRange => ".",
    }
}

/// Plain-text grid: one column per weekday, one row per time tick.
fn render_text(view: &CalendarView) -> String {
    let mut out = format!("{}  {} / {}\n", view.month_label, view.location, view.specialty);
    if view.hidden {
        out.push_str("(no calendar for this location and specialty)\n");
        return out;
    }

    out.push_str(&" ".repeat(6));
    for day in &view.days {
        let label = if day.is_past {
            format!("{}*", day.label)
        } else {
            day.label.clone()
        };
        out.push_str(&format!("{:<width$}", label, width = CELL_WIDTH));
    }
    out.push('\n');

    for row in &view.rows {
        out.push_str(&format!("{:<6}", row.time));
        for cell in &row.cells {
            out.push_str(&format!("{:<width$}", cell_symbol(cell), width = CELL_WIDTH));
        }
        out.push('\n');
    }
    out.push_str("A available  O exceptionally open  B booked  X blocked  . unavailable  * past\n");
    out
}

fn describe_schedule(location: &str, specialty: u32, schedule: &SpecialtySchedule) -> String {
    let room = schedule
        .room_id
        .map(|r| r.to_string())
        .unwrap_or_else(|| "-".to_string());
    let mut lines = vec![format!("{} / {} (room {})", location, specialty, room)];
    for (weekday, slots) in &schedule.day_slots {
        for slot in slots {
            let repeat = match slot.recurrence {
                Recurrence::Weekly => "weekly".to_string(),
                Recurrence::Biweekly { anchor } => format!("biweekly from {}", anchor),
                Recurrence::Monthly { day_of_month } => format!("monthly on day {}", day_of_month),
            };
            lines.push(format!(
                "  day {}  {}-{}  {}",
                weekday,
                slot.start.format("%H:%M"),
                slot.end.format("%H:%M"),
                repeat
            ));
        }
    }
    lines.join("\n")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
