//! User-facing strings for the three languages the clinic site is served in.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    /// European Portuguese, the site default.
    #[default]
    Pt,
    En,
    Es,
}

const MONTHS_PT: [&str; 12] = [
    "janeiro", "fevereiro", "março", "abril", "maio", "junho", "julho", "agosto", "setembro",
    "outubro", "novembro", "dezembro",
];
const MONTHS_EN: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];
const MONTHS_ES: [&str; 12] = [
    "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto", "septiembre",
    "octubre", "noviembre", "diciembre",
];

// Monday first.
const WEEKDAYS_PT: [&str; 7] = ["seg.", "ter.", "qua.", "qui.", "sex.", "sáb.", "dom."];
const WEEKDAYS_EN: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const WEEKDAYS_ES: [&str; 7] = ["lun", "mar", "mié", "jue", "vie", "sáb", "dom"];

impl Locale {
    /// Resolve a BCP 47 language tag such as the page's `lang` attribute.
    ///
    /// `en*` and `es*` map to English and Spanish; anything else is Portuguese.
    pub fn from_tag(tag: &str) -> Locale {
        let primary = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "en" => Locale::En,
            "es" => Locale::Es,
            _ => Locale::Pt,
        }
    }

    pub fn month_name(self, month: u32) -> &'static str {
        let names = match self {
            Locale::Pt => &MONTHS_PT,
            Locale::En => &MONTHS_EN,
            Locale::Es => &MONTHS_ES,
        };
        names[(month.clamp(1, 12) - 1) as usize]
    }

    /// Calendar header, e.g. `janeiro 2025`.
    pub fn month_label(self, year: i32, month: u32) -> String {
        format!("{} {}", self.month_name(month), year)
    }

    /// Column header for a day, e.g. `ter., 07/01` or `Tue, 1/7`.
    pub fn day_label(self, date: NaiveDate) -> String {
        let weekday = date.weekday().num_days_from_monday() as usize;
        match self {
            Locale::Pt => format!("{}, {:02}/{:02}", WEEKDAYS_PT[weekday], date.day(), date.month()),
            Locale::En => format!("{}, {}/{}", WEEKDAYS_EN[weekday], date.month(), date.day()),
            Locale::Es => format!("{}, {}/{}", WEEKDAYS_ES[weekday], date.day(), date.month()),
        }
    }

    /// Full date as written in the booking e-mail.
    pub fn date_label(self, date: NaiveDate) -> String {
        match self {
            Locale::En => date.format("%m/%d/%Y").to_string(),
            Locale::Pt | Locale::Es => date.format("%d/%m/%Y").to_string(),
        }
    }

    /// Tooltip over a booked cell.
    pub fn booked_tooltip(self) -> &'static str {
        match self {
            Locale::Pt => "Horário já ocupado",
            Locale::En => "Time slot already taken",
            Locale::Es => "Horario ya ocupado",
        }
    }

    /// Tooltip over a cell opened by an exception.
    pub fn open_exception_tooltip(self) -> &'static str {
        match self {
            Locale::Pt => "Aberto excecionalmente",
            Locale::En => "Exceptionally open",
            Locale::Es => "Abierto excepcionalmente",
        }
    }

    /// Prompt shown when the form is submitted without a slot.
    pub fn slot_required(self) -> &'static str {
        match self {
            Locale::Pt => "Por favor selecione um horário.",
            Locale::En => "Please select a time slot.",
            Locale::Es => "Por favor seleccione un horario.",
        }
    }
}
