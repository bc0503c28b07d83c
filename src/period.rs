//! Period labels and the bilingual calendar
//!
//! Payroll periods arrive as "January 2024", "Enero 2024" or plain ISO dates.
//! Everything resolves to a `CalendarMonth`, which sorts chronologically.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical month keys used by month-valued inputs
pub const SPANISH_MONTHS: [&str; 12] = [
    "Enero", "Febrero", "Marzo", "Abril", "Mayo", "Junio",
    "Julio", "Agosto", "Septiembre", "Octubre", "Noviembre", "Diciembre",
];

/// Canonical quarter keys used by quarter-valued inputs
pub const QUARTER_KEYS: [&str; 4] = ["Q1", "Q2", "Q3", "Q4"];

const MONTH_NAMES: [(&str, u32); 25] = [
    ("january", 1), ("february", 2), ("march", 3), ("april", 4),
    ("may", 5), ("june", 6), ("july", 7), ("august", 8),
    ("september", 9), ("october", 10), ("november", 11), ("december", 12),
    ("enero", 1), ("febrero", 2), ("marzo", 3), ("abril", 4),
    ("mayo", 5), ("junio", 6), ("julio", 7), ("agosto", 8),
    ("septiembre", 9), ("setiembre", 9), ("octubre", 10), ("noviembre", 11),
    ("diciembre", 12),
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Look up a month number (1-12) by English or Spanish name, case-insensitive
pub fn month_number(name: &str) -> Option<u32> {
    let lowered = name.trim().to_lowercase();
    MONTH_NAMES
        .iter()
        .find(|(candidate, _)| *candidate == lowered)
        .map(|&(_, number)| number)
}

/// Fiscal quarter of the calendar year
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    const ALL: [Quarter; 4] = [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];

    /// Quarter containing a month (1-12); None for any other number
    pub fn from_month(month: u32) -> Option<Self> {
        match month {
            1..=12 => Some(Self::ALL[((month - 1) / 3) as usize]),
            _ => None,
        }
    }

    /// Zero-based index, used for goal table lookups
    pub fn index(&self) -> usize {
        match self {
            Quarter::Q1 => 0,
            Quarter::Q2 => 1,
            Quarter::Q3 => 2,
            Quarter::Q4 => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        QUARTER_KEYS[self.index()]
    }
}

impl FromStr for Quarter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "Q1" => Ok(Quarter::Q1),
            "Q2" => Ok(Quarter::Q2),
            "Q3" => Ok(Quarter::Q3),
            "Q4" => Ok(Quarter::Q4),
            other => Err(format!("unknown quarter: {}", other)),
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A calendar month, ordered chronologically
///
/// Only built through `new` or a parsed date, so the month is always 1-12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CalendarMonth {
    year: i32,
    month: u32,
}

impl CalendarMonth {
    /// Returns None when the month number is outside 1-12
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Month number, 1-12
    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn quarter(&self) -> Quarter {
        Quarter::ALL[((self.month - 1) / 3) as usize]
    }

    /// Canonical Spanish month key, e.g. "Marzo"
    pub fn spanish_name(&self) -> &'static str {
        SPANISH_MONTHS[(self.month - 1) as usize]
    }

    fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Parse a period label into its calendar month
///
/// Accepts date-like strings (resolved to their month) or "Month Year" with an
/// English or Spanish month name. Returns None when the label cannot be placed
/// on the calendar; callers then fall back to label ordering.
pub fn parse_period(text: &str) -> Option<CalendarMonth> {
    let txt = text.trim();
    if txt.is_empty() {
        return None;
    }

    if let Some(date) = parse_date_like(txt) {
        return Some(CalendarMonth::from_date(date));
    }

    let normalized = txt.replace(['-', '/'], " ");
    let mut parts = normalized.split_whitespace();
    let month_token = parts.next()?;
    let year_token = parts.next()?;

    let year: i32 = year_token.parse().ok()?;
    let month = month_number(month_token)?;
    CalendarMonth::new(year, month)
}

fn parse_date_like(txt: &str) -> Option<NaiveDate> {
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(txt, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(txt, format) {
            return Some(datetime.date());
        }
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(txt) {
        return Some(datetime.date_naive());
    }

    // Year-month only: "2024-03" or "2024/03"
    let mut pieces = txt.split(['-', '/']);
    let (year, month) = (pieces.next()?, pieces.next()?);
    if pieces.next().is_some() || year.len() != 4 {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}
