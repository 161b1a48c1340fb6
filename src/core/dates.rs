//! Day-first date normalization
//!
//! Every date the registry stores or displays uses the canonical form
//! `dd/mm/yyyy`. Spreadsheets, manual entry and the backend disagree on
//! shape, so [`normalize_date`] folds the accepted encodings into that form
//! and [`is_valid_date`] checks the result against the Gregorian calendar.
//!
//! Ambiguous two-number prefixes are always read day first: `1/13/2001`
//! becomes `01/13/2001` (and then fails validation), never 13 January.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;

use crate::types::CellValue;

/// Spreadsheet serial number of 1970-01-01.
pub const SERIAL_UNIX_EPOCH: i64 = 25569;

/// Oldest year accepted by validation.
pub const MIN_YEAR: i32 = 1900;

/// Newest year accepted by validation.
pub const MAX_YEAR: i32 = 2100;

struct DatePatterns {
    canonical: Regex,
    iso: Regex,
    dashed_dmy: Regex,
    loose_dmy: Regex,
    slashed_ymd: Regex,
}

/// `None` only if a pattern fails to compile; callers then treat every
/// value as unrecognised.
fn patterns() -> Option<&'static DatePatterns> {
    static PATTERNS: OnceLock<Option<DatePatterns>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            Some(DatePatterns {
                canonical: Regex::new(r"^([0-9]{2})/([0-9]{2})/([0-9]{4})$").ok()?,
                iso: Regex::new(r"^([0-9]{4})-([0-9]{1,2})-([0-9]{1,2})$").ok()?,
                dashed_dmy: Regex::new(r"^[0-9]{2}-[0-9]{2}-[0-9]{4}$").ok()?,
                loose_dmy: Regex::new(r"^([0-9]{1,2})([/.\-])([0-9]{1,2})([/.\-])([0-9]{4})$")
                    .ok()?,
                slashed_ymd: Regex::new(r"^([0-9]{4})/([0-9]{1,2})/([0-9]{1,2})$").ok()?,
            })
        })
        .as_ref()
}

/// Normalize a raw cell to `dd/mm/yyyy`.
///
/// Numbers are spreadsheet serial dates. Text goes through
/// [`normalize_date_str`]. Empty cells normalize to an empty string.
pub fn normalize_date(value: &CellValue) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Number(serial) => {
            serial_to_canonical(*serial).unwrap_or_else(|| value.to_string())
        }
        CellValue::Text(text) => normalize_date_str(text),
    }
}

/// Normalize date text to `dd/mm/yyyy`, returning the (trimmed) input
/// unchanged when no accepted shape matches.
///
/// Shapes are tried in a fixed order and the first match wins:
/// `dd/mm/yyyy`, `yyyy-mm-dd`, `dd-mm-yyyy`, day-first `d/m/yyyy` with `/`,
/// `-` or `.` separators, `yyyy/mm/dd`, then free calendar text such as
/// `15 August 1990` or `15 Agustus 1990`.
pub fn normalize_date_str(raw: &str) -> String {
    let s = raw.trim();
    if s.is_empty() {
        return String::new();
    }

    let Some(p) = patterns() else {
        return s.to_string();
    };

    if p.canonical.is_match(s) {
        return s.to_string();
    }

    if let Some(c) = p.iso.captures(s) {
        return join_dmy(&c[3], &c[2], &c[1]);
    }

    if p.dashed_dmy.is_match(s) {
        return s.replace('-', "/");
    }

    if let Some(c) = p.loose_dmy.captures(s) {
        // Mixed separators (`1/2-2001`) are not a recognised shape.
        if c[2] == c[4] {
            return join_dmy(&c[1], &c[3], &c[5]);
        }
    }

    if let Some(c) = p.slashed_ymd.captures(s) {
        return join_dmy(&c[3], &c[2], &c[1]);
    }

    parse_calendar_text(s)
        .map(format_canonical)
        .unwrap_or_else(|| s.to_string())
}

/// Convert a spreadsheet serial day number; the fractional time part is dropped.
pub fn serial_to_canonical(serial: f64) -> Option<String> {
    serial_to_date(serial).map(format_canonical)
}

pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let offset = (serial.floor() as i64).checked_sub(SERIAL_UNIX_EPOCH)?;
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
    if offset >= 0 {
        epoch.checked_add_days(Days::new(offset as u64))
    } else {
        epoch.checked_sub_days(Days::new(offset.unsigned_abs()))
    }
}

/// True for a real calendar date in canonical form within
/// [`MIN_YEAR`]..=[`MAX_YEAR`]. Empty input means "no date" and is valid.
pub fn is_valid_date(value: &str) -> bool {
    if value.trim().is_empty() {
        return true;
    }

    let Some(c) = patterns().and_then(|p| p.canonical.captures(value)) else {
        return false;
    };

    let (Ok(day), Ok(month), Ok(year)) = (
        c[1].parse::<u32>(),
        c[2].parse::<u32>(),
        c[3].parse::<i32>(),
    ) else {
        return false;
    };

    if !(1..=12).contains(&month) || !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return false;
    }

    day >= 1 && day <= days_in_month(year, month)
}

pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Days in `month` (1-12) of `year`; 0 for an out-of-range month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

pub fn format_canonical(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Today's local date in canonical form, for report headers and file names.
pub fn today_canonical() -> String {
    format_canonical(chrono::Local::now().date_naive())
}

/// Convert a stored date to the `yyyy-mm-dd` shape used by date inputs on
/// edit forms. Unrecognised values come back unchanged.
pub fn to_date_input(value: &str) -> String {
    let s = value.trim();
    if s.is_empty() {
        return String::new();
    }

    let normalized = normalize_date_str(s);
    if let Some(c) = patterns().and_then(|p| p.canonical.captures(&normalized)) {
        return format!("{}-{}-{}", &c[3], &c[2], &c[1]);
    }
    s.to_string()
}

fn join_dmy(day: &str, month: &str, year: &str) -> String {
    format!("{:0>2}/{:0>2}/{}", day, month, year)
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const TEXT_DATE_FORMATS: &[&str] = &[
    "%d %B %Y",
    "%d-%B-%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%A, %d %B %Y",
    "%A %d %B %Y",
];

const INDONESIAN_MONTHS: &[(&str, &str)] = &[
    ("januari", "January"),
    ("februari", "February"),
    ("pebruari", "February"),
    ("maret", "March"),
    ("april", "April"),
    ("mei", "May"),
    ("juni", "June"),
    ("juli", "July"),
    ("agustus", "August"),
    ("agu", "August"),
    ("agt", "August"),
    ("september", "September"),
    ("oktober", "October"),
    ("okt", "October"),
    ("november", "November"),
    ("nopember", "November"),
    ("desember", "December"),
    ("des", "December"),
];

/// Free-form calendar text: timestamps, RFC 2822/3339, English and
/// Indonesian month names.
fn parse_calendar_text(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    parse_month_name(s).or_else(|| parse_month_name(&translate_indonesian_months(s)))
}

fn parse_month_name(s: &str) -> Option<NaiveDate> {
    TEXT_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn translate_indonesian_months(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            word.split('-')
                .map(|token| {
                    let lower = token.trim_end_matches(',').to_lowercase();
                    INDONESIAN_MONTHS
                        .iter()
                        .find(|(id, _)| *id == lower)
                        .map(|(_, en)| en.to_string())
                        .unwrap_or_else(|| token.to_string())
                })
                .collect::<Vec<_>>()
                .join("-")
        })
        .collect::<Vec<_>>()
        .join(" ")
}
