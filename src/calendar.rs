use chrono::{Datelike, Days, Local, Months, NaiveDate};

/// Source of "today" as a local calendar date.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Reads the local wall clock on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always answers the same date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

// ── Arithmetic ───────────────────────────────────────────────

pub fn add_days(date: NaiveDate, n: i64) -> NaiveDate {
    let step = Days::new(n.unsigned_abs());
    let moved = if n >= 0 {
        date.checked_add_days(step)
    } else {
        date.checked_sub_days(step)
    };
    // Saturate at chrono's representable range instead of panicking.
    moved.unwrap_or(if n >= 0 { NaiveDate::MAX } else { NaiveDate::MIN })
}

/// First day of the month `n` months after (or before) `date`'s month.
pub fn add_months(date: NaiveDate, n: i64) -> NaiveDate {
    let first = month_start(date);
    let step = Months::new(u32::try_from(n.unsigned_abs()).unwrap_or(u32::MAX));
    let moved = if n >= 0 {
        first.checked_add_months(step)
    } else {
        first.checked_sub_months(step)
    };
    moved.unwrap_or(if n >= 0 { NaiveDate::MAX } else { NaiveDate::MIN })
}

/// Whole days from `a` to `b`; positive if `b` is later.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

/// Fractional months from `a` to `b`, counting every month as 30 days.
/// Only `b`'s day-of-month contributes to the fraction.
pub fn months_between(a: NaiveDate, b: NaiveDate) -> f64 {
    let whole = month_index(b) - month_index(a);
    whole as f64 + f64::from(b.day() - 1) / 30.0
}

/// Calendar-month difference, ignoring the day.
pub fn month_index_diff(a: NaiveDate, b: NaiveDate) -> i64 {
    month_index(b) - month_index(a)
}

fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

/// Monday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let from_monday = i64::from(date.weekday().num_days_from_monday());
    add_days(date, -from_monday)
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

// ── Predicates ───────────────────────────────────────────────

pub fn is_same_day(a: NaiveDate, b: NaiveDate) -> bool {
    a == b
}

pub fn is_same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// `week_start <= date <= week_start + 6`.
pub fn is_in_week(date: NaiveDate, week_start: NaiveDate) -> bool {
    week_start <= date && date <= add_days(week_start, 6)
}

// ── Labels ───────────────────────────────────────────────────

/// `"Jan 15"`
pub fn day_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// `"Jan 15 - Jan 21"`
pub fn week_label(start: NaiveDate) -> String {
    format!("{} - {}", day_label(start), day_label(add_days(start, 6)))
}

/// `"Jan 2025"`
pub fn month_label(date: NaiveDate) -> String {
    date.format("%b %Y").to_string()
}

/// `MM.DD.YYYY`, the board's display format for form fields.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%m.%d.%Y").to_string()
}

pub fn to_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_iso(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}
