mod columns;

pub use columns::{Column, Columns};

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use tracing::debug;

use crate::calendar::{self, Clock};
use crate::limits::{MAX_EXPAND_BUFFER, MAX_INITIAL_COLUMNS};

/// Unit used for columns and for measuring positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Day,
    Week,
    Month,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
        }
    }

    /// Move `date` by `n` units. Month steps land on the first of the month.
    pub fn step(&self, date: NaiveDate, n: i64) -> NaiveDate {
        match self {
            Granularity::Day => calendar::add_days(date, n),
            Granularity::Week => calendar::add_days(date, n.saturating_mul(7)),
            Granularity::Month => calendar::add_months(date, n),
        }
    }

    /// First day of the unit containing `date`.
    pub fn unit_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Day => date,
            Granularity::Week => calendar::week_start(date),
            Granularity::Month => calendar::month_start(date),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Granularity::Day),
            "week" => Ok(Granularity::Week),
            "month" => Ok(Granularity::Month),
            other => Err(format!("unknown granularity: {other}")),
        }
    }
}

/// Pixel width of one column, per granularity. The board uses one constant
/// for all three; separate values remain configurable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnWidths {
    pub day: f64,
    pub week: f64,
    pub month: f64,
}

impl ColumnWidths {
    pub const DEFAULT_WIDTH: f64 = 100.0;

    pub fn uniform(width: f64) -> Self {
        Self {
            day: width,
            week: width,
            month: width,
        }
    }

    pub fn get(&self, granularity: Granularity) -> f64 {
        match granularity {
            Granularity::Day => self.day,
            Granularity::Week => self.week,
            Granularity::Month => self.month,
        }
    }
}

impl Default for ColumnWidths {
    fn default() -> Self {
        Self::uniform(Self::DEFAULT_WIDTH)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimescaleConfig {
    /// Columns materialized by `center_on_today`.
    pub initial_columns: u32,
    /// Units added per `expand_past` / `expand_future`.
    pub expand_buffer: u32,
    /// Floor for `bar_width`, in pixels.
    pub min_bar_width: f64,
    pub column_widths: ColumnWidths,
}

impl Default for TimescaleConfig {
    fn default() -> Self {
        Self {
            initial_columns: 12,
            expand_buffer: 6,
            min_bar_width: 80.0,
            column_widths: ColumnWidths::default(),
        }
    }
}

/// Owns the granularity and the materialized `[view_start, view_end]`
/// window, and maps dates to pixel offsets within it.
///
/// `view_start` and `view_end` are always the first day of a unit. The
/// window only grows until the next `set_granularity` / `center_on_today`.
pub struct TimescaleEngine {
    granularity: Granularity,
    view_start: NaiveDate,
    view_end: NaiveDate,
    config: TimescaleConfig,
    clock: Box<dyn Clock>,
}

impl TimescaleEngine {
    /// Starts in month view, centered on today. Window sizes are clamped to
    /// `1..=MAX_INITIAL_COLUMNS` and `1..=MAX_EXPAND_BUFFER`.
    pub fn new(mut config: TimescaleConfig, clock: impl Clock + 'static) -> Self {
        config.initial_columns = config.initial_columns.clamp(1, MAX_INITIAL_COLUMNS);
        config.expand_buffer = config.expand_buffer.clamp(1, MAX_EXPAND_BUFFER);
        let today = clock.today();
        let mut engine = Self {
            granularity: Granularity::Month,
            view_start: today,
            view_end: today,
            config,
            clock: Box::new(clock),
        };
        engine.center_on_today();
        engine
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn view_start(&self) -> NaiveDate {
        self.view_start
    }

    pub fn view_end(&self) -> NaiveDate {
        self.view_end
    }

    pub fn config(&self) -> &TimescaleConfig {
        &self.config
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Switch granularity. Always re-centers; expansions are discarded.
    pub fn set_granularity(&mut self, granularity: Granularity) {
        self.granularity = granularity;
        metrics::counter!(
            crate::observability::GRANULARITY_CHANGES_TOTAL,
            "granularity" => granularity.as_str()
        )
        .increment(1);
        self.center_on_today();
    }

    /// Reset the window to `initial_columns` units with today's unit at
    /// index `initial_columns / 2`.
    pub fn center_on_today(&mut self) {
        let columns = i64::from(self.config.initial_columns);
        let offset = columns / 2;
        let anchor = self.granularity.unit_start(self.today());
        self.view_start = self.granularity.step(anchor, -offset);
        self.view_end = self.granularity.step(self.view_start, columns - 1);
        debug!(
            granularity = %self.granularity,
            view_start = %self.view_start,
            view_end = %self.view_end,
            "timescale centered on today"
        );
    }

    pub fn column_width(&self) -> f64 {
        self.config.column_widths.get(self.granularity)
    }

    /// Units between `view_start` and `view_end`, inclusive.
    pub fn total_columns(&self) -> usize {
        let n = match self.granularity {
            Granularity::Day => calendar::days_between(self.view_start, self.view_end) + 1,
            Granularity::Week => {
                let days = calendar::days_between(self.view_start, self.view_end);
                (days + 6).div_euclid(7) + 1
            }
            Granularity::Month => calendar::month_index_diff(self.view_start, self.view_end) + 1,
        };
        usize::try_from(n).unwrap_or(0)
    }

    pub fn total_width(&self) -> f64 {
        self.total_columns() as f64 * self.column_width()
    }

    /// Header columns for the current window, starting at `view_start`.
    pub fn columns(&self) -> Columns {
        Columns::new(self.granularity, self.view_start, self.today(), self.total_columns())
    }

    /// First and last calendar day covered by the rendered columns.
    pub fn visible_range(&self) -> (NaiveDate, NaiveDate) {
        let last = match self.granularity {
            Granularity::Day => self.view_end,
            Granularity::Week => calendar::add_days(self.view_end, 6),
            Granularity::Month => calendar::add_days(calendar::add_months(self.view_end, 1), -1),
        };
        (self.view_start, last)
    }

    // ── Coordinates ──────────────────────────────────────────

    /// Pixel offset of `start` from the left edge of `view_start`. Not
    /// clamped: dates outside the window give negative or overflowing
    /// offsets.
    pub fn bar_left(&self, start: NaiveDate) -> f64 {
        let units = match self.granularity {
            Granularity::Day => calendar::days_between(self.view_start, start) as f64,
            Granularity::Week => calendar::days_between(self.view_start, start) as f64 / 7.0,
            Granularity::Month => calendar::months_between(self.view_start, start),
        };
        units * self.column_width()
    }

    /// Pixel width of a bar covering `[start, end]` with the end day
    /// included, never narrower than `min_bar_width`.
    pub fn bar_width(&self, start: NaiveDate, end: NaiveDate) -> f64 {
        let inclusive_days = (calendar::days_between(start, end) + 1) as f64;
        let units = match self.granularity {
            Granularity::Day => inclusive_days,
            Granularity::Week => inclusive_days / 7.0,
            Granularity::Month => inclusive_days / 30.0,
        };
        (units * self.column_width()).max(self.config.min_bar_width)
    }

    /// Start date of the column under `offset_x`. Sub-column offsets snap
    /// down to the column's first day.
    pub fn date_at(&self, offset_x: f64) -> NaiveDate {
        let index = (offset_x / self.column_width()).floor();
        if !index.is_finite() {
            return self.view_start;
        }
        self.granularity.step(self.view_start, index as i64)
    }

    /// `bar_left(today)`; may fall outside the rendered width.
    pub fn today_position(&self) -> f64 {
        self.bar_left(self.today())
    }

    // ── Expansion ────────────────────────────────────────────

    /// Move `view_start` back by `expand_buffer` units. Returns the number
    /// of columns prepended.
    pub fn expand_past(&mut self) -> usize {
        let before = self.total_columns();
        self.view_start = self
            .granularity
            .step(self.view_start, -i64::from(self.config.expand_buffer));
        let added = self.total_columns() - before;
        metrics::counter!(crate::observability::WINDOW_EXPANSIONS_TOTAL, "direction" => "past").increment(1);
        debug!(added, view_start = %self.view_start, "expanded window into the past");
        added
    }

    /// Move `view_end` forward by `expand_buffer` units. Returns the number
    /// of columns appended.
    pub fn expand_future(&mut self) -> usize {
        let before = self.total_columns();
        self.view_end = self
            .granularity
            .step(self.view_end, i64::from(self.config.expand_buffer));
        let added = self.total_columns() - before;
        metrics::counter!(crate::observability::WINDOW_EXPANSIONS_TOTAL, "direction" => "future").increment(1);
        debug!(added, view_end = %self.view_end, "expanded window into the future");
        added
    }

    /// Scroll delta that keeps the viewport still after `expand_past`
    /// prepended `added` columns.
    pub fn scroll_compensation(&self, added: usize) -> f64 {
        added as f64 * self.column_width()
    }
}
