use std::iter::FusedIterator;

use chrono::NaiveDate;

use crate::calendar;

use super::Granularity;

/// One header cell of the timescale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// First day covered by the column.
    pub date: NaiveDate,
    pub label: String,
    /// True iff "today" falls inside this column's span.
    pub is_current_period: bool,
}

/// Column sequence for one window snapshot. `today` is captured when the
/// iterator is created; re-read the engine after midnight.
#[derive(Debug, Clone)]
pub struct Columns {
    granularity: Granularity,
    start: NaiveDate,
    today: NaiveDate,
    next: usize,
    len: usize,
}

impl Columns {
    pub(super) fn new(granularity: Granularity, start: NaiveDate, today: NaiveDate, len: usize) -> Self {
        Self {
            granularity,
            start,
            today,
            next: 0,
            len,
        }
    }

    fn column_at(&self, index: usize) -> Column {
        let date = self.granularity.step(self.start, index as i64);
        let (label, is_current_period) = match self.granularity {
            Granularity::Day => (calendar::day_label(date), calendar::is_same_day(date, self.today)),
            Granularity::Week => (calendar::week_label(date), calendar::is_in_week(self.today, date)),
            Granularity::Month => (calendar::month_label(date), calendar::is_same_month(date, self.today)),
        };
        Column {
            date,
            label,
            is_current_period,
        }
    }
}

impl Iterator for Columns {
    type Item = Column;

    fn next(&mut self) -> Option<Column> {
        if self.next >= self.len {
            return None;
        }
        let column = self.column_at(self.next);
        self.next += 1;
        Some(column)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Columns {}

impl FusedIterator for Columns {}
