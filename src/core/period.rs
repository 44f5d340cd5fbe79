//! Calendar month arithmetic (UTC).
use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, Utc};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthWindow {
    first_day: NaiveDate,
}

impl MonthWindow {
    pub fn containing(timestamp: DateTime<Utc>) -> Self {
        let date = timestamp.date_naive();
        Self {
            first_day: date - Days::new(u64::from(date.day0())),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.first_day.and_time(NaiveTime::MIN).and_utc()
    }

    /// Start of the following month; `None` past the end of the calendar.
    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.first_day
            .checked_add_months(Months::new(1))
            .map(|d| d.and_time(NaiveTime::MIN).and_utc())
    }

    pub fn months_before(&self, months: u32) -> Option<Self> {
        self.first_day
            .checked_sub_months(Months::new(months))
            .map(|first_day| Self { first_day })
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        Self::containing(timestamp) == *self
    }

    pub fn label(&self) -> String {
        self.first_day.format("%b %Y").to_string()
    }
}

impl Display for MonthWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
