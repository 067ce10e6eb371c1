use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// An outfit scheduled for a given day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntry {
    pub id: String,
    pub user_id: String,
    pub outfit_id: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Request body for scheduling an outfit
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCalendarEntry {
    /// ISO date (`2024-05-01`) or RFC 3339 timestamp
    pub date: String,
    pub outfit_id: String,
}

impl NewCalendarEntry {
    pub fn parse_date(&self) -> AppResult<NaiveDate> {
        parse_calendar_date(&self.date)
    }
}

/// Query string for listing calendar entries
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarQuery {
    /// Month in `YYYY-MM` form
    pub month: Option<String>,
}

impl CalendarQuery {
    pub fn range(&self) -> AppResult<Option<MonthRange>> {
        self.month.as_deref().map(MonthRange::parse).transpose()
    }
}

/// Half-open date range `[start, end)` covering one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MonthRange {
    /// Parses a `YYYY-MM` month
    pub fn parse(month: &str) -> AppResult<Self> {
        let invalid = || AppError::InvalidInput(format!("Invalid month: {}", month));

        let (year, month_num) = month.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month_num.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month_num: u32 = month_num.parse().map_err(|_| invalid())?;

        let start = NaiveDate::from_ymd_opt(year, month_num, 1).ok_or_else(invalid)?;
        let end = start
            .checked_add_months(Months::new(1))
            .ok_or_else(invalid)?;

        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (reduced to its UTC day)
pub fn parse_calendar_date(value: &str) -> AppResult<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| AppError::InvalidInput(format!("Invalid date: {}", value)))
}
