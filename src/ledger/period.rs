use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;

/// A calendar month, the unit of ledger isolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, LedgerError> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(LedgerError::Validation(format!(
                "{year}-{month:02} is not a valid calendar month"
            )));
        }
        Ok(Self { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Days left in the period after `today`, never below one.
    ///
    /// Dates before the period count the whole month; dates after it clamp to one.
    pub fn days_remaining_after(&self, today: NaiveDate) -> u32 {
        if today < self.first_day() {
            return self.days_in_month();
        }
        if !self.contains(today) {
            return 1;
        }
        (self.days_in_month() - today.day()).max(1)
    }

    /// File stem used by the tabular storage backend, e.g. `2025_01`.
    pub fn file_stem(&self) -> String {
        format!("{}_{:02}", self.year, self.month)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = LedgerError;

    /// Accepts `YYYY-MM` or the storage form `YYYY_MM`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let (year, month) = trimmed
            .split_once(['-', '_'])
            .ok_or_else(|| LedgerError::Validation(format!("`{trimmed}` is not YYYY-MM")))?;
        let year: i32 = year
            .parse()
            .map_err(|_| LedgerError::Validation(format!("`{trimmed}` has an invalid year")))?;
        let month: u32 = month
            .parse()
            .map_err(|_| LedgerError::Validation(format!("`{trimmed}` has an invalid month")))?;
        Period::new(year, month)
    }
}
