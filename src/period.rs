//! The month/year period used to scope reports and charts.

use std::fmt::Display;

use serde::Deserialize;
use time::{Date, Month};

use crate::Error;

/// A calendar month and year that scopes a report or chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    /// The calendar month.
    pub month: Month,
    /// The calendar year.
    pub year: i32,
}

impl Period {
    /// Create a period from a raw month number.
    ///
    /// # Errors
    /// Returns an [Error::InvalidMonth] if `month` is outside of 1 through 12.
    pub fn new(month: u8, year: i32) -> Result<Self, Error> {
        let month = Month::try_from(month).map_err(|_| Error::InvalidMonth(month))?;

        Ok(Self { month, year })
    }

    /// The period containing `date`.
    pub fn containing(date: Date) -> Self {
        Self {
            month: date.month(),
            year: date.year(),
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.month, self.year)
    }
}

/// The month/year query string sent by the period picker.
///
/// Missing fields fall back to the current month so that `/report` without a
/// query string shows the month in progress.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    /// The selected month, 1 through 12.
    pub month: Option<u8>,
    /// The selected year.
    pub year: Option<i32>,
}

impl PeriodQuery {
    /// Resolve the query into a [Period], defaulting missing fields to the
    /// month containing `today`.
    ///
    /// # Errors
    /// Returns an [Error::InvalidMonth] if the query names a month outside of
    /// 1 through 12.
    pub fn resolve(&self, today: Date) -> Result<Period, Error> {
        Period::new(
            self.month.unwrap_or_else(|| u8::from(today.month())),
            self.year.unwrap_or_else(|| today.year()),
        )
    }
}
