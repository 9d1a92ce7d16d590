use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

/// The text could not be read as a [`DateFormat`]
#[derive(Debug, thiserror::Error)]
#[error("Unknown date format `{0}`, expected one of `dd/mm/yyyy`, `yyyy-mm-dd`")]
pub struct UnknownDateFormat(String);

/// The way dates are written in a sales file
///
/// One format applies to every date column of a dataset. Mixed formats within
/// a single file are not supported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DateFormat {
    /// `dd/mm/yyyy`, e.g. `31/01/2024`
    #[default]
    DayMonthYear,
    /// `yyyy-mm-dd`, e.g. `2024-01-31`
    YearMonthDay,
}

impl DateFormat {
    /// The chrono pattern used for parsing
    pub fn pattern(self) -> &'static str {
        match self {
            DateFormat::DayMonthYear => "%d/%m/%Y",
            DateFormat::YearMonthDay => "%Y-%m-%d",
        }
    }

    pub fn parse(self, value: &str) -> Result<NaiveDate, chrono::ParseError> {
        NaiveDate::parse_from_str(value, self.pattern())
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateFormat::DayMonthYear => f.write_str("dd/mm/yyyy"),
            DateFormat::YearMonthDay => f.write_str("yyyy-mm-dd"),
        }
    }
}

impl FromStr for DateFormat {
    type Err = UnknownDateFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dd/mm/yyyy" | "day-month-year" => Ok(DateFormat::DayMonthYear),
            "yyyy-mm-dd" | "year-month-day" => Ok(DateFormat::YearMonthDay),
            _ => Err(UnknownDateFormat(s.to_owned())),
        }
    }
}
