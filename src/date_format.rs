//! Specifies how calendar dates are written in JSON bodies and query strings,
//! e.g. "2024-01-31".
//!
//! Use with `#[serde(with = "crate::date_format")]` on a [time::Date] field.

use serde::{Deserialize, Deserializer, Serializer};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

/// Date format for transaction dates, e.g. "2024-01-31".
pub const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// The error for text that is not a date in the format [DATE_FORMAT].
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DateParseError {
    /// The text does not describe a valid calendar date.
    #[error("{0}")]
    Malformed(String),
    /// The year is zero, negative or written with a sign.
    ///
    /// Dates are stored as text and compared lexicographically, which only
    /// orders correctly for unsigned four digit years.
    #[error("the year must be between 0001 and 9999")]
    YearOutOfRange,
}

/// Parse a date in the format [DATE_FORMAT] with a year from 0001 to 9999.
pub fn parse_date(text: &str) -> Result<Date, DateParseError> {
    if !text.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(DateParseError::YearOutOfRange);
    }

    let date =
        Date::parse(text, DATE_FORMAT).map_err(|error| DateParseError::Malformed(error.to_string()))?;

    if date.year() < 1 {
        return Err(DateParseError::YearOutOfRange);
    }

    Ok(date)
}

pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let formatted = date
        .format(DATE_FORMAT)
        .map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&formatted)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_date(&s).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::{DateParseError, parse_date};

    #[test]
    fn parses_calendar_date() {
        assert_eq!(parse_date("2024-01-02").unwrap(), date!(2024 - 01 - 02));
    }

    #[test]
    fn rejects_impossible_date() {
        assert!(parse_date("2024-02-30").is_err());
    }

    #[test]
    fn rejects_signed_and_zero_years() {
        assert_eq!(parse_date("-0001-01-01"), Err(DateParseError::YearOutOfRange));
        assert_eq!(parse_date("+2024-01-01"), Err(DateParseError::YearOutOfRange));
        assert_eq!(parse_date("0000-06-15"), Err(DateParseError::YearOutOfRange));
    }

    #[test]
    fn accepts_first_year() {
        assert_eq!(parse_date("0001-01-01"), Ok(date!(0001 - 01 - 01)));
    }

    #[test]
    fn rejects_other_formats() {
        assert!(parse_date("02/01/2024").is_err());
        assert!(parse_date("2024-1-2").is_err());
        assert!(parse_date("").is_err());
    }
}
