//! Birth-date parsing.
//!
//! Dates travel as `YYYY-MM-DD` strings between the forms and the core.
//! Built on `winnow` 0.7; month and day are range-checked against the
//! calendar, including leap years.

use crate::error::FamilyError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take_while;

/// A calendar date without time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BirthDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl BirthDate {
    /// Build a date, rejecting out-of-range months and days.
    pub fn new(year: u16, month: u8, day: u8) -> Option<Self> {
        if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
            return None;
        }
        Some(Self { year, month, day })
    }
}

fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Parse a `YYYY-MM-DD` birth date. Single-digit month and day are accepted.
pub fn parse_birth_date(input: &str) -> Result<BirthDate, FamilyError> {
    let invalid = || FamilyError::InvalidBirthDate(input.to_string());
    let (year, month, day) = parse_ymd.parse(input.trim()).map_err(|_| invalid())?;
    BirthDate::new(year, month, day).ok_or_else(invalid)
}

fn parse_ymd(input: &mut &str) -> ModalResult<(u16, u8, u8)> {
    let year = parse_digits(4, 4).parse_next(input)?;
    let _ = '-'.parse_next(input)?;
    let month = parse_digits(1, 2).parse_next(input)?;
    let _ = '-'.parse_next(input)?;
    let day = parse_digits(1, 2).parse_next(input)?;
    Ok((year as u16, month as u8, day as u8))
}

fn parse_digits<'a>(min: usize, max: usize) -> impl Parser<&'a str, u32, ErrMode<ContextError>> {
    take_while(min..=max, |c: char| c.is_ascii_digit()).try_map(str::parse::<u32>)
}

impl FromStr for BirthDate {
    type Err = FamilyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_birth_date(s)
    }
}

impl fmt::Display for BirthDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl Serialize for BirthDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BirthDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_birth_date(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_date() {
        let date = parse_birth_date("1992-10-01").unwrap();
        assert_eq!(date, BirthDate::new(1992, 10, 1).unwrap());
        assert_eq!(date.to_string(), "1992-10-01");
    }

    #[test]
    fn accepts_unpadded_month_and_day() {
        let date = parse_birth_date("2019-3-7").unwrap();
        assert_eq!((date.month, date.day), (3, 7));
        assert_eq!(date.to_string(), "2019-03-07");
    }

    #[test]
    fn leap_day_depends_on_year() {
        assert!(parse_birth_date("2024-02-29").is_ok());
        assert!(parse_birth_date("2000-02-29").is_ok());
        assert!(parse_birth_date("1900-02-29").is_err());
        assert!(parse_birth_date("2023-02-29").is_err());
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in ["", "1992", "1992-13-01", "1992-04-31", "92-10-01", "1992/10/01", "1992-10-01x"] {
            assert_eq!(
                parse_birth_date(bad),
                Err(FamilyError::InvalidBirthDate(bad.to_string())),
                "should reject {bad:?}"
            );
        }
    }

    #[test]
    fn serde_uses_string_form() {
        let date = BirthDate::new(1957, 3, 15).unwrap();
        assert_eq!(serde_json::to_string(&date).unwrap(), "\"1957-03-15\"");
        let back: BirthDate = serde_json::from_str("\"1957-03-15\"").unwrap();
        assert_eq!(back, date);
        assert!(serde_json::from_str::<BirthDate>("\"1957-02-30\"").is_err());
    }
}
