//! Academic year tags.
//!
//! Records are partitioned by an academic year tag such as `"2026-2027"`.
//! The year boundary is configurable because institutions start their year
//! in different months:
//!
//! - `ACADEMIC_YEAR_START_MONTH`: month number 1-12 (default: 4, April)
//!
//! With an April start, 2027-03-31 belongs to `"2026-2027"` and 2027-04-01
//! belongs to `"2027-2028"`.

use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_START_MONTH: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcademicYearError {
    #[error("academic year must look like YYYY-YYYY, got {0:?}")]
    Malformed(String),
    #[error("academic year must span two consecutive years, got {0:?}")]
    NotConsecutive(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AcademicYear {
    start_year: i32,
}

impl AcademicYear {
    pub const fn new(start_year: i32) -> Self {
        Self { start_year }
    }

    pub const fn start_year(&self) -> i32 {
        self.start_year
    }

    pub const fn end_year(&self) -> i32 {
        self.start_year + 1
    }

    /// The academic year a calendar date falls into.
    pub fn containing(date: NaiveDate, start_month: u32) -> Self {
        if date.month() >= start_month {
            Self::new(date.year())
        } else {
            Self::new(date.year() - 1)
        }
    }
}

impl fmt::Display for AcademicYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_year, self.end_year())
    }
}

impl FromStr for AcademicYear {
    type Err = AcademicYearError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || AcademicYearError::Malformed(s.to_string());

        let (start, end) = s.trim().split_once('-').ok_or_else(malformed)?;
        let four_digits = |part: &str| part.len() == 4 && part.bytes().all(|b| b.is_ascii_digit());
        if !four_digits(start) || !four_digits(end) {
            return Err(malformed());
        }
        let start: i32 = start.parse().map_err(|_| malformed())?;
        let end: i32 = end.parse().map_err(|_| malformed())?;

        if end != start + 1 {
            return Err(AcademicYearError::NotConsecutive(s.to_string()));
        }

        Ok(Self::new(start))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AcademicYearConfig {
    pub start_month: u32,
}

impl Default for AcademicYearConfig {
    fn default() -> Self {
        Self {
            start_month: DEFAULT_START_MONTH,
        }
    }
}

impl AcademicYearConfig {
    pub fn from_env() -> Self {
        let start_month = std::env::var("ACADEMIC_YEAR_START_MONTH")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|m| (1..=12).contains(m))
            .unwrap_or(DEFAULT_START_MONTH);

        Self { start_month }
    }

    pub fn year_for(&self, date: NaiveDate) -> AcademicYear {
        AcademicYear::containing(date, self.start_month)
    }

    /// The tag for `date`, e.g. `"2026-2027"`.
    pub fn tag_for(&self, date: NaiveDate) -> String {
        self.year_for(date).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_boundary_with_april_start() {
        let config = AcademicYearConfig::default();
        assert_eq!(config.tag_for(date(2027, 3, 31)), "2026-2027");
        assert_eq!(config.tag_for(date(2027, 4, 1)), "2027-2028");
    }

    #[test]
    fn test_january_start_matches_calendar_year() {
        let config = AcademicYearConfig { start_month: 1 };
        assert_eq!(config.tag_for(date(2026, 1, 1)), "2026-2027");
        assert_eq!(config.tag_for(date(2026, 12, 31)), "2026-2027");
    }

    #[test]
    fn test_parse_valid_tag() {
        let year: AcademicYear = "2026-2027".parse().unwrap();
        assert_eq!(year.start_year(), 2026);
        assert_eq!(year.end_year(), 2027);
        assert_eq!(year.to_string(), "2026-2027");
    }

    #[test]
    fn test_parse_rejects_non_consecutive() {
        assert_eq!(
            "2026-2028".parse::<AcademicYear>(),
            Err(AcademicYearError::NotConsecutive("2026-2028".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in [
            "2026",
            "26-27",
            "2026/2027",
            "abcd-efgh",
            "+202-+203",
            "",
            "２０２６-２０２７",
        ] {
            assert!(
                matches!(
                    input.parse::<AcademicYear>(),
                    Err(AcademicYearError::Malformed(_))
                ),
                "{input} should be malformed"
            );
        }
    }

    #[test]
    fn test_parse_trims_and_display_normalizes() {
        let year: AcademicYear = " 2026-2027 ".parse().unwrap();
        assert_eq!(year.to_string(), "2026-2027");
    }
}
