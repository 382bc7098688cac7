use chrono::{Datelike, NaiveDate};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum YearMonthError {
    #[error("Invalid year-month '{0}': expected YYYYMM or YYYY-MM")]
    Format(String),

    #[error("Invalid month {month} in '{input}'")]
    Month { input: String, month: u32 },
}

/// A calendar month with no day component. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn days_in_month(&self) -> u32 {
        match self.month {
            4 | 6 | 9 | 11 => 30,
            2 if is_leap_year(self.year) => 29,
            2 => 28,
            _ => 31,
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.days_in_month())
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// The `YYYYMM` form used by budget data files.
    pub fn compact(&self) -> String {
        format!("{:04}{:02}", self.year, self.month)
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

impl FromStr for YearMonth {
    type Err = YearMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if !trimmed.is_ascii() {
            return Err(YearMonthError::Format(s.to_string()));
        }
        let (year_str, month_str) = match trimmed.len() {
            6 => trimmed.split_at(4),
            7 if trimmed.as_bytes()[4] == b'-' => (&trimmed[..4], &trimmed[5..]),
            _ => return Err(YearMonthError::Format(s.to_string())),
        };
        if !year_str
            .bytes()
            .chain(month_str.bytes())
            .all(|b| b.is_ascii_digit())
        {
            return Err(YearMonthError::Format(s.to_string()));
        }
        let year: i32 = year_str
            .parse()
            .map_err(|_| YearMonthError::Format(s.to_string()))?;
        let month: u32 = month_str
            .parse()
            .map_err(|_| YearMonthError::Format(s.to_string()))?;
        Self::new(year, month).ok_or_else(|| YearMonthError::Month {
            input: s.to_string(),
            month,
        })
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
