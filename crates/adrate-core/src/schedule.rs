//! Publication calendar types.
//!
//! Schedules arrive from the rate-table provider with the month stored
//! either as `"YYYY-MM"` or as a month name plus a separate `year`. Both
//! shapes are normalized here, at deserialization time, into a canonical
//! [`IssueKey`] so nothing downstream re-parses month strings.

use chrono::{Datelike, Month, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while normalizing schedule months.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// Month number outside 1..=12.
    #[error("month {0} is out of range [1, 12]")]
    MonthOutOfRange(u32),
    /// Month text could not be read as a number, `YYYY-MM` or month name.
    #[error("unrecognised month: {0:?}")]
    UnrecognisedMonth(String),
    /// Month given by name or number without an accompanying year.
    #[error("month {0:?} has no year")]
    MissingYear(String),
}

/// Canonical `(year, month)` pair identifying one issue slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IssueKey {
    pub year: i32,
    /// 1-based month.
    pub month: u32,
}

impl IssueKey {
    pub fn new(year: i32, month: u32) -> Result<Self, ScheduleError> {
        if !(1..=12).contains(&month) {
            return Err(ScheduleError::MonthOutOfRange(month));
        }
        Ok(Self { year, month })
    }

    /// Key of the month containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Calendar arithmetic on whole months, carrying into the year.
    pub fn add_months(self, months: u32) -> Self {
        let zero_based =
            i64::from(self.year) * 12 + i64::from(self.month) - 1 + i64::from(months);
        Self {
            year: zero_based.div_euclid(12) as i32,
            month: zero_based.rem_euclid(12) as u32 + 1,
        }
    }

    /// First calendar day of the month.
    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Resolve a month field that may be `"2025-06"`, `"6"`, `"June"` or `"Jun"`.
    /// Name and bare-number forms need `year`.
    pub fn parse_month(text: &str, year: Option<i32>) -> Result<Self, ScheduleError> {
        let text = text.trim();
        if let Some((y, m)) = text.split_once('-') {
            // Tolerate a trailing day component ("2025-06-01").
            let m = m.split('-').next().unwrap_or(m);
            let year = y
                .parse::<i32>()
                .map_err(|_| ScheduleError::UnrecognisedMonth(text.to_string()))?;
            let month = m
                .parse::<u32>()
                .map_err(|_| ScheduleError::UnrecognisedMonth(text.to_string()))?;
            return Self::new(year, month);
        }
        let month = match text.parse::<u32>() {
            Ok(n) => n,
            Err(_) => text
                .parse::<Month>()
                .map_err(|_| ScheduleError::UnrecognisedMonth(text.to_string()))?
                .number_from_month(),
        };
        let year = year.ok_or_else(|| ScheduleError::MissingYear(text.to_string()))?;
        Self::new(year, month)
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for IssueKey {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.contains('-') {
            return Err(ScheduleError::UnrecognisedMonth(s.to_string()));
        }
        Self::parse_month(s, None)
    }
}

impl TryFrom<String> for IssueKey {
    type Error = ScheduleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IssueKey> for String {
    fn from(key: IssueKey) -> Self {
        key.to_string()
    }
}

/// One publication slot with its production deadlines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ScheduleRecord", into = "ScheduleRecord")]
pub struct ScheduleEntry {
    pub key: IssueKey,
    pub copy_deadline: Option<NaiveDate>,
    /// Absent for leaflet schedules.
    pub print_deadline: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
}

impl ScheduleEntry {
    pub fn new(key: IssueKey) -> Self {
        Self {
            key,
            copy_deadline: None,
            print_deadline: None,
            delivery_date: None,
        }
    }

    /// Date shown to customers: the delivery date, or the first of the month.
    pub fn display_date(&self) -> Option<NaiveDate> {
        self.delivery_date.or_else(|| self.key.first_day())
    }

    /// Whether the issue is still to come on `today`: its delivery date, or
    /// the first of its month when undated, is not before `today`.
    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.display_date().is_some_and(|d| d >= today)
    }
}

/// Month as it appears in provider data: a number or free text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MonthField {
    Number(u32),
    Text(String),
}

/// Wire shape of a schedule entry before month normalization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub month: MonthField,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copy_deadline: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print_deadline: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<NaiveDate>,
}

impl TryFrom<ScheduleRecord> for ScheduleEntry {
    type Error = ScheduleError;

    fn try_from(record: ScheduleRecord) -> Result<Self, Self::Error> {
        let key = match &record.month {
            MonthField::Number(n) => {
                let year = record
                    .year
                    .ok_or_else(|| ScheduleError::MissingYear(n.to_string()))?;
                IssueKey::new(year, *n)?
            }
            MonthField::Text(text) => IssueKey::parse_month(text, record.year)?,
        };
        Ok(Self {
            key,
            copy_deadline: record.copy_deadline,
            print_deadline: record.print_deadline,
            delivery_date: record.delivery_date,
        })
    }
}

impl From<ScheduleEntry> for ScheduleRecord {
    fn from(entry: ScheduleEntry) -> Self {
        Self {
            month: MonthField::Text(entry.key.to_string()),
            year: None,
            copy_deadline: entry.copy_deadline,
            print_deadline: entry.print_deadline,
            delivery_date: entry.delivery_date,
        }
    }
}
