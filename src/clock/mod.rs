//! Timestamps for simulated trading days

use std::fmt::{Display, Formatter};
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

const SECS_IN_DAY: i64 = 86_400;

const DATE_FORMAT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");
const MINUTE_FORMAT: &[FormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");
const SECOND_FORMAT: &[FormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const ISO_FORMAT: &[FormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

///[DateTime] is a wrapper around the epoch time as i64. Every row of a price table and every
///record in the history is keyed by one of these.
//The internal representation with the time package should remain hidden from clients so that the
//dependency can be swapped out without changing the API.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DateTime(i64);

impl DateTime {
    /// Parses the date formats found in exported price tables: `2024-01-02`, `2024-01-02 09:30`,
    /// `2024-01-02 09:30:00` and `2024-01-02T09:30:00`. Date-only values are taken at midnight UTC.
    pub fn parse(val: &str) -> Option<Self> {
        let val = val.trim();
        for format in [SECOND_FORMAT, ISO_FORMAT, MINUTE_FORMAT] {
            if let Ok(parsed) = PrimitiveDateTime::parse(val, format) {
                return Some(parsed.assume_utc().into());
            }
        }
        if let Ok(parsed) = Date::parse(val, DATE_FORMAT) {
            return Some(parsed.midnight().assume_utc().into());
        }
        None
    }

    ///Produces `length` consecutive daily timestamps starting at `start`.
    pub fn daily_sequence(start: i64, length: usize) -> Vec<DateTime> {
        (0..length as i64)
            .map(|offset| DateTime(start + offset * SECS_IN_DAY))
            .collect()
    }
}

impl Display for DateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        //Out-of-range epochs are still valid keys, they just can't be rendered as a calendar date
        match OffsetDateTime::from_unix_timestamp(self.0)
            .ok()
            .and_then(|date| date.format(MINUTE_FORMAT).ok())
        {
            Some(formatted) => write!(f, "{}", formatted),
            None => write!(f, "{}", self.0),
        }
    }
}

impl Deref for DateTime {
    type Target = i64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<OffsetDateTime> for DateTime {
    fn from(value: OffsetDateTime) -> Self {
        value.unix_timestamp().into()
    }
}

impl From<DateTime> for i64 {
    fn from(v: DateTime) -> Self {
        v.0
    }
}

impl From<i64> for DateTime {
    fn from(v: i64) -> Self {
        DateTime(v)
    }
}
