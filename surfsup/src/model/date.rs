// SurfsUp
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! The `IsoDate` and `DateRange` data types.

use crate::model::{ModelError, ModelResult};
use derive_getters::Getters;
use serde::{Serialize, Serializer};
use std::fmt;
use time::macros::format_description;
use time::{Date, Month};

/// Length of a date in its textual `YYYY-MM-DD` form.
const ISO_DATE_LENGTH: usize = 10;

/// Represents a calendar date that is always rendered as `YYYY-MM-DD`.
///
/// This is the format in which dates come in through URLs and in which SQLite stores them.  Given
/// that the textual form is zero-padded, comparing two dates as strings yields the same result as
/// comparing them chronologically.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct IsoDate(Date);

impl IsoDate {
    /// Wraps an already-valid `date`.
    pub const fn from_date(date: Date) -> Self {
        Self(date)
    }

    /// Creates a new date from an untrusted string `s`, making sure it is a valid calendar date
    /// in the strict `YYYY-MM-DD` form.
    pub fn parse(s: &str) -> ModelResult<Self> {
        if s.len() != ISO_DATE_LENGTH {
            return Err(ModelError(format!("Invalid date '{}': expected YYYY-MM-DD", s)));
        }

        match Date::parse(s, format_description!("[year]-[month]-[day]")) {
            Ok(date) => Ok(Self(date)),
            Err(e) => Err(ModelError(format!("Invalid date '{}': {}", s, e))),
        }
    }

    /// Returns the same calendar day one year earlier.  February 29th maps to February 28th.
    pub fn one_year_before(self) -> ModelResult<Self> {
        let year = self.0.year() - 1;
        let date = match self.0.replace_year(year) {
            Ok(date) => date,
            Err(_) if self.0.month() == Month::February && self.0.day() == 29 => {
                Date::from_calendar_date(year, Month::February, 28)
                    .map_err(|e| ModelError(format!("Cannot go back a year from {}: {}", self, e)))?
            }
            Err(e) => {
                return Err(ModelError(format!("Cannot go back a year from {}: {}", self, e)));
            }
        };
        Ok(Self(date))
    }

    /// Returns the wrapped date.
    pub fn as_date(&self) -> Date {
        self.0
    }
}

impl fmt::Display for IsoDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.0.year(), u8::from(self.0.month()), self.0.day())
    }
}

impl Serialize for IsoDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// A closed range of dates used to filter measurements.  A missing `end` means that the range is
/// open towards the future.
///
/// The range is not validated: an `end` earlier than `start` is legal and simply matches nothing.
#[derive(Clone, Copy, Debug, Getters, PartialEq)]
pub struct DateRange {
    /// First date included in the range.
    start: IsoDate,

    /// Last date included in the range, if any.
    end: Option<IsoDate>,
}

impl DateRange {
    /// Creates a range that starts on `start` and has no upper bound.
    pub fn since(start: IsoDate) -> Self {
        Self { start, end: None }
    }

    /// Creates a range covering `start` to `end`, both inclusive.
    pub fn between(start: IsoDate, end: IsoDate) -> Self {
        Self { start, end: Some(end) }
    }
}
