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

//! Business logic for the service.
//!
//! Every operation implemented in the `Driver` consumes `self` and takes a single connection from
//! the pool for the duration of the operation.  The connection goes back to the pool when the
//! operation returns, whether it succeeded or not.

use crate::db::{Db, DbError};
use crate::model::{IsoDate, StationId};
use derive_getters::Getters;
use derive_more::Constructor;
use std::sync::Arc;
use time::macros::date;

mod facts;
mod precipitation;
mod stations;
mod temperatures;
#[cfg(test)]
pub(crate) mod testutils;

pub use facts::FactsSource;

/// Default first date of the "last year" of data: one year before the last date in the dataset.
pub const DEFAULT_LAST_YEAR_START: IsoDate = IsoDate::from_date(date!(2016 - 08 - 23));

/// Default station with the most observations in the dataset.
pub const DEFAULT_MOST_ACTIVE_STATION: &str = "USC00519281";

/// Business logic errors.  These errors encompass backend and logical errors.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum DriverError {
    /// Catch-all error type for unexpected database errors.
    #[error("{0}")]
    BackendError(String),

    /// Indicates that a requested entry does not exist.
    #[error("{0}")]
    NotFound(String),
}

impl From<DbError> for DriverError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::BackendError(_) => DriverError::BackendError(e.to_string()),
            DbError::DataIntegrityError(_) => DriverError::BackendError(e.to_string()),
            DbError::NotFound => DriverError::NotFound(e.to_string()),
            DbError::Unavailable => DriverError::BackendError(e.to_string()),
        }
    }
}

/// Result type for this module.
pub type DriverResult<T> = Result<T, DriverError>;

/// Facts about the dataset that the queries depend on.
///
/// These are fixed when the service starts and never recomputed while serving requests.
#[derive(Clone, Constructor, Debug, Getters, PartialEq)]
pub struct DatasetFacts {
    /// First date of the "last year" of data, used to filter precipitation and temperatures.
    last_year_start: IsoDate,

    /// Station whose temperatures are reported by the `tobs` endpoint.
    most_active_station: StationId,
}

impl Default for DatasetFacts {
    fn default() -> Self {
        Self {
            last_year_start: DEFAULT_LAST_YEAR_START,
            most_active_station: StationId::new(DEFAULT_MOST_ACTIVE_STATION)
                .expect("Hardcoded station identifier must be valid"),
        }
    }
}

/// Business logic.
///
/// The public operations exposed by the driver are all "one shot": they take one connection from
/// the pool and issue one query, so it's incorrect for the caller to use two separate calls.  For
/// this reason, these operations consume the driver in an attempt to minimize the possibility of
/// executing two operations.
#[derive(Clone)]
pub(crate) struct Driver {
    /// The database that the driver reads from.
    db: Arc<dyn Db + Send + Sync>,

    /// Dataset facts fixed at startup.
    facts: Arc<DatasetFacts>,
}

impl Driver {
    /// Creates a new driver backed by the given injected components.
    pub(crate) fn new(db: Arc<dyn Db + Send + Sync>, facts: DatasetFacts) -> Self {
        Self { db, facts: Arc::from(facts) }
    }
}
