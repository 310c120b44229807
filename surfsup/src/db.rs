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

//! Generic abstraction to access the climate database.
//!
//! The facilities in this module provide an abstraction over different database systems such as
//! PostgreSQL and SQLite.  The dataset is distributed as an SQLite file so that is the default
//! backend, but the same data can be served from PostgreSQL.
//!
//! The service never writes to the database.  The tables are owned by whoever prepared the
//! dataset and the schema files in this module only exist to build test databases.

use crate::model::{
    DateRange, IsoDate, ModelError, PrecipitationReading, StationId, TemperatureSummary,
};
use async_trait::async_trait;
#[cfg(any(feature = "sqlite", test))]
use sqlx::sqlite::{Sqlite, SqliteRow};
#[cfg(feature = "postgres")]
use sqlx::postgres::{PgRow, Postgres};
use sqlx::pool::PoolConnection;
use sqlx::Row;

#[cfg(feature = "postgres")]
pub mod postgres;
mod query;
#[cfg(any(feature = "sqlite", test))]
pub mod sqlite;

use query::Dialect;

/// Database errors.  Any unexpected errors that come from the database are classified as
/// `BackendError`, but errors we know about have more specific types.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DbError {
    /// Catch-all error type for unexpected database errors.
    #[error("Database error: {0}")]
    BackendError(String),

    /// Indicates a failure processing the data that already exists in the database.
    #[error("Data integrity error: {0}")]
    DataIntegrityError(String),

    /// Indicates that a requested entry does not exist.
    #[error("Entity not found")]
    NotFound,

    /// Indicates that the database is not available (maybe because of too many active concurrent
    /// connections).
    #[error("Unavailable")]
    Unavailable,
}

impl From<ModelError> for DbError {
    fn from(e: ModelError) -> Self {
        DbError::DataIntegrityError(e.to_string())
    }
}

/// Result type for this module.
pub type DbResult<T> = Result<T, DbError>;

/// A database executor that can talk to multiple database implementations.
///
/// Each executor owns one connection taken from the pool of its database.  The connection goes
/// back to the pool when the executor is dropped, whichever way the operation that used it ends.
/// Users of this type are forced to destructure it and issue different calls for each database.
pub enum Executor {
    /// A PostgreSQL connection that can be used in `sqlx` operations.
    #[cfg(feature = "postgres")]
    Postgres(PoolConnection<Postgres>),

    /// A SQLite connection that can be used in `sqlx` operations.
    #[cfg(any(feature = "sqlite", test))]
    Sqlite(PoolConnection<Sqlite>),
}

/// Abstraction over the database connection.
#[async_trait]
pub trait Db {
    /// Obtains an executor backed by a connection from the pool.
    ///
    /// This would be better called `executor` but this method is used so frequently that it makes
    /// call sites too verbose.
    async fn ex(&self) -> DbResult<Executor>;

    /// Closes the pool, waiting for any outstanding connections to be returned first.
    ///
    /// Once closed, `ex` fails for any new callers.
    async fn close(&self);
}

#[cfg(feature = "postgres")]
impl TryFrom<PgRow> for PrecipitationReading {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let date: time::Date = row.try_get("date").map_err(postgres::map_sqlx_error)?;
        let prcp: Option<f64> = row.try_get("prcp").map_err(postgres::map_sqlx_error)?;
        Ok(PrecipitationReading::new(IsoDate::from_date(date), prcp))
    }
}

#[cfg(any(feature = "sqlite", test))]
impl TryFrom<SqliteRow> for PrecipitationReading {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let date: String = row.try_get("date").map_err(sqlite::map_sqlx_error)?;
        let prcp: Option<f64> = row.try_get("prcp").map_err(sqlite::map_sqlx_error)?;
        Ok(PrecipitationReading::new(IsoDate::parse(&date)?, prcp))
    }
}

#[cfg(feature = "postgres")]
impl TryFrom<PgRow> for TemperatureSummary {
    type Error = DbError;

    fn try_from(row: PgRow) -> DbResult<Self> {
        let min: Option<f64> = row.try_get("min_tobs").map_err(postgres::map_sqlx_error)?;
        let avg: Option<f64> = row.try_get("avg_tobs").map_err(postgres::map_sqlx_error)?;
        let max: Option<f64> = row.try_get("max_tobs").map_err(postgres::map_sqlx_error)?;
        Ok(TemperatureSummary::new(min, avg, max))
    }
}

#[cfg(any(feature = "sqlite", test))]
impl TryFrom<SqliteRow> for TemperatureSummary {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let min: Option<f64> = row.try_get("min_tobs").map_err(sqlite::map_sqlx_error)?;
        let avg: Option<f64> = row.try_get("avg_tobs").map_err(sqlite::map_sqlx_error)?;
        let max: Option<f64> = row.try_get("max_tobs").map_err(sqlite::map_sqlx_error)?;
        Ok(TemperatureSummary::new(min, avg, max))
    }
}

/// Initializes the database schema.  Only used to prepare test databases.
#[cfg(test)]
pub(crate) async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(conn) => postgres::run_schema(conn, include_str!("db/postgres.sql")).await,

        Executor::Sqlite(conn) => sqlite::run_schema(conn, include_str!("db/sqlite.sql")).await,
    }
}

/// Stores a new station with identifier `station` and made-up metadata.  Only used to populate
/// test databases.
#[cfg(test)]
pub(crate) async fn put_station(ex: &mut Executor, station: &StationId) -> DbResult<()> {
    let query_str = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(_) => {
            "INSERT INTO station (station, name, latitude, longitude, elevation)
                VALUES ($1, $2, 21.3, -157.8, 3.0)"
        }
        Executor::Sqlite(_) => {
            "INSERT INTO station (station, name, latitude, longitude, elevation)
                VALUES (?, ?, 21.3, -157.8, 3.0)"
        }
    };
    let name = format!("Station {}", station.as_str());

    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(conn) => {
            sqlx::query(query_str)
                .bind(station.as_str())
                .bind(name)
                .execute(&mut **conn)
                .await
                .map_err(postgres::map_sqlx_error)?;
        }

        Executor::Sqlite(conn) => {
            sqlx::query(query_str)
                .bind(station.as_str())
                .bind(name)
                .execute(&mut **conn)
                .await
                .map_err(sqlite::map_sqlx_error)?;
        }
    }
    Ok(())
}

/// Stores a new measurement of `station` taken on `date`.  Only used to populate test databases.
#[cfg(test)]
pub(crate) async fn put_measurement(
    ex: &mut Executor,
    station: &StationId,
    date: IsoDate,
    prcp: Option<f64>,
    tobs: f64,
) -> DbResult<()> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(conn) => {
            let query_str = "
                INSERT INTO measurement (station, date, prcp, tobs) VALUES ($1, $2, $3, $4)
            ";
            sqlx::query(query_str)
                .bind(station.as_str())
                .bind(date.as_date())
                .bind(prcp)
                .bind(tobs)
                .execute(&mut **conn)
                .await
                .map_err(postgres::map_sqlx_error)?;
        }

        Executor::Sqlite(conn) => {
            let query_str = "
                INSERT INTO measurement (station, date, prcp, tobs) VALUES (?, ?, ?, ?)
            ";
            sqlx::query(query_str)
                .bind(station.as_str())
                .bind(date.to_string())
                .bind(prcp)
                .bind(tobs)
                .execute(&mut **conn)
                .await
                .map_err(sqlite::map_sqlx_error)?;
        }
    }
    Ok(())
}

/// Gets the precipitation recorded by every station on or after the `since` date, sorted by date.
pub(crate) async fn get_precipitation_since(
    ex: &mut Executor,
    since: IsoDate,
) -> DbResult<Vec<PrecipitationReading>> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(conn) => {
            let query = query::precipitation_since(Dialect::Postgres, since);
            let rows = postgres::prepare(&query)
                .fetch_all(&mut **conn)
                .await
                .map_err(postgres::map_sqlx_error)?;
            rows.into_iter().map(PrecipitationReading::try_from).collect()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(conn) => {
            let query = query::precipitation_since(Dialect::Sqlite, since);
            let rows = sqlite::prepare(&query)
                .fetch_all(&mut **conn)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            rows.into_iter().map(PrecipitationReading::try_from).collect()
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Gets the identifiers of all known stations in the order in which the database returns them.
pub(crate) async fn get_station_ids(ex: &mut Executor) -> DbResult<Vec<StationId>> {
    let raw_ids: Vec<String> = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(conn) => {
            let query = query::station_ids(Dialect::Postgres);
            let rows = postgres::prepare(&query)
                .fetch_all(&mut **conn)
                .await
                .map_err(postgres::map_sqlx_error)?;
            rows.iter()
                .map(|row| row.try_get("station"))
                .collect::<Result<_, sqlx::Error>>()
                .map_err(postgres::map_sqlx_error)?
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(conn) => {
            let query = query::station_ids(Dialect::Sqlite);
            let rows = sqlite::prepare(&query)
                .fetch_all(&mut **conn)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            rows.iter()
                .map(|row| row.try_get("station"))
                .collect::<Result<_, sqlx::Error>>()
                .map_err(sqlite::map_sqlx_error)?
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    raw_ids.into_iter().map(|id| StationId::new(id).map_err(DbError::from)).collect()
}

/// Gets the temperatures observed by `station` on or after the `since` date, sorted by date.
pub(crate) async fn get_station_temperatures_since(
    ex: &mut Executor,
    station: &StationId,
    since: IsoDate,
) -> DbResult<Vec<f64>> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(conn) => {
            let query = query::station_temperatures_since(Dialect::Postgres, station.clone(), since);
            let rows = postgres::prepare(&query)
                .fetch_all(&mut **conn)
                .await
                .map_err(postgres::map_sqlx_error)?;
            rows.iter()
                .map(|row| row.try_get("tobs"))
                .collect::<Result<_, sqlx::Error>>()
                .map_err(postgres::map_sqlx_error)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(conn) => {
            let query = query::station_temperatures_since(Dialect::Sqlite, station.clone(), since);
            let rows = sqlite::prepare(&query)
                .fetch_all(&mut **conn)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            rows.iter()
                .map(|row| row.try_get("tobs"))
                .collect::<Result<_, sqlx::Error>>()
                .map_err(sqlite::map_sqlx_error)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Computes the minimum, average and maximum temperatures observed within `range`.
///
/// A range that matches no measurements yields a summary with no values.
pub(crate) async fn get_temperature_summary(
    ex: &mut Executor,
    range: DateRange,
) -> DbResult<TemperatureSummary> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(conn) => {
            let query = query::temperature_summary(Dialect::Postgres, range);
            let row = postgres::prepare(&query)
                .fetch_one(&mut **conn)
                .await
                .map_err(postgres::map_sqlx_error)?;
            TemperatureSummary::try_from(row)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(conn) => {
            let query = query::temperature_summary(Dialect::Sqlite, range);
            let row = sqlite::prepare(&query)
                .fetch_one(&mut **conn)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            TemperatureSummary::try_from(row)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Gets the date of the most recent measurement in the database.
///
/// Returns `NotFound` if there are no measurements.
pub(crate) async fn get_last_measurement_date(ex: &mut Executor) -> DbResult<IsoDate> {
    let last_date = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(conn) => {
            let query = query::last_measurement_date(Dialect::Postgres);
            let row = postgres::prepare(&query)
                .fetch_one(&mut **conn)
                .await
                .map_err(postgres::map_sqlx_error)?;
            let last_date: Option<time::Date> =
                row.try_get("last_date").map_err(postgres::map_sqlx_error)?;
            last_date.map(IsoDate::from_date)
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(conn) => {
            let query = query::last_measurement_date(Dialect::Sqlite);
            let row = sqlite::prepare(&query)
                .fetch_one(&mut **conn)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            let last_date: Option<String> =
                row.try_get("last_date").map_err(sqlite::map_sqlx_error)?;
            match last_date {
                Some(raw) => Some(IsoDate::parse(&raw)?),
                None => None,
            }
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    last_date.ok_or(DbError::NotFound)
}

/// Gets the station with the largest number of measurements.  Ties are broken by picking the
/// station with the lowest identifier.
///
/// Returns `NotFound` if there are no measurements.
pub(crate) async fn get_most_active_station(ex: &mut Executor) -> DbResult<StationId> {
    let raw_id: Option<String> = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(conn) => {
            let query = query::most_active_station(Dialect::Postgres);
            let row = postgres::prepare(&query)
                .fetch_optional(&mut **conn)
                .await
                .map_err(postgres::map_sqlx_error)?;
            match row {
                Some(row) => Some(row.try_get("station").map_err(postgres::map_sqlx_error)?),
                None => None,
            }
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(conn) => {
            let query = query::most_active_station(Dialect::Sqlite);
            let row = sqlite::prepare(&query)
                .fetch_optional(&mut **conn)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            match row {
                Some(row) => Some(row.try_get("station").map_err(sqlite::map_sqlx_error)?),
                None => None,
            }
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    match raw_id {
        Some(id) => Ok(StationId::new(id)?),
        None => Err(DbError::NotFound),
    }
}
