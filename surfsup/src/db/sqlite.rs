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

//! Common utilities to interact with an SQLite database.

use crate::db::query::{Param, Query};
use crate::db::{Db, DbError, DbResult, Executor};
use crate::env::get_optional_var;
use async_trait::async_trait;
use log::warn;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// Default value for the `path` configuration property.
const DEFAULT_PATH: &str = "Resources/hawaii.sqlite";

/// Takes a raw SQLx error `e` and converts it to our generic error type.
pub fn map_sqlx_error(e: sqlx::Error) -> DbError {
    match e {
        sqlx::Error::ColumnDecode { source, .. } => DbError::DataIntegrityError(source.to_string()),
        sqlx::Error::PoolClosed => DbError::Unavailable,
        sqlx::Error::PoolTimedOut => DbError::Unavailable,
        sqlx::Error::RowNotFound => DbError::NotFound,
        e => DbError::BackendError(e.to_string()),
    }
}

/// Options to open an SQLite database.
#[derive(Debug)]
#[cfg_attr(test, derive(PartialEq))]
pub struct SqliteOptions {
    /// Path to the database file.
    pub path: String,

    /// Maximum number of connections to allow against the database.
    pub max_connections: Option<u32>,
}

impl SqliteOptions {
    /// Initializes a set of options from environment variables whose name is prefixed with the
    /// given `prefix`.
    ///
    /// This will use variables such as `<prefix>_PATH` and `<prefix>_MAX_CONNECTIONS`.
    pub fn from_env(prefix: &str) -> Result<SqliteOptions, String> {
        Ok(SqliteOptions {
            path: get_optional_var::<String>(prefix, "PATH")?
                .unwrap_or_else(|| DEFAULT_PATH.to_owned()),
            max_connections: get_optional_var::<u32>(prefix, "MAX_CONNECTIONS")?,
        })
    }
}

/// Builds an executable sqlx query from a dialect-specific `query`, binding all of its
/// parameters.  Dates are bound in their textual form because that is how the dataset stores
/// them.
pub(crate) fn prepare(query: &Query) -> sqlx::query::Query<'_, Sqlite, SqliteArguments<'_>> {
    let mut prepared = sqlx::query(&query.sql);
    for param in &query.params {
        prepared = match param {
            Param::Date(date) => prepared.bind(date.to_string()),
            Param::Station(station) => prepared.bind(station.as_str()),
        };
    }
    prepared
}

/// A database instance backed by an SQLite database.
pub struct SqliteDb {
    /// Shared SQLite connection pool.  This is a cloneable type that all concurrent
    /// requests can use concurrently.
    pool: SqlitePool,
}

impl SqliteDb {
    /// Opens the database described by `opts`.
    ///
    /// The database file must already exist and is opened in read-only mode: the service never
    /// modifies the dataset.
    pub async fn connect(opts: SqliteOptions) -> DbResult<Self> {
        let mut pool_options = SqlitePoolOptions::new();
        if let Some(max_connections) = opts.max_connections {
            pool_options = pool_options.max_connections(max_connections);
        }

        let options = SqliteConnectOptions::new().filename(&opts.path).read_only(true);

        let pool = pool_options.connect_with(options).await.map_err(map_sqlx_error)?;
        Ok(Self { pool })
    }

    /// Returns a connection of the specific type used by this database.
    pub(crate) async fn typed_ex(&self) -> DbResult<PoolConnection<Sqlite>> {
        self.pool.acquire().await.map_err(map_sqlx_error)
    }
}

impl Drop for SqliteDb {
    fn drop(&mut self) {
        if !self.pool.is_closed() {
            warn!("Dropping connection without having called close() first");
        }
    }
}

#[async_trait]
impl Db for SqliteDb {
    async fn ex(&self) -> DbResult<Executor> {
        let conn = self.typed_ex().await?;
        Ok(Executor::Sqlite(conn))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Helper function to initialize the database with a schema.
#[cfg(test)]
pub(crate) async fn run_schema(conn: &mut PoolConnection<Sqlite>, schema: &str) -> DbResult<()> {
    sqlx::raw_sql(schema).execute(&mut **conn).await.map_err(map_sqlx_error)?;
    Ok(())
}
