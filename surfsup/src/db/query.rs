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

//! Builders for the fixed set of queries issued by the service.
//!
//! The functions in this module are pure: they produce the SQL text and the ordered list of
//! parameters to bind, and leave execution to the backend-specific code in the parent module.
//! Keeping the two apart lets us test the shape of every query without a database.

use crate::model::{DateRange, IsoDate, StationId};

/// SQL dialects we know how to generate queries for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Dialect {
    /// PostgreSQL, which uses numbered `$n` placeholders.
    #[cfg_attr(not(feature = "postgres"), allow(unused))]
    Postgres,

    /// SQLite, which uses positional `?` placeholders.
    #[cfg_attr(not(any(feature = "sqlite", test)), allow(unused))]
    Sqlite,
}

impl Dialect {
    /// Returns the placeholder for the 1-based parameter `index`.
    fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${}", index),
            Dialect::Sqlite => "?".to_owned(),
        }
    }
}

/// A value to bind to one of the placeholders of a `Query`.
#[derive(Debug, PartialEq)]
pub(crate) enum Param {
    /// A date to compare against `measurement.date`.
    Date(IsoDate),

    /// A station to compare against `measurement.station`.
    Station(StationId),
}

/// A query ready to be executed: its SQL text and the values for its placeholders, in order.
#[derive(Debug, PartialEq)]
pub(crate) struct Query {
    /// The SQL text with dialect-specific placeholders.
    pub(crate) sql: String,

    /// Values for the placeholders in `sql`, in the order in which they appear.
    pub(crate) params: Vec<Param>,
}

/// Conditions to select rows from the `measurement` table.  All conditions are optional and the
/// ones that are present are combined with `AND`.
#[derive(Default)]
struct MeasurementFilter {
    /// Only select rows for this station.
    station: Option<StationId>,

    /// Only select rows on or after this date.
    since: Option<IsoDate>,

    /// Only select rows on or before this date.
    until: Option<IsoDate>,
}

impl MeasurementFilter {
    /// Restricts the filter to the rows of `station`.
    fn with_station(mut self, station: StationId) -> Self {
        self.station = Some(station);
        self
    }

    /// Restricts the filter to the rows dated on or after `since`.
    fn with_since(mut self, since: IsoDate) -> Self {
        self.since = Some(since);
        self
    }

    /// Restricts the filter to the rows dated on or before `until`, if given.
    fn with_until(mut self, until: Option<IsoDate>) -> Self {
        self.until = until;
        self
    }

    /// Renders the filter as a `WHERE` clause, including a leading space, for `dialect`.
    ///
    /// Returns an empty clause if the filter has no conditions.
    fn into_where_clause(self, dialect: Dialect) -> (String, Vec<Param>) {
        let mut conditions = vec![];
        let mut params = vec![];

        if let Some(station) = self.station {
            params.push(Param::Station(station));
            conditions.push(format!("station = {}", dialect.placeholder(params.len())));
        }
        if let Some(since) = self.since {
            params.push(Param::Date(since));
            conditions.push(format!("date >= {}", dialect.placeholder(params.len())));
        }
        if let Some(until) = self.until {
            params.push(Param::Date(until));
            conditions.push(format!("date <= {}", dialect.placeholder(params.len())));
        }

        if conditions.is_empty() {
            (String::new(), params)
        } else {
            (format!(" WHERE {}", conditions.join(" AND ")), params)
        }
    }
}

/// Builds the query to fetch the `date` and `prcp` of all measurements taken on or after `since`,
/// sorted by date.
pub(crate) fn precipitation_since(dialect: Dialect, since: IsoDate) -> Query {
    let (where_clause, params) = MeasurementFilter::default().with_since(since).into_where_clause(dialect);
    Query { sql: format!("SELECT date, prcp FROM measurement{} ORDER BY date ASC", where_clause), params }
}

/// Builds the query to fetch the `station` identifier of all known stations.
///
/// There is no `ORDER BY`: results come in the natural order of the table.
pub(crate) fn station_ids(_dialect: Dialect) -> Query {
    Query { sql: "SELECT station FROM station".to_owned(), params: vec![] }
}

/// Builds the query to fetch the `tobs` of all measurements of `station` taken on or after
/// `since`, sorted by date.
pub(crate) fn station_temperatures_since(dialect: Dialect, station: StationId, since: IsoDate) -> Query {
    let (where_clause, params) =
        MeasurementFilter::default().with_station(station).with_since(since).into_where_clause(dialect);
    Query { sql: format!("SELECT tobs FROM measurement{} ORDER BY date ASC", where_clause), params }
}

/// Builds the query to compute the `min_tobs`, `avg_tobs` and `max_tobs` aggregates over all
/// measurements within `range`.
pub(crate) fn temperature_summary(dialect: Dialect, range: DateRange) -> Query {
    let (where_clause, params) = MeasurementFilter::default()
        .with_since(*range.start())
        .with_until(*range.end())
        .into_where_clause(dialect);
    Query {
        sql: format!(
            "SELECT MIN(tobs) AS min_tobs, AVG(tobs) AS avg_tobs, MAX(tobs) AS max_tobs \
            FROM measurement{}",
            where_clause
        ),
        params,
    }
}

/// Builds the query to fetch the `last_date` on which any measurement was taken.
pub(crate) fn last_measurement_date(_dialect: Dialect) -> Query {
    Query { sql: "SELECT MAX(date) AS last_date FROM measurement".to_owned(), params: vec![] }
}

/// Builds the query to fetch the `station` with the most measurements, breaking ties by picking
/// the lowest identifier.
pub(crate) fn most_active_station(_dialect: Dialect) -> Query {
    Query {
        sql: "SELECT station, COUNT(*) AS observations FROM measurement \
            GROUP BY station ORDER BY observations DESC, station ASC LIMIT 1"
            .to_owned(),
        params: vec![],
    }
}
