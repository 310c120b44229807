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

//! Resolution of the dataset facts at startup.

use crate::db::{self, Db, DbError};
use crate::driver::{DatasetFacts, DriverResult};
use crate::env::get_optional_var;
use crate::model::{IsoDate, StationId};
use log::info;

/// Where the dataset facts come from.
#[derive(Debug, PartialEq)]
pub enum FactsSource {
    /// Use the given facts as is.
    Fixed(DatasetFacts),

    /// Compute the facts from the contents of the database.
    Derived,
}

impl FactsSource {
    /// Initializes the source of facts from environment variables whose name is prefixed with the
    /// given `prefix`.
    ///
    /// This will use variables such as `<prefix>_LAST_YEAR_START`,
    /// `<prefix>_MOST_ACTIVE_STATION` and `<prefix>_DERIVE_FACTS`.  Facts that are not overridden
    /// take their default values.  Asking to derive the facts while also overriding any of them is
    /// an error.
    pub fn from_env(prefix: &str) -> Result<FactsSource, String> {
        let derive = get_optional_var::<bool>(prefix, "DERIVE_FACTS")?.unwrap_or(false);
        let last_year_start = get_optional_var::<IsoDate>(prefix, "LAST_YEAR_START")?;
        let most_active_station = get_optional_var::<StationId>(prefix, "MOST_ACTIVE_STATION")?;

        if derive {
            if last_year_start.is_some() || most_active_station.is_some() {
                return Err(format!(
                    "{}_DERIVE_FACTS cannot be combined with explicit dataset facts",
                    prefix
                ));
            }
            return Ok(FactsSource::Derived);
        }

        let defaults = DatasetFacts::default();
        Ok(FactsSource::Fixed(DatasetFacts::new(
            last_year_start.unwrap_or(defaults.last_year_start),
            most_active_station.unwrap_or(defaults.most_active_station),
        )))
    }

    /// Obtains the facts described by this source, querying `db` if they have to be derived.
    pub(crate) async fn resolve(self, db: &(dyn Db + Send + Sync)) -> DriverResult<DatasetFacts> {
        match self {
            FactsSource::Fixed(facts) => Ok(facts),
            FactsSource::Derived => {
                let mut ex = db.ex().await?;
                let last_date = db::get_last_measurement_date(&mut ex).await?;
                let last_year_start = last_date.one_year_before().map_err(DbError::from)?;
                let most_active_station = db::get_most_active_station(&mut ex).await?;
                info!(
                    "Derived dataset facts: last measurement on {}, last year starts on {}, \
                    most active station is {}",
                    last_date,
                    last_year_start,
                    most_active_station.as_str()
                );
                Ok(DatasetFacts::new(last_year_start, most_active_station))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::DriverError;
    use crate::driver::testutils::*;

    #[test]
    fn test_from_env_defaults() {
        temp_env::with_vars(
            [
                ("FACTS_DERIVE_FACTS", None::<&str>),
                ("FACTS_LAST_YEAR_START", None),
                ("FACTS_MOST_ACTIVE_STATION", None),
            ],
            || {
                assert_eq!(
                    FactsSource::Fixed(DatasetFacts::default()),
                    FactsSource::from_env("FACTS").unwrap()
                );
            },
        );
    }

    #[test]
    fn test_from_env_overrides() {
        temp_env::with_vars(
            [
                ("FACTS_DERIVE_FACTS", Some("false")),
                ("FACTS_LAST_YEAR_START", Some("2015-01-01")),
                ("FACTS_MOST_ACTIVE_STATION", Some("USC00513117")),
            ],
            || {
                assert_eq!(
                    FactsSource::Fixed(DatasetFacts::new(
                        IsoDate::parse("2015-01-01").unwrap(),
                        StationId::from("USC00513117")
                    )),
                    FactsSource::from_env("FACTS").unwrap()
                );
            },
        );
    }

    #[test]
    fn test_from_env_partial_override() {
        temp_env::with_vars(
            [
                ("FACTS_DERIVE_FACTS", None),
                ("FACTS_LAST_YEAR_START", None),
                ("FACTS_MOST_ACTIVE_STATION", Some("USC00513117")),
            ],
            || {
                assert_eq!(
                    FactsSource::Fixed(DatasetFacts::new(
                        IsoDate::parse("2016-08-23").unwrap(),
                        StationId::from("USC00513117")
                    )),
                    FactsSource::from_env("FACTS").unwrap()
                );
            },
        );
    }

    #[test]
    fn test_from_env_derive() {
        temp_env::with_vars(
            [
                ("FACTS_DERIVE_FACTS", Some("true")),
                ("FACTS_LAST_YEAR_START", None),
                ("FACTS_MOST_ACTIVE_STATION", None),
            ],
            || {
                assert_eq!(FactsSource::Derived, FactsSource::from_env("FACTS").unwrap());
            },
        );
    }

    #[test]
    fn test_from_env_derive_conflicts_with_overrides() {
        temp_env::with_vars(
            [
                ("FACTS_DERIVE_FACTS", Some("true")),
                ("FACTS_LAST_YEAR_START", Some("2015-01-01")),
                ("FACTS_MOST_ACTIVE_STATION", None),
            ],
            || {
                let err = FactsSource::from_env("FACTS").unwrap_err();
                assert!(err.contains("FACTS_DERIVE_FACTS cannot be combined"));
            },
        );
    }

    #[test]
    fn test_from_env_bad_date() {
        temp_env::with_vars(
            [
                ("FACTS_DERIVE_FACTS", None),
                ("FACTS_LAST_YEAR_START", Some("2015-13-01")),
                ("FACTS_MOST_ACTIVE_STATION", None),
            ],
            || {
                let err = FactsSource::from_env("FACTS").unwrap_err();
                assert!(err.contains("FACTS_LAST_YEAR_START"));
                assert!(err.contains("2015-13-01"));
            },
        );
    }

    #[tokio::test]
    async fn test_resolve_fixed_does_not_touch_db() {
        let context = TestContext::setup().await;
        context.close().await;

        let facts = DatasetFacts::new(
            IsoDate::parse("2010-01-01").unwrap(),
            StationId::from("USC00513117"),
        );
        let resolved = FactsSource::Fixed(facts.clone()).resolve(context.db()).await.unwrap();
        assert_eq!(facts, resolved);
    }

    #[tokio::test]
    async fn test_resolve_derived() {
        let context = TestContext::setup().await;
        context.put_measurement("USC00519397", "2017-08-20", None, 80.0).await;
        context.put_measurement("USC00519281", "2017-08-22", None, 80.0).await;
        context.put_measurement("USC00519281", "2017-08-23", None, 80.0).await;

        let facts = FactsSource::Derived.resolve(context.db()).await.unwrap();
        assert_eq!(
            DatasetFacts::new(IsoDate::parse("2016-08-23").unwrap(), StationId::from("USC00519281")),
            facts
        );

        context.close().await;
    }

    #[tokio::test]
    async fn test_resolve_derived_leap_day() {
        let context = TestContext::setup().await;
        context.put_measurement("USC00519281", "2016-02-29", None, 80.0).await;

        let facts = FactsSource::Derived.resolve(context.db()).await.unwrap();
        assert_eq!(&IsoDate::parse("2015-02-28").unwrap(), facts.last_year_start());

        context.close().await;
    }

    #[tokio::test]
    async fn test_resolve_derived_empty_dataset() {
        let context = TestContext::setup().await;

        match FactsSource::Derived.resolve(context.db()).await {
            Err(DriverError::NotFound(_)) => (),
            r => panic!("Unexpected result: {:?}", r),
        }

        context.close().await;
    }
}
