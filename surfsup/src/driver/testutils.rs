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

//! Test utilities for the business layer.

use crate::db::{self, Db, sqlite};
use crate::driver::{DatasetFacts, Driver};
use crate::model::{IsoDate, StationId};
use std::sync::Arc;

/// State of a test that exercises the driver against an in-memory database.
pub(crate) struct TestContext {
    /// The database backing the driver, for direct manipulation.
    db: Arc<dyn Db + Send + Sync>,

    /// The driver under test.
    driver: Driver,
}

impl TestContext {
    /// Sets up a driver with the default dataset facts.
    pub(crate) async fn setup() -> Self {
        Self::setup_with_facts(DatasetFacts::default()).await
    }

    /// Sets up a driver with custom dataset `facts`.
    pub(crate) async fn setup_with_facts(facts: DatasetFacts) -> Self {
        let db: Arc<dyn Db + Send + Sync> = Arc::from(sqlite::testutils::setup().await);
        let driver = Driver::new(db.clone(), facts);
        Self { db, driver }
    }

    /// Returns the database backing the driver.
    pub(crate) fn db(&self) -> &(dyn Db + Send + Sync) {
        self.db.as_ref()
    }

    /// Returns a clone of the driver under test.
    pub(crate) fn driver(&self) -> Driver {
        self.driver.clone()
    }

    /// Closes the database so that further operations fail.
    pub(crate) async fn close(&self) {
        self.db.close().await;
    }

    /// Stores a station with identifier `station`.
    pub(crate) async fn put_station(&self, station: &str) {
        db::put_station(&mut self.db.ex().await.unwrap(), &StationId::new(station).unwrap())
            .await
            .unwrap();
    }

    /// Stores a measurement of `station` taken on `date`.
    pub(crate) async fn put_measurement(
        &self,
        station: &str,
        date: &str,
        prcp: Option<f64>,
        tobs: f64,
    ) {
        db::put_measurement(
            &mut self.db.ex().await.unwrap(),
            &StationId::new(station).unwrap(),
            IsoDate::parse(date).unwrap(),
            prcp,
            tobs,
        )
        .await
        .unwrap();
    }
}
