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

//! Operations on precipitation readings.

use crate::db;
use crate::driver::{Driver, DriverResult};
use crate::model::PrecipitationReading;

impl Driver {
    /// Gets the precipitation readings of the last year of data, sorted by date.
    pub(crate) async fn get_precipitation(self) -> DriverResult<Vec<PrecipitationReading>> {
        let mut ex = self.db.ex().await?;
        let readings = db::get_precipitation_since(&mut ex, *self.facts.last_year_start()).await?;
        Ok(readings)
    }
}
