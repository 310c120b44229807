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

//! Operations on temperature observations.

use crate::db;
use crate::driver::{Driver, DriverResult};
use crate::model::{DateRange, TemperatureSummary};

impl Driver {
    /// Gets the temperatures observed by the most active station during the last year of data,
    /// sorted by date.
    pub(crate) async fn get_most_active_temperatures(self) -> DriverResult<Vec<f64>> {
        let mut ex = self.db.ex().await?;
        let temperatures = db::get_station_temperatures_since(
            &mut ex,
            self.facts.most_active_station(),
            *self.facts.last_year_start(),
        )
        .await?;
        Ok(temperatures)
    }

    /// Summarizes the temperatures observed by all stations within `range`.
    pub(crate) async fn get_temperature_summary(
        self,
        range: DateRange,
    ) -> DriverResult<TemperatureSummary> {
        let mut ex = self.db.ex().await?;
        let summary = db::get_temperature_summary(&mut ex, range).await?;
        Ok(summary)
    }
}
