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

//! Operations on the collection of stations.

use crate::db;
use crate::driver::{Driver, DriverResult};
use crate::model::StationId;

impl Driver {
    /// Gets the identifiers of all stations.
    pub(crate) async fn get_stations(self) -> DriverResult<Vec<StationId>> {
        let mut ex = self.db.ex().await?;
        let ids = db::get_station_ids(&mut ex).await?;
        Ok(ids)
    }
}
