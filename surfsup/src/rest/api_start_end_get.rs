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

//! API to summarize the temperatures observed within a range of dates.

use crate::driver::Driver;
use crate::model::DateRange;
use crate::rest::{EmptyBody, PathParams, RestError, parse_date_param};
use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    PathParams((start, end)): PathParams<(String, String)>,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    let start = parse_date_param("start", &start)?;
    let end = parse_date_param("end", &end)?;
    let summary = driver.get_temperature_summary(DateRange::between(start, end)).await?;
    Ok(Json(summary))
}
