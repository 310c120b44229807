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

//! API to list the available routes.

use crate::rest::EmptyBody;
use axum::response::Html;

/// Listing of the routes exposed by the service, with sample parameters.
const ROUTES: &str = "Available Routes:<br/>\
    /api/v1.0/precipitation<br/>\
    /api/v1.0/stations<br/>\
    /api/v1.0/tobs<br/>\
    /api/v1.0/start/2014-01-26<br/>\
    /api/v1.0/start/2014-01-26/end/2017-02-18";

/// API handler.
pub(crate) async fn handler(_: EmptyBody) -> Html<&'static str> {
    Html(ROUTES)
}
