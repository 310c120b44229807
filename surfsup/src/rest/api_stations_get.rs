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

//! API to list all stations.

use crate::driver::Driver;
use crate::rest::{EmptyBody, RestError};
use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    _: EmptyBody,
) -> Result<impl IntoResponse, RestError> {
    let stations = driver.get_stations().await?;
    Ok(Json(stations))
}

#[cfg(test)]
mod tests {
    use crate::rest::testutils::*;
    use axum::http;
    use std::collections::BTreeSet;

    fn route() -> (http::Method, String) {
        (http::Method::GET, "/api/v1.0/stations".to_owned())
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;
        context.put_station("USC00519397").await;
        context.put_station("USC00513117").await;
        context.put_station("USC00514830").await;

        let response = OneShotBuilder::new(context.app(), route())
            .send_empty()
            .await
            .expect_json::<Vec<String>>()
            .await;
        assert_eq!(3, response.len());
        assert_eq!(
            BTreeSet::from([
                "USC00513117".to_owned(),
                "USC00514830".to_owned(),
                "USC00519397".to_owned()
            ]),
            response.into_iter().collect::<BTreeSet<String>>()
        );

        context.close().await;
    }

    #[tokio::test]
    async fn test_empty() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.app(), route()).send_empty().await.expect_text(r"^\[\]$").await;

        context.close().await;
    }

    #[tokio::test]
    async fn test_db_error() {
        let context = TestContext::setup().await;
        context.close().await;

        OneShotBuilder::new(context.app(), route())
            .send_empty()
            .await
            .expect_status(http::StatusCode::INTERNAL_SERVER_ERROR)
            .expect_error("Unavailable")
            .await;
    }

    test_payload_must_be_empty!(TestContext::setup().await.into_app(), route());
}
