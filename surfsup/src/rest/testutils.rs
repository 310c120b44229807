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

//! Test utilities for the REST API.

use crate::db::{self, Db, sqlite};
use crate::driver::{DatasetFacts, Driver};
use crate::model::{IsoDate, StationId};
use crate::rest::{ErrorResponse, app};
use axum::Router;
use axum::extract::Request;
use axum::response::Response;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tower::util::ServiceExt;

/// Maximum body size for testing purposes.
const MAX_BODY_SIZE: usize = 64 * 1024;

/// Builder for a single request to the API server.
#[must_use]
pub(crate) struct OneShotBuilder {
    /// The router for the app being tested.
    app: Router,

    /// Builder for the request that will be sent to the app.
    builder: http::request::Builder,
}

impl OneShotBuilder {
    /// Creates a new request against a given `method`/`uri` pair served by an `app` router.
    pub(crate) fn new<U: AsRef<str>>(app: Router, (method, uri): (http::Method, U)) -> Self {
        let builder = Request::builder().method(method).uri(uri.as_ref());
        Self { app, builder }
    }

    /// Finishes building the request and sends it with an empty payload.
    pub(crate) async fn send_empty(self) -> ResponseChecker {
        let request = self.builder.body(axum::body::Body::empty()).unwrap();
        ResponseChecker::from(self.app.oneshot(request).await.unwrap())
    }

    /// Finishes building the request and sends it with a text payload.
    pub(crate) async fn send_text<T: Into<String>>(self, text: T) -> ResponseChecker {
        let request = self
            .builder
            .header(http::header::CONTENT_TYPE, mime::TEXT_PLAIN.as_ref())
            .body(axum::body::Body::from(text.into()))
            .unwrap();
        ResponseChecker::from(self.app.oneshot(request).await.unwrap())
    }
}

/// Validator for the outcome of a request sent by a `OneShotBuilder`.
#[must_use]
pub(crate) struct ResponseChecker {
    /// Actual response that we received from the app.
    response: Response,

    /// Expected HTTP status code in the response above.
    exp_status: http::StatusCode,
}

impl From<Response> for ResponseChecker {
    fn from(response: Response) -> Self {
        Self { response, exp_status: http::StatusCode::OK }
    }
}

impl ResponseChecker {
    /// Sets the expected exit HTTP status to `status`.
    pub(crate) fn expect_status(mut self, status: http::StatusCode) -> Self {
        self.exp_status = status;
        self
    }

    /// Performs common validation operations on the response.
    fn verify(&self) {
        assert_eq!(self.exp_status, self.response.status());
    }

    /// Finishes checking the response and returns its body.
    async fn take_body(self) -> Vec<u8> {
        self.verify();

        let body = axum::body::to_bytes(self.response.into_body(), MAX_BODY_SIZE).await.unwrap();
        body.to_vec()
    }

    /// Finishes checking the response and expects it to contain an empty body.
    pub(crate) async fn expect_empty(self) {
        let body = String::from_utf8(self.take_body().await).unwrap();
        assert!(body.is_empty(), "Body not empty; got {}", body);
    }

    /// Finishes checking the response and expects its body to be an `ErrorResponse` that
    /// matches `exp_re`.
    pub(crate) async fn expect_error(self, exp_re: &str) {
        let body = self.take_body().await;
        let response: ErrorResponse = match serde_json::from_slice(&body) {
            Ok(response) => response,
            Err(e) => {
                let body = String::from_utf8(body).unwrap();
                panic!("Invalid error response due to {}; content was {}", e, body);
            }
        };
        let re = regex::Regex::new(exp_re).unwrap();
        assert!(
            re.is_match(&response.message),
            "Response content '{:?}' does not match re '{}'",
            response,
            exp_re
        );
    }

    /// Finishes checking the response and expects it to contain a valid JSON object of
    /// type `T`.
    pub(crate) async fn expect_json<T: DeserializeOwned>(self) -> T {
        let body = self.take_body().await;
        serde_json::from_slice::<T>(&body).unwrap()
    }

    /// Finishes checking the response and expects its body to be valid UTF-8 and to match
    /// `exp_re`.
    pub(crate) async fn expect_text(self, exp_re: &str) {
        assert!(!exp_re.is_empty(), "Use expect_empty to validate empty responses");

        let body = String::from_utf8(self.take_body().await).unwrap();
        assert!(
            !body.contains("\"message\":"),
            "Use expect_error to validate errors wrapped in an ErrorResponse"
        );
        let re = regex::Regex::new(exp_re).unwrap();
        assert!(re.is_match(&body), "Body content '{}' does not match re '{}'", body, exp_re);
    }

    /// Finishes checking the response and returns the body of the response as UTF-8.
    pub(crate) async fn take_body_as_text(self) -> String {
        String::from_utf8(self.take_body().await).unwrap()
    }

    /// Finishes checking the response and returns the response itself for out of band
    /// validation of properties not supported by the `ResponseChecker`.
    pub(crate) async fn take_response(self) -> Response {
        self.verify();

        self.response
    }
}

/// Generates a test to verify that an API that does not expect a payload fails as necessary.
macro_rules! test_payload_must_be_empty {
    ( $app:expr, $route:expr ) => {
        #[tokio::test]
        async fn test_payload_must_be_empty() {
            $crate::rest::testutils::OneShotBuilder::new($app, $route)
                .send_text("should not be here")
                .await
                .expect_status(axum::http::StatusCode::PAYLOAD_TOO_LARGE)
                .expect_error("Content should be empty")
                .await;
        }
    };
}

pub(crate) use test_payload_must_be_empty;

/// State of a test that exercises the REST API against an in-memory database.
pub(crate) struct TestContext {
    /// The database backing the app, for direct manipulation.
    db: Arc<dyn Db + Send + Sync>,

    /// The app under test.
    app: Router,
}

impl TestContext {
    /// Sets up the app with the default dataset facts.
    pub(crate) async fn setup() -> Self {
        Self::setup_with_facts(DatasetFacts::default()).await
    }

    /// Sets up the app with custom dataset `facts`.
    pub(crate) async fn setup_with_facts(facts: DatasetFacts) -> Self {
        let db: Arc<dyn Db + Send + Sync> = Arc::from(sqlite::testutils::setup().await);
        let driver = Driver::new(db.clone(), facts);
        let app = app(driver);
        Self { db, app }
    }

    /// Returns a clone of the app under test.
    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    /// Consumes the context and returns the app under test.
    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Closes the database so that further requests fail.
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
