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

//! Entry point to the REST server.
//!
//! Every API is put in its own `.rs` file, using a name like `<path>_<method>.rs`, so that all
//! the integration tests for a given API live next to it.  The `tests` module within an API
//! defines a `route` function that returns the HTTP method and the API path under test, and all
//! tests within the module rely on it.

use crate::driver::{Driver, DriverError};
use crate::model::{IsoDate, ModelError};
use async_trait::async_trait;
use axum::Json;
use axum::Router;
use axum::body::HttpBody;
use axum::extract::path::ErrorKind;
use axum::extract::rejection::PathRejection;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::response::{IntoResponse, Response};
use http::request::Parts;
use log::error;
#[cfg(test)]
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;

mod api_precipitation_get;
mod api_root_get;
mod api_start_end_get;
mod api_start_get;
mod api_stations_get;
mod api_tobs_get;
#[cfg(test)]
mod testutils;

/// Frontend errors.  These are the errors that are visible to the user on failed requests.
#[derive(Debug, PartialEq, thiserror::Error)]
pub(crate) enum RestError {
    /// Catch-all error type for all unexpected errors.
    #[error("{0}")]
    InternalError(String),

    /// Indicates an error in the contents of the request.
    #[error("{0}")]
    InvalidRequest(String),

    /// Indicates that a requested entity does not exist.
    ///
    /// None of the current APIs look up individual entities, so this only surfaces if a driver
    /// operation reports a missing entry through `DriverError::NotFound`.
    #[error("{0}")]
    NotFound(String),

    /// Indicates that a request that should have empty content did not.
    #[error("Content should be empty")]
    PayloadNotEmpty,
}

impl From<DriverError> for RestError {
    fn from(e: DriverError) -> Self {
        match e {
            DriverError::BackendError(_) => RestError::InternalError(e.to_string()),
            DriverError::NotFound(_) => RestError::NotFound(e.to_string()),
        }
    }
}

impl From<ModelError> for RestError {
    fn from(e: ModelError) -> Self {
        RestError::InvalidRequest(e.to_string())
    }
}

impl From<PathRejection> for RestError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(e) => match e.kind() {
                ErrorKind::InvalidUtf8InPathParam { key, .. } => {
                    RestError::InvalidRequest(format!("Invalid {} parameter: not valid UTF-8", key))
                }
                _ => RestError::InvalidRequest(e.body_text()),
            },
            rejection => RestError::InternalError(rejection.body_text()),
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = match self {
            RestError::InternalError(_) => {
                error!("Request failed: {}", self);
                http::StatusCode::INTERNAL_SERVER_ERROR
            }
            RestError::InvalidRequest(_) => http::StatusCode::BAD_REQUEST,
            RestError::NotFound(_) => http::StatusCode::NOT_FOUND,
            RestError::PayloadNotEmpty => http::StatusCode::PAYLOAD_TOO_LARGE,
        };

        let response = ErrorResponse { message: self.to_string() };

        (status, Json(response)).into_response()
    }
}

/// Result type for this module.
pub(crate) type RestResult<T> = Result<T, RestError>;

/// Representation of the details of an error response.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub(crate) struct ErrorResponse {
    /// Textual representation of the error message.
    pub(crate) message: String,
}

/// A request body extractor that forbids any content.
///
/// Any API that doesn't expect a body should use this to ensure we don't get garbage data that we
/// don't care about.
pub(crate) struct EmptyBody {}

#[async_trait]
impl<S> FromRequest<S> for EmptyBody
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        if req.into_body().is_end_stream() {
            Ok(EmptyBody {})
        } else {
            Err(RestError::PayloadNotEmpty)
        }
    }
}

/// A path parameters extractor that reports malformed parameters as a `RestError`.
///
/// All APIs that take path parameters should use this instead of `Path` so that the error
/// responses always carry an `ErrorResponse`.
pub(crate) struct PathParams<T>(
    /// The deserialized path parameters.
    pub(crate) T,
);

#[async_trait]
impl<S, T> FromRequestParts<S> for PathParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = RestError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(PathParams(params))
    }
}

/// Parses the path parameter `name` with the `raw` value as a date.
fn parse_date_param(name: &str, raw: &str) -> RestResult<IsoDate> {
    IsoDate::parse(raw)
        .map_err(|e| RestError::InvalidRequest(format!("Invalid {} parameter: {}", name, e)))
}

/// Converts a panic raised by a handler into a regular error response.
fn handle_panic(details: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = details.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = details.downcast_ref::<&str>() {
        (*s).to_owned()
    } else {
        "unknown cause".to_owned()
    };
    RestError::InternalError(format!("Request handler panicked: {}", details)).into_response()
}

/// Creates the router for the application.
pub(crate) fn app(driver: Driver) -> Router {
    use axum::routing::get;
    Router::new()
        .route("/", get(api_root_get::handler))
        .route("/api/v1.0/precipitation", get(api_precipitation_get::handler))
        .route("/api/v1.0/stations", get(api_stations_get::handler))
        .route("/api/v1.0/tobs", get(api_tobs_get::handler))
        .route("/api/v1.0/start/:start", get(api_start_get::handler))
        .route("/api/v1.0/start/:start/end/:end", get(api_start_end_get::handler))
        .with_state(driver)
        .layer(CatchPanicLayer::custom(handle_panic))
}
